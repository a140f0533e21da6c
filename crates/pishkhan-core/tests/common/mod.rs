pub mod viewer_server;
