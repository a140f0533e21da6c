pub mod calendar;
pub mod config;
pub mod crawler;
pub mod dates;
pub mod error;
pub mod http;
pub mod ledger;
pub mod logging;
pub mod resolver;
pub mod retry;
pub mod store;
