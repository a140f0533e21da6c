//! CLI command handlers. Each command is in its own file.

mod reset_failed;
mod run;
mod status;

pub use reset_failed::run_reset_failed;
pub use run::run_crawl;
pub use status::run_status;
