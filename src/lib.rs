pub mod config;
pub mod format;
pub mod logging;
pub mod output;
pub mod system;
pub mod watch;
