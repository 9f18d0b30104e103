pub mod app;
pub mod config;

pub use app::{build_core, LunchCore};
pub use config::Config;
