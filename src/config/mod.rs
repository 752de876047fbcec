/// Application settings from config.toml and the environment
pub mod app;

/// Ledger storage setup
pub mod ledger;

pub use app::{AppConfig, load_app_configuration};
pub use ledger::open_ledger;
