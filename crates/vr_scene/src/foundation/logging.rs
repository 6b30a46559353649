//! Logging utilities and structured logging support

use crate::config::LoggingConfig;

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with a fallback level from configuration
///
/// `RUST_LOG` still wins when it is set. Calling this more than once is
/// harmless: later calls leave the installed logger in place.
pub fn init_with_config(config: &LoggingConfig) {
    let env = env_logger::Env::default().default_filter_or(config.level.as_str());
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized, keeping existing configuration");
    }
}
