//! Process-wide logging setup for bloomshop binaries and tests.

pub mod logging;

pub use logging::{LogFormat, LogSettings};

/// Initialize logging from the environment.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    logging::init(LogSettings::from_env());
}
