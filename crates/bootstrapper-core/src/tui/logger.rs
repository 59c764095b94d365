use crate::logger::Logger;

/// Logger that prints cliclack status lines
///
/// Write errors on the terminal are dropped; a status line is never worth
/// aborting a half-finished setup for.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn info(&self, message: &str) {
        tracing::debug!("{message}");
        let _ = cliclack::log::info(message);
    }

    fn success(&self, message: &str) {
        tracing::debug!("{message}");
        let _ = cliclack::log::success(message);
    }

    fn warning(&self, message: &str) {
        tracing::debug!("{message}");
        let _ = cliclack::log::warning(message);
    }

    fn error(&self, message: &str) {
        tracing::debug!("{message}");
        let _ = cliclack::log::error(message);
    }
}
