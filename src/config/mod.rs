use error_stack::Report;
use thiserror::Error;

mod database;
mod jwt;
mod logging;
mod server;

pub use database::{Database, DbPoolConfig};
pub use jwt::Jwt;
pub use logging::{InvalidLoggingStyle, Logging, LoggingStyle};
pub use server::Server;

#[derive(Debug, Error)]
#[error("Failed to load configuration")]
pub struct ParseError;

/// Collects every invalid configuration key so they can be
/// reported all at once instead of one per run.
#[derive(Debug, Default)]
pub(crate) struct Violations(Vec<String>);

impl Violations {
    pub fn check(&mut self, valid: bool, key: &str, message: &str) {
        if !valid {
            self.0.push(format!("{key}: {message}"));
        }
    }

    pub fn into_result(self) -> error_stack::Result<(), ParseError> {
        if self.0.is_empty() {
            return Ok(());
        }

        let mut report = Report::new(ParseError);
        for violation in self.0 {
            report = report.attach_printable(violation);
        }
        Err(report)
    }
}
