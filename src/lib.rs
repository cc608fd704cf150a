pub mod checker;
pub mod cli;
pub mod config;
pub mod dict;
pub mod error;
pub mod host;
pub mod scheduler;
pub mod session;

pub use checker::severity::{ErrorKind, Severity, SeverityConfig};
pub use checker::DiagnosticCollector;
pub use config::{Config, TriggerEvent};
pub use error::{CollectError, ConfigError, HostError};
pub use host::{DocumentId, OracleResult, RegionTag, SyntaxStack};
pub use session::{HostEvent, Session};

use serde::{Deserialize, Serialize};

/// Namespace this crate publishes its diagnostics under.
pub const SOURCE: &str = "texspell";

/// A scanning position. Both fields are 1-based; columns count `char`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Zero-based `(line, column)` pair, as used by [`Diagnostic`].
    pub fn to_zero_based(self) -> (usize, usize) {
        (self.line.saturating_sub(1), self.column.saturating_sub(1))
    }
}

/// One misspelled word instance. Ranges are 0-based and half-open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
    pub severity: Severity,
    pub message: String,
    pub source: String,
}

impl Diagnostic {
    /// The message every spelling diagnostic carries.
    pub fn message_for(word: &str, kind: ErrorKind) -> String {
        format!("Spelling: {} ({})", word, kind)
    }
}
