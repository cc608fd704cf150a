use crate::host::DocumentId;
use thiserror::Error;

/// A rejected setup option. The option falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown option `{0}`")]
    UnknownOption(String),

    #[error("option `{option}` expects {expected}, found {found}")]
    InvalidType {
        option: String,
        expected: &'static str,
        found: String,
    },

    #[error("option `{option}` has invalid value `{value}`: {reason}")]
    InvalidValue {
        option: String,
        value: String,
        reason: String,
    },
}

/// A failure reported by one of the host collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("document `{0}` is not open")]
    DocumentClosed(DocumentId),

    #[error("syntax stack lookup failed at {line}:{column}: {reason}")]
    StackLookup {
        line: usize,
        column: usize,
        reason: String,
    },

    #[error("spell oracle failed on `{word}`: {reason}")]
    Oracle { word: String, reason: String },
}

/// Why a collection pass was abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectError {
    #[error("collection for `{document}` failed: {source}")]
    Host {
        document: DocumentId,
        #[source]
        source: HostError,
    },
}

impl CollectError {
    pub fn host(document: &DocumentId, source: HostError) -> Self {
        Self::Host {
            document: document.clone(),
            source,
        }
    }
}
