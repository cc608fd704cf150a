//! Collaborator contracts the checker consumes from its host.
//!
//! The host owns the documents, the syntax engine, the spelling backend and the
//! place diagnostics end up. Each is a narrow query trait so any editor, syntax
//! highlighter or spell backend satisfying the contract can be plugged in.

pub mod memory;
pub mod regions;

use crate::checker::severity::ErrorKind;
use crate::error::HostError;
use crate::{Diagnostic, Position};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Opaque handle naming a document inside the host.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_path(path: &Path) -> Self {
        Self(path.display().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A syntactic region label as assigned by the syntax engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionTag {
    pub name: String,
    /// The engine's own "spell" attribute for this region.
    #[serde(default)]
    pub spell: bool,
}

impl RegionTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spell: false,
        }
    }

    pub fn spellable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spell: true,
        }
    }
}

/// Region tags enclosing a position, outermost first.
pub type SyntaxStack = Vec<RegionTag>;

/// Verdict of the spell oracle for a single word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleResult {
    Correct,
    Misspelled {
        /// The word as the oracle matched it, which may differ from the input.
        word: String,
        kind: ErrorKind,
    },
}

impl OracleResult {
    /// Build a verdict from a raw kind label; unknown labels become `bad`.
    pub fn misspelled(word: impl Into<String>, kind: &str) -> Self {
        Self::Misspelled {
            word: word.into(),
            kind: ErrorKind::normalize(kind),
        }
    }

    pub fn is_misspelled(&self) -> bool {
        matches!(self, Self::Misspelled { .. })
    }
}

pub trait DocumentStore: Send + Sync {
    /// All lines of an open document, without line terminators.
    fn lines(&self, doc: &DocumentId) -> Result<Vec<String>, HostError>;

    /// Host-owned per-document switch (e.g. the editor's `spell` option).
    fn is_spelling_enabled(&self, doc: &DocumentId) -> Result<bool, HostError>;

    fn is_open(&self, doc: &DocumentId) -> bool;

    fn open_documents(&self) -> Vec<DocumentId>;
}

pub trait SyntaxStackProvider: Send + Sync {
    fn stack_at(&self, doc: &DocumentId, position: Position) -> Result<SyntaxStack, HostError>;
}

pub trait SpellOracle: Send + Sync {
    fn check(&self, word: &str) -> Result<OracleResult, HostError>;
}

pub trait DiagnosticSink: Send + Sync {
    /// Replace the whole set published for `(doc, namespace)`.
    fn publish(&self, doc: &DocumentId, namespace: &str, records: Vec<Diagnostic>);

    fn clear(&self, doc: &DocumentId, namespace: &str);
}
