use super::{DiagnosticSink, DocumentId, DocumentStore};
use crate::error::HostError;
use crate::Diagnostic;
use dashmap::DashMap;

#[derive(Debug, Clone)]
struct Document {
    lines: Vec<String>,
    spelling_enabled: bool,
}

/// Document store holding open documents in memory.
#[derive(Debug, Default)]
pub struct MemoryDocuments {
    docs: DashMap<DocumentId, Document>,
}

impl MemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or reopen) a document with spelling enabled.
    pub fn open(&self, doc: DocumentId, text: &str) {
        self.docs.insert(
            doc,
            Document {
                lines: split_lines(text),
                spelling_enabled: true,
            },
        );
    }

    /// Replace the content of an open document. Returns false if it is not open.
    pub fn update(&self, doc: &DocumentId, text: &str) -> bool {
        match self.docs.get_mut(doc) {
            Some(mut entry) => {
                entry.lines = split_lines(text);
                true
            }
            None => false,
        }
    }

    pub fn set_spelling_enabled(&self, doc: &DocumentId, enabled: bool) -> bool {
        match self.docs.get_mut(doc) {
            Some(mut entry) => {
                entry.spelling_enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn close(&self, doc: &DocumentId) -> bool {
        self.docs.remove(doc).is_some()
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

impl DocumentStore for MemoryDocuments {
    fn lines(&self, doc: &DocumentId) -> Result<Vec<String>, HostError> {
        self.docs
            .get(doc)
            .map(|entry| entry.lines.clone())
            .ok_or_else(|| HostError::DocumentClosed(doc.clone()))
    }

    fn is_spelling_enabled(&self, doc: &DocumentId) -> Result<bool, HostError> {
        self.docs
            .get(doc)
            .map(|entry| entry.spelling_enabled)
            .ok_or_else(|| HostError::DocumentClosed(doc.clone()))
    }

    fn is_open(&self, doc: &DocumentId) -> bool {
        self.docs.contains_key(doc)
    }

    fn open_documents(&self) -> Vec<DocumentId> {
        let mut docs: Vec<DocumentId> = self.docs.iter().map(|entry| entry.key().clone()).collect();
        docs.sort();
        docs
    }
}

/// Diagnostic sink keeping the latest set per document and namespace.
#[derive(Debug, Default)]
pub struct DiagnosticStore {
    sets: DashMap<(DocumentId, String), Vec<Diagnostic>>,
}

impl DiagnosticStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently published set, empty if nothing was published.
    pub fn get(&self, doc: &DocumentId, namespace: &str) -> Vec<Diagnostic> {
        self.sets
            .get(&(doc.clone(), namespace.to_string()))
            .map(|set| set.clone())
            .unwrap_or_default()
    }

    pub fn total(&self, namespace: &str) -> usize {
        self.sets
            .iter()
            .filter(|entry| entry.key().1 == namespace)
            .map(|entry| entry.value().len())
            .sum()
    }
}

impl DiagnosticSink for DiagnosticStore {
    fn publish(&self, doc: &DocumentId, namespace: &str, records: Vec<Diagnostic>) {
        self.sets
            .insert((doc.clone(), namespace.to_string()), records);
    }

    fn clear(&self, doc: &DocumentId, namespace: &str) {
        self.sets.remove(&(doc.clone(), namespace.to_string()));
    }
}
