use crate::host::memory::MemoryDocuments;
use crate::host::regions::RegionMap;
use crate::host::{DocumentId, DocumentStore};
use crate::session::{HostEvent, Session};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Files on disk exposed to a [`Session`] as host documents.
pub struct Workspace {
    pub session: Session,
    pub documents: Arc<MemoryDocuments>,
    pub regions: Arc<RegionMap>,
}

impl Workspace {
    fn read(&self, path: &Path) -> Result<(DocumentId, String)> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let doc = DocumentId::from_path(path);
        let dump = RegionMap::sidecar_path(path);
        if dump.exists() {
            self.regions.load(doc.clone(), &dump)?;
        } else {
            self.regions.remove(&doc);
        }
        Ok((doc, text))
    }

    pub fn open(&self, path: &Path) -> Result<DocumentId> {
        let (doc, text) = self.read(path)?;
        self.documents.open(doc.clone(), &text);
        self.session.handle(HostEvent::Opened(doc.clone()));
        Ok(doc)
    }

    /// Reload an open file and report the change as settled.
    pub fn edit(&self, path: &Path) -> Result<DocumentId> {
        self.reload(path, HostEvent::EditSettled)
    }

    pub fn save(&self, path: &Path) -> Result<DocumentId> {
        self.reload(path, HostEvent::Saved)
    }

    fn reload(&self, path: &Path, event: fn(DocumentId) -> HostEvent) -> Result<DocumentId> {
        let doc = DocumentId::from_path(path);
        if !self.documents.is_open(&doc) {
            anyhow::bail!("{} is not open", path.display());
        }
        let (doc, text) = self.read(path)?;
        self.documents.update(&doc, &text);
        self.session.handle(event(doc.clone()));
        Ok(doc)
    }

    pub fn close(&self, path: &Path) -> DocumentId {
        let doc = DocumentId::from_path(path);
        self.documents.close(&doc);
        self.regions.remove(&doc);
        self.session.handle(HostEvent::Closed(doc.clone()));
        doc
    }
}
