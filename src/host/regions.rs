use super::{DocumentId, RegionTag, SyntaxStack, SyntaxStackProvider};
use crate::error::HostError;
use crate::Position;
use anyhow::{Context, Result};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Treats every position as plain text.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainText;

impl SyntaxStackProvider for PlainText {
    fn stack_at(&self, _doc: &DocumentId, _position: Position) -> Result<SyntaxStack, HostError> {
        Ok(Vec::new())
    }
}

/// One highlighted region from an external syntax engine.
///
/// `start` is inclusive and `end` exclusive; both are 1-based `[line, column]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub tag: String,
    #[serde(default)]
    pub spell: bool,
    pub start: (usize, usize),
    pub end: (usize, usize),
}

impl Region {
    fn contains(&self, position: Position) -> bool {
        let at = (position.line, position.column);
        self.start <= at && at < self.end
    }
}

/// Answers stack queries from region dumps loaded per document.
#[derive(Debug, Default)]
pub struct RegionMap {
    regions: DashMap<DocumentId, Vec<Region>>,
}

impl RegionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, doc: DocumentId, mut regions: Vec<Region>) {
        // Outer regions start earlier, or start together and end later.
        regions.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        self.regions.insert(doc, regions);
    }

    pub fn remove(&self, doc: &DocumentId) {
        self.regions.remove(doc);
    }

    /// Load the JSON dump for `doc` from `path`.
    pub fn load(&self, doc: DocumentId, path: &Path) -> Result<()> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read region dump: {}", path.display()))?;
        let regions: Vec<Region> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse region dump: {}", path.display()))?;
        tracing::debug!(document = %doc, regions = regions.len(), "loaded region dump");
        self.insert(doc, regions);
        Ok(())
    }

    /// The conventional dump location for a source file: `<file>.regions.json`.
    pub fn sidecar_path(source: &Path) -> PathBuf {
        let mut name = source.as_os_str().to_owned();
        name.push(".regions.json");
        PathBuf::from(name)
    }
}

impl SyntaxStackProvider for RegionMap {
    fn stack_at(&self, doc: &DocumentId, position: Position) -> Result<SyntaxStack, HostError> {
        let Some(regions) = self.regions.get(doc) else {
            return Ok(Vec::new());
        };

        Ok(regions
            .iter()
            .filter(|region| region.contains(position))
            .map(|region| RegionTag {
                name: region.tag.clone(),
                spell: region.spell,
            })
            .collect())
    }
}
