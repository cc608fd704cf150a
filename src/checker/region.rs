//! Decides whether text at a position is prose worth spell checking.
//!
//! Region names follow the `tex*` syntax group conventions of vim and vimtex.
//! Only the innermost region can veto checking outright (math and comments);
//! otherwise the first region from the inside that is either explicitly
//! spellable or explicitly structural decides, and anything unrecognized is
//! checked.

use crate::host::{RegionTag, SyntaxStack};
use std::collections::BTreeSet;

/// Region names whose text is always checked.
const SPELLABLE_EXACT: &[&str] = &["texArg", "texCmdArgs", "texGenericArg"];

/// Prefixes of heading, title, author and document class regions.
const SPELLABLE_PREFIXES: &[&str] = &[
    "texTitle",
    "texSection",
    "texSubsection",
    "texChapter",
    "texPart",
    "texParagraph",
    "texAuthor",
    "texDocType",
    "texDocumentClass",
];

/// Prefixes of regions that hold markup rather than prose.
const STRUCTURAL_PREFIXES: &[&str] = &[
    "texStatement",
    "texCmd",
    "texBeginEnd",
    "texEnvName",
    "texDelimiter",
    "texDelim",
    "texInputFile",
    "texFileArg",
    "texFilesArg",
    "texSpecialChar",
];

/// What a single region tag says about checking its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionRole {
    Math,
    Comment,
    Spellable,
    Structural,
    Unknown,
}

/// Prefixes of math zones and the markup inside them.
const MATH_PREFIXES: &[&str] = &["texMath", "texDisplayMath", "texInlineMath", "math"];

/// `\text{...}` inside math holds prose again.
const MATH_TEXT_PREFIX: &str = "texMathText";

fn is_math(name: &str) -> bool {
    if name.starts_with(MATH_TEXT_PREFIX) {
        return false;
    }
    name.contains("MathZone") || MATH_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

fn is_comment(name: &str) -> bool {
    name.contains("Comment") || name.starts_with("comment")
}

#[derive(Debug, Clone, Default)]
pub struct RegionClassifier {
    extra_spellable: BTreeSet<String>,
    extra_skipped: BTreeSet<String>,
}

impl RegionClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add exact region names to treat as spellable or as structural.
    pub fn with_extra_regions<S, K>(spellable: S, skipped: K) -> Self
    where
        S: IntoIterator<Item = String>,
        K: IntoIterator<Item = String>,
    {
        Self {
            extra_spellable: spellable.into_iter().collect(),
            extra_skipped: skipped.into_iter().collect(),
        }
    }

    pub fn role(&self, tag: &RegionTag) -> RegionRole {
        let name = tag.name.as_str();
        if is_math(name) {
            RegionRole::Math
        } else if is_comment(name) {
            RegionRole::Comment
        } else if tag.spell
            || self.extra_spellable.contains(name)
            || SPELLABLE_EXACT.contains(&name)
            || SPELLABLE_PREFIXES.iter().any(|p| name.starts_with(p))
        {
            RegionRole::Spellable
        } else if self.extra_skipped.contains(name)
            || STRUCTURAL_PREFIXES.iter().any(|p| name.starts_with(p))
        {
            RegionRole::Structural
        } else {
            RegionRole::Unknown
        }
    }

    pub fn is_spellcheckable(&self, stack: &SyntaxStack) -> bool {
        let Some(innermost) = stack.last() else {
            return true;
        };

        if is_math(&innermost.name) || is_comment(&innermost.name) {
            return false;
        }

        for tag in stack.iter().rev() {
            match self.role(tag) {
                RegionRole::Spellable => return true,
                RegionRole::Structural => return false,
                RegionRole::Math | RegionRole::Comment | RegionRole::Unknown => {}
            }
        }

        true
    }
}
