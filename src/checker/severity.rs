use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error classification reported by a spell oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Not a known word.
    Bad,
    /// Known word with wrong capitalization.
    Caps,
    /// Known but rarely used word.
    Rare,
    /// Word belonging to another regional variant.
    Local,
}

impl ErrorKind {
    /// Parse an oracle label. Empty, `unknown` and unrecognized labels are `bad`.
    pub fn normalize(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "caps" => ErrorKind::Caps,
            "rare" => ErrorKind::Rare,
            "local" => ErrorKind::Local,
            _ => ErrorKind::Bad,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Bad => write!(f, "bad"),
            ErrorKind::Caps => write!(f, "caps"),
            ErrorKind::Rare => write!(f, "rare"),
            ErrorKind::Local => write!(f, "local"),
        }
    }
}

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warn,
    Info,
    Hint,
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warn" | "warning" => Ok(Severity::Warn),
            "info" | "information" => Ok(Severity::Info),
            "hint" => Ok(Severity::Hint),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// Severity assigned to each error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityConfig {
    #[serde(default = "default_bad")]
    pub bad: Severity,
    #[serde(default = "default_caps")]
    pub caps: Severity,
    #[serde(default = "default_rare")]
    pub rare: Severity,
    #[serde(default = "default_local")]
    pub local: Severity,
}

fn default_bad() -> Severity {
    Severity::Error
}

fn default_caps() -> Severity {
    Severity::Warn
}

fn default_rare() -> Severity {
    Severity::Hint
}

fn default_local() -> Severity {
    Severity::Info
}

impl Default for SeverityConfig {
    fn default() -> Self {
        Self {
            bad: default_bad(),
            caps: default_caps(),
            rare: default_rare(),
            local: default_local(),
        }
    }
}

impl SeverityConfig {
    pub fn severity(&self, kind: ErrorKind) -> Severity {
        match kind {
            ErrorKind::Bad => self.bad,
            ErrorKind::Caps => self.caps,
            ErrorKind::Rare => self.rare,
            ErrorKind::Local => self.local,
        }
    }

    /// Mutable slot for a kind label, `None` for labels outside the known set.
    pub(crate) fn slot_mut(&mut self, label: &str) -> Option<&mut Severity> {
        match label {
            "bad" => Some(&mut self.bad),
            "caps" => Some(&mut self.caps),
            "rare" => Some(&mut self.rare),
            "local" => Some(&mut self.local),
            _ => None,
        }
    }
}
