use crate::checker::severity::{Severity, SeverityConfig};
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use toml::{Table, Value};

/// Host events that may schedule a collection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerEvent {
    DocumentOpened,
    DocumentSaved,
    EditSettled,
}

impl TriggerEvent {
    pub const ALL: [TriggerEvent; 3] = [
        TriggerEvent::DocumentOpened,
        TriggerEvent::DocumentSaved,
        TriggerEvent::EditSettled,
    ];
}

impl FromStr for TriggerEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document-opened" => Ok(TriggerEvent::DocumentOpened),
            "document-saved" => Ok(TriggerEvent::DocumentSaved),
            "edit-settled" => Ok(TriggerEvent::EditSettled),
            _ => Err(format!("Unknown trigger event: {}", s)),
        }
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerEvent::DocumentOpened => write!(f, "document-opened"),
            TriggerEvent::DocumentSaved => write!(f, "document-saved"),
            TriggerEvent::EditSettled => write!(f, "edit-settled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub enabled: bool,
    pub severity: SeverityConfig,
    pub debounce_interval_ms: u64,
    pub trigger_events: BTreeSet<TriggerEvent>,
    pub language: String,
    pub personal_dictionary: Option<PathBuf>,
    pub extra_spellable_regions: Vec<String>,
    pub extra_skipped_regions: Vec<String>,
}

pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: SeverityConfig::default(),
            debounce_interval_ms: DEFAULT_DEBOUNCE_MS,
            trigger_events: TriggerEvent::ALL.into_iter().collect(),
            language: "en_US".to_string(),
            personal_dictionary: None,
            extra_spellable_regions: Vec::new(),
            extra_skipped_regions: Vec::new(),
        }
    }
}

/// Values given on the command line; they win over every config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub language: Option<String>,
    pub personal_dictionary: Option<PathBuf>,
    pub debounce_interval_ms: Option<u64>,
}

fn invalid_type(option: &str, expected: &'static str, found: &Value) -> ConfigError {
    ConfigError::InvalidType {
        option: option.to_string(),
        expected,
        found: found.type_str().to_string(),
    }
}

fn string_list(option: &str, value: &Value) -> Result<Vec<String>, ConfigError> {
    let Value::Array(items) = value else {
        return Err(invalid_type(option, "an array of strings", value));
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(invalid_type(option, "an array of strings", other)),
        })
        .collect()
}

impl Config {
    /// Validate raw options. Rejected options keep their default and are
    /// reported back instead of failing the whole setup.
    pub fn from_table(table: &Table) -> (Self, Vec<ConfigError>) {
        let mut config = Self::default();
        let mut errors = Vec::new();

        for (key, value) in table {
            if let Err(e) = config.apply(key, value, &mut errors) {
                errors.push(e);
            }
        }

        (config, errors)
    }

    /// Apply one option. Options made of several entries keep their valid
    /// entries and report each rejected one into `rejected`.
    fn apply(
        &mut self,
        key: &str,
        value: &Value,
        rejected: &mut Vec<ConfigError>,
    ) -> Result<(), ConfigError> {
        match key {
            "enabled" => match value {
                Value::Boolean(enabled) => self.enabled = *enabled,
                other => return Err(invalid_type(key, "a boolean", other)),
            },
            "severity" => self.severity = parse_severity(value, rejected)?,
            "debounce_interval_ms" => match value {
                Value::Integer(ms) if *ms >= 0 => self.debounce_interval_ms = *ms as u64,
                Value::Integer(ms) => {
                    return Err(ConfigError::InvalidValue {
                        option: key.to_string(),
                        value: ms.to_string(),
                        reason: "must not be negative".to_string(),
                    })
                }
                other => return Err(invalid_type(key, "an integer", other)),
            },
            "trigger_events" => {
                let Value::Array(names) = value else {
                    return Err(invalid_type(key, "an array of strings", value));
                };
                let mut events = BTreeSet::new();
                for name in names {
                    let Value::String(name) = name else {
                        rejected.push(invalid_type(key, "an array of strings", name));
                        continue;
                    };
                    match name.parse::<TriggerEvent>() {
                        Ok(event) => {
                            events.insert(event);
                        }
                        Err(reason) => rejected.push(ConfigError::InvalidValue {
                            option: key.to_string(),
                            value: name.clone(),
                            reason,
                        }),
                    }
                }
                // Nothing usable left: keep the default rather than never checking.
                if events.is_empty() && !names.is_empty() {
                    return Ok(());
                }
                self.trigger_events = events;
            }
            "language" => match value {
                Value::String(language) if !language.is_empty() => {
                    self.language = language.clone()
                }
                other => return Err(invalid_type(key, "a non-empty string", other)),
            },
            "personal_dictionary" => match value {
                Value::String(path) => self.personal_dictionary = Some(PathBuf::from(path)),
                other => return Err(invalid_type(key, "a path", other)),
            },
            "extra_spellable_regions" => self.extra_spellable_regions = string_list(key, value)?,
            "extra_skipped_regions" => self.extra_skipped_regions = string_list(key, value)?,
            unknown => return Err(ConfigError::UnknownOption(unknown.to_string())),
        }
        Ok(())
    }

    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(overrides: Overrides) -> Result<(Self, Vec<ConfigError>)> {
        let mut table = Table::new();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                merge_tables(&mut table, Self::read_table(&global_path)?);
            }
        }

        let local_path = PathBuf::from(".texspell.toml");
        if local_path.exists() {
            merge_tables(&mut table, Self::read_table(&local_path)?);
        }

        let (mut config, errors) = Self::from_table(&table);

        if let Some(language) = overrides.language {
            config.language = language;
        }
        if let Some(dict) = overrides.personal_dictionary {
            config.personal_dictionary = Some(dict);
        }
        if let Some(ms) = overrides.debounce_interval_ms {
            config.debounce_interval_ms = ms;
        }

        if config.personal_dictionary.is_none() {
            config.personal_dictionary = Self::default_personal_dict_path();
        }

        Ok((config, errors))
    }

    fn read_table(path: &Path) -> Result<Table> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        contents
            .parse::<Table>()
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "texspell").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn default_personal_dict_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "texspell").map(|dirs| dirs.config_dir().join("personal.txt"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "texspell").map(|dirs| dirs.data_dir().to_path_buf())
    }
}

/// Parse the `[severity]` table. A rejected entry keeps its default level.
fn parse_severity(
    value: &Value,
    rejected: &mut Vec<ConfigError>,
) -> Result<SeverityConfig, ConfigError> {
    let Value::Table(levels) = value else {
        return Err(invalid_type("severity", "a table", value));
    };

    let mut severity = SeverityConfig::default();
    for (kind, level) in levels {
        let option = format!("severity.{}", kind);
        let Some(slot) = severity.slot_mut(kind) else {
            rejected.push(ConfigError::UnknownOption(option));
            continue;
        };
        let Value::String(level) = level else {
            rejected.push(invalid_type(&option, "a severity name", level));
            continue;
        };
        match level.parse::<Severity>() {
            Ok(parsed) => *slot = parsed,
            Err(reason) => rejected.push(ConfigError::InvalidValue {
                option,
                value: level.clone(),
                reason,
            }),
        }
    }
    Ok(severity)
}

/// Later files override earlier ones key by key; `severity` merges per kind.
fn merge_tables(base: &mut Table, other: Table) {
    for (key, value) in other {
        if let (Some(Value::Table(existing)), Value::Table(incoming)) = (base.get_mut(&key), &value) {
            for (k, v) in incoming {
                existing.insert(k.clone(), v.clone());
            }
            continue;
        }
        base.insert(key, value);
    }
}
