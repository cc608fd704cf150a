use crate::host::memory::DiagnosticStore;
use crate::host::{DiagnosticSink, DocumentId};
use crate::{Diagnostic, Severity};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub file: String,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput {
    pub files_checked: usize,
    pub total_errors: usize,
    pub files: Vec<JsonReport>,
}

fn paint_severity(severity: Severity) -> ColoredString {
    let label = severity.to_string();
    match severity {
        Severity::Error => label.red().bold(),
        Severity::Warn => label.yellow().bold(),
        Severity::Info => label.blue(),
        Severity::Hint => label.dimmed(),
    }
}

/// Print one document's diagnostics as human-readable text.
pub fn print_text_diagnostics(doc: &DocumentId, diagnostics: &[Diagnostic], colored_output: bool) {
    if diagnostics.is_empty() {
        return;
    }

    let file_name = doc.to_string();
    if colored_output {
        println!("\n{}", file_name.bold().underline());
    } else {
        println!("\n{}", file_name);
    }

    for diagnostic in diagnostics {
        // Editors count from one.
        let line_info = format!("{}:{}", diagnostic.start_line + 1, diagnostic.start_col + 1);

        if colored_output {
            println!(
                "  {} {} {}",
                line_info.blue().bold(),
                paint_severity(diagnostic.severity),
                diagnostic.message
            );
        } else {
            println!(
                "  {} {} {}",
                line_info, diagnostic.severity, diagnostic.message
            );
        }
    }
}

/// Print the final report of a one-shot check.
pub fn print_report(
    docs: &[DocumentId],
    store: &DiagnosticStore,
    colored_output: bool,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Text => {
            for doc in docs {
                print_text_diagnostics(doc, &store.get(doc, crate::SOURCE), colored_output);
            }
        }
        OutputFormat::Json => {
            let files: Vec<JsonReport> = docs
                .iter()
                .map(|doc| JsonReport {
                    file: doc.to_string(),
                    diagnostics: store.get(doc, crate::SOURCE),
                })
                .collect();
            let output = JsonOutput {
                files_checked: docs.len(),
                total_errors: files.iter().map(|f| f.diagnostics.len()).sum(),
                files,
            };
            match serde_json::to_string_pretty(&output) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::error!(error = %e, "failed to serialize report"),
            }
        }
    }
}

pub fn print_check_summary(total_errors: usize, files: usize, colored: bool) {
    println!();
    if total_errors == 0 {
        if colored {
            println!("{}", "✓ No spelling errors found!".green().bold());
        } else {
            println!("✓ No spelling errors found!");
        }
    } else {
        let error_word = if total_errors == 1 { "error" } else { "errors" };
        let file_word = if files == 1 { "file" } else { "files" };
        if colored {
            println!(
                "{} {} {} found in {} {}",
                "✗".red().bold(),
                total_errors.to_string().red().bold(),
                error_word,
                files,
                file_word
            );
        } else {
            println!(
                "✗ {} {} found in {} {}",
                total_errors, error_word, files, file_word
            );
        }
    }
}

/// Sink that keeps the latest sets and echoes every publish to stdout.
pub struct ReportingSink {
    store: DiagnosticStore,
    colored: bool,
    format: OutputFormat,
}

impl ReportingSink {
    pub fn new(colored: bool, format: OutputFormat) -> Self {
        Self {
            store: DiagnosticStore::new(),
            colored,
            format,
        }
    }

    pub fn store(&self) -> &DiagnosticStore {
        &self.store
    }

    fn announce(&self, doc: &DocumentId, diagnostics: &[Diagnostic]) {
        match self.format {
            OutputFormat::Text => {
                let status = format!("{}: {} spelling diagnostics", doc, diagnostics.len());
                if self.colored {
                    println!("{}", status.cyan());
                } else {
                    println!("{}", status);
                }
                print_text_diagnostics(doc, diagnostics, self.colored);
            }
            OutputFormat::Json => {
                let report = JsonReport {
                    file: doc.to_string(),
                    diagnostics: diagnostics.to_vec(),
                };
                match serde_json::to_string(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => tracing::error!(error = %e, "failed to serialize diagnostics"),
                }
            }
        }
    }
}

impl DiagnosticSink for ReportingSink {
    fn publish(&self, doc: &DocumentId, namespace: &str, records: Vec<Diagnostic>) {
        self.announce(doc, &records);
        self.store.publish(doc, namespace, records);
    }

    fn clear(&self, doc: &DocumentId, namespace: &str) {
        self.store.clear(doc, namespace);
        self.announce(doc, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_reporting_sink_keeps_latest_set() {
        let sink = ReportingSink::new(false, OutputFormat::Json);
        let doc = DocumentId::new("a.tex");
        let record = Diagnostic {
            start_line: 0,
            start_col: 0,
            end_line: 0,
            end_col: 3,
            severity: Severity::Error,
            message: Diagnostic::message_for("Hte", crate::ErrorKind::Bad),
            source: crate::SOURCE.to_string(),
        };

        sink.publish(&doc, crate::SOURCE, vec![record.clone()]);
        assert_eq!(sink.store().get(&doc, crate::SOURCE), vec![record]);

        sink.clear(&doc, crate::SOURCE);
        assert!(sink.store().get(&doc, crate::SOURCE).is_empty());
    }
}
