pub mod dictionary;
pub mod region;
pub mod severity;
pub mod tokenizer;

use crate::error::CollectError;
use crate::host::{DocumentId, DocumentStore, OracleResult, SpellOracle, SyntaxStackProvider};
use crate::{Diagnostic, Position, SOURCE};
use region::RegionClassifier;
use severity::SeverityConfig;

/// Runs one collection pass over a document.
pub struct DiagnosticCollector<'a> {
    pub documents: &'a dyn DocumentStore,
    pub stacks: &'a dyn SyntaxStackProvider,
    pub oracle: &'a dyn SpellOracle,
    pub classifier: &'a RegionClassifier,
    pub severity: &'a SeverityConfig,
}

impl<'a> DiagnosticCollector<'a> {
    /// Collect diagnostics for an open document.
    ///
    /// Returns an empty set without scanning when the host has spelling
    /// turned off for the document.
    pub fn collect(&self, doc: &DocumentId) -> Result<Vec<Diagnostic>, CollectError> {
        let enabled = self
            .documents
            .is_spelling_enabled(doc)
            .map_err(|e| CollectError::host(doc, e))?;
        if !enabled {
            return Ok(Vec::new());
        }

        let lines = self
            .documents
            .lines(doc)
            .map_err(|e| CollectError::host(doc, e))?;
        self.collect_lines(doc, &lines)
    }

    /// Collect diagnostics for `lines`, in document order.
    pub fn collect_lines<S: AsRef<str>>(
        &self,
        doc: &DocumentId,
        lines: &[S],
    ) -> Result<Vec<Diagnostic>, CollectError> {
        let mut diagnostics = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            for token in tokenizer::tokenize(line.as_ref()) {
                let position = Position::new(index + 1, token.start + 1);
                if !self.is_spellcheckable(doc, position) {
                    continue;
                }

                let verdict = self
                    .oracle
                    .check(token.text)
                    .map_err(|e| CollectError::host(doc, e))?;

                let OracleResult::Misspelled { word, kind } = verdict else {
                    continue;
                };

                // The oracle may have matched a different form of the word.
                if word != token.text {
                    continue;
                }

                let (row, start_col) = position.to_zero_based();
                diagnostics.push(Diagnostic {
                    start_line: row,
                    start_col,
                    end_line: row,
                    end_col: token.end,
                    severity: self.severity.severity(kind),
                    message: Diagnostic::message_for(token.text, kind),
                    source: SOURCE.to_string(),
                });
            }
        }

        Ok(diagnostics)
    }

    fn is_spellcheckable(&self, doc: &DocumentId, position: Position) -> bool {
        match self.stacks.stack_at(doc, position) {
            Ok(stack) => self.classifier.is_spellcheckable(&stack),
            Err(e) => {
                tracing::debug!(document = %doc, error = %e, "stack lookup failed, checking anyway");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::host::memory::MemoryDocuments;
    use crate::host::regions::{PlainText, Region, RegionMap};
    use crate::host::SyntaxStack;
    use crate::{ErrorKind, Severity};
    use std::collections::HashMap;

    /// Oracle answering from a fixed table of `word -> (canonical, kind)`.
    struct TableOracle(HashMap<&'static str, (&'static str, &'static str)>);

    impl SpellOracle for TableOracle {
        fn check(&self, word: &str) -> Result<OracleResult, HostError> {
            Ok(match self.0.get(word) {
                Some((canonical, kind)) => OracleResult::misspelled(*canonical, kind),
                None => OracleResult::Correct,
            })
        }
    }

    struct FailingOracle;

    impl SpellOracle for FailingOracle {
        fn check(&self, word: &str) -> Result<OracleResult, HostError> {
            Err(HostError::Oracle {
                word: word.to_string(),
                reason: "backend unavailable".to_string(),
            })
        }
    }

    struct BrokenStacks;

    impl SyntaxStackProvider for BrokenStacks {
        fn stack_at(&self, _doc: &DocumentId, position: Position) -> Result<SyntaxStack, HostError> {
            Err(HostError::StackLookup {
                line: position.line,
                column: position.column,
                reason: "syntax not ready".to_string(),
            })
        }
    }

    fn oracle(entries: &[(&'static str, &'static str, &'static str)]) -> TableOracle {
        TableOracle(
            entries
                .iter()
                .map(|(word, canonical, kind)| (*word, (*canonical, *kind)))
                .collect(),
        )
    }

    fn documents(text: &str) -> (MemoryDocuments, DocumentId) {
        let docs = MemoryDocuments::new();
        let doc = DocumentId::new("main.tex");
        docs.open(doc.clone(), text);
        (docs, doc)
    }

    #[test]
    fn test_flashcard_argument() {
        let (docs, doc) = documents(r"\flashcard{Hte answer}");
        let oracle = oracle(&[("Hte", "Hte", "bad")]);
        let severity = SeverityConfig::default();
        let classifier = RegionClassifier::new();
        let collector = DiagnosticCollector {
            documents: &docs,
            stacks: &PlainText,
            oracle: &oracle,
            classifier: &classifier,
            severity: &severity,
        };

        let diagnostics = collector.collect(&doc).unwrap();
        assert_eq!(
            diagnostics,
            vec![Diagnostic {
                start_line: 0,
                start_col: 11,
                end_line: 0,
                end_col: 14,
                severity: Severity::Error,
                message: "Spelling: Hte (bad)".to_string(),
                source: SOURCE.to_string(),
            }]
        );
    }

    #[test]
    fn test_canonical_word_must_match() {
        let (docs, doc) = documents("running dogs");
        let oracle = oracle(&[("running", "run", "bad"), ("dogs", "dogs", "rare")]);
        let severity = SeverityConfig::default();
        let classifier = RegionClassifier::new();
        let collector = DiagnosticCollector {
            documents: &docs,
            stacks: &PlainText,
            oracle: &oracle,
            classifier: &classifier,
            severity: &severity,
        };

        let diagnostics = collector.collect(&doc).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Spelling: dogs (rare)");
        assert_eq!(diagnostics[0].severity, Severity::Hint);
    }

    #[test]
    fn test_math_and_comments_are_skipped() {
        let (docs, doc) = documents("Teh text $xyzzy$\n% qwrty note");
        let stacks = RegionMap::new();
        stacks.insert(
            doc.clone(),
            vec![
                Region {
                    tag: "texMathZoneX".to_string(),
                    spell: false,
                    start: (1, 10),
                    end: (1, 17),
                },
                Region {
                    tag: "texComment".to_string(),
                    spell: false,
                    start: (2, 1),
                    end: (2, 13),
                },
            ],
        );
        let oracle = oracle(&[
            ("Teh", "Teh", "bad"),
            ("xyzzy", "xyzzy", "bad"),
            ("qwrty", "qwrty", "bad"),
        ]);
        let severity = SeverityConfig::default();
        let classifier = RegionClassifier::new();
        let collector = DiagnosticCollector {
            documents: &docs,
            stacks: &stacks,
            oracle: &oracle,
            classifier: &classifier,
            severity: &severity,
        };

        let diagnostics = collector.collect(&doc).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Spelling: Teh (bad)");
    }

    #[test]
    fn test_document_order() {
        let (docs, doc) = documents("bb aa\ncc");
        let oracle = oracle(&[("aa", "aa", ""), ("bb", "bb", "caps"), ("cc", "cc", "local")]);
        let severity = SeverityConfig::default();
        let classifier = RegionClassifier::new();
        let collector = DiagnosticCollector {
            documents: &docs,
            stacks: &PlainText,
            oracle: &oracle,
            classifier: &classifier,
            severity: &severity,
        };

        let diagnostics = collector.collect(&doc).unwrap();
        let spans: Vec<_> = diagnostics
            .iter()
            .map(|d| (d.start_line, d.start_col, d.severity))
            .collect();
        assert_eq!(
            spans,
            vec![
                (0, 0, Severity::Warn),
                (0, 3, Severity::Error),
                (1, 0, Severity::Info)
            ]
        );
        assert_eq!(diagnostics[1].message, Diagnostic::message_for("aa", ErrorKind::Bad));
    }

    #[test]
    fn test_spelling_disabled_document() {
        let (docs, doc) = documents("Teh");
        docs.set_spelling_enabled(&doc, false);
        let severity = SeverityConfig::default();
        let classifier = RegionClassifier::new();
        let collector = DiagnosticCollector {
            documents: &docs,
            stacks: &PlainText,
            oracle: &FailingOracle,
            classifier: &classifier,
            severity: &severity,
        };

        assert!(collector.collect(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_stack_failures_degrade_to_checked() {
        let (docs, doc) = documents("Teh");
        let oracle = oracle(&[("Teh", "Teh", "bad")]);
        let severity = SeverityConfig::default();
        let classifier = RegionClassifier::new();
        let collector = DiagnosticCollector {
            documents: &docs,
            stacks: &BrokenStacks,
            oracle: &oracle,
            classifier: &classifier,
            severity: &severity,
        };

        assert_eq!(collector.collect(&doc).unwrap().len(), 1);
    }

    #[test]
    fn test_oracle_failure_fails_the_pass() {
        let (docs, doc) = documents("word");
        let severity = SeverityConfig::default();
        let classifier = RegionClassifier::new();
        let collector = DiagnosticCollector {
            documents: &docs,
            stacks: &PlainText,
            oracle: &FailingOracle,
            classifier: &classifier,
            severity: &severity,
        };

        let err = collector.collect(&doc).unwrap_err();
        assert!(matches!(
            err,
            CollectError::Host {
                source: HostError::Oracle { .. },
                ..
            }
        ));

        let closed = DocumentId::new("closed.tex");
        assert!(collector.collect(&closed).is_err());
    }
}
