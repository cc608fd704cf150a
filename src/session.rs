//! Host-facing facade: lifecycle events in, debounced diagnostic sets out.

use crate::checker::region::RegionClassifier;
use crate::checker::DiagnosticCollector;
use crate::config::{Config, TriggerEvent};
use crate::error::ConfigError;
use crate::host::{DiagnosticSink, DocumentId, DocumentStore, SpellOracle, SyntaxStackProvider};
use crate::scheduler::DebounceScheduler;
use crate::SOURCE;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Document lifecycle notifications from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Opened(DocumentId),
    Saved(DocumentId),
    EditSettled(DocumentId),
    Closed(DocumentId),
}

impl HostEvent {
    pub fn document(&self) -> &DocumentId {
        match self {
            HostEvent::Opened(doc)
            | HostEvent::Saved(doc)
            | HostEvent::EditSettled(doc)
            | HostEvent::Closed(doc) => doc,
        }
    }

    fn trigger(&self) -> Option<TriggerEvent> {
        match self {
            HostEvent::Opened(_) => Some(TriggerEvent::DocumentOpened),
            HostEvent::Saved(_) => Some(TriggerEvent::DocumentSaved),
            HostEvent::EditSettled(_) => Some(TriggerEvent::EditSettled),
            HostEvent::Closed(_) => None,
        }
    }
}

/// The collaborators a session works against.
#[derive(Clone)]
pub struct Host {
    pub documents: Arc<dyn DocumentStore>,
    pub stacks: Arc<dyn SyntaxStackProvider>,
    pub oracle: Arc<dyn SpellOracle>,
    pub sink: Arc<dyn DiagnosticSink>,
}

struct Inner {
    config: Config,
    enabled: AtomicBool,
    host: Host,
    classifier: RegionClassifier,
    scheduler: DebounceScheduler,
    /// Lowest pass number still allowed to publish, per document.
    fences: DashMap<DocumentId, u64>,
    /// Passes currently collecting, per document.
    in_flight: DashMap<DocumentId, usize>,
    current: RwLock<Option<DocumentId>>,
}

#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    pub fn setup(config: Config, host: Host) -> Self {
        let classifier = RegionClassifier::with_extra_regions(
            config.extra_spellable_regions.iter().cloned(),
            config.extra_skipped_regions.iter().cloned(),
        );
        let scheduler = DebounceScheduler::new(Duration::from_millis(config.debounce_interval_ms));

        tracing::debug!(
            enabled = config.enabled,
            debounce_ms = config.debounce_interval_ms,
            "spell check session set up"
        );

        Self {
            inner: Arc::new(Inner {
                enabled: AtomicBool::new(config.enabled),
                config,
                host,
                classifier,
                scheduler,
                fences: DashMap::new(),
                in_flight: DashMap::new(),
                current: RwLock::new(None),
            }),
        }
    }

    /// Validate raw options and set up. Rejected options are logged, returned,
    /// and replaced by their defaults.
    pub fn setup_from_table(table: &toml::Table, host: Host) -> (Self, Vec<ConfigError>) {
        let (config, errors) = Config::from_table(table);
        for error in &errors {
            tracing::warn!(%error, "ignoring spell check option");
        }
        (Self::setup(config, host), errors)
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::SeqCst)
    }

    pub fn current_document(&self) -> Option<DocumentId> {
        self.inner.current.read().clone()
    }

    pub fn is_pending(&self, doc: &DocumentId) -> bool {
        self.inner.scheduler.is_pending(doc)
    }

    /// Wait until every scheduled pass has run or been cancelled.
    pub async fn idle(&self) {
        self.inner.scheduler.idle().await
    }

    pub fn handle(&self, event: HostEvent) {
        let Some(trigger) = event.trigger() else {
            self.close(event.document());
            return;
        };

        let doc = event.document().clone();
        *self.inner.current.write() = Some(doc.clone());

        if !self.is_enabled() || !self.inner.config.trigger_events.contains(&trigger) {
            return;
        }
        self.schedule(doc);
    }

    pub fn enable(&self) {
        if self.inner.enabled.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!("spell checking enabled");

        for doc in self.inner.host.documents.open_documents() {
            if matches!(self.inner.host.documents.is_spelling_enabled(&doc), Ok(true)) {
                self.schedule(doc);
            }
        }
    }

    pub fn disable(&self) {
        if !self.inner.enabled.swap(false, Ordering::SeqCst) {
            return;
        }
        tracing::debug!("spell checking disabled");

        self.inner.scheduler.cancel_all();
        for doc in self.inner.host.documents.open_documents() {
            self.inner.retire(&doc);
        }
    }

    /// Flip the enabled flag; returns the new state.
    pub fn toggle(&self) -> bool {
        if self.is_enabled() {
            self.disable();
        } else {
            self.enable();
        }
        self.is_enabled()
    }

    /// Schedule a pass for `doc`, or for the most recently active document.
    pub fn refresh(&self, doc: Option<&DocumentId>) {
        let Some(doc) = doc.cloned().or_else(|| self.current_document()) else {
            tracing::debug!("refresh requested with no current document");
            return;
        };
        if !self.is_enabled() {
            tracing::debug!(document = %doc, "refresh ignored, spell checking is disabled");
            return;
        }
        self.schedule(doc);
    }

    fn close(&self, doc: &DocumentId) {
        self.inner.scheduler.cancel(doc);
        self.inner.forget(doc);

        let mut current = self.inner.current.write();
        if current.as_ref() == Some(doc) {
            *current = None;
        }
    }

    fn schedule(&self, doc: DocumentId) {
        if !self.inner.host.documents.is_open(&doc) {
            tracing::debug!(document = %doc, "not scheduling a pass for a closed document");
            return;
        }

        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        let target = doc.clone();
        self.inner.scheduler.trigger(doc, move |pass| {
            if let Some(inner) = inner.upgrade() {
                inner.run_pass(&target, pass);
            }
        });
    }
}

impl Inner {
    fn run_pass(&self, doc: &DocumentId, pass: u64) {
        // Registered before the open check so a concurrent close sees this pass.
        *self.in_flight.entry(doc.clone()).or_insert(0) += 1;
        self.collect_and_publish(doc, pass);
        self.finish_pass(doc);
    }

    fn collect_and_publish(&self, doc: &DocumentId, pass: u64) {
        if !self.enabled.load(Ordering::SeqCst) {
            return;
        }
        if !self.host.documents.is_open(doc) {
            tracing::debug!(document = %doc, "document closed before its pass ran");
            return;
        }

        let collector = DiagnosticCollector {
            documents: self.host.documents.as_ref(),
            stacks: self.host.stacks.as_ref(),
            oracle: self.host.oracle.as_ref(),
            classifier: &self.classifier,
            severity: &self.config.severity,
        };

        match collector.collect(doc) {
            Ok(records) => self.publish(doc, pass, records),
            Err(error) => {
                tracing::warn!(document = %doc, pass, %error, "spell check pass failed, keeping previous diagnostics");
            }
        }
    }

    fn publish(&self, doc: &DocumentId, pass: u64, records: Vec<crate::Diagnostic>) {
        let mut fence = self.fences.entry(doc.clone()).or_insert(0);
        if *fence > pass {
            tracing::debug!(document = %doc, pass, fence = *fence, "dropping superseded pass");
            return;
        }

        tracing::debug!(document = %doc, pass, count = records.len(), "publishing diagnostics");
        self.host.sink.publish(doc, SOURCE, records);
        *fence = pass;
    }

    fn finish_pass(&self, doc: &DocumentId) {
        let idle = match self.in_flight.entry(doc.clone()) {
            Entry::Occupied(mut running) => {
                *running.get_mut() -= 1;
                if *running.get() == 0 {
                    running.remove();
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(_) => true,
        };
        if idle && !self.host.documents.is_open(doc) {
            self.fences.remove(doc);
        }
    }

    /// Drop all state for a closed document. A fence is kept only while one
    /// of its passes is still collecting.
    fn forget(&self, doc: &DocumentId) {
        let running = self.in_flight.get(doc);
        if running.is_some() {
            self.fences.insert(doc.clone(), self.scheduler.next_pass());
        } else {
            self.fences.remove(doc);
        }
        drop(running);
        self.host.sink.clear(doc, SOURCE);
    }

    /// Clear published diagnostics and reject any pass armed before now.
    fn retire(&self, doc: &DocumentId) {
        let fence = self.scheduler.next_pass();
        self.fences.insert(doc.clone(), fence);
        self.host.sink.clear(doc, SOURCE);
    }
}
