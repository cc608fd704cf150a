//! Per-document debounce timers.
//!
//! Each document owns at most one pending timer. Arming a new one aborts the
//! old one, so a burst of triggers collapses into a single pass that starts one
//! interval after the last trigger. Every armed timer carries a pass number
//! drawn from one monotonic counter; a timer only runs its pass if it is still
//! the one registered for its document when it wakes.

use crate::host::DocumentId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;

struct Pending {
    pass: u64,
    handle: JoinHandle<()>,
}

pub struct DebounceScheduler {
    interval: Duration,
    timers: Arc<DashMap<DocumentId, Pending>>,
    passes: AtomicU64,
    settled: Arc<Notify>,
}

impl DebounceScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            timers: Arc::new(DashMap::new()),
            passes: AtomicU64::new(0),
            settled: Arc::new(Notify::new()),
        }
    }

    /// Allocate a pass number greater than any handed out so far.
    pub fn next_pass(&self) -> u64 {
        self.passes.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Arm (or re-arm) the timer for `doc`. When it expires, `run` is called
    /// with the pass number of this trigger.
    ///
    /// Must be called from within a tokio runtime; otherwise nothing is scheduled.
    pub fn trigger<F>(&self, doc: DocumentId, run: F)
    where
        F: FnOnce(u64) + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            tracing::error!(document = %doc, "no async runtime, dropping spell check trigger");
            return;
        };

        let pass = self.next_pass();
        let deadline = Instant::now() + self.interval;
        let timers = Arc::clone(&self.timers);
        let settled = Arc::clone(&self.settled);
        let key = doc.clone();

        // The entry stays locked until the new timer is registered, so the
        // task cannot wake and look itself up before it exists.
        let entry = self.timers.entry(doc);
        let handle = runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;

            let current = timers.get(&key).is_some_and(|pending| pending.pass == pass);
            if !current {
                return;
            }

            run(pass);

            timers.remove_if(&key, |_, pending| pending.pass == pass);
            settled.notify_waiters();
        });

        match entry {
            Entry::Occupied(mut occupied) => {
                let previous = occupied.insert(Pending { pass, handle });
                previous.handle.abort();
                tracing::trace!(document = %occupied.key(), pass, "debounce timer restarted");
            }
            Entry::Vacant(vacant) => {
                tracing::trace!(document = %vacant.key(), pass, "debounce timer armed");
                vacant.insert(Pending { pass, handle });
            }
        }
    }

    /// Drop the pending timer for `doc` without running it.
    pub fn cancel(&self, doc: &DocumentId) -> bool {
        let cancelled = match self.timers.remove(doc) {
            Some((_, pending)) => {
                pending.handle.abort();
                true
            }
            None => false,
        };
        if cancelled {
            self.settled.notify_waiters();
        }
        cancelled
    }

    pub fn cancel_all(&self) {
        let docs: Vec<DocumentId> = self.timers.iter().map(|entry| entry.key().clone()).collect();
        for doc in docs {
            self.cancel(&doc);
        }
    }

    pub fn is_pending(&self, doc: &DocumentId) -> bool {
        self.timers.contains_key(doc)
    }

    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }

    /// Wait until no timer is pending.
    pub async fn idle(&self) {
        loop {
            let notified = self.settled.notified();
            if self.timers.is_empty() {
                return;
            }
            notified.await;
        }
    }
}

impl Drop for DebounceScheduler {
    fn drop(&mut self) {
        for entry in self.timers.iter() {
            entry.value().handle.abort();
        }
    }
}
