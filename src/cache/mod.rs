//! Template cache with single-flight parsing.
//!
//! Parsed templates are immutable, so one parse per distinct
//! `(source, form code)` pair is enough for the lifetime of the process. The
//! cache is an explicit service object: construct it once with the engine
//! configuration and hand clones to whoever needs templates. Clones share the
//! same storage.
//!
//! # Concurrency Model
//!
//! Entries live in a [`DashMap`] keyed by a SHA-256 fingerprint of the form
//! code and source. Each entry is either:
//!
//! - `Pending(InFlight)`: a parse is in flight
//! - `Ready(Arc<ParseResult>)`: the parse finished (successfully or not)
//!
//! The first caller for a key inserts `Pending` and becomes the leader; later
//! callers find `Pending` and wait for it to land. Async callers register on
//! the flight's [`Notify`] before releasing the map entry; blocking callers
//! wait on its [`Condvar`]. Both kinds of caller share the same entry, so a
//! key is parsed once no matter how callers are mixed.
//!
//! An async leader parses on [`tokio::task::spawn_blocking`] and the blocking
//! task itself stores the result and wakes the waiters. A leader whose future
//! is dropped (caller timeout, `select!`) therefore never strands its
//! followers. A blocking leader parses on its own thread.
//!
//! If the parse panics, a drop guard removes the `Pending` entry and wakes the
//! waiters, so the next caller retries with a fresh parse.
//!
//! Failed parses are cached like successful ones: the same source always
//! produces the same failure.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

use crate::config::EngineConfig;
use crate::constants::PENDING_PARSE_WARN_AFTER;
use crate::core::{Result, TaxformError};
use crate::parser::{ParseResult, parse_template};

/// State of one cache key.
#[derive(Debug, Clone)]
enum ParseState {
    /// A parse is in flight; waiters are woken when it completes.
    Pending(Arc<InFlight>),
    /// The parse completed.
    Ready(Arc<ParseResult>),
}

/// Wake-up handles for one in-flight parse.
#[derive(Debug, Default)]
struct InFlight {
    notify: Notify,
    done: Mutex<bool>,
    finished: Condvar,
}

impl InFlight {
    /// Mark the flight landed (committed or aborted) and wake every waiter.
    fn complete(&self) {
        *self.done.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.finished.notify_all();
        self.notify.notify_waiters();
    }

    /// Block until the flight lands or `timeout` passes. Returns whether it landed.
    fn wait_timeout(&self, timeout: Duration) -> bool {
        let done = self.done.lock().unwrap_or_else(PoisonError::into_inner);
        let (done, _) = self
            .finished
            .wait_timeout_while(done, timeout, |done| !*done)
            .unwrap_or_else(PoisonError::into_inner);
        *done
    }
}

type ParseFn = fn(&str, &str, &EngineConfig) -> ParseResult;

/// Counters exposed by [`TemplateCache::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Parses actually executed
    pub parses: u64,
    /// Lookups answered from a completed entry
    pub hits: u64,
    /// Lookups that waited on another caller's in-flight parse
    pub coalesced: u64,
}

#[derive(Debug, Default)]
struct Counters {
    parses: AtomicU64,
    hits: AtomicU64,
    coalesced: AtomicU64,
}

/// Memoising, coalescing template parser.
#[derive(Debug, Clone)]
pub struct TemplateCache {
    entries: Arc<DashMap<String, ParseState>>,
    counters: Arc<Counters>,
    config: Arc<EngineConfig>,
    parse: ParseFn,
}

/// Cache key for a template source and form code.
///
/// SHA-256 over the form code, a NUL separator and the source, hex encoded.
#[must_use]
pub fn fingerprint(source: &str, form_code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(form_code.as_bytes());
    hasher.update([0u8]);
    hasher.update(source.as_bytes());
    hex::encode(hasher.finalize())
}

impl TemplateCache {
    /// Create an empty cache that parses with `config`.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_parser(config, parse_template)
    }

    fn with_parser(config: EngineConfig, parse: ParseFn) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            counters: Arc::new(Counters::default()),
            config: Arc::new(config),
            parse,
        }
    }

    /// Configuration used for parsing.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Return the parse result for a source, parsing it at most once.
    ///
    /// Concurrent callers for the same uncached key share a single parse and
    /// all receive the same `Arc`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxformError::Other`] when the blocking parse task could not
    /// be joined (runtime shutdown). A panicking parse is re-raised.
    pub async fn get_or_parse(&self, source: &str, form_code: &str) -> Result<Arc<ParseResult>> {
        let key = fingerprint(source, form_code);
        let mut waited = false;

        let flight = loop {
            match self.entries.entry(key.clone()) {
                Entry::Occupied(entry) => match entry.get() {
                    ParseState::Ready(result) => {
                        let result = Arc::clone(result);
                        drop(entry);
                        if !waited {
                            self.counters.hits.fetch_add(1, Ordering::Relaxed);
                        }
                        tracing::trace!(
                            target: "cache",
                            "Cache hit for {} ({})",
                            form_code,
                            &key[..12]
                        );
                        return Ok(result);
                    }
                    ParseState::Pending(existing) => {
                        let existing = Arc::clone(existing);
                        // Register before releasing the entry so a completion
                        // between drop and await is not missed.
                        let notified = existing.notify.notified();
                        drop(entry);

                        if !waited {
                            waited = true;
                            self.counters.coalesced.fetch_add(1, Ordering::Relaxed);
                            tracing::debug!(
                                target: "cache",
                                "Waiting for in-flight parse of {} ({})",
                                form_code,
                                &key[..12]
                            );
                        }

                        tokio::select! {
                            () = notified => {}
                            () = tokio::time::sleep(PENDING_PARSE_WARN_AFTER) => {
                                tracing::warn!(
                                    target: "cache",
                                    "Parse of {} still in flight after {:?}",
                                    form_code,
                                    PENDING_PARSE_WARN_AFTER
                                );
                            }
                        }
                    }
                },
                Entry::Vacant(entry) => {
                    let flight = Arc::new(InFlight::default());
                    entry.insert(ParseState::Pending(Arc::clone(&flight)));
                    break flight;
                }
            }
        };

        let parse = self.parse;
        let entries = Arc::clone(&self.entries);
        let counters = Arc::clone(&self.counters);
        let config = Arc::clone(&self.config);
        let source = source.to_owned();
        let form_code = form_code.to_owned();

        let handle = tokio::task::spawn_blocking(move || {
            let slot = PendingSlot {
                entries: &entries,
                key: &key,
                flight: &flight,
                armed: true,
            };
            counters.parses.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(target: "cache", "Parsing template for {}", form_code);
            let result = Arc::new(parse(&source, &form_code, &config));
            slot.commit(Arc::clone(&result));
            result
        });

        match handle.await {
            Ok(result) => Ok(result),
            Err(error) if error.is_panic() => std::panic::resume_unwind(error.into_panic()),
            Err(error) => Err(TaxformError::Other {
                message: format!("template parse task did not complete: {error}"),
            }),
        }
    }

    /// Synchronous memoised lookup for callers outside an async runtime.
    ///
    /// Shares single-flight state with [`get_or_parse`](Self::get_or_parse):
    /// on a miss this thread parses inline, and while any parse for the key is
    /// in flight (async or blocking) it blocks until that parse lands. A
    /// panicking parse is re-raised on the thread that ran it.
    pub fn get_or_parse_blocking(&self, source: &str, form_code: &str) -> Arc<ParseResult> {
        let key = fingerprint(source, form_code);
        let mut waited = false;

        let flight = loop {
            match self.entries.entry(key.clone()) {
                Entry::Occupied(entry) => match entry.get() {
                    ParseState::Ready(result) => {
                        let result = Arc::clone(result);
                        drop(entry);
                        if !waited {
                            self.counters.hits.fetch_add(1, Ordering::Relaxed);
                        }
                        return result;
                    }
                    ParseState::Pending(existing) => {
                        let existing = Arc::clone(existing);
                        drop(entry);
                        if !waited {
                            waited = true;
                            self.counters.coalesced.fetch_add(1, Ordering::Relaxed);
                        }
                        if !existing.wait_timeout(PENDING_PARSE_WARN_AFTER) {
                            tracing::warn!(
                                target: "cache",
                                "Parse of {} still in flight after {:?}",
                                form_code,
                                PENDING_PARSE_WARN_AFTER
                            );
                        }
                    }
                },
                Entry::Vacant(entry) => {
                    let flight = Arc::new(InFlight::default());
                    entry.insert(ParseState::Pending(Arc::clone(&flight)));
                    break flight;
                }
            }
        };

        let slot = PendingSlot {
            entries: &self.entries,
            key: &key,
            flight: &flight,
            armed: true,
        };
        self.counters.parses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(target: "cache", "Parsing template for {} inline", form_code);
        let result = Arc::new((self.parse)(source, form_code, &self.config));
        slot.commit(Arc::clone(&result));
        result
    }

    /// Drop the completed entry for a source. Returns whether one was removed.
    ///
    /// In-flight parses are not affected.
    pub fn invalidate(&self, source: &str, form_code: &str) -> bool {
        let key = fingerprint(source, form_code);
        self.entries.remove_if(&key, |_, state| matches!(state, ParseState::Ready(_))).is_some()
    }

    /// Drop every completed entry.
    pub fn clear(&self) {
        self.entries.retain(|_, state| matches!(state, ParseState::Pending(_)));
    }

    /// Number of completed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| matches!(entry.value(), ParseState::Ready(_))).count()
    }

    /// Whether no completed entries are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the cache counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            parses: self.counters.parses.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            coalesced: self.counters.coalesced.load(Ordering::Relaxed),
        }
    }
}

/// Owns a `Pending` entry for the duration of a parse.
///
/// Committing stores the result and wakes waiters. Dropping without a commit
/// (the parse panicked) removes the entry and wakes waiters so one of them
/// retries.
struct PendingSlot<'a> {
    entries: &'a DashMap<String, ParseState>,
    key: &'a str,
    flight: &'a InFlight,
    armed: bool,
}

impl PendingSlot<'_> {
    fn commit(mut self, result: Arc<ParseResult>) {
        self.entries.insert(self.key.to_owned(), ParseState::Ready(result));
        self.armed = false;
        self.flight.complete();
    }
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.entries.remove_if(self.key, |_, state| matches!(state, ParseState::Pending(_)));
            self.flight.complete();
            tracing::warn!(target: "cache", "Template parse aborted, cleared pending entry");
        }
    }
}
