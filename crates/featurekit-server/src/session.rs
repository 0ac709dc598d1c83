//! Per-session negotiation state.
//!
//! Each connection owns one [`SessionSlot`]: a write-once cell holding the
//! session's [`FeatureSet`]. The slot moves through three states:
//!
//! ```text
//! Uninitialized -> Negotiated -> Closed
//!        \_____________________/
//! ```
//!
//! Only one transition into `Negotiated` is possible; there is no way back to
//! `Uninitialized`. Reads before negotiation, and after close, return the
//! empty set.
//!
//! The [`SessionStore`] indexes slots by session id. Transports without
//! session ids (stdio, a single in-process pipe) use a fixed default slot,
//! selected by passing `None`.
//!
//! Closing a keyed session leaves its closed slot in the store as a
//! tombstone, so a late `set` for the same id reports
//! [`SetOutcome::Closed`] instead of starting over. Tombstones are purged by
//! [`SessionStore::reap_stale`] once they have been closed for longer than
//! the timeout. Only [`SessionStore::open`] replaces a tombstone with a fresh
//! slot, for a new connection reusing the id.
//!
//! # Concurrency
//!
//! The features live in a [`OnceLock`] and the lifecycle in one [`AtomicU8`],
//! so reading through a [`SessionHandle`] never takes a lock. The handshake
//! and the stale-session reaper both claim a pending slot with a
//! compare-and-swap, so exactly one of them wins.
//! Keyed lookups through the store take a [`DashMap`] shard read lock; hold a
//! handle (or a `RequestContext`) on hot paths instead.
//!
//! # Example
//!
//! ```rust
//! use featurekit_core::{FeatureSet, Format};
//! use featurekit_server::session::{NegotiationState, SessionStore, SetOutcome};
//!
//! let store = SessionStore::new();
//! let handle = store.open(Some("conn-1"));
//! assert_eq!(handle.state(), NegotiationState::Uninitialized);
//! assert_eq!(handle.features().format(), Format::Markdown);
//!
//! let first = FeatureSet::parse(["format=json"]);
//! let second = FeatureSet::parse(["format=text"]);
//! assert_eq!(store.set(Some("conn-1"), first), SetOutcome::Negotiated);
//! assert_eq!(store.set(Some("conn-1"), second), SetOutcome::AlreadyNegotiated);
//! assert_eq!(handle.features().format(), Format::Json);
//!
//! store.remove(Some("conn-1"));
//! assert_eq!(handle.state(), NegotiationState::Closed);
//! assert!(store.get(Some("conn-1")).is_empty());
//! ```

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use featurekit_core::{FeatureSet, Resolution};

/// Label used in logs for the default (id-less) session.
pub const DEFAULT_SESSION_LABEL: &str = "<default>";

pub(crate) fn label(session: Option<&str>) -> &str {
    session.unwrap_or(DEFAULT_SESSION_LABEL)
}

/// Lifecycle state of one session's negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NegotiationState {
    /// Connected, handshake not yet complete.
    Uninitialized,
    /// Features recorded; they will not change for the rest of the session.
    Negotiated,
    /// Connection closed; the slot is released.
    Closed,
}

/// Result of recording a session's features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOutcome {
    /// The features were recorded.
    Negotiated,
    /// The session was already negotiated; the new value was discarded.
    AlreadyNegotiated,
    /// The session is closed; the value was discarded.
    Closed,
}

impl SetOutcome {
    /// Check whether the features were recorded.
    #[must_use]
    pub fn is_accepted(self) -> bool {
        self == Self::Negotiated
    }
}

// Slot lifecycle words. `WRITING` reads as `Uninitialized` from outside.
const PENDING: u8 = 0;
const WRITING: u8 = 1;
const NEGOTIATED: u8 = 2;
const CLOSED: u8 = 3;

/// Write-once negotiation record for one connection.
#[derive(Debug)]
pub struct SessionSlot {
    features: OnceLock<FeatureSet>,
    state: AtomicU8,
    opened_at: Instant,
    closed_at: OnceLock<Instant>,
}

impl SessionSlot {
    fn new() -> Self {
        Self {
            features: OnceLock::new(),
            state: AtomicU8::new(PENDING),
            opened_at: Instant::now(),
            closed_at: OnceLock::new(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> NegotiationState {
        match self.state.load(Ordering::Acquire) {
            NEGOTIATED => NegotiationState::Negotiated,
            CLOSED => NegotiationState::Closed,
            _ => NegotiationState::Uninitialized,
        }
    }

    /// The negotiated features, or `None` before negotiation and after close.
    #[must_use]
    pub fn features_ref(&self) -> Option<&FeatureSet> {
        if self.state.load(Ordering::Acquire) == NEGOTIATED {
            self.features.get()
        } else {
            None
        }
    }

    /// The negotiated features, or the empty set.
    #[must_use]
    pub fn features(&self) -> FeatureSet {
        self.features_ref().cloned().unwrap_or_default()
    }

    /// Time since the slot was opened.
    #[must_use]
    pub fn age(&self) -> Duration {
        self.opened_at.elapsed()
    }

    /// Time since the slot was closed, or `None` while it is open.
    #[must_use]
    pub fn closed_for(&self) -> Option<Duration> {
        self.closed_at.get().map(Instant::elapsed)
    }

    fn set(&self, features: FeatureSet) -> SetOutcome {
        let claimed = self
            .state
            .compare_exchange(PENDING, WRITING, Ordering::AcqRel, Ordering::Acquire);
        if let Err(current) = claimed {
            return if current == CLOSED {
                SetOutcome::Closed
            } else {
                SetOutcome::AlreadyNegotiated
            };
        }

        // Only the writer that moved PENDING -> WRITING gets here.
        let _ = self.features.set(features);
        match self
            .state
            .compare_exchange(WRITING, NEGOTIATED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => SetOutcome::Negotiated,
            Err(_) => SetOutcome::Closed,
        }
    }

    /// Close unconditionally. Returns `true` if this call closed the slot.
    fn close(&self) -> bool {
        let closing = self.state.swap(CLOSED, Ordering::AcqRel) != CLOSED;
        if closing {
            self.mark_closed();
        }
        closing
    }

    /// Close only if no handshake has started. Returns `true` on success.
    fn close_pending(&self) -> bool {
        let closing = self
            .state
            .compare_exchange(PENDING, CLOSED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if closing {
            self.mark_closed();
        }
        closing
    }

    fn mark_closed(&self) {
        let _ = self.closed_at.set(Instant::now());
    }
}

/// Read-only handle to one session's slot.
///
/// Cheap to clone. Hand one to every request handler of the connection; all
/// of its reads are lock-free.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: Option<Arc<str>>,
    slot: Arc<SessionSlot>,
}

impl SessionHandle {
    fn new(id: Option<&str>, slot: Arc<SessionSlot>) -> Self {
        Self {
            id: id.map(Arc::from),
            slot,
        }
    }

    /// A handle to a fresh slot that no store knows about.
    ///
    /// It stays `Uninitialized` forever and always reads the empty set.
    #[must_use]
    pub fn detached(id: Option<&str>) -> Self {
        Self::new(id, Arc::new(SessionSlot::new()))
    }

    /// The session id, or `None` for the default slot.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The negotiated features, or the empty set.
    #[must_use]
    pub fn features(&self) -> FeatureSet {
        self.slot.features()
    }

    /// Every standard query evaluated against the negotiated features.
    #[must_use]
    pub fn resolution(&self) -> Resolution {
        self.slot
            .features_ref()
            .map(FeatureSet::resolution)
            .unwrap_or_default()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> NegotiationState {
        self.slot.state()
    }

    /// Check whether negotiation has completed and the session is open.
    #[must_use]
    pub fn is_negotiated(&self) -> bool {
        self.state() == NegotiationState::Negotiated
    }

    /// The underlying slot.
    #[must_use]
    pub fn slot(&self) -> &SessionSlot {
        &self.slot
    }
}

/// Thread-safe store of per-session negotiation slots.
///
/// Share it behind an `Arc` and inject it where handshakes are handled; it is
/// never reachable through a global.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<SessionSlot>>,
    default_slot: Arc<SessionSlot>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            default_slot: Arc::new(SessionSlot::new()),
        }
    }

    /// Open a session under a freshly generated id.
    #[must_use]
    pub fn create(&self) -> SessionHandle {
        let id = uuid::Uuid::new_v4().to_string();
        self.open(Some(&id))
    }

    /// Register a session on connection open and return a handle to it.
    ///
    /// Opening an already-open session returns a handle to the same slot.
    /// Opening a closed keyed session starts a fresh slot; handles to the old
    /// one stay `Closed`. The default slot stays closed once closed.
    pub fn open(&self, session: Option<&str>) -> SessionHandle {
        let slot = match session {
            None => Arc::clone(&self.default_slot),
            Some(id) => {
                let mut slot = self
                    .sessions
                    .entry(id.to_owned())
                    .or_insert_with(|| Arc::new(SessionSlot::new()));
                if slot.state() == NegotiationState::Closed {
                    tracing::debug!(session = %id, "reopening closed session id");
                    *slot = Arc::new(SessionSlot::new());
                }
                Arc::clone(&slot)
            }
        };
        SessionHandle::new(session, slot)
    }

    /// A handle to an existing session.
    ///
    /// Always `Some` for the default slot.
    #[must_use]
    pub fn handle(&self, session: Option<&str>) -> Option<SessionHandle> {
        match session {
            None => Some(SessionHandle::new(None, Arc::clone(&self.default_slot))),
            Some(id) => self
                .sessions
                .get(id)
                .map(|slot| SessionHandle::new(session, Arc::clone(&slot))),
        }
    }

    /// The features negotiated for a session.
    ///
    /// Unknown, un-negotiated and closed sessions all read the empty set.
    ///
    /// Keyed lookups take a `DashMap` shard read lock. Request handlers
    /// should read through a [`SessionHandle`] or `RequestContext`, which
    /// never lock.
    #[must_use]
    pub fn get(&self, session: Option<&str>) -> FeatureSet {
        let features = match session {
            None => self.default_slot.features(),
            Some(id) => self
                .sessions
                .get(id)
                .map(|slot| slot.features())
                .unwrap_or_default(),
        };
        tracing::trace!(session = label(session), tags = features.len(), "read session features");
        features
    }

    /// Record a session's features. Only the first call per session counts.
    ///
    /// A session that was never opened is opened implicitly. A session that
    /// was closed, by [`remove`](Self::remove) or by
    /// [`reap_stale`](Self::reap_stale), stays closed: the call returns
    /// [`SetOutcome::Closed`] and outstanding handles keep reading the empty set.
    pub fn set(&self, session: Option<&str>, features: FeatureSet) -> SetOutcome {
        let outcome = self.slot_or_insert(session).set(features);
        match outcome {
            SetOutcome::Negotiated => {}
            SetOutcome::AlreadyNegotiated => {
                tracing::warn!(
                    session = label(session),
                    "ignoring renegotiation attempt; features are fixed for the session"
                );
            }
            SetOutcome::Closed => {
                tracing::warn!(
                    session = label(session),
                    "ignoring negotiation for closed session"
                );
            }
        }
        outcome
    }

    /// Lifecycle state of a session. Unknown sessions read as `Uninitialized`.
    #[must_use]
    pub fn state(&self, session: Option<&str>) -> NegotiationState {
        match session {
            None => self.default_slot.state(),
            Some(id) => self
                .sessions
                .get(id)
                .map_or(NegotiationState::Uninitialized, |slot| slot.state()),
        }
    }

    /// Release a session on connection teardown.
    ///
    /// Outstanding handles observe `Closed`. The slot is closed in place and
    /// a keyed entry stays behind as a tombstone until
    /// [`reap_stale`](Self::reap_stale) purges it. Returns `true` if an open
    /// session was released.
    pub fn remove(&self, session: Option<&str>) -> bool {
        let released = match session {
            None => self.default_slot.close(),
            Some(id) => self.sessions.get(id).is_some_and(|slot| slot.close()),
        };
        if released {
            tracing::debug!(session = label(session), "released session");
        }
        released
    }

    /// Number of open keyed sessions. Tombstones are not counted.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|slot| slot.state() != NegotiationState::Closed)
            .count()
    }

    /// Close keyed sessions that have not negotiated within `timeout`.
    ///
    /// Closed sessions become tombstones, so a handshake arriving after this
    /// is refused with [`SetOutcome::Closed`]. Tombstones closed for at least
    /// `timeout` are purged in the same pass. Returns how many sessions were
    /// closed.
    pub fn reap_stale(&self, timeout: Duration) -> usize {
        let mut reaped = 0;
        self.sessions.retain(|id, slot| match slot.state() {
            NegotiationState::Uninitialized if slot.age() >= timeout => {
                if slot.close_pending() {
                    reaped += 1;
                    tracing::debug!(session = %id, "closing session that never negotiated");
                }
                true
            }
            NegotiationState::Closed => {
                !slot.closed_for().is_some_and(|closed| closed >= timeout)
            }
            _ => true,
        });
        reaped
    }

    /// Start a background task that periodically calls [`reap_stale`](Self::reap_stale).
    ///
    /// The task stops once the store is dropped.
    #[cfg(feature = "tokio-runtime")]
    pub fn start_cleanup_task(
        self: &Arc<Self>,
        interval: Duration,
        handshake_timeout: Duration,
    ) -> tokio::task::JoinHandle<()> {
        let store = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                let reaped = store.reap_stale(handshake_timeout);
                if reaped > 0 {
                    tracing::info!(reaped, "cleaned up stale sessions");
                }
            }
        })
    }

    fn slot_or_insert(&self, session: Option<&str>) -> Arc<SessionSlot> {
        match session {
            None => Arc::clone(&self.default_slot),
            Some(id) => {
                if let Some(slot) = self.sessions.get(id) {
                    return Arc::clone(&slot);
                }
                Arc::clone(
                    &self
                        .sessions
                        .entry(id.to_owned())
                        .or_insert_with(|| Arc::new(SessionSlot::new())),
                )
            }
        }
    }
}
