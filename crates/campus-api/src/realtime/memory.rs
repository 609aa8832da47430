//! In-process realtime store.
//!
//! Backs the `--demo` console mode and the synchronizer tests. Writes are
//! applied to a local JSON tree and echoed to every overlapping
//! subscription, like the remote store does. Failure injection hooks
//! simulate rejected writes and dropped subscriptions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{
    RealtimeStore, Subscription, SubscriptionEvent, parse_group_snapshot, path_segments, tree,
};
use crate::error::Error;

/// Shared in-memory store. Clones share state.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<State>,
    echo: AtomicBool,
}

#[derive(Default)]
struct State {
    tree: Value,
    subscribers: Vec<Subscriber>,
    write_failures: HashMap<String, String>,
    write_delay: Duration,
    attempts: Vec<String>,
    writes: Vec<(String, Value)>,
}

struct Subscriber {
    path: String,
    tx: mpsc::UnboundedSender<SubscriptionEvent>,
    cancel: CancellationToken,
}

impl Subscriber {
    fn is_live(&self) -> bool {
        !self.cancel.is_cancelled() && !self.tx.is_closed()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::with_tree(Value::Null)
    }

    /// A store seeded with `tree` as its root value.
    pub fn with_tree(tree: Value) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    tree,
                    ..State::default()
                }),
                echo: AtomicBool::new(true),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ── Remote-side mutation ─────────────────────────────────────────

    /// Change the value at `path` as another client would, notifying every
    /// overlapping subscription. Not recorded in [`writes`](Self::writes).
    pub fn set_remote(&self, path: &str, value: Value) {
        let mut state = self.state();
        tree::put(&mut state.tree, path, value);
        notify(&mut state, path);
    }

    /// Current value at `path`, or `null`.
    pub fn value_at(&self, path: &str) -> Value {
        tree::get(&self.state().tree, path).clone()
    }

    /// Every acknowledged write, oldest first.
    pub fn writes(&self) -> Vec<(String, Value)> {
        self.state().writes.clone()
    }

    /// Path of every write issued, accepted or not, in call order.
    pub fn write_attempts(&self) -> Vec<String> {
        self.state().attempts.clone()
    }

    // ── Failure injection ────────────────────────────────────────────

    /// Reject writes at or below `path` with `reason`.
    pub fn fail_writes(&self, path: &str, reason: impl Into<String>) {
        self.state()
            .write_failures
            .insert(path.trim_matches('/').to_owned(), reason.into());
    }

    /// Accept all writes again.
    pub fn clear_failures(&self) {
        self.state().write_failures.clear();
    }

    /// Hold every write for `delay` before acknowledging it.
    pub fn set_write_delay(&self, delay: Duration) {
        self.state().write_delay = delay;
    }

    /// Whether acknowledged writes are echoed to subscriptions.
    pub fn set_echo(&self, echo: bool) {
        self.inner.echo.store(echo, Ordering::SeqCst);
    }

    /// Terminate every subscription rooted at `path` with a cancellation
    /// error, as the server does when access rules change.
    pub fn fail_subscriptions(&self, path: &str, reason: &str) {
        let target = path_segments(path);
        let mut state = self.state();
        state.subscribers.retain(|sub| {
            if path_segments(&sub.path) != target {
                return true;
            }
            let _ = sub.tx.send(SubscriptionEvent::Error(Error::SubscriptionCancelled {
                path: sub.path.clone(),
                reason: reason.to_owned(),
            }));
            false
        });
    }

    /// Number of open subscriptions rooted at `path`.
    pub fn subscriber_count(&self, path: &str) -> usize {
        let target = path_segments(path);
        self.state()
            .subscribers
            .iter()
            .filter(|sub| sub.is_live() && path_segments(&sub.path) == target)
            .count()
    }

    fn rejection(&self, path: &str) -> Option<String> {
        let segments = path_segments(path);
        self.state()
            .write_failures
            .iter()
            .find(|(prefix, _)| segments.starts_with(&path_segments(prefix)))
            .map(|(_, reason)| reason.clone())
    }

    fn apply(&self, path: &str, value: Value) {
        let echo = self.inner.echo.load(Ordering::SeqCst);
        let mut state = self.state();
        state.writes.push((path.to_owned(), value.clone()));
        tree::put(&mut state.tree, path, value);
        if echo {
            notify(&mut state, path);
        }
    }
}

impl RealtimeStore for MemoryStore {
    fn subscribe(&self, path: &str) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let mut state = self.state();
        let initial = parse_group_snapshot(tree::get(&state.tree, path));
        let _ = tx.send(SubscriptionEvent::Snapshot(initial));
        state.subscribers.retain(Subscriber::is_live);
        state.subscribers.push(Subscriber {
            path: path.to_owned(),
            tx,
            cancel: cancel.clone(),
        });
        debug!(path, "memory store subscription opened");

        Subscription::new(path, rx, cancel)
    }

    async fn write(&self, path: &str, value: Value) -> Result<(), Error> {
        let delay = {
            let mut state = self.state();
            state.attempts.push(path.to_owned());
            state.write_delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.rejection(path) {
            return Err(Error::Realtime {
                path: path.to_owned(),
                message,
            });
        }

        self.apply(path, value);
        Ok(())
    }
}

/// Send a fresh snapshot to every live subscription whose subtree overlaps
/// `changed`.
fn notify(state: &mut State, changed: &str) {
    let changed = path_segments(changed);
    let State {
        tree: root,
        subscribers,
        ..
    } = state;

    subscribers.retain(Subscriber::is_live);
    for sub in subscribers.iter() {
        let sub_path = path_segments(&sub.path);
        if !(changed.starts_with(&sub_path) || sub_path.starts_with(&changed)) {
            continue;
        }
        let snapshot = parse_group_snapshot(tree::get(root, &sub.path));
        let _ = sub.tx.send(SubscriptionEvent::Snapshot(snapshot));
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("MemoryStore")
            .field("tree", &state.tree)
            .field("subscribers", &state.subscribers.len())
            .finish_non_exhaustive()
    }
}
