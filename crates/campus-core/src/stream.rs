// ── Reactive projection streams ──
//
// Subscription type for consuming projection changes from the
// synchronizer.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::ProjectionSnapshot;

/// A subscription to the device projection.
///
/// Provides both point-in-time snapshot access and change notification
/// via [`changed`](Self::changed) or by converting to a `Stream`.
pub struct ProjectionStream {
    current: Arc<ProjectionSnapshot>,
    receiver: watch::Receiver<Arc<ProjectionSnapshot>>,
}

impl ProjectionStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<ProjectionSnapshot>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation time (or at the last `changed`).
    pub fn current(&self) -> &Arc<ProjectionSnapshot> {
        &self.current
    }

    /// The latest snapshot.
    pub fn latest(&self) -> Arc<ProjectionSnapshot> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the synchronizer has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<ProjectionSnapshot>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream`. The first item is the current snapshot.
    pub fn into_stream(self) -> ProjectionWatchStream {
        ProjectionWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct ProjectionWatchStream {
    inner: WatchStream<Arc<ProjectionSnapshot>>,
}

impl Stream for ProjectionWatchStream {
    type Item = Arc<ProjectionSnapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
