// ── Reactive light stream ──
//
// Subscription type for consuming light-set changes from the LightStore.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::Light;

/// A subscription to the cached light set.
///
/// Provides point-in-time snapshot access and change notification via
/// `changed()` or by converting to a `Stream`.
pub struct LightStream {
    current: Arc<Vec<Light>>,
    receiver: watch::Receiver<Arc<Vec<Light>>>,
}

impl LightStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<Vec<Light>>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &Arc<Vec<Light>> {
        &self.current
    }

    pub fn latest(&self) -> Arc<Vec<Light>> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Arc<Vec<Light>>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = Arc::clone(&snap);
        Some(snap)
    }

    pub fn into_stream(self) -> LightWatchStream {
        LightWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding a snapshot each time the light set changes.
pub struct LightWatchStream {
    inner: WatchStream<Arc<Vec<Light>>>,
}

impl Stream for LightWatchStream {
    type Item = Arc<Vec<Light>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
