use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::broadcast;
use tracing::trace;

use nestlist_types::events::GatewayEvent;

/// Events a slow watcher may fall behind by before it starts skipping.
pub const EVENT_BUFFER: usize = 1024;

/// Fans registry change events out to every connected watcher.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    /// Broadcast channel for gateway events. All connected clients receive all events
    broadcast_tx: broadcast::Sender<GatewayEvent>,

    /// Open websocket connections
    watchers: AtomicUsize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            inner: Arc::new(DispatcherInner {
                broadcast_tx,
                watchers: AtomicUsize::new(0),
            }),
        }
    }

    /// Subscribe to gateway events. Returns a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    /// Broadcast an event to all connected clients. Nobody listening is not an error.
    pub fn broadcast(&self, event: GatewayEvent) {
        trace!(?event, "broadcast");
        let _ = self.inner.broadcast_tx.send(event);
    }

    pub fn watcher_count(&self) -> usize {
        self.inner.watchers.load(Ordering::Relaxed)
    }

    /// Count a connection for as long as the returned guard lives.
    pub fn track_watcher(&self) -> WatcherGuard {
        self.inner.watchers.fetch_add(1, Ordering::Relaxed);
        WatcherGuard {
            dispatcher: self.clone(),
        }
    }
}

pub struct WatcherGuard {
    dispatcher: Dispatcher,
}

impl Drop for WatcherGuard {
    fn drop(&mut self) {
        self.dispatcher.inner.watchers.fetch_sub(1, Ordering::Relaxed);
    }
}
