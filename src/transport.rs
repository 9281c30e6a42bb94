//! Outbound broadcast seam and an in-process loopback implementation.

use tokio::sync::broadcast;

use crate::error::Result;
use crate::protocol::SyncMessage;

/// Best-effort, at-most-once broadcast to all other clients.
///
/// Delivery, ordering, and retry are explicitly not this trait's problem;
/// the sync layer catches and logs send failures without rolling anything
/// back.
pub trait BroadcastTransport: Send + Sync {
    fn send(&self, message: SyncMessage) -> Result<()>;
}

/// Loopback transport over a `tokio::sync::broadcast` channel, for the demo
/// binary and tests. Every subscriber sees every message, sender included.
pub struct LoopbackTransport {
    tx: broadcast::Sender<SyncMessage>,
}

impl LoopbackTransport {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncMessage> {
        self.tx.subscribe()
    }
}

impl BroadcastTransport for LoopbackTransport {
    fn send(&self, message: SyncMessage) -> Result<()> {
        // No receivers connected is fine
        let _ = self.tx.send(message);
        Ok(())
    }
}
