//! Replication of challenge state across clients.
//!
//! Outbound: serialize the full snapshot and fire it at the transport,
//! logging (never propagating) send failures. Inbound: apply the receive
//! rules to each message and tell the caller what its views should do.
//!
//! Replication is last-writer-wins with no causal ordering: whichever
//! snapshot arrives last overwrites the local copy, so concurrent mutations
//! can lose updates. That is an accepted limitation, not a bug to fix here.

use std::sync::Arc;

use crate::protocol::SyncMessage;
use crate::registry::ChallengeRegistry;
use crate::transport::BroadcastTransport;
use crate::types::{Challenge, ClientIdentity};

/// What the embedding UI should do after a message was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEffect {
    /// Show a (new) view for this challenge.
    OpenView(Challenge),
    /// Re-render any live views bound to this challenge id.
    RefreshViews(Challenge),
    /// Message was filtered or malformed; nothing changed.
    Ignored,
}

/// Encodes, sends, and applies challenge sync messages for one client.
pub struct ChallengeSyncProtocol {
    identity: ClientIdentity,
    registry: Arc<ChallengeRegistry>,
    transport: Arc<dyn BroadcastTransport>,
}

impl ChallengeSyncProtocol {
    pub fn new(
        identity: ClientIdentity,
        registry: Arc<ChallengeRegistry>,
        transport: Arc<dyn BroadcastTransport>,
    ) -> Self {
        Self {
            identity,
            registry,
            transport,
        }
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    /// Announce a freshly created challenge to peers.
    pub fn announce_open(&self, challenge: &Challenge) {
        self.emit(SyncMessage::OpenChallenge {
            challenge: challenge.clone(),
        });
    }

    /// Announce a local mutation. The caller must have written the snapshot
    /// to the registry first: never broadcast state that is not committed
    /// locally.
    pub fn announce_update(&self, challenge: &Challenge) {
        self.emit(SyncMessage::UpdateChallenge {
            challenge: challenge.clone(),
        });
    }

    fn emit(&self, message: SyncMessage) {
        // Fire-and-forget: the local mutation already took effect and is not
        // rolled back on a failed send.
        if let Err(e) = self.transport.send(message) {
            tracing::warn!("broadcast send failed: {}", e);
        }
    }

    /// Apply one received message to the local registry.
    pub async fn handle_message(&self, message: SyncMessage) -> SyncEffect {
        match message {
            SyncMessage::OpenChallenge { challenge } => {
                if !self.should_open(&challenge) {
                    tracing::debug!(
                        challenge = %challenge.id,
                        user = %self.identity.user_id,
                        "openChallenge filtered for this client"
                    );
                    return SyncEffect::Ignored;
                }

                self.registry.put(challenge.clone()).await;
                SyncEffect::OpenView(challenge)
            }
            SyncMessage::UpdateChallenge { challenge } => {
                // Unconditional overwrite, even for ids never seen before.
                self.registry.put(challenge.clone()).await;
                SyncEffect::RefreshViews(challenge)
            }
        }
    }

    /// Decode and apply a raw envelope; malformed input is logged and ignored.
    pub async fn handle_raw(&self, text: &str) -> SyncEffect {
        match SyncMessage::decode(text) {
            Ok(message) => self.handle_message(message).await,
            Err(e) => {
                tracing::warn!("ignoring malformed sync message: {}", e);
                SyncEffect::Ignored
            }
        }
    }

    /// Receive filter for `openChallenge`: the designated player sees it, and
    /// so does any GM other than the creator. The explicit sender-id
    /// comparison is what stops the creating GM from double-opening its own
    /// challenge.
    fn should_open(&self, challenge: &Challenge) -> bool {
        let is_designated_player = challenge.player_id.as_deref() == Some(&self.identity.user_id);
        let is_other_gm = self.identity.is_gm && self.identity.user_id != challenge.gm_id;
        is_designated_player || is_other_gm
    }
}
