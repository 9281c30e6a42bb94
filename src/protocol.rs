//! Wire envelope for the broadcast channel.
//!
//! Both message kinds carry a full challenge snapshot, never a diff:
//!
//! ```json
//! { "type": "updateChallenge", "payload": { "challenge": { … } } }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::Challenge;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum SyncMessage {
    /// Sent by the GM right after creation, and whenever the challenge
    /// should be (re-)surfaced to peers. Receivers apply a role filter.
    OpenChallenge { challenge: Challenge },
    /// Sent after any local mutation. Receivers overwrite unconditionally.
    UpdateChallenge { challenge: Challenge },
}

impl SyncMessage {
    pub fn challenge(&self) -> &Challenge {
        match self {
            SyncMessage::OpenChallenge { challenge } => challenge,
            SyncMessage::UpdateChallenge { challenge } => challenge,
        }
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
