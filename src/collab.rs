//! Collaborator seams the challenge core consumes but does not implement:
//! dice rolling, chat output, and actor lookup.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ActorRef;

/// Raw result of one skill check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Evaluated check total (die plus modifiers).
    pub total: i32,
    /// Face of the d20 itself, when the roller can report it.
    pub natural_die: Option<u8>,
}

/// Produces check totals for an actor against a DC.
#[async_trait]
pub trait RollProvider: Send + Sync {
    /// Roll a check. `Ok(None)` signals a cancelled roll; the caller must
    /// treat it as "no attempt happened".
    async fn roll_check(&self, actor: &ActorRef, dc: i32) -> Result<Option<CheckOutcome>>;
}

/// Fire-and-forget chat output. The core never reads anything back.
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn post(&self, actor: &ActorRef, message: &str) -> Result<()>;
}

/// What the core needs to know about a resolved actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorInfo {
    pub name: String,
}

/// Resolves opaque actor references against the external document store.
#[async_trait]
pub trait ActorDirectory: Send + Sync {
    async fn resolve(&self, actor: &ActorRef) -> Result<Option<ActorInfo>>;
}
