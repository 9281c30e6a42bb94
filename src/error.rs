use crate::types::{ActorRef, ChallengeId};

/// Result type for lockpick operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the challenge core
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Challenge not found: {0}")]
    UnknownChallenge(ChallengeId),

    #[error("Actor not found: {0}")]
    MissingActor(ActorRef),

    #[error("Invalid challenge parameters: {0}")]
    InvalidParams(String),

    #[error("Only the GM may {0}")]
    GmOnly(&'static str),

    #[error("Inventory operation failed: {0}")]
    Inventory(String),

    #[error("Roll failed: {0}")]
    Roll(String),

    #[error("Chat post failed: {0}")]
    Chat(String),

    #[error("Broadcast send failed: {0}")]
    Transport(String),

    #[error("Message encoding failed: {0}")]
    Codec(#[from] serde_json::Error),
}
