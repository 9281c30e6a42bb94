//! Per-client authoritative store of challenge state.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::types::{ActorRef, Challenge, ChallengeId, UserId};

/// Parameters for creating a new challenge.
#[derive(Debug, Clone)]
pub struct CreateChallengeParams {
    pub actor_ref: ActorRef,
    pub dc: i32,
    pub required_attempts: u32,
    pub gm_id: UserId,
    pub player_id: Option<UserId>,
}

/// The local client's map of challenge id to challenge state.
///
/// Each client owns exactly one copy of each challenge it knows about; there
/// is no shared memory between clients and no merge logic. `put` is an
/// unconditional overwrite, used both for local mutation and for applying a
/// remote snapshot.
#[derive(Default)]
pub struct ChallengeRegistry {
    challenges: RwLock<HashMap<ChallengeId, Challenge>>,
}

impl ChallengeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id and store a fresh challenge.
    ///
    /// `required_attempts` is clamped into [2, 6]; a non-positive DC is
    /// rejected.
    pub async fn create(&self, params: CreateChallengeParams) -> Result<Challenge> {
        if params.dc <= 0 {
            return Err(Error::InvalidParams(format!(
                "DC must be positive, got {}",
                params.dc
            )));
        }

        let challenge = Challenge {
            id: ulid::Ulid::new().to_string(),
            actor_ref: params.actor_ref,
            dc: params.dc,
            required_attempts: params.required_attempts.clamp(2, 6),
            success_count: 0,
            gm_id: params.gm_id,
            player_id: params.player_id,
            tool_selection: None,
        };

        self.challenges
            .write()
            .await
            .insert(challenge.id.clone(), challenge.clone());

        Ok(challenge)
    }

    pub async fn get(&self, id: &str) -> Option<Challenge> {
        self.challenges.read().await.get(id).cloned()
    }

    /// Unconditional overwrite. Last writer wins; there is no version check.
    pub async fn put(&self, challenge: Challenge) {
        self.challenges
            .write()
            .await
            .insert(challenge.id.clone(), challenge);
    }

    pub async fn remove(&self, id: &str) -> Option<Challenge> {
        self.challenges.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.challenges.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.challenges.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> CreateChallengeParams {
        CreateChallengeParams {
            actor_ref: "Actor.abc123".to_string(),
            dc: 20,
            required_attempts: 3,
            gm_id: "gm-1".to_string(),
            player_id: Some("player-1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_initializes_progress() {
        let registry = ChallengeRegistry::new();
        let challenge = registry.create(params()).await.unwrap();

        assert_eq!(challenge.success_count, 0);
        assert!(challenge.tool_selection.is_none());
        assert!(!challenge.id.is_empty());
        assert_eq!(registry.get(&challenge.id).await, Some(challenge));
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_dc() {
        let registry = ChallengeRegistry::new();
        let result = registry
            .create(CreateChallengeParams { dc: 0, ..params() })
            .await;

        assert!(matches!(result, Err(Error::InvalidParams(_))));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_clamps_required_attempts() {
        let registry = ChallengeRegistry::new();

        let low = registry
            .create(CreateChallengeParams {
                required_attempts: 1,
                ..params()
            })
            .await
            .unwrap();
        assert_eq!(low.required_attempts, 2);

        let high = registry
            .create(CreateChallengeParams {
                required_attempts: 9,
                ..params()
            })
            .await
            .unwrap();
        assert_eq!(high.required_attempts, 6);
    }

    #[tokio::test]
    async fn test_put_overwrites_unconditionally() {
        let registry = ChallengeRegistry::new();
        let mut challenge = registry.create(params()).await.unwrap();

        challenge.success_count = 2;
        registry.put(challenge.clone()).await;
        assert_eq!(registry.get(&challenge.id).await, Some(challenge.clone()));

        // A "stale" snapshot still replaces the newer one
        challenge.success_count = 0;
        registry.put(challenge.clone()).await;
        assert_eq!(
            registry.get(&challenge.id).await.unwrap().success_count,
            0
        );
    }

    #[tokio::test]
    async fn test_remove() {
        let registry = ChallengeRegistry::new();
        let challenge = registry.create(params()).await.unwrap();

        assert!(registry.remove(&challenge.id).await.is_some());
        assert!(registry.get(&challenge.id).await.is_none());
        assert!(registry.remove(&challenge.id).await.is_none());
    }
}
