//! Default dice implementation: a plain `1d20 + modifier` check.

use async_trait::async_trait;
use rand::Rng;

use crate::collab::{CheckOutcome, RollProvider};
use crate::error::Result;
use crate::types::ActorRef;

/// Rolls `1d20 + modifier` and reports the natural die face.
///
/// This is the fallback when no richer check machinery is available;
/// embedding applications with their own dice subsystem supply their own
/// [`RollProvider`] instead.
#[derive(Debug, Clone, Default)]
pub struct D20Roller {
    /// Flat skill modifier added to the die.
    pub modifier: i32,
}

impl D20Roller {
    pub fn new(modifier: i32) -> Self {
        Self { modifier }
    }
}

#[async_trait]
impl RollProvider for D20Roller {
    async fn roll_check(&self, _actor: &ActorRef, dc: i32) -> Result<Option<CheckOutcome>> {
        let face: u8 = rand::rng().random_range(1..=20);
        let total = i32::from(face) + self.modifier;
        tracing::debug!(face, total, dc, "rolled check");

        Ok(Some(CheckOutcome {
            total,
            natural_die: Some(face),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roll_stays_in_range() {
        let roller = D20Roller::new(5);
        let actor = "actor-1".to_string();

        for _ in 0..100 {
            let outcome = roller.roll_check(&actor, 15).await.unwrap().unwrap();
            let face = outcome.natural_die.unwrap();
            assert!((1..=20).contains(&face));
            assert_eq!(outcome.total, i32::from(face) + 5);
        }
    }
}
