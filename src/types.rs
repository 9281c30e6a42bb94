use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type ChallengeId = String;
pub type UserId = String;
pub type ActorRef = String;
pub type ItemId = String;

/// Outcome band of a skill check against a DC.
///
/// Variant order matters: derived `Ord` follows the degree ladder, which the
/// resolver's natural-die override steps along.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum DegreeOfSuccess {
    CriticalFailure,
    Failure,
    Success,
    CriticalSuccess,
}

impl DegreeOfSuccess {
    pub fn index(self) -> u8 {
        match self {
            DegreeOfSuccess::CriticalFailure => 0,
            DegreeOfSuccess::Failure => 1,
            DegreeOfSuccess::Success => 2,
            DegreeOfSuccess::CriticalSuccess => 3,
        }
    }

    /// Map an index back to a degree, clamping out-of-range values to the ends.
    pub fn from_index(index: i8) -> Self {
        match index {
            i8::MIN..=0 => DegreeOfSuccess::CriticalFailure,
            1 => DegreeOfSuccess::Failure,
            2 => DegreeOfSuccess::Success,
            _ => DegreeOfSuccess::CriticalSuccess,
        }
    }
}

/// Full replicated state of one lock-pick challenge.
///
/// This is also the wire snapshot: sync messages always carry the whole
/// struct, never a diff. Field names are camelCase on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: ChallengeId,
    /// Reference resolvable to an external actor document.
    pub actor_ref: ActorRef,
    /// Difficulty class, fixed at creation.
    pub dc: i32,
    /// Target success count, fixed at creation, in [2, 6].
    pub required_attempts: u32,
    pub success_count: u32,
    /// The creating GM.
    pub gm_id: UserId,
    /// The designated beneficiary, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<UserId>,
    /// Currently chosen toolkit item; lazily auto-populated on first display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_selection: Option<ItemId>,
}

impl Challenge {
    pub fn is_resolved(&self) -> bool {
        self.success_count >= self.required_attempts
    }

    /// Keep `success_count` inside [0, required_attempts].
    pub fn clamp_success_count(&mut self) {
        if self.success_count > self.required_attempts {
            self.success_count = self.required_attempts;
        }
    }
}

/// Who this client is, as carried in role flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub user_id: UserId,
    pub is_gm: bool,
}

impl ClientIdentity {
    pub fn gm(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            is_gm: true,
        }
    }

    pub fn player(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            is_gm: false,
        }
    }
}
