//! Orchestrates a challenge's lifecycle on one client: creation, the
//! pick-attempt state machine, GM adjustments, and the view model the
//! presentation layer renders.

use std::sync::Arc;

use crate::collab::{ActorDirectory, ChatSink, RollProvider};
use crate::error::{Error, Result};
use crate::inventory::{self, Inventory, RestoreOutcome};
use crate::registry::{ChallengeRegistry, CreateChallengeParams};
use crate::resolver;
use crate::strings::{self, MessageKey};
use crate::sync::ChallengeSyncProtocol;
use crate::types::{Challenge, ChallengeId, DegreeOfSuccess, ItemId};

/// Why an attempt did not reach the dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptBlock {
    /// No intact toolkits and no replacement picks; no roll is spent.
    NoPicksAvailable,
    /// No toolkit selected.
    NoToolSelected,
    /// The roll collaborator yielded no result.
    RollCancelled,
}

/// Result of one attempt action.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// The challenge was already resolved: the local entry was removed and
    /// the view should close. Nothing is broadcast.
    Closed,
    /// The attempt was disallowed; no state changed.
    Blocked(AttemptBlock),
    /// A roll happened and the challenge was updated and broadcast.
    Rolled {
        degree: DegreeOfSuccess,
        resolved: bool,
        challenge: Challenge,
    },
}

/// GM adjustment to the success counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Increment,
    Decrement,
}

/// One entry of the toolkit dropdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOption {
    pub id: ItemId,
    pub name: String,
    pub quantity: u32,
    pub selected: bool,
}

/// Everything the presentation layer needs to render one challenge.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeView {
    pub actor_name: String,
    pub success_count: u32,
    pub required_attempts: u32,
    pub dc: i32,
    pub remaining_picks: u32,
    pub is_resolved: bool,
    pub can_attempt: bool,
    pub tool_options: Vec<ToolOption>,
}

pub struct ChallengeController {
    registry: Arc<ChallengeRegistry>,
    sync: Arc<ChallengeSyncProtocol>,
    inventory: Arc<dyn Inventory>,
    roll: Arc<dyn RollProvider>,
    chat: Arc<dyn ChatSink>,
    actors: Arc<dyn ActorDirectory>,
}

impl ChallengeController {
    pub fn new(
        registry: Arc<ChallengeRegistry>,
        sync: Arc<ChallengeSyncProtocol>,
        inventory: Arc<dyn Inventory>,
        roll: Arc<dyn RollProvider>,
        chat: Arc<dyn ChatSink>,
        actors: Arc<dyn ActorDirectory>,
    ) -> Self {
        Self {
            registry,
            sync,
            inventory,
            roll,
            chat,
            actors,
        }
    }

    /// Create a challenge and announce it to peers. GM only.
    pub async fn start_challenge(&self, params: CreateChallengeParams) -> Result<Challenge> {
        if !self.sync.identity().is_gm {
            return Err(Error::GmOnly("start a challenge"));
        }

        let challenge = self.registry.create(params).await?;
        self.sync.announce_open(&challenge);
        tracing::info!(challenge = %challenge.id, dc = challenge.dc, "challenge started");
        Ok(challenge)
    }

    /// Build the render model for one challenge.
    ///
    /// The first time a challenge is displayed with no toolkit selected, the
    /// first intact toolkit is selected and written back locally. A stale
    /// selection is tolerated; it simply matches no option.
    pub async fn view_model(&self, id: &ChallengeId) -> Result<ChallengeView> {
        let mut challenge = self
            .registry
            .get(id)
            .await
            .ok_or_else(|| Error::UnknownChallenge(id.clone()))?;

        let Some(actor) = self.actors.resolve(&challenge.actor_ref).await? else {
            tracing::warn!(challenge = %challenge.id, actor = %challenge.actor_ref, "actor not found");
            return Ok(ChallengeView {
                actor_name: strings::lookup(MessageKey::MissingActor).to_string(),
                success_count: challenge.success_count,
                required_attempts: challenge.required_attempts,
                dc: challenge.dc,
                remaining_picks: 0,
                is_resolved: challenge.is_resolved(),
                can_attempt: false,
                tool_options: Vec::new(),
            });
        };

        let items = self.inventory.list_equipment(&challenge.actor_ref).await?;
        let tools = inventory::classify(&items);

        if challenge.tool_selection.is_none() {
            if let Some(first) = tools.tools_intact.first() {
                challenge.tool_selection = Some(first.id.clone());
                self.registry.put(challenge.clone()).await;
            }
        }

        let is_resolved = challenge.is_resolved();
        let remaining_picks = tools.total_picks();

        let tool_options = tools
            .tools_intact
            .iter()
            .map(|item| ToolOption {
                id: item.id.clone(),
                name: item.name.clone(),
                quantity: item.quantity,
                selected: challenge.tool_selection.as_ref() == Some(&item.id),
            })
            .collect();

        Ok(ChallengeView {
            actor_name: actor.name,
            success_count: challenge.success_count,
            required_attempts: challenge.required_attempts,
            dc: challenge.dc,
            remaining_picks,
            is_resolved,
            can_attempt: remaining_picks > 0 && !is_resolved,
            tool_options,
        })
    }

    /// Change (or clear) the toolkit selection.
    pub async fn select_tool(
        &self,
        id: &ChallengeId,
        tool: Option<ItemId>,
    ) -> Result<Challenge> {
        let mut challenge = self
            .registry
            .get(id)
            .await
            .ok_or_else(|| Error::UnknownChallenge(id.clone()))?;

        challenge.tool_selection = tool;
        self.registry.put(challenge.clone()).await;
        self.sync.announce_update(&challenge);
        Ok(challenge)
    }

    /// Run one pick attempt.
    pub async fn attempt(&self, id: &ChallengeId) -> Result<AttemptOutcome> {
        // Refresh from the registry: a sync message may have overwritten the
        // snapshot since the view was last rendered.
        let mut challenge = self
            .registry
            .get(id)
            .await
            .ok_or_else(|| Error::UnknownChallenge(id.clone()))?;

        if challenge.is_resolved() {
            // Terminal and local-only: remove the entry, no broadcast.
            self.registry.remove(id).await;
            tracing::debug!(challenge = %id, "resolved challenge closed locally");
            return Ok(AttemptOutcome::Closed);
        }

        let actor = self
            .actors
            .resolve(&challenge.actor_ref)
            .await?
            .ok_or_else(|| Error::MissingActor(challenge.actor_ref.clone()))?;

        let items = self.inventory.list_equipment(&challenge.actor_ref).await?;
        let tools = inventory::classify(&items);
        if tools.total_picks() == 0 {
            tracing::debug!(challenge = %id, "no picks available, attempt disallowed");
            return Ok(AttemptOutcome::Blocked(AttemptBlock::NoPicksAvailable));
        }

        let Some(selected_tool) = challenge.tool_selection.clone() else {
            tracing::debug!(challenge = %id, "no toolkit selected, attempt aborted");
            return Ok(AttemptOutcome::Blocked(AttemptBlock::NoToolSelected));
        };

        let Some(outcome) = self.roll.roll_check(&challenge.actor_ref, challenge.dc).await? else {
            tracing::debug!(challenge = %id, "roll cancelled, attempt aborted");
            return Ok(AttemptOutcome::Blocked(AttemptBlock::RollCancelled));
        };

        let degree = resolver::resolve(outcome.total, challenge.dc, outcome.natural_die);

        match degree {
            DegreeOfSuccess::CriticalSuccess => challenge.success_count += 2,
            DegreeOfSuccess::Success => challenge.success_count += 1,
            DegreeOfSuccess::Failure | DegreeOfSuccess::CriticalFailure => {}
        }
        challenge.clamp_success_count();

        if degree == DegreeOfSuccess::CriticalFailure {
            // Inventory calls are each their own unit: a partial application
            // here does not undo the attempt.
            if let Err(e) = inventory::consume_on_critical_failure(
                self.inventory.as_ref(),
                &challenge.actor_ref,
                Some(&selected_tool),
            )
            .await
            {
                tracing::warn!(challenge = %id, "pick consumption failed: {}", e);
            }
        }

        // Commit locally before telling anyone else about it.
        self.registry.put(challenge.clone()).await;
        self.sync.announce_update(&challenge);

        let resolved = challenge.is_resolved();
        self.post_chat(&challenge, &strings::attempt_message(&actor.name, degree))
            .await;
        if resolved {
            self.post_chat(&challenge, &strings::lock_picked_message(&actor.name))
                .await;
        }

        tracing::info!(
            challenge = %id,
            total = outcome.total,
            ?degree,
            success_count = challenge.success_count,
            "attempt resolved"
        );

        Ok(AttemptOutcome::Rolled {
            degree,
            resolved,
            challenge,
        })
    }

    /// Directly bump the success counter up or down. GM only.
    pub async fn adjust_success(
        &self,
        id: &ChallengeId,
        adjustment: Adjustment,
    ) -> Result<Challenge> {
        if !self.sync.identity().is_gm {
            return Err(Error::GmOnly("adjust the success count"));
        }

        let mut challenge = self
            .registry
            .get(id)
            .await
            .ok_or_else(|| Error::UnknownChallenge(id.clone()))?;

        match adjustment {
            Adjustment::Increment => {
                challenge.success_count =
                    (challenge.success_count + 1).min(challenge.required_attempts);
            }
            Adjustment::Decrement => {
                challenge.success_count = challenge.success_count.saturating_sub(1);
            }
        }

        self.registry.put(challenge.clone()).await;
        self.sync.announce_update(&challenge);
        Ok(challenge)
    }

    /// Best-effort undo of a consumed pick. GM only.
    pub async fn restore_pick(&self, id: &ChallengeId) -> Result<RestoreOutcome> {
        if !self.sync.identity().is_gm {
            return Err(Error::GmOnly("restore a pick"));
        }

        let challenge = self
            .registry
            .get(id)
            .await
            .ok_or_else(|| Error::UnknownChallenge(id.clone()))?;

        let outcome = inventory::restore_one(self.inventory.as_ref(), &challenge.actor_ref).await?;

        // The snapshot itself did not change, but peers re-derive pick counts
        // from it on re-render.
        self.registry.put(challenge.clone()).await;
        self.sync.announce_update(&challenge);
        Ok(outcome)
    }

    /// Drop the challenge from the local registry. Local-only: remote
    /// replicas are never told and may persist indefinitely.
    pub async fn end_challenge(&self, id: &ChallengeId) -> Option<Challenge> {
        self.registry.remove(id).await
    }

    async fn post_chat(&self, challenge: &Challenge, message: &str) {
        if let Err(e) = self.chat.post(&challenge.actor_ref, message).await {
            tracing::warn!(challenge = %challenge.id, "chat post failed: {}", e);
        }
    }
}
