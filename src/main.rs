//! Demo: two clients (a GM and a player) sharing one challenge over an
//! in-process loopback transport.
//!
//! The GM starts a lock-pick challenge for the player's character; the
//! player rolls attempts until the lock opens or the tools run out. Every
//! mutation is broadcast as a full snapshot and applied by the peer.

use std::sync::Arc;

use tokio::sync::broadcast::error::TryRecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lockpick::controller::{AttemptOutcome, ChallengeController};
use lockpick::inventory::Item;
use lockpick::memory::{MemoryInventory, RecordingChat, StaticActors};
use lockpick::protocol::SyncMessage;
use lockpick::registry::{ChallengeRegistry, CreateChallengeParams};
use lockpick::roll::D20Roller;
use lockpick::sync::{ChallengeSyncProtocol, SyncEffect};
use lockpick::transport::LoopbackTransport;
use lockpick::types::ClientIdentity;

struct Client {
    label: &'static str,
    controller: ChallengeController,
    sync: Arc<ChallengeSyncProtocol>,
    rx: tokio::sync::broadcast::Receiver<SyncMessage>,
}

impl Client {
    fn new(
        label: &'static str,
        identity: ClientIdentity,
        transport: &Arc<LoopbackTransport>,
        inventory: &Arc<MemoryInventory>,
        actors: &Arc<StaticActors>,
    ) -> Self {
        let registry = Arc::new(ChallengeRegistry::new());
        let sync = Arc::new(ChallengeSyncProtocol::new(
            identity,
            registry.clone(),
            transport.clone() as Arc<dyn lockpick::transport::BroadcastTransport>,
        ));
        let controller = ChallengeController::new(
            registry,
            sync.clone(),
            inventory.clone(),
            Arc::new(D20Roller::new(8)),
            Arc::new(RecordingChat::new()),
            actors.clone(),
        );

        Self {
            label,
            controller,
            sync,
            rx: transport.subscribe(),
        }
    }

    /// Apply everything waiting on the wire.
    async fn pump(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(message) => match self.sync.handle_message(message).await {
                    SyncEffect::OpenView(challenge) => {
                        tracing::info!("[{}] opened challenge {}", self.label, challenge.id);
                    }
                    SyncEffect::RefreshViews(challenge) => {
                        tracing::debug!(
                            "[{}] refreshed challenge {} (successes {}/{})",
                            self.label,
                            challenge.id,
                            challenge.success_count,
                            challenge.required_attempts
                        );
                    }
                    SyncEffect::Ignored => {}
                },
                Err(TryRecvError::Empty) => break,
                Err(e) => {
                    tracing::warn!("[{}] receive error: {}", self.label, e);
                    break;
                }
            }
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lockpick=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let actor = "Actor.merisiel".to_string();

    // The inventory store is shared: it models the external document store
    // every client reads and writes.
    let inventory = Arc::new(MemoryInventory::new());
    inventory
        .seed(
            actor.clone(),
            vec![
                Item {
                    id: "toolkit-1".to_string(),
                    name: "Thieves' Toolkit".to_string(),
                    quantity: 1,
                    slug: "thieves-toolkit".to_string(),
                },
                Item {
                    id: "picks-1".to_string(),
                    name: "Replacement Picks".to_string(),
                    quantity: 2,
                    slug: "replacement-picks".to_string(),
                },
            ],
        )
        .await;

    let actors = Arc::new(StaticActors::new().with_actor(actor.clone(), "Merisiel"));
    let transport = Arc::new(LoopbackTransport::new(64));

    let mut gm = Client::new(
        "gm",
        ClientIdentity::gm("gm-user"),
        &transport,
        &inventory,
        &actors,
    );
    let mut player = Client::new(
        "player",
        ClientIdentity::player("ida"),
        &transport,
        &inventory,
        &actors,
    );

    let challenge = gm
        .controller
        .start_challenge(CreateChallengeParams {
            actor_ref: actor.clone(),
            dc: 20,
            required_attempts: 3,
            gm_id: "gm-user".to_string(),
            player_id: Some("ida".to_string()),
        })
        .await
        .expect("failed to start challenge");

    tracing::info!(
        "GM started challenge {} (DC {}, {} successes required)",
        challenge.id,
        challenge.dc,
        challenge.required_attempts
    );

    player.pump().await;

    // First display auto-selects a toolkit.
    let view = player
        .controller
        .view_model(&challenge.id)
        .await
        .expect("player has no replica");
    tracing::info!(
        "[player] {} picks the lock with {} picks remaining",
        view.actor_name,
        view.remaining_picks
    );

    for round in 1..=50 {
        match player.controller.attempt(&challenge.id).await {
            Ok(AttemptOutcome::Rolled {
                degree,
                resolved,
                challenge: snapshot,
            }) => {
                tracing::info!(
                    "[player] attempt {}: {:?} ({}/{})",
                    round,
                    degree,
                    snapshot.success_count,
                    snapshot.required_attempts
                );
                gm.pump().await;
                player.pump().await;
                if resolved {
                    break;
                }
            }
            Ok(AttemptOutcome::Blocked(reason)) => {
                tracing::warn!("[player] attempt blocked: {:?}", reason);
                break;
            }
            Ok(AttemptOutcome::Closed) => break,
            Err(e) => {
                tracing::error!("[player] attempt failed: {}", e);
                break;
            }
        }
    }

    // Acting on a resolved challenge closes the player's local copy; the
    // GM's replica is never purged remotely.
    if let Ok(AttemptOutcome::Closed) = player.controller.attempt(&challenge.id).await {
        tracing::info!("[player] challenge resolved and closed locally");
    }

    let gm_view = gm
        .controller
        .view_model(&challenge.id)
        .await
        .expect("gm replica vanished");
    tracing::info!(
        "[gm] final replica: {}/{} successes, {} picks left",
        gm_view.success_count,
        gm_view.required_attempts,
        gm_view.remaining_picks
    );
}
