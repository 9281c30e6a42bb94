//! In-process collaborator implementations backed by shared memory.
//!
//! These stand in for the external document store, dice subsystem, and chat
//! log in the demo binary and the test suites. A real embedding wires the
//! traits to its own backends instead.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::collab::{ActorDirectory, ActorInfo, ChatSink, CheckOutcome, RollProvider};
use crate::error::{Error, Result};
use crate::inventory::{Inventory, Item, ItemPatch};
use crate::types::{ActorRef, ItemId};

/// Inventory store shared by all clients, keyed by actor.
#[derive(Default)]
pub struct MemoryInventory {
    items: RwLock<HashMap<ActorRef, Vec<Item>>>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, actor: impl Into<ActorRef>, items: Vec<Item>) {
        self.items.write().await.insert(actor.into(), items);
    }

    pub async fn items_of(&self, actor: &str) -> Vec<Item> {
        self.items.read().await.get(actor).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Inventory for MemoryInventory {
    async fn list_equipment(&self, actor: &ActorRef) -> Result<Vec<Item>> {
        Ok(self.items_of(actor).await)
    }

    async fn update_quantity(&self, actor: &ActorRef, item: &ItemId, quantity: u32) -> Result<()> {
        let mut store = self.items.write().await;
        let items = store
            .get_mut(actor)
            .ok_or_else(|| Error::Inventory(format!("no inventory for actor {}", actor)))?;
        let entry = items
            .iter_mut()
            .find(|i| &i.id == item)
            .ok_or_else(|| Error::Inventory(format!("item {} not found", item)))?;
        entry.quantity = quantity;
        Ok(())
    }

    async fn rename(&self, actor: &ActorRef, item: &ItemId, new_name: &str) -> Result<()> {
        let mut store = self.items.write().await;
        let items = store
            .get_mut(actor)
            .ok_or_else(|| Error::Inventory(format!("no inventory for actor {}", actor)))?;
        let entry = items
            .iter_mut()
            .find(|i| &i.id == item)
            .ok_or_else(|| Error::Inventory(format!("item {} not found", item)))?;
        entry.name = new_name.to_string();
        Ok(())
    }

    async fn delete(&self, actor: &ActorRef, item: &ItemId) -> Result<()> {
        let mut store = self.items.write().await;
        let items = store
            .get_mut(actor)
            .ok_or_else(|| Error::Inventory(format!("no inventory for actor {}", actor)))?;
        let before = items.len();
        items.retain(|i| &i.id != item);
        if items.len() == before {
            return Err(Error::Inventory(format!("item {} not found", item)));
        }
        Ok(())
    }

    async fn create_from_template(
        &self,
        actor: &ActorRef,
        source: &ItemId,
        patch: ItemPatch,
    ) -> Result<Item> {
        let mut store = self.items.write().await;
        let items = store
            .get_mut(actor)
            .ok_or_else(|| Error::Inventory(format!("no inventory for actor {}", actor)))?;
        let template = items
            .iter()
            .find(|i| &i.id == source)
            .ok_or_else(|| Error::Inventory(format!("item {} not found", source)))?;

        let mut created = template.clone();
        created.id = ulid::Ulid::new().to_string();
        if let Some(name) = patch.name {
            created.name = name;
        }
        if let Some(quantity) = patch.quantity {
            created.quantity = quantity;
        }

        items.push(created.clone());
        Ok(created)
    }
}

/// Actor directory over a fixed set of known actors.
#[derive(Default)]
pub struct StaticActors {
    actors: HashMap<ActorRef, ActorInfo>,
}

impl StaticActors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actor(mut self, actor: impl Into<ActorRef>, name: impl Into<String>) -> Self {
        self.actors
            .insert(actor.into(), ActorInfo { name: name.into() });
        self
    }
}

#[async_trait]
impl ActorDirectory for StaticActors {
    async fn resolve(&self, actor: &ActorRef) -> Result<Option<ActorInfo>> {
        Ok(self.actors.get(actor).cloned())
    }
}

/// Chat sink that records every posted line.
#[derive(Default)]
pub struct RecordingChat {
    posts: Mutex<Vec<(ActorRef, String)>>,
}

impl RecordingChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posts(&self) -> Vec<(ActorRef, String)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatSink for RecordingChat {
    async fn post(&self, actor: &ActorRef, message: &str) -> Result<()> {
        tracing::info!(%actor, "chat: {}", message);
        self.posts
            .lock()
            .unwrap()
            .push((actor.clone(), message.to_string()));
        Ok(())
    }
}

/// Roll provider that replays a queued script of outcomes.
///
/// `None` entries model a cancelled roll. An exhausted script also yields
/// `None`.
#[derive(Default)]
pub struct ScriptedRoller {
    outcomes: Mutex<VecDeque<Option<CheckOutcome>>>,
}

impl ScriptedRoller {
    pub fn new(outcomes: impl IntoIterator<Item = Option<CheckOutcome>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
        }
    }

    pub fn push(&self, outcome: Option<CheckOutcome>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }
}

#[async_trait]
impl RollProvider for ScriptedRoller {
    async fn roll_check(&self, _actor: &ActorRef, _dc: i32) -> Result<Option<CheckOutcome>> {
        Ok(self.outcomes.lock().unwrap().pop_front().flatten())
    }
}
