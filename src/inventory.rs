//! Tool/pick inventory: collaborator seam, classification, and the
//! consumption policy applied on a critical failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{ActorRef, ItemId};

/// Name suffix marking a toolkit as broken.
pub const BROKEN_SUFFIX: &str = " (broken)";

/// Equipment slugs recognized as thieves' toolkits.
pub const TOOL_SLUGS: &[&str] = &[
    "thieves-toolkit",
    "thieves-tools",
    "thieves-tools-infiltrator",
];

/// Equipment slugs recognized as replacement picks.
pub const REPLACEMENT_SLUGS: &[&str] = &["thieves-toolkit-replacement-picks", "replacement-picks"];

/// One equipment record in an actor's inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub quantity: u32,
    /// Category tag identifying what kind of equipment this is.
    pub slug: String,
}

impl Item {
    pub fn is_broken(&self) -> bool {
        self.name.contains(BROKEN_SUFFIX)
    }
}

/// Field overrides for `create_from_template`.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub quantity: Option<u32>,
}

/// Access to an actor's equipment records in the external document store.
///
/// Each call is its own unit of work; the consumption policy deliberately
/// does not treat sequences of calls as a transaction.
#[async_trait]
pub trait Inventory: Send + Sync {
    /// List the actor's equipment items.
    async fn list_equipment(&self, actor: &ActorRef) -> Result<Vec<Item>>;

    async fn update_quantity(&self, actor: &ActorRef, item: &ItemId, quantity: u32) -> Result<()>;

    async fn rename(&self, actor: &ActorRef, item: &ItemId, new_name: &str) -> Result<()>;

    async fn delete(&self, actor: &ActorRef, item: &ItemId) -> Result<()>;

    /// Create a new item as a copy of `source` with the patch applied.
    async fn create_from_template(
        &self,
        actor: &ActorRef,
        source: &ItemId,
        patch: ItemPatch,
    ) -> Result<Item>;
}

/// An actor's lock-picking equipment, split by category and condition.
#[derive(Debug, Clone, Default)]
pub struct ToolClassification {
    pub tools_intact: Vec<Item>,
    pub tools_broken: Vec<Item>,
    pub replacements: Vec<Item>,
}

impl ToolClassification {
    pub fn intact_tool_count(&self) -> u32 {
        self.tools_intact.iter().map(|i| i.quantity).sum()
    }

    pub fn replacement_count(&self) -> u32 {
        self.replacements.iter().map(|i| i.quantity).sum()
    }

    /// Usable attempts left: intact toolkits plus replacement picks.
    pub fn total_picks(&self) -> u32 {
        self.intact_tool_count() + self.replacement_count()
    }
}

/// Sort equipment into toolkits (broken/intact) and replacement picks.
pub fn classify(items: &[Item]) -> ToolClassification {
    let mut out = ToolClassification::default();

    for item in items {
        if TOOL_SLUGS.contains(&item.slug.as_str()) {
            if item.is_broken() {
                out.tools_broken.push(item.clone());
            } else {
                out.tools_intact.push(item.clone());
            }
        } else if REPLACEMENT_SLUGS.contains(&item.slug.as_str()) {
            out.replacements.push(item.clone());
        }
    }

    out
}

/// Append the broken marker to a name, without double-marking.
fn broken_name(name: &str) -> String {
    if name.contains(BROKEN_SUFFIX) {
        name.to_string()
    } else {
        format!("{}{}", name, BROKEN_SUFFIX)
    }
}

/// Strip the broken marker from a name.
fn repaired_name(name: &str) -> String {
    name.replacen(BROKEN_SUFFIX, "", 1)
}

/// What `consume_on_critical_failure` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// One unit was taken from a replacement-pick stack.
    ReplacementSpent,
    /// The selected toolkit was marked broken (or split off a broken copy).
    ToolBroken,
    /// Nothing could be consumed; inventory untouched.
    NoOp,
}

/// What `restore_one` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A broken toolkit had its marker stripped.
    ToolRepaired,
    /// A replacement-pick stack gained one unit.
    ReplacementRefunded,
    /// Nothing to restore; inventory untouched.
    NoOp,
}

/// Consume exactly one pick's worth of resources after a critical failure.
///
/// Replacement picks are spent before toolkits: the cheapest fungible
/// resource goes first. When a toolkit must break, a stack is split so only
/// one unit is lost; a lone toolkit is renamed in place.
pub async fn consume_on_critical_failure(
    inventory: &dyn Inventory,
    actor: &ActorRef,
    selected_tool: Option<&ItemId>,
) -> Result<ConsumeOutcome> {
    let items = inventory.list_equipment(actor).await?;
    let tools = classify(&items);

    if let Some(replacement) = tools.replacements.iter().find(|i| i.quantity > 0) {
        if replacement.quantity > 1 {
            inventory
                .update_quantity(actor, &replacement.id, replacement.quantity - 1)
                .await?;
        } else {
            inventory.delete(actor, &replacement.id).await?;
        }
        tracing::debug!(item = %replacement.id, "consumed one replacement pick");
        return Ok(ConsumeOutcome::ReplacementSpent);
    }

    let Some(selected_id) = selected_tool else {
        tracing::warn!("critical failure with no toolkit selected; nothing consumed");
        return Ok(ConsumeOutcome::NoOp);
    };

    let Some(toolkit) = items.iter().find(|i| &i.id == selected_id) else {
        tracing::warn!(item = %selected_id, "selected toolkit not found on actor");
        return Ok(ConsumeOutcome::NoOp);
    };

    if toolkit.quantity > 1 {
        // Split the stack: one unit becomes a separate broken toolkit.
        inventory
            .update_quantity(actor, &toolkit.id, toolkit.quantity - 1)
            .await?;
        inventory
            .create_from_template(
                actor,
                &toolkit.id,
                ItemPatch {
                    name: Some(broken_name(&toolkit.name)),
                    quantity: Some(1),
                },
            )
            .await?;
        tracing::debug!(item = %toolkit.id, "split one broken toolkit off the stack");
    } else {
        inventory
            .rename(actor, &toolkit.id, &broken_name(&toolkit.name))
            .await?;
        tracing::debug!(item = %toolkit.id, "marked toolkit as broken");
    }

    Ok(ConsumeOutcome::ToolBroken)
}

/// Best-effort undo of a consumed pick (GM action).
///
/// Repairs the first broken toolkit if one exists; otherwise refunds one
/// replacement pick onto an existing stack.
pub async fn restore_one(inventory: &dyn Inventory, actor: &ActorRef) -> Result<RestoreOutcome> {
    let items = inventory.list_equipment(actor).await?;
    let tools = classify(&items);

    if let Some(broken) = tools.tools_broken.first() {
        inventory
            .rename(actor, &broken.id, &repaired_name(&broken.name))
            .await?;
        tracing::debug!(item = %broken.id, "repaired broken toolkit");
        return Ok(RestoreOutcome::ToolRepaired);
    }

    if let Some(replacement) = tools.replacements.first() {
        inventory
            .update_quantity(actor, &replacement.id, replacement.quantity + 1)
            .await?;
        tracing::debug!(item = %replacement.id, "refunded one replacement pick");
        return Ok(RestoreOutcome::ReplacementRefunded);
    }

    tracing::debug!("nothing to restore");
    Ok(RestoreOutcome::NoOp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryInventory;

    fn toolkit(id: &str, name: &str, quantity: u32) -> Item {
        Item {
            id: id.to_string(),
            name: name.to_string(),
            quantity,
            slug: "thieves-toolkit".to_string(),
        }
    }

    fn picks(id: &str, quantity: u32) -> Item {
        Item {
            id: id.to_string(),
            name: "Replacement Picks".to_string(),
            quantity,
            slug: "replacement-picks".to_string(),
        }
    }

    fn total_picks(items: &[Item]) -> u32 {
        classify(items).total_picks()
    }

    #[test]
    fn test_classify_splits_broken_and_intact() {
        let items = vec![
            toolkit("a", "Thieves' Toolkit", 2),
            toolkit("b", "Thieves' Toolkit (broken)", 1),
            picks("c", 3),
            Item {
                id: "d".to_string(),
                name: "Rope".to_string(),
                quantity: 1,
                slug: "rope".to_string(),
            },
        ];

        let tools = classify(&items);
        assert_eq!(tools.tools_intact.len(), 1);
        assert_eq!(tools.tools_broken.len(), 1);
        assert_eq!(tools.replacements.len(), 1);
        assert_eq!(tools.intact_tool_count(), 2);
        assert_eq!(tools.replacement_count(), 3);
        assert_eq!(tools.total_picks(), 5);
    }

    #[tokio::test]
    async fn test_consume_prefers_replacement_picks() {
        let inventory = MemoryInventory::new();
        inventory
            .seed("actor-1", vec![toolkit("kit", "Thieves' Toolkit", 1), picks("p", 2)])
            .await;

        let selected = "kit".to_string();
        let outcome = consume_on_critical_failure(&inventory, &"actor-1".to_string(), Some(&selected))
            .await
            .unwrap();

        assert_eq!(outcome, ConsumeOutcome::ReplacementSpent);
        let items = inventory.items_of("actor-1").await;
        assert_eq!(items.iter().find(|i| i.id == "p").unwrap().quantity, 1);
        // The toolkit is untouched
        assert_eq!(items.iter().find(|i| i.id == "kit").unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn test_consume_deletes_emptied_replacement_stack() {
        let inventory = MemoryInventory::new();
        inventory
            .seed("actor-1", vec![picks("p", 1)])
            .await;

        let outcome = consume_on_critical_failure(&inventory, &"actor-1".to_string(), None)
            .await
            .unwrap();

        assert_eq!(outcome, ConsumeOutcome::ReplacementSpent);
        assert!(inventory.items_of("actor-1").await.is_empty());
    }

    #[tokio::test]
    async fn test_consume_splits_stacked_toolkit() {
        let inventory = MemoryInventory::new();
        inventory
            .seed("actor-1", vec![toolkit("kit", "Thieves' Toolkit", 3)])
            .await;

        let selected = "kit".to_string();
        let outcome = consume_on_critical_failure(&inventory, &"actor-1".to_string(), Some(&selected))
            .await
            .unwrap();

        assert_eq!(outcome, ConsumeOutcome::ToolBroken);
        let items = inventory.items_of("actor-1").await;
        assert_eq!(items.len(), 2);
        assert_eq!(items.iter().find(|i| i.id == "kit").unwrap().quantity, 2);

        let broken = items.iter().find(|i| i.id != "kit").unwrap();
        assert_eq!(broken.name, "Thieves' Toolkit (broken)");
        assert_eq!(broken.quantity, 1);
        assert_eq!(broken.slug, "thieves-toolkit");
    }

    #[tokio::test]
    async fn test_consume_renames_lone_toolkit_in_place() {
        let inventory = MemoryInventory::new();
        inventory
            .seed("actor-1", vec![toolkit("kit", "Thieves' Toolkit", 1)])
            .await;

        let selected = "kit".to_string();
        let outcome = consume_on_critical_failure(&inventory, &"actor-1".to_string(), Some(&selected))
            .await
            .unwrap();

        assert_eq!(outcome, ConsumeOutcome::ToolBroken);
        let items = inventory.items_of("actor-1").await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Thieves' Toolkit (broken)");
    }

    #[tokio::test]
    async fn test_consume_does_not_double_mark_broken() {
        let inventory = MemoryInventory::new();
        inventory
            .seed(
                "actor-1",
                vec![toolkit("kit", "Thieves' Toolkit (broken)", 1)],
            )
            .await;

        let selected = "kit".to_string();
        consume_on_critical_failure(&inventory, &"actor-1".to_string(), Some(&selected))
            .await
            .unwrap();

        let items = inventory.items_of("actor-1").await;
        assert_eq!(items[0].name, "Thieves' Toolkit (broken)");
    }

    #[tokio::test]
    async fn test_consume_without_selection_is_noop() {
        let inventory = MemoryInventory::new();
        inventory
            .seed("actor-1", vec![toolkit("kit", "Thieves' Toolkit", 1)])
            .await;

        let outcome = consume_on_critical_failure(&inventory, &"actor-1".to_string(), None)
            .await
            .unwrap();

        assert_eq!(outcome, ConsumeOutcome::NoOp);
        assert_eq!(inventory.items_of("actor-1").await[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_consume_with_unresolvable_selection_is_noop() {
        let inventory = MemoryInventory::new();
        inventory
            .seed("actor-1", vec![toolkit("kit", "Thieves' Toolkit", 1)])
            .await;

        let selected = "gone".to_string();
        let outcome = consume_on_critical_failure(&inventory, &"actor-1".to_string(), Some(&selected))
            .await
            .unwrap();

        assert_eq!(outcome, ConsumeOutcome::NoOp);
    }

    #[tokio::test]
    async fn test_consume_removes_at_most_one_pick() {
        let seeds: Vec<Vec<Item>> = vec![
            vec![toolkit("kit", "Thieves' Toolkit", 1), picks("p", 3)],
            vec![toolkit("kit", "Thieves' Toolkit", 4)],
            vec![toolkit("kit", "Thieves' Toolkit", 1)],
            vec![picks("p", 1)],
        ];

        for seed in seeds {
            let inventory = MemoryInventory::new();
            inventory.seed("actor-1", seed.clone()).await;
            let before = total_picks(&inventory.items_of("actor-1").await);

            let selected = "kit".to_string();
            consume_on_critical_failure(&inventory, &"actor-1".to_string(), Some(&selected))
                .await
                .unwrap();

            let after = total_picks(&inventory.items_of("actor-1").await);
            assert_eq!(before - after, 1, "seed: {:?}", seed);
        }
    }

    #[tokio::test]
    async fn test_restore_repairs_broken_toolkit_first() {
        let inventory = MemoryInventory::new();
        inventory
            .seed(
                "actor-1",
                vec![
                    toolkit("kit", "Thieves' Toolkit (broken)", 1),
                    picks("p", 1),
                ],
            )
            .await;

        let outcome = restore_one(&inventory, &"actor-1".to_string()).await.unwrap();

        assert_eq!(outcome, RestoreOutcome::ToolRepaired);
        let items = inventory.items_of("actor-1").await;
        assert_eq!(
            items.iter().find(|i| i.id == "kit").unwrap().name,
            "Thieves' Toolkit"
        );
        assert_eq!(items.iter().find(|i| i.id == "p").unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn test_restore_refunds_replacement_when_no_broken_tool() {
        let inventory = MemoryInventory::new();
        inventory.seed("actor-1", vec![picks("p", 2)]).await;

        let outcome = restore_one(&inventory, &"actor-1".to_string()).await.unwrap();

        assert_eq!(outcome, RestoreOutcome::ReplacementRefunded);
        assert_eq!(inventory.items_of("actor-1").await[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_restore_with_nothing_to_restore_is_noop() {
        let inventory = MemoryInventory::new();
        inventory
            .seed("actor-1", vec![toolkit("kit", "Thieves' Toolkit", 1)])
            .await;

        let outcome = restore_one(&inventory, &"actor-1".to_string()).await.unwrap();
        assert_eq!(outcome, RestoreOutcome::NoOp);
    }
}
