//! Resolution pipeline: parses a RON content document, resolves string
//! references, and builds a frozen registry.
//!
//! Entities register in document order, so template IDs are stable for a
//! given content file. Unlock rules are resolved last, once every
//! referenced entity exists.

use crate::schema::ContentFile;
use aerodrome_core::registry::{
    BuildingDef, EntityRef, Registry, RegistryBuilder, RegistryError, StaffDef, UpgradeDef,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while loading a content document.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The document is not valid RON for the content schema.
    #[error("content parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// The parsed content failed registry validation.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// An unlock rule names an entity the document never defines.
    #[error("unlock rule at level {level} references unknown {kind} '{id}'")]
    UnresolvedRef {
        level: u32,
        kind: &'static str,
        id: String,
    },
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse a RON content document and build the registry it describes.
pub fn load_content(raw: &str) -> Result<Registry, DataLoadError> {
    let content: ContentFile = ron::from_str(raw)?;
    let mut builder = RegistryBuilder::new();

    for data in &content.buildings {
        builder.register_building(BuildingDef {
            id: data.id.clone(),
            name: data.name.clone(),
            description: data.description.clone(),
            base_cost: data.base_cost,
            cost_scaling: data.cost_scaling,
            money_per_tick: data.money_per_tick,
            passengers_per_tick: data.passengers_per_tick,
            click_boost: data.click_boost,
            boost_efficiency: data.boost_efficiency,
            start_unlocked: data.unlocked,
            max_owned: data.max_owned,
        });
    }
    for data in &content.staff {
        builder.register_staff(StaffDef {
            id: data.id.clone(),
            name: data.name.clone(),
            description: data.description.clone(),
            base_cost: data.base_cost,
            cost_scaling: data.cost_scaling,
            click_bonus: data.click_bonus,
            passive_bonus: data.passive_bonus,
            start_unlocked: data.unlocked,
        });
    }
    for data in &content.upgrades {
        builder.register_upgrade(UpgradeDef {
            id: data.id.clone(),
            name: data.name.clone(),
            description: data.description.clone(),
            cost: data.cost,
            effect: data.effect,
            start_unlocked: data.unlocked,
        });
    }

    for rule in &content.unlocks {
        let mut entities = Vec::new();
        for id in &rule.buildings {
            let type_id =
                builder
                    .building_id(id)
                    .ok_or_else(|| DataLoadError::UnresolvedRef {
                        level: rule.level,
                        kind: "building",
                        id: id.clone(),
                    })?;
            entities.push(EntityRef::Building(type_id));
        }
        for id in &rule.staff {
            let type_id = builder
                .staff_id(id)
                .ok_or_else(|| DataLoadError::UnresolvedRef {
                    level: rule.level,
                    kind: "staff",
                    id: id.clone(),
                })?;
            entities.push(EntityRef::Staff(type_id));
        }
        for id in &rule.upgrades {
            let upgrade_id =
                builder
                    .upgrade_id(id)
                    .ok_or_else(|| DataLoadError::UnresolvedRef {
                        level: rule.level,
                        kind: "upgrade",
                        id: id.clone(),
                    })?;
            entities.push(EntityRef::Upgrade(upgrade_id));
        }
        builder.register_unlock(rule.level, entities);
    }

    Ok(builder.build()?)
}
