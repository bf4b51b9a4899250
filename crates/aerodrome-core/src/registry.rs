//! Immutable content registry: building, staff, and upgrade templates plus
//! the level-gated unlock schedule.
//!
//! Two-phase lifecycle: register everything on a [`RegistryBuilder`], then
//! [`RegistryBuilder::build`] validates and freezes the result. The
//! [`Registry`] has no `&mut self` methods; owned progress lives in
//! [`crate::state::EconomyState`], never here.

use crate::id::{BuildingTypeId, StaffTypeId, UpgradeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Template definitions
// ---------------------------------------------------------------------------

/// A building template definition.
#[derive(Debug, Clone)]
pub struct BuildingDef {
    /// Unique string key, e.g. `"runway"`. Also the persistence merge key.
    pub id: String,
    pub name: String,
    pub description: String,
    pub base_cost: f64,
    /// Overrides the category default scaling factor when set.
    pub cost_scaling: Option<f64>,
    /// Flat passive money production per owned unit per tick.
    pub money_per_tick: f64,
    /// Flat passive passenger arrival per owned unit per tick.
    pub passengers_per_tick: f64,
    /// Additive boost to click yield per owned unit, as a fraction of the
    /// base click value.
    pub click_boost: f64,
    /// Per-unit multiplier applied to *other* buildings' click boosts.
    pub boost_efficiency: f64,
    /// Whether the building is purchasable before any level unlock.
    pub start_unlocked: bool,
    /// Hard cap on owned count, if any.
    pub max_owned: Option<u32>,
}

/// A staff role definition.
#[derive(Debug, Clone)]
pub struct StaffDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub base_cost: f64,
    /// Overrides the category default scaling factor when set.
    pub cost_scaling: Option<f64>,
    /// Per-unit multiplicative bonus to click yield, combined as
    /// `(1 + bonus)^owned`.
    pub click_bonus: f64,
    /// Per-unit multiplicative bonus to passive income, same form.
    pub passive_bonus: f64,
    pub start_unlocked: bool,
}

/// The one-time effect of an upgrade, interpreted by the engine rather than
/// embedded as behavior. Effects accumulate additively on the matching
/// global multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpgradeEffect {
    /// Adds to the global click multiplier.
    ClickMultiplierBonus(f64),
    /// Adds to the global passive-income multiplier.
    PassiveMultiplierBonus(f64),
}

/// A one-time upgrade definition. Upgrades have a flat cost.
#[derive(Debug, Clone)]
pub struct UpgradeDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cost: f64,
    pub effect: UpgradeEffect,
    pub start_unlocked: bool,
}

// ---------------------------------------------------------------------------
// Unlock schedule
// ---------------------------------------------------------------------------

/// A reference to any purchasable entity, used by unlock rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Building(BuildingTypeId),
    Staff(StaffTypeId),
    Upgrade(UpgradeId),
}

/// Entities that become unlocked once the airport reaches `level`.
#[derive(Debug, Clone)]
pub struct UnlockRule {
    pub level: u32,
    pub entities: Vec<EntityRef>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for constructing an immutable [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    buildings: Vec<BuildingDef>,
    staff: Vec<StaffDef>,
    upgrades: Vec<UpgradeDef>,
    unlocks: Vec<UnlockRule>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a building template. Returns its ID.
    pub fn register_building(&mut self, def: BuildingDef) -> BuildingTypeId {
        let id = BuildingTypeId(self.buildings.len() as u32);
        self.buildings.push(def);
        id
    }

    /// Register a staff role. Returns its ID.
    pub fn register_staff(&mut self, def: StaffDef) -> StaffTypeId {
        let id = StaffTypeId(self.staff.len() as u32);
        self.staff.push(def);
        id
    }

    /// Register an upgrade. Returns its ID.
    pub fn register_upgrade(&mut self, def: UpgradeDef) -> UpgradeId {
        let id = UpgradeId(self.upgrades.len() as u32);
        self.upgrades.push(def);
        id
    }

    /// Register an unlock rule: `entities` become unlocked at `level`.
    pub fn register_unlock(&mut self, level: u32, entities: Vec<EntityRef>) {
        self.unlocks.push(UnlockRule { level, entities });
    }

    /// Lookup a registered building ID by string key.
    pub fn building_id(&self, id: &str) -> Option<BuildingTypeId> {
        self.buildings
            .iter()
            .position(|d| d.id == id)
            .map(|i| BuildingTypeId(i as u32))
    }

    /// Lookup a registered staff ID by string key.
    pub fn staff_id(&self, id: &str) -> Option<StaffTypeId> {
        self.staff
            .iter()
            .position(|d| d.id == id)
            .map(|i| StaffTypeId(i as u32))
    }

    /// Lookup a registered upgrade ID by string key.
    pub fn upgrade_id(&self, id: &str) -> Option<UpgradeId> {
        self.upgrades
            .iter()
            .position(|d| d.id == id)
            .map(|i| UpgradeId(i as u32))
    }

    /// Validate and build the immutable registry.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let mut building_ids = HashMap::new();
        for (i, def) in self.buildings.iter().enumerate() {
            Self::check_costs(&def.id, def.base_cost, def.cost_scaling)?;
            if building_ids
                .insert(def.id.clone(), BuildingTypeId(i as u32))
                .is_some()
            {
                return Err(RegistryError::DuplicateId(def.id.clone()));
            }
        }

        let mut staff_ids = HashMap::new();
        for (i, def) in self.staff.iter().enumerate() {
            Self::check_costs(&def.id, def.base_cost, def.cost_scaling)?;
            if staff_ids
                .insert(def.id.clone(), StaffTypeId(i as u32))
                .is_some()
            {
                return Err(RegistryError::DuplicateId(def.id.clone()));
            }
        }

        let mut upgrade_ids = HashMap::new();
        for (i, def) in self.upgrades.iter().enumerate() {
            Self::check_costs(&def.id, def.cost, None)?;
            if upgrade_ids
                .insert(def.id.clone(), UpgradeId(i as u32))
                .is_some()
            {
                return Err(RegistryError::DuplicateId(def.id.clone()));
            }
        }

        // All unlock references must resolve to a registered entity.
        for rule in &self.unlocks {
            for entity in &rule.entities {
                let valid = match *entity {
                    EntityRef::Building(id) => (id.0 as usize) < self.buildings.len(),
                    EntityRef::Staff(id) => (id.0 as usize) < self.staff.len(),
                    EntityRef::Upgrade(id) => (id.0 as usize) < self.upgrades.len(),
                };
                if !valid {
                    return Err(RegistryError::InvalidUnlockRef { level: rule.level });
                }
            }
        }

        let mut unlocks = self.unlocks;
        unlocks.sort_by_key(|r| r.level);

        Ok(Registry {
            buildings: self.buildings,
            building_ids,
            staff: self.staff,
            staff_ids,
            upgrades: self.upgrades,
            upgrade_ids,
            unlocks,
        })
    }

    fn check_costs(id: &str, base_cost: f64, scaling: Option<f64>) -> Result<(), RegistryError> {
        if !(base_cost >= 0.0) {
            return Err(RegistryError::NegativeCost(id.to_string()));
        }
        if let Some(factor) = scaling {
            if !(factor > 1.0) {
                return Err(RegistryError::InvalidScaling {
                    id: id.to_string(),
                    factor,
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Immutable registry. Frozen after build(). Consumers copy unlock defaults
/// into their own state rather than aliasing templates.
#[derive(Debug)]
pub struct Registry {
    buildings: Vec<BuildingDef>,
    building_ids: HashMap<String, BuildingTypeId>,
    staff: Vec<StaffDef>,
    staff_ids: HashMap<String, StaffTypeId>,
    upgrades: Vec<UpgradeDef>,
    upgrade_ids: HashMap<String, UpgradeId>,
    unlocks: Vec<UnlockRule>,
}

impl Registry {
    /// All building templates in registration order.
    pub fn buildings(&self) -> &[BuildingDef] {
        &self.buildings
    }

    /// All staff roles in registration order.
    pub fn staff(&self) -> &[StaffDef] {
        &self.staff
    }

    /// All upgrades in registration order.
    pub fn upgrades(&self) -> &[UpgradeDef] {
        &self.upgrades
    }

    /// All unlock rules, sorted ascending by level.
    pub fn unlocks(&self) -> &[UnlockRule] {
        &self.unlocks
    }

    pub fn get_building(&self, id: BuildingTypeId) -> Option<&BuildingDef> {
        self.buildings.get(id.0 as usize)
    }

    pub fn get_staff(&self, id: StaffTypeId) -> Option<&StaffDef> {
        self.staff.get(id.0 as usize)
    }

    pub fn get_upgrade(&self, id: UpgradeId) -> Option<&UpgradeDef> {
        self.upgrades.get(id.0 as usize)
    }

    pub fn building_id(&self, id: &str) -> Option<BuildingTypeId> {
        self.building_ids.get(id).copied()
    }

    pub fn staff_id(&self, id: &str) -> Option<StaffTypeId> {
        self.staff_ids.get(id).copied()
    }

    pub fn upgrade_id(&self, id: &str) -> Option<UpgradeId> {
        self.upgrade_ids.get(id).copied()
    }

    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    pub fn staff_count(&self) -> usize {
        self.staff.len()
    }

    pub fn upgrade_count(&self) -> usize {
        self.upgrades.len()
    }

    /// Entities from every unlock rule with a threshold at or below `level`.
    /// Applying all of them makes multi-level jumps trigger every
    /// intermediate unlock.
    pub fn unlocked_at_or_below(&self, level: u32) -> impl Iterator<Item = EntityRef> + '_ {
        self.unlocks
            .iter()
            .take_while(move |rule| rule.level <= level)
            .flat_map(|rule| rule.entities.iter().copied())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate entity id: {0}")]
    DuplicateId(String),
    #[error("cost scaling factor for {id} must be > 1, got {factor}")]
    InvalidScaling { id: String, factor: f64 },
    #[error("negative cost for entity: {0}")]
    NegativeCost(String),
    #[error("unlock rule at level {level} references an unregistered entity")]
    InvalidUnlockRef { level: u32 },
}
