//! Shared fixtures for unit and integration tests.
//!
//! Compiled for this crate's own tests and, via the `test-utils` feature,
//! for downstream test crates. Not part of the public API proper.

use crate::engine::Engine;
use crate::formula::FormulaConfig;
use crate::persist::{MemoryStore, SaveStore, StoreError};
use crate::registry::{
    BuildingDef, EntityRef, Registry, RegistryBuilder, StaffDef, UpgradeDef, UpgradeEffect,
};
use std::cell::RefCell;
use std::rc::Rc;

// ---------------------------------------------------------------------------
// Template constructors
// ---------------------------------------------------------------------------

/// A plain building: no production, no boosts, no cap, purchasable from
/// the start. Tests override the fields they care about.
pub fn building(id: &str, base_cost: f64) -> BuildingDef {
    BuildingDef {
        id: id.to_string(),
        name: id.to_string(),
        description: String::new(),
        base_cost,
        cost_scaling: None,
        money_per_tick: 0.0,
        passengers_per_tick: 0.0,
        click_boost: 0.0,
        boost_efficiency: 0.0,
        start_unlocked: true,
        max_owned: None,
    }
}

/// A plain staff role with no bonuses, purchasable from the start.
pub fn staff(id: &str, base_cost: f64) -> StaffDef {
    StaffDef {
        id: id.to_string(),
        name: id.to_string(),
        description: String::new(),
        base_cost,
        cost_scaling: None,
        click_bonus: 0.0,
        passive_bonus: 0.0,
        start_unlocked: true,
    }
}

/// An upgrade with the given effect, purchasable from the start.
pub fn upgrade(id: &str, cost: f64, effect: UpgradeEffect) -> UpgradeDef {
    UpgradeDef {
        id: id.to_string(),
        name: id.to_string(),
        description: String::new(),
        cost,
        effect,
        start_unlocked: true,
    }
}

// ---------------------------------------------------------------------------
// The standard airport fixture
// ---------------------------------------------------------------------------

/// A small but complete content set exercising every mechanic: cost
/// overrides, a build cap, click boosts and efficiency, passive production,
/// staff bonuses, both upgrade effects, and a two-step unlock schedule.
pub fn airport_registry() -> Registry {
    let mut b = RegistryBuilder::new();

    let _runway = b.register_building(BuildingDef {
        name: "Runway".to_string(),
        click_boost: 0.5,
        max_owned: Some(8),
        ..building("runway", 10.0)
    });
    let _terminal = b.register_building(BuildingDef {
        name: "Terminal".to_string(),
        money_per_tick: 2.0,
        ..building("terminal", 50.0)
    });
    let tower = b.register_building(BuildingDef {
        name: "Control Tower".to_string(),
        cost_scaling: Some(2.0),
        money_per_tick: 15.0,
        boost_efficiency: 0.1,
        start_unlocked: false,
        ..building("control-tower", 1000.0)
    });
    let garage = b.register_building(BuildingDef {
        name: "Parking Garage".to_string(),
        money_per_tick: 10.0,
        passengers_per_tick: 0.5,
        start_unlocked: false,
        ..building("parking-garage", 2000.0)
    });

    let _pilot = b.register_staff(StaffDef {
        name: "Pilot".to_string(),
        click_bonus: 0.02,
        ..staff("pilot", 25.0)
    });
    let _attendant = b.register_staff(StaffDef {
        name: "Flight Attendant".to_string(),
        passive_bonus: 0.05,
        ..staff("flight-attendant", 100.0)
    });
    let mechanic = b.register_staff(StaffDef {
        name: "Mechanic".to_string(),
        passive_bonus: 0.10,
        start_unlocked: false,
        ..staff("mechanic", 500.0)
    });

    b.register_upgrade(UpgradeDef {
        name: "Better Seats".to_string(),
        ..upgrade("better-seats", 200.0, UpgradeEffect::ClickMultiplierBonus(1.0))
    });
    b.register_upgrade(UpgradeDef {
        name: "Faster Check-In".to_string(),
        ..upgrade(
            "faster-check-in",
            500.0,
            UpgradeEffect::PassiveMultiplierBonus(0.5),
        )
    });

    b.register_unlock(2, vec![EntityRef::Building(tower), EntityRef::Staff(mechanic)]);
    b.register_unlock(3, vec![EntityRef::Building(garage)]);

    b.build().expect("fixture registry is valid")
}

/// An engine over [`airport_registry`] with the default config and the
/// given starting money.
pub fn funded_engine(money: f64) -> Engine {
    let mut engine = Engine::new(airport_registry(), FormulaConfig::default());
    engine.state_mut().money = money;
    engine
}

// ---------------------------------------------------------------------------
// Store doubles
// ---------------------------------------------------------------------------

/// A [`MemoryStore`] behind `Rc<RefCell>` so a test can keep a handle to
/// the record after the engine takes ownership of the store.
#[derive(Debug, Clone, Default)]
pub struct SharedStore(pub Rc<RefCell<MemoryStore>>);

impl SharedStore {
    pub fn record(&self) -> Option<String> {
        self.0.borrow().record().map(str::to_string)
    }
}

impl SaveStore for SharedStore {
    fn read(&mut self) -> Result<Option<String>, StoreError> {
        self.0.borrow_mut().read()
    }

    fn write(&mut self, raw: &str) -> Result<(), StoreError> {
        self.0.borrow_mut().write(raw)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.0.borrow_mut().clear()
    }
}

/// A store whose writes always fail, for checkpoint-failure paths.
#[derive(Debug)]
pub struct FailingStore;

impl SaveStore for FailingStore {
    fn read(&mut self) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn write(&mut self, _raw: &str) -> Result<(), StoreError> {
        Err(StoreError("storage quota exceeded".to_string()))
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}
