//! Versioned persistence codec and the durable-storage seam.
//!
//! The durable record is a minimal JSON projection of [`EconomyState`]:
//! scalars plus `{id, owned|purchased, unlocked}` per entity. Derived and
//! transient fields (per-tick display rates, the click cooldown, the
//! checkpoint counter) are never persisted.
//!
//! # Reconciliation
//!
//! [`SaveGame::restore`] merges by iterating the CURRENT registry and
//! looking each template up in the saved data by string id. Entities added
//! since the save get fresh defaults; saved entities no longer in the
//! registry are ignored. This is what keeps saves working across content
//! revisions in both directions.

use crate::formula::{self, FormulaConfig};
use crate::registry::Registry;
use crate::state::EconomyState;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Current save format version. Increment when breaking the record shape.
pub const SAVE_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while encoding a save record.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("save encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors that can occur while decoding a save record.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("save record is not valid JSON: {0}")]
    Parse(String),
    #[error("save from future version {0} (this build supports up to {SAVE_VERSION})")]
    FutureVersion(u32),
}

/// A durable-storage failure, reported by [`SaveStore`] implementations.
#[derive(Debug, thiserror::Error)]
#[error("storage backend failure: {0}")]
pub struct StoreError(pub String);

// ---------------------------------------------------------------------------
// Save record
// ---------------------------------------------------------------------------

/// Saved progress for one counted entity (building or staff).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCounter {
    pub id: String,
    pub owned: u32,
    pub unlocked: bool,
}

/// Saved progress for one upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedUpgrade {
    pub id: String,
    pub purchased: bool,
    pub unlocked: bool,
}

fn one() -> f64 {
    1.0
}

/// The complete durable record. Fields missing from an older save fall
/// back to defaults, so a partial record still decodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub money: f64,
    #[serde(default)]
    pub passengers: f64,
    #[serde(default)]
    pub reputation: u64,
    #[serde(default)]
    pub total_flights: u64,
    #[serde(default)]
    pub total_passengers: f64,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub base_click_value: f64,
    #[serde(default = "one")]
    pub click_multiplier: f64,
    #[serde(default = "one")]
    pub passive_multiplier: f64,
    #[serde(default)]
    pub buildings: Vec<SavedCounter>,
    #[serde(default)]
    pub staff: Vec<SavedCounter>,
    #[serde(default)]
    pub upgrades: Vec<SavedUpgrade>,
}

impl SaveGame {
    /// Project the durable fields out of a live state.
    pub fn capture(state: &EconomyState, registry: &Registry) -> Self {
        Self {
            version: SAVE_VERSION,
            money: state.money,
            passengers: state.passengers,
            reputation: state.reputation,
            total_flights: state.total_flights,
            total_passengers: state.total_passengers,
            level: state.level,
            base_click_value: state.base_click_value,
            click_multiplier: state.click_multiplier,
            passive_multiplier: state.passive_multiplier,
            buildings: registry
                .buildings()
                .iter()
                .zip(&state.buildings)
                .map(|(def, slot)| SavedCounter {
                    id: def.id.clone(),
                    owned: slot.owned,
                    unlocked: slot.unlocked,
                })
                .collect(),
            staff: registry
                .staff()
                .iter()
                .zip(&state.staff)
                .map(|(def, slot)| SavedCounter {
                    id: def.id.clone(),
                    owned: slot.owned,
                    unlocked: slot.unlocked,
                })
                .collect(),
            upgrades: registry
                .upgrades()
                .iter()
                .zip(&state.upgrades)
                .map(|(def, slot)| SavedUpgrade {
                    id: def.id.clone(),
                    purchased: slot.purchased,
                    unlocked: slot.unlocked,
                })
                .collect(),
        }
    }

    /// Rebuild a full state from this record against the current registry.
    ///
    /// Starts from fresh defaults, overwrites the scalars (clamped back
    /// into their invariants), then merges per-entity progress keyed by
    /// string id. `unlocked` only ever flips false to true.
    pub fn restore(&self, registry: &Registry, config: &FormulaConfig) -> EconomyState {
        let mut state = EconomyState::initial(registry, config);

        state.money = self.money.max(0.0);
        state.passengers = self.passengers.max(0.0);
        state.total_flights = self.total_flights;
        state.total_passengers = self.total_passengers.max(0.0);
        // Reputation and level are derived; re-derive rather than trusting
        // the record, but never come back below what the save claims.
        state.reputation = formula::reputation_for(state.total_passengers, config).max(self.reputation);
        state.level = formula::level_for(state.reputation, config).max(self.level.max(1));
        if self.base_click_value > 0.0 {
            state.base_click_value = self.base_click_value;
        }
        state.click_multiplier = self.click_multiplier.max(1.0);
        state.passive_multiplier = self.passive_multiplier.max(1.0);

        for (idx, def) in registry.buildings().iter().enumerate() {
            if let Some(saved) = self.buildings.iter().find(|s| s.id == def.id) {
                let slot = &mut state.buildings[idx];
                slot.owned = match def.max_owned {
                    Some(cap) => saved.owned.min(cap),
                    None => saved.owned,
                };
                if saved.unlocked {
                    slot.unlocked = true;
                }
            }
        }
        for (idx, def) in registry.staff().iter().enumerate() {
            if let Some(saved) = self.staff.iter().find(|s| s.id == def.id) {
                let slot = &mut state.staff[idx];
                slot.owned = saved.owned;
                if saved.unlocked {
                    slot.unlocked = true;
                }
            }
        }
        for (idx, def) in registry.upgrades().iter().enumerate() {
            if let Some(saved) = self.upgrades.iter().find(|s| s.id == def.id) {
                let slot = &mut state.upgrades[idx];
                slot.purchased = saved.purchased;
                if saved.unlocked {
                    slot.unlocked = true;
                }
            }
        }

        state
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Serialize a state to its durable JSON form.
pub fn encode(state: &EconomyState, registry: &Registry) -> Result<String, SaveError> {
    Ok(serde_json::to_string(&SaveGame::capture(state, registry))?)
}

/// Parse a durable record. A parse failure is terminal: nothing is applied
/// and the caller falls back to fresh defaults.
pub fn decode(raw: &str) -> Result<SaveGame, LoadError> {
    let save: SaveGame = serde_json::from_str(raw).map_err(|e| LoadError::Parse(e.to_string()))?;
    if save.version > SAVE_VERSION {
        return Err(LoadError::FutureVersion(save.version));
    }
    Ok(save)
}

// ---------------------------------------------------------------------------
// SaveStore — the durable key-value seam
// ---------------------------------------------------------------------------

/// A single-slot durable store. Browser localStorage, a file, or anything
/// else that can hold one string record. Checkpoints are fire-and-forget:
/// write failures are reported to the player but never roll back state.
pub trait SaveStore: std::fmt::Debug {
    /// Read the record, `None` if no save exists.
    fn read(&mut self) -> Result<Option<String>, StoreError>;
    /// Replace the record.
    fn write(&mut self, raw: &str) -> Result<(), StoreError>;
    /// Delete the record.
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// An in-memory store, for tests and headless sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing record.
    pub fn with_record(raw: impl Into<String>) -> Self {
        Self {
            slot: Some(raw.into()),
        }
    }

    /// Current record contents, if any.
    pub fn record(&self) -> Option<&str> {
        self.slot.as_deref()
    }
}

impl SaveStore for MemoryStore {
    fn read(&mut self) -> Result<Option<String>, StoreError> {
        Ok(self.slot.clone())
    }

    fn write(&mut self, raw: &str) -> Result<(), StoreError> {
        self.slot = Some(raw.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::airport_registry;
    use proptest::prelude::*;

    fn setup() -> (Registry, EconomyState, FormulaConfig) {
        let reg = airport_registry();
        let config = FormulaConfig::default();
        let state = EconomyState::initial(&reg, &config);
        (reg, state, config)
    }

    #[test]
    fn round_trip_reproduces_scalars_and_entities() {
        let (reg, mut state, config) = setup();
        state.money = 1234.5;
        state.passengers = 42.0;
        state.total_flights = 99;
        state.total_passengers = 1005.0;
        state.reputation = 10;
        state.level = 2;
        state.click_multiplier = 2.0;
        state.buildings[0].owned = 3;
        state.staff[0].owned = 2;
        state.upgrades[0].purchased = true;

        let raw = encode(&state, &reg).unwrap();
        let restored = decode(&raw).unwrap().restore(&reg, &config);

        assert_eq!(restored.money, state.money);
        assert_eq!(restored.passengers, state.passengers);
        assert_eq!(restored.total_flights, state.total_flights);
        assert_eq!(restored.total_passengers, state.total_passengers);
        assert_eq!(restored.reputation, state.reputation);
        assert_eq!(restored.level, state.level);
        assert_eq!(restored.click_multiplier, state.click_multiplier);
        assert_eq!(restored.buildings, state.buildings);
        assert_eq!(restored.staff, state.staff);
        assert_eq!(restored.upgrades, state.upgrades);
    }

    #[test]
    fn transient_fields_are_not_persisted() {
        let (reg, mut state, _) = setup();
        state.tick = 500;
        state.ticks_since_checkpoint = 7;
        let raw = encode(&state, &reg).unwrap();
        assert!(!raw.contains("ticks_since_checkpoint"));
        assert!(!raw.contains("\"tick\""));
        assert!(!raw.contains("cooldown"));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(decode("not json {{{"), Err(LoadError::Parse(_))));
    }

    #[test]
    fn decode_rejects_future_version() {
        let raw = format!("{{\"version\": {}}}", SAVE_VERSION + 1);
        assert!(matches!(
            decode(&raw),
            Err(LoadError::FutureVersion(v)) if v == SAVE_VERSION + 1
        ));
    }

    #[test]
    fn partial_record_decodes_with_defaults() {
        let save = decode(r#"{"version": 1, "money": 50.0}"#).unwrap();
        assert_eq!(save.money, 50.0);
        assert_eq!(save.click_multiplier, 1.0);
        assert!(save.buildings.is_empty());
    }

    #[test]
    fn unknown_saved_entity_is_ignored() {
        let (reg, _, config) = setup();
        let save = decode(
            r#"{"version": 1, "buildings": [{"id": "monorail", "owned": 7, "unlocked": true}]}"#,
        )
        .unwrap();
        let restored = save.restore(&reg, &config);
        assert!(restored.buildings.iter().all(|b| b.owned == 0));
    }

    #[test]
    fn missing_entity_keeps_defaults() {
        // A registry entity absent from the save gets fresh defaults,
        // because the merge iterates the current registry.
        let (reg, mut state, config) = setup();
        state.buildings[0].owned = 2;
        let mut save = SaveGame::capture(&state, &reg);
        save.buildings.retain(|b| b.id != "terminal");
        let restored = save.restore(&reg, &config);
        let terminal = reg.building_id("terminal").unwrap().0 as usize;
        assert_eq!(restored.buildings[terminal].owned, 0);
        assert_eq!(restored.buildings[0].owned, 2);
    }

    #[test]
    fn unlocked_never_reverts_on_restore() {
        let (reg, state, config) = setup();
        let mut save = SaveGame::capture(&state, &reg);
        // Corrupted or older save claims a start-unlocked building is locked.
        let runway = reg.building_id("runway").unwrap().0 as usize;
        save.buildings[runway].unlocked = false;
        let restored = save.restore(&reg, &config);
        assert!(restored.buildings[runway].unlocked);
    }

    #[test]
    fn restore_clamps_owned_to_capacity() {
        let (reg, _, config) = setup();
        let save = decode(
            r#"{"version": 1, "buildings": [{"id": "runway", "owned": 50, "unlocked": true}]}"#,
        )
        .unwrap();
        let restored = save.restore(&reg, &config);
        let runway = reg.building_id("runway").unwrap().0 as usize;
        // Fixture runway caps at 8.
        assert_eq!(restored.buildings[runway].owned, 8);
    }

    #[test]
    fn restore_rederives_reputation_and_level() {
        let (reg, _, config) = setup();
        let save = decode(r#"{"version": 1, "total_passengers": 1005.0}"#).unwrap();
        let restored = save.restore(&reg, &config);
        assert_eq!(restored.reputation, 10);
        assert_eq!(restored.level, 2);
    }

    #[test]
    fn restore_clamps_scalars_into_invariants() {
        let (reg, _, config) = setup();
        let save = decode(
            r#"{"version": 1, "money": -10.0, "click_multiplier": 0.5, "level": 0}"#,
        )
        .unwrap();
        let restored = save.restore(&reg, &config);
        assert_eq!(restored.money, 0.0);
        assert_eq!(restored.click_multiplier, 1.0);
        assert_eq!(restored.level, 1);
    }

    #[test]
    fn memory_store_read_write_clear() {
        let mut store = MemoryStore::new();
        assert_eq!(store.read().unwrap(), None);
        store.write("hello").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("hello"));
        store.clear().unwrap();
        assert_eq!(store.read().unwrap(), None);
    }

    proptest! {
        #[test]
        fn round_trip_is_identity_for_reachable_states(
            money in 0.0f64..1e9,
            total_passengers in 0.0f64..1e7,
            flights in 0u64..100_000,
            runways in 0u32..=8,
            pilots in 0u32..100,
        ) {
            let (reg, mut state, config) = setup();
            state.money = money;
            state.total_passengers = total_passengers;
            state.reputation = crate::formula::reputation_for(total_passengers, &config);
            state.level = crate::formula::level_for(state.reputation, &config);
            state.total_flights = flights;
            let runway = reg.building_id("runway").unwrap().0 as usize;
            state.buildings[runway].owned = runways;
            let pilot = reg.staff_id("pilot").unwrap().0 as usize;
            state.staff[pilot].owned = pilots;

            let raw = encode(&state, &reg).unwrap();
            let restored = decode(&raw).unwrap().restore(&reg, &config);

            prop_assert_eq!(restored.money, state.money);
            prop_assert_eq!(restored.reputation, state.reputation);
            prop_assert_eq!(restored.level, state.level);
            prop_assert_eq!(restored.buildings, state.buildings);
            prop_assert_eq!(restored.staff, state.staff);
        }
    }
}
