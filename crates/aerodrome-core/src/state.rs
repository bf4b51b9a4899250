//! The mutable economy ledger.
//!
//! [`EconomyState`] is the only shared mutable resource in the engine. It is
//! created fresh from the registry via [`EconomyState::initial`], optionally
//! overwritten by a restored save, mutated by every click/tick/transaction,
//! and rebuilt from scratch on reset. Rendering code only ever reads it.

use crate::formula::FormulaConfig;
use crate::registry::Registry;

/// Tick counter type. One tick per second at the default cadence.
pub type Ticks = u64;

// ---------------------------------------------------------------------------
// Per-entity owned state
// ---------------------------------------------------------------------------

/// Mutable progress for one building template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnedBuilding {
    pub owned: u32,
    pub unlocked: bool,
}

/// Mutable progress for one staff role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnedStaff {
    pub owned: u32,
    pub unlocked: bool,
}

/// Mutable progress for one upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnedUpgrade {
    pub purchased: bool,
    pub unlocked: bool,
}

// ---------------------------------------------------------------------------
// EconomyState
// ---------------------------------------------------------------------------

/// The full mutable game ledger. Entity vectors are parallel to registry
/// registration order.
///
/// Invariants maintained by the engine after every mutation:
/// - `reputation == floor(total_passengers / passengers_per_reputation)`
/// - `level == reputation / reputation_per_level + 1`, never decreasing
/// - `money >= 0`
/// - owned counts never exceed a template's `max_owned`
/// - `unlocked` never reverts to false (outside a full reset)
#[derive(Debug, Clone, PartialEq)]
pub struct EconomyState {
    pub money: f64,
    /// Passengers currently at the airport.
    pub passengers: f64,
    /// Derived from `total_passengers`; never decreases.
    pub reputation: u64,
    pub total_flights: u64,
    /// Cumulative passengers served; monotonic.
    pub total_passengers: f64,
    /// Airport level, derived from reputation; starts at 1, never decreases.
    pub level: u32,
    /// Money earned per click before any boosts or multipliers.
    pub base_click_value: f64,
    /// Global click multiplier; upgrades add to it.
    pub click_multiplier: f64,
    /// Global passive-income multiplier; upgrades add to it.
    pub passive_multiplier: f64,
    pub buildings: Vec<OwnedBuilding>,
    pub staff: Vec<OwnedStaff>,
    pub upgrades: Vec<OwnedUpgrade>,
    /// Total ticks applied so far.
    pub tick: Ticks,
    /// Ticks since the last persistence checkpoint.
    pub ticks_since_checkpoint: u32,
}

impl EconomyState {
    /// Create a fresh ledger for the given registry. Unlock defaults are
    /// copied out of the templates; nothing aliases the registry.
    pub fn initial(registry: &Registry, config: &FormulaConfig) -> Self {
        Self {
            money: 0.0,
            passengers: 0.0,
            reputation: 0,
            total_flights: 0,
            total_passengers: 0.0,
            level: 1,
            base_click_value: config.base_click_value,
            click_multiplier: 1.0,
            passive_multiplier: 1.0,
            buildings: registry
                .buildings()
                .iter()
                .map(|def| OwnedBuilding {
                    owned: 0,
                    unlocked: def.start_unlocked,
                })
                .collect(),
            staff: registry
                .staff()
                .iter()
                .map(|def| OwnedStaff {
                    owned: 0,
                    unlocked: def.start_unlocked,
                })
                .collect(),
            upgrades: registry
                .upgrades()
                .iter()
                .map(|def| OwnedUpgrade {
                    purchased: false,
                    unlocked: def.start_unlocked,
                })
                .collect(),
            tick: 0,
            ticks_since_checkpoint: 0,
        }
    }
}
