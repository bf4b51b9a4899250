//! Pure progression math: cost curves, click yield, passive yield, and the
//! reputation/level derivation.
//!
//! Everything here is a pure function over `(&Registry, &EconomyState,
//! &FormulaConfig)` -- no side effects, no I/O. The engine is the only
//! mutator; these functions just compute.
//!
//! # Click yield ordering
//!
//! The composition order is fixed and load-bearing:
//!
//! 1. additive per-unit building boosts (fractions of the base value),
//! 2. the efficiency factor from boost-amplifying buildings,
//! 3. the multiplicative staff product `(1 + bonus)^owned`,
//! 4. the accumulated global click multiplier from upgrades.

use crate::registry::{BuildingDef, Registry, StaffDef};
use crate::state::EconomyState;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Every tunable economy parameter. Carried by the engine; never ambient.
#[derive(Debug, Clone)]
pub struct FormulaConfig {
    /// Money earned per click before boosts and multipliers.
    pub base_click_value: f64,
    /// Category default cost scaling for buildings.
    pub building_cost_scaling: f64,
    /// Category default cost scaling for staff.
    pub staff_cost_scaling: f64,
    /// Passengers served per reputation point.
    pub passengers_per_reputation: f64,
    /// Reputation points per airport level.
    pub reputation_per_level: u64,
    /// Flat passenger arrival per tick, before reputation and buildings.
    pub base_passenger_arrival: f64,
    /// Additional passenger arrival per tick per reputation point.
    pub arrival_per_reputation: f64,
    /// Passive income is scaled by `1 + reputation / this`.
    pub income_reputation_divisor: f64,
    /// A checkpoint is requested every this many ticks.
    pub checkpoint_interval: u32,
    /// Window during which a second click is rejected.
    pub click_cooldown: Duration,
    /// Most recent notifications retained; oldest evicted first.
    pub notification_capacity: usize,
}

impl Default for FormulaConfig {
    fn default() -> Self {
        Self {
            base_click_value: 10.0,
            building_cost_scaling: 1.15,
            staff_cost_scaling: 1.2,
            passengers_per_reputation: 100.0,
            reputation_per_level: 10,
            base_passenger_arrival: 0.1,
            arrival_per_reputation: 0.01,
            income_reputation_divisor: 100.0,
            checkpoint_interval: 15,
            click_cooldown: Duration::from_millis(100),
            notification_capacity: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Costs
// ---------------------------------------------------------------------------

/// Cost of the next unit of a building: `floor(base * s^owned)` where `s`
/// is the template override or the category default.
pub fn building_cost(def: &BuildingDef, config: &FormulaConfig, owned: u32) -> f64 {
    let scaling = def.cost_scaling.unwrap_or(config.building_cost_scaling);
    (def.base_cost * scaling.powi(owned as i32)).floor()
}

/// Cost of the next hire of a staff role.
pub fn staff_cost(def: &StaffDef, config: &FormulaConfig, owned: u32) -> f64 {
    let scaling = def.cost_scaling.unwrap_or(config.staff_cost_scaling);
    (def.base_cost * scaling.powi(owned as i32)).floor()
}

pub fn can_afford(money: f64, cost: f64) -> bool {
    money >= cost
}

// ---------------------------------------------------------------------------
// Yields
// ---------------------------------------------------------------------------

/// Money earned from one manual click.
pub fn click_yield(registry: &Registry, state: &EconomyState) -> f64 {
    let pairs = || registry.buildings().iter().zip(&state.buildings);

    // Efficiency buildings amplify the other buildings' click boosts.
    let efficiency: f64 = 1.0
        + pairs()
            .map(|(def, slot)| slot.owned as f64 * def.boost_efficiency)
            .sum::<f64>();
    let boost: f64 = pairs()
        .map(|(def, slot)| slot.owned as f64 * def.click_boost)
        .sum();

    let mut earned = state.base_click_value * (1.0 + boost * efficiency);

    for (def, slot) in registry.staff().iter().zip(&state.staff) {
        if slot.owned > 0 && def.click_bonus != 0.0 {
            earned *= (1.0 + def.click_bonus).powi(slot.owned as i32);
        }
    }

    earned * state.click_multiplier
}

/// Passive production for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassiveYield {
    pub money_per_tick: f64,
    pub passengers_per_tick: f64,
}

/// Compute the passive yield for the current state.
///
/// Building income scales with reputation; staff passive bonuses and the
/// global passive multiplier apply to the money component. Passenger
/// arrival is reputation-driven plus flat building production.
pub fn passive_yield(registry: &Registry, state: &EconomyState, config: &FormulaConfig) -> PassiveYield {
    let reputation = state.reputation as f64;
    let reputation_factor = 1.0 + reputation / config.income_reputation_divisor;

    let mut money: f64 = registry
        .buildings()
        .iter()
        .zip(&state.buildings)
        .map(|(def, slot)| slot.owned as f64 * def.money_per_tick)
        .sum::<f64>()
        * reputation_factor;

    for (def, slot) in registry.staff().iter().zip(&state.staff) {
        if slot.owned > 0 && def.passive_bonus != 0.0 {
            money *= (1.0 + def.passive_bonus).powi(slot.owned as i32);
        }
    }
    money *= state.passive_multiplier;

    let passengers = config.base_passenger_arrival
        + reputation * config.arrival_per_reputation
        + registry
            .buildings()
            .iter()
            .zip(&state.buildings)
            .map(|(def, slot)| slot.owned as f64 * def.passengers_per_tick)
            .sum::<f64>();

    PassiveYield {
        money_per_tick: money,
        passengers_per_tick: passengers,
    }
}

// ---------------------------------------------------------------------------
// Reputation and level
// ---------------------------------------------------------------------------

/// Reputation earned for a cumulative passenger count.
pub fn reputation_for(total_passengers: f64, config: &FormulaConfig) -> u64 {
    if total_passengers <= 0.0 {
        return 0;
    }
    (total_passengers / config.passengers_per_reputation).floor() as u64
}

/// Airport level for a reputation value. Level 1 is the floor.
pub fn level_for(reputation: u64, config: &FormulaConfig) -> u32 {
    (reputation / config.reputation_per_level) as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EconomyState;
    use crate::test_utils::airport_registry;
    use proptest::prelude::*;

    fn setup() -> (crate::registry::Registry, EconomyState, FormulaConfig) {
        let reg = airport_registry();
        let config = FormulaConfig::default();
        let state = EconomyState::initial(&reg, &config);
        (reg, state, config)
    }

    fn runway_idx(reg: &crate::registry::Registry) -> usize {
        reg.building_id("runway").unwrap().0 as usize
    }

    // -----------------------------------------------------------------------
    // Costs
    // -----------------------------------------------------------------------

    #[test]
    fn building_cost_progression() {
        let (reg, _, config) = setup();
        let runway = reg.get_building(reg.building_id("runway").unwrap()).unwrap();
        assert_eq!(building_cost(runway, &config, 0), 10.0);
        assert_eq!(building_cost(runway, &config, 1), 11.0); // floor(10 * 1.15)
        assert_eq!(building_cost(runway, &config, 2), 13.0); // floor(10 * 1.3225)
    }

    #[test]
    fn scaling_override_wins_over_category_default() {
        let (reg, _, config) = setup();
        let tower = reg
            .get_building(reg.building_id("control-tower").unwrap())
            .unwrap();
        // Tower overrides to 2.0 in the fixture.
        assert_eq!(building_cost(tower, &config, 1), 2000.0);
    }

    #[test]
    fn staff_cost_uses_staff_scaling() {
        let (reg, _, config) = setup();
        let pilot = reg.get_staff(reg.staff_id("pilot").unwrap()).unwrap();
        assert_eq!(staff_cost(pilot, &config, 0), 25.0);
        assert_eq!(staff_cost(pilot, &config, 1), 30.0); // floor(25 * 1.2)
    }

    #[test]
    fn afford_boundary_is_inclusive() {
        assert!(can_afford(10.0, 10.0));
        assert!(!can_afford(9.99, 10.0));
    }

    // -----------------------------------------------------------------------
    // Click yield
    // -----------------------------------------------------------------------

    #[test]
    fn click_yield_with_nothing_owned_is_base() {
        let (reg, state, _) = setup();
        assert_eq!(click_yield(&reg, &state), state.base_click_value);
    }

    #[test]
    fn runway_boost_is_additive_per_unit() {
        let (reg, mut state, _) = setup();
        let idx = runway_idx(&reg);
        state.buildings[idx].owned = 2;
        // Fixture runway click_boost is 0.5: base * (1 + 2 * 0.5) = 2x base.
        assert_eq!(click_yield(&reg, &state), state.base_click_value * 2.0);
    }

    #[test]
    fn tower_efficiency_amplifies_runway_boost() {
        let (reg, mut state, _) = setup();
        state.buildings[runway_idx(&reg)].owned = 2;
        let tower = reg.building_id("control-tower").unwrap().0 as usize;
        state.buildings[tower].owned = 1;
        // Fixture tower boost_efficiency is 0.1: boost 1.0 becomes 1.1.
        let expected = state.base_click_value * (1.0 + 1.0 * 1.1);
        assert!((click_yield(&reg, &state) - expected).abs() < 1e-9);
    }

    #[test]
    fn staff_bonus_compounds_per_hire() {
        let (reg, mut state, _) = setup();
        let pilot = reg.staff_id("pilot").unwrap().0 as usize;
        state.staff[pilot].owned = 3;
        // Fixture pilot click_bonus is 0.02.
        let expected = state.base_click_value * 1.02f64.powi(3);
        assert!((click_yield(&reg, &state) - expected).abs() < 1e-9);
    }

    #[test]
    fn global_multiplier_applies_last() {
        let (reg, mut state, _) = setup();
        state.buildings[runway_idx(&reg)].owned = 1;
        state.click_multiplier = 2.0;
        let expected = state.base_click_value * 1.5 * 2.0;
        assert!((click_yield(&reg, &state) - expected).abs() < 1e-9);
    }

    // -----------------------------------------------------------------------
    // Passive yield
    // -----------------------------------------------------------------------

    #[test]
    fn passive_money_is_zero_with_no_buildings() {
        let (reg, state, config) = setup();
        let y = passive_yield(&reg, &state, &config);
        assert_eq!(y.money_per_tick, 0.0);
    }

    #[test]
    fn passenger_arrival_has_a_base_rate() {
        let (reg, state, config) = setup();
        let y = passive_yield(&reg, &state, &config);
        assert_eq!(y.passengers_per_tick, config.base_passenger_arrival);
    }

    #[test]
    fn reputation_scales_building_income() {
        let (reg, mut state, config) = setup();
        let terminal = reg.building_id("terminal").unwrap().0 as usize;
        state.buildings[terminal].owned = 1;
        state.reputation = 50;
        // Fixture terminal produces 2.0/tick; scaled by 1 + 50/100.
        let y = passive_yield(&reg, &state, &config);
        assert!((y.money_per_tick - 2.0 * 1.5).abs() < 1e-9);
    }

    #[test]
    fn staff_and_global_multipliers_stack_on_income() {
        let (reg, mut state, config) = setup();
        let terminal = reg.building_id("terminal").unwrap().0 as usize;
        state.buildings[terminal].owned = 1;
        let attendant = reg.staff_id("flight-attendant").unwrap().0 as usize;
        state.staff[attendant].owned = 2;
        state.passive_multiplier = 1.5;
        // Fixture attendant passive_bonus is 0.05.
        let expected = 2.0 * 1.05f64.powi(2) * 1.5;
        let y = passive_yield(&reg, &state, &config);
        assert!((y.money_per_tick - expected).abs() < 1e-9);
    }

    #[test]
    fn reputation_feeds_passenger_arrival() {
        let (reg, mut state, config) = setup();
        state.reputation = 30;
        let y = passive_yield(&reg, &state, &config);
        let expected = config.base_passenger_arrival + 30.0 * config.arrival_per_reputation;
        assert!((y.passengers_per_tick - expected).abs() < 1e-9);
    }

    // -----------------------------------------------------------------------
    // Reputation and level
    // -----------------------------------------------------------------------

    #[test]
    fn reputation_thresholds() {
        let config = FormulaConfig::default();
        assert_eq!(reputation_for(0.0, &config), 0);
        assert_eq!(reputation_for(99.9, &config), 0);
        assert_eq!(reputation_for(100.0, &config), 1);
        assert_eq!(reputation_for(995.0, &config), 9);
        assert_eq!(reputation_for(1005.0, &config), 10);
    }

    #[test]
    fn level_thresholds() {
        let config = FormulaConfig::default();
        assert_eq!(level_for(0, &config), 1);
        assert_eq!(level_for(9, &config), 1);
        assert_eq!(level_for(10, &config), 2);
        assert_eq!(level_for(25, &config), 3);
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    proptest! {
        #[test]
        // Base below ~7 can floor to the same cost at low owned counts, so
        // start where the 15% step always clears a whole unit.
        fn cost_strictly_increases_with_owned(base in 10.0f64..10_000.0, owned in 0u32..60) {
            let (reg, _, config) = setup();
            let mut def = reg.get_building(reg.building_id("runway").unwrap()).unwrap().clone();
            def.base_cost = base;
            prop_assert!(building_cost(&def, &config, owned + 1) > building_cost(&def, &config, owned));
        }

        #[test]
        fn yields_are_never_negative_or_nan(
            runways in 0u32..50,
            pilots in 0u32..50,
            reputation in 0u64..10_000,
        ) {
            let (reg, mut state, config) = setup();
            state.buildings[runway_idx(&reg)].owned = runways;
            let pilot = reg.staff_id("pilot").unwrap().0 as usize;
            state.staff[pilot].owned = pilots;
            state.reputation = reputation;

            let click = click_yield(&reg, &state);
            prop_assert!(click.is_finite() && click >= 0.0);

            let y = passive_yield(&reg, &state, &config);
            prop_assert!(y.money_per_tick.is_finite() && y.money_per_tick >= 0.0);
            prop_assert!(y.passengers_per_tick.is_finite() && y.passengers_per_tick >= 0.0);
        }

        #[test]
        fn reputation_matches_floor_division(total in 0.0f64..1e9) {
            let config = FormulaConfig::default();
            let rep = reputation_for(total, &config);
            prop_assert_eq!(rep, (total / 100.0).floor() as u64);
        }
    }
}
