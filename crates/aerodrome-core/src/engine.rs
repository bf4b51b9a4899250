//! The economy engine: owns all mutable state and processes every action
//! as a single atomic unit of work.
//!
//! # Architecture
//!
//! The `Engine` owns:
//! - A [`Registry`] (immutable content catalog)
//! - An [`EconomyState`] (the mutable ledger)
//! - A [`FormulaConfig`] (economy parameters)
//! - A [`NotificationLog`] read by the rendering collaborator
//! - An optional [`SaveStore`] for fire-and-forget checkpoints
//! - The click cooldown guard
//!
//! # Action shape
//!
//! Every transaction checks its preconditions in a fixed order; the first
//! failure aborts with a named [`ActionError`] and no state change. On
//! success the full effect is applied before the call returns. There is no
//! partial application and no retry.
//!
//! Reputation and level are re-derived after every crediting action, and a
//! level increase applies every unlock rule at or below the new level, so
//! a multi-level jump in one tick triggers every intermediate unlock.

use crate::formula::{self, FormulaConfig};
use crate::notify::{Notification, NotificationIter, NotificationLog, Severity};
use crate::persist::{self, SaveStore};
use crate::query::{BuildingView, ResourceSnapshot, StaffView, UpgradeView};
use crate::registry::{EntityRef, Registry, UpgradeEffect};
use crate::state::EconomyState;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Errors and outcomes
// ---------------------------------------------------------------------------

/// A named, terminal action failure. The state is untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error("unknown entity: {0}")]
    EntityNotFound(String),
    #[error("{0} is not unlocked yet")]
    EntityLocked(String),
    #[error("{0} is at its build limit")]
    CapacityReached(String),
    #[error("{0} has already been purchased")]
    AlreadyPurchased(String),
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: f64, available: f64 },
    #[error("click rejected: cooldown active")]
    CooldownActive,
}

/// Result of a successful building purchase or staff hire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PurchaseOutcome {
    pub cost: f64,
    /// Owned count after the purchase.
    pub owned: u32,
}

/// Result of a successful upgrade purchase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpgradeOutcome {
    pub cost: f64,
    pub effect: UpgradeEffect,
}

/// Result of a processed click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickOutcome {
    pub money_earned: f64,
    /// Set when this click pushed the airport to a new level.
    pub new_level: Option<u32>,
}

/// Result of one passive tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub money_earned: f64,
    pub passengers_arrived: f64,
    pub new_level: Option<u32>,
    /// Whether this tick requested a persistence checkpoint.
    pub checkpointed: bool,
}

/// How [`Engine::attach_store`] resolved the saved record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No saved record; starting from defaults.
    Fresh,
    /// Saved progress was restored.
    Restored,
    /// The record was unreadable; it was cleared and defaults apply.
    Corrupt,
}

// ---------------------------------------------------------------------------
// Click cooldown
// ---------------------------------------------------------------------------

/// Non-blocking guard against rapid clicking. A rejected click is dropped,
/// never queued; the window is armed at click time and simply expires.
#[derive(Debug)]
struct ClickCooldown {
    window: Duration,
    ready_at: Option<Instant>,
}

impl ClickCooldown {
    fn new(window: Duration) -> Self {
        Self {
            window,
            ready_at: None,
        }
    }

    /// Returns false while the window from the previous click is open;
    /// otherwise arms a new window and returns true.
    fn try_begin(&mut self, now: Instant) -> bool {
        if let Some(ready_at) = self.ready_at {
            if now < ready_at {
                return false;
            }
        }
        self.ready_at = Some(now + self.window);
        true
    }

    fn reset(&mut self) {
        self.ready_at = None;
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The core economy engine. Single-threaded; every method is one
/// synchronous unit of work, so ticks and actions never interleave.
#[derive(Debug)]
pub struct Engine {
    registry: Registry,
    config: FormulaConfig,
    state: EconomyState,
    notifications: NotificationLog,
    store: Option<Box<dyn SaveStore>>,
    cooldown: ClickCooldown,
}

impl Engine {
    /// Create an engine with a fresh ledger.
    pub fn new(registry: Registry, config: FormulaConfig) -> Self {
        let state = EconomyState::initial(&registry, &config);
        let notifications = NotificationLog::new(config.notification_capacity);
        let cooldown = ClickCooldown::new(config.click_cooldown);
        Self {
            registry,
            config,
            state,
            notifications,
            store: None,
            cooldown,
        }
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &FormulaConfig {
        &self.config
    }

    /// The ledger. Rendering code reads it; only the engine mutates it.
    pub fn state(&self) -> &EconomyState {
        &self.state
    }

    /// Mutable ledger access for tests and fixtures.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn state_mut(&mut self) -> &mut EconomyState {
        &mut self.state
    }

    // -----------------------------------------------------------------------
    // Persistence handshake
    // -----------------------------------------------------------------------

    /// Attach a durable store and load whatever it holds.
    ///
    /// A corrupt or unreadable record is cleared and reported; the engine
    /// continues from fresh defaults. Nothing is ever partially applied.
    pub fn attach_store(&mut self, mut store: Box<dyn SaveStore>) -> LoadOutcome {
        let outcome = match store.read() {
            Ok(Some(raw)) => match persist::decode(&raw) {
                Ok(save) => {
                    self.state = save.restore(&self.registry, &self.config);
                    self.notifications.push(Severity::Info, "Game progress loaded.");
                    LoadOutcome::Restored
                }
                Err(err) => {
                    let _ = store.clear();
                    self.notifications.push(
                        Severity::Error,
                        format!("Error loading save game ({err}). Starting fresh."),
                    );
                    LoadOutcome::Corrupt
                }
            },
            Ok(None) => LoadOutcome::Fresh,
            Err(err) => {
                let _ = store.clear();
                self.notifications.push(
                    Severity::Error,
                    format!("Save storage unavailable ({err}). Starting fresh."),
                );
                LoadOutcome::Corrupt
            }
        };
        self.store = Some(store);
        outcome
    }

    /// Encode the ledger and write it to the store, if one is attached.
    /// Failures are reported via the notification log and never roll back
    /// in-memory state.
    pub fn checkpoint(&mut self) {
        self.state.ticks_since_checkpoint = 0;
        let Some(store) = self.store.as_mut() else {
            return;
        };
        match persist::encode(&self.state, &self.registry) {
            Ok(raw) => {
                if let Err(err) = store.write(&raw) {
                    self.notifications.push(
                        Severity::Error,
                        format!("Error saving game ({err}). Progress continues in memory."),
                    );
                }
            }
            Err(err) => {
                self.notifications
                    .push(Severity::Error, format!("Error saving game ({err})."));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Manual action
    // -----------------------------------------------------------------------

    /// Process one manual "operate flight" click at time `now`.
    ///
    /// Rejected while the cooldown window from the previous click is open.
    pub fn click(&mut self, now: Instant) -> Result<ClickOutcome, ActionError> {
        if !self.cooldown.try_begin(now) {
            return Err(ActionError::CooldownActive);
        }
        let earned = formula::click_yield(&self.registry, &self.state);
        self.state.money += earned;
        self.state.total_flights += 1;
        let new_level = self.refresh_progression();
        Ok(ClickOutcome {
            money_earned: earned,
            new_level,
        })
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Apply one passive tick: credit passive yield, re-derive progression,
    /// and checkpoint every `checkpoint_interval` ticks.
    pub fn tick(&mut self) -> TickOutcome {
        let produced = formula::passive_yield(&self.registry, &self.state, &self.config);
        self.state.money += produced.money_per_tick;
        self.state.passengers += produced.passengers_per_tick;
        self.state.total_passengers += produced.passengers_per_tick;
        self.state.tick += 1;
        let new_level = self.refresh_progression();

        self.state.ticks_since_checkpoint += 1;
        let checkpointed = self.state.ticks_since_checkpoint >= self.config.checkpoint_interval;
        if checkpointed {
            self.checkpoint();
        }

        TickOutcome {
            money_earned: produced.money_per_tick,
            passengers_arrived: produced.passengers_per_tick,
            new_level,
            checkpointed,
        }
    }

    // -----------------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------------

    /// Buy one unit of a building.
    pub fn purchase_building(&mut self, id: &str) -> Result<PurchaseOutcome, ActionError> {
        let Some(type_id) = self.registry.building_id(id) else {
            self.notifications
                .push(Severity::Error, format!("Unknown building: {id}"));
            return Err(ActionError::EntityNotFound(id.to_string()));
        };
        let idx = type_id.0 as usize;
        let def = &self.registry.buildings()[idx];
        let slot = self.state.buildings[idx];

        if !slot.unlocked {
            return Err(ActionError::EntityLocked(id.to_string()));
        }
        if let Some(cap) = def.max_owned {
            if slot.owned >= cap {
                self.notifications.push(
                    Severity::Warning,
                    format!("Maximum number of {}s ({cap}) reached.", def.name),
                );
                return Err(ActionError::CapacityReached(id.to_string()));
            }
        }
        let cost = formula::building_cost(def, &self.config, slot.owned);
        if !formula::can_afford(self.state.money, cost) {
            self.notifications
                .push(Severity::Warning, format!("Not enough money for {}", def.name));
            return Err(ActionError::InsufficientFunds {
                needed: cost,
                available: self.state.money,
            });
        }

        self.state.money -= cost;
        self.state.buildings[idx].owned += 1;
        let owned = self.state.buildings[idx].owned;
        self.notifications
            .push(Severity::Success, format!("Purchased a {}", def.name));
        self.checkpoint();
        Ok(PurchaseOutcome { cost, owned })
    }

    /// Hire one unit of a staff role.
    pub fn hire_staff(&mut self, id: &str) -> Result<PurchaseOutcome, ActionError> {
        let Some(type_id) = self.registry.staff_id(id) else {
            self.notifications
                .push(Severity::Error, format!("Unknown staff role: {id}"));
            return Err(ActionError::EntityNotFound(id.to_string()));
        };
        let idx = type_id.0 as usize;
        let def = &self.registry.staff()[idx];
        let slot = self.state.staff[idx];

        if !slot.unlocked {
            return Err(ActionError::EntityLocked(id.to_string()));
        }
        let cost = formula::staff_cost(def, &self.config, slot.owned);
        if !formula::can_afford(self.state.money, cost) {
            self.notifications
                .push(Severity::Warning, format!("Not enough money for {}", def.name));
            return Err(ActionError::InsufficientFunds {
                needed: cost,
                available: self.state.money,
            });
        }

        self.state.money -= cost;
        self.state.staff[idx].owned += 1;
        let owned = self.state.staff[idx].owned;
        self.notifications
            .push(Severity::Success, format!("Hired a {}", def.name));
        self.checkpoint();
        Ok(PurchaseOutcome { cost, owned })
    }

    /// Buy a one-time upgrade and apply its effect to the global
    /// multipliers. Re-buying is a silent, idempotent no-op failure.
    pub fn purchase_upgrade(&mut self, id: &str) -> Result<UpgradeOutcome, ActionError> {
        let Some(upgrade_id) = self.registry.upgrade_id(id) else {
            self.notifications
                .push(Severity::Error, format!("Unknown upgrade: {id}"));
            return Err(ActionError::EntityNotFound(id.to_string()));
        };
        let idx = upgrade_id.0 as usize;
        let def = &self.registry.upgrades()[idx];
        let slot = self.state.upgrades[idx];

        if !slot.unlocked {
            return Err(ActionError::EntityLocked(id.to_string()));
        }
        if slot.purchased {
            // UI hides bought upgrades; no notification for this path.
            return Err(ActionError::AlreadyPurchased(id.to_string()));
        }
        let cost = def.cost;
        if !formula::can_afford(self.state.money, cost) {
            self.notifications
                .push(Severity::Warning, format!("Not enough money for {}", def.name));
            return Err(ActionError::InsufficientFunds {
                needed: cost,
                available: self.state.money,
            });
        }

        self.state.money -= cost;
        self.state.upgrades[idx].purchased = true;
        let effect = def.effect;
        match effect {
            UpgradeEffect::ClickMultiplierBonus(amount) => {
                self.state.click_multiplier += amount;
            }
            UpgradeEffect::PassiveMultiplierBonus(amount) => {
                self.state.passive_multiplier += amount;
            }
        }
        self.notifications
            .push(Severity::Success, format!("Upgrade purchased: {}", def.name));
        self.checkpoint();
        Ok(UpgradeOutcome { cost, effect })
    }

    // -----------------------------------------------------------------------
    // Reset
    // -----------------------------------------------------------------------

    /// Destroy all progress: clear the durable record and rebuild the
    /// ledger from registry defaults. The caller is responsible for
    /// confirming with the player first.
    pub fn reset(&mut self) {
        self.notifications.clear();
        if let Some(store) = self.store.as_mut() {
            if let Err(err) = store.clear() {
                self.notifications.push(
                    Severity::Error,
                    format!("Error clearing saved progress ({err})."),
                );
            }
        }
        self.state = EconomyState::initial(&self.registry, &self.config);
        self.cooldown.reset();
        self.notifications.push(Severity::Warning, "Game progress reset.");
    }

    // -----------------------------------------------------------------------
    // Progression
    // -----------------------------------------------------------------------

    /// Re-derive reputation and level from the ledger; on a level increase,
    /// apply the unlock schedule and announce the level.
    fn refresh_progression(&mut self) -> Option<u32> {
        let derived = formula::reputation_for(self.state.total_passengers, &self.config);
        self.state.reputation = derived.max(self.state.reputation);
        let new_level = formula::level_for(self.state.reputation, &self.config);
        if new_level <= self.state.level {
            return None;
        }
        self.state.level = new_level;
        self.notifications.push(
            Severity::Success,
            format!("Your airport has reached level {new_level}!"),
        );
        self.apply_unlocks();
        Some(new_level)
    }

    /// Unlock every entity gated at or below the current level. Idempotent:
    /// already-unlocked entities are skipped and get no second notification.
    fn apply_unlocks(&mut self) {
        let level = self.state.level;
        for rule in self.registry.unlocks() {
            if rule.level > level {
                break; // rules are sorted by level
            }
            for entity in &rule.entities {
                match *entity {
                    EntityRef::Building(id) => {
                        let idx = id.0 as usize;
                        if !self.state.buildings[idx].unlocked {
                            self.state.buildings[idx].unlocked = true;
                            let name = &self.registry.buildings()[idx].name;
                            self.notifications
                                .push(Severity::Info, format!("New building unlocked: {name}"));
                        }
                    }
                    EntityRef::Staff(id) => {
                        let idx = id.0 as usize;
                        if !self.state.staff[idx].unlocked {
                            self.state.staff[idx].unlocked = true;
                            let name = &self.registry.staff()[idx].name;
                            self.notifications
                                .push(Severity::Info, format!("New staff unlocked: {name}"));
                        }
                    }
                    EntityRef::Upgrade(id) => {
                        let idx = id.0 as usize;
                        if !self.state.upgrades[idx].unlocked {
                            self.state.upgrades[idx].unlocked = true;
                            let name = &self.registry.upgrades()[idx].name;
                            self.notifications
                                .push(Severity::Info, format!("New upgrade unlocked: {name}"));
                        }
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Scalar resources plus the derived display rates.
    pub fn resources(&self) -> ResourceSnapshot {
        let rates = formula::passive_yield(&self.registry, &self.state, &self.config);
        ResourceSnapshot {
            money: self.state.money,
            passengers: self.state.passengers,
            reputation: self.state.reputation,
            total_flights: self.state.total_flights,
            total_passengers: self.state.total_passengers,
            level: self.state.level,
            click_value: formula::click_yield(&self.registry, &self.state),
            money_per_tick: rates.money_per_tick,
            passengers_per_tick: rates.passengers_per_tick,
        }
    }

    /// Per-building purchase views, in registry order.
    pub fn building_views(&self) -> Vec<BuildingView> {
        self.registry
            .buildings()
            .iter()
            .zip(&self.state.buildings)
            .map(|(def, slot)| {
                let at_capacity = def.max_owned.is_some_and(|cap| slot.owned >= cap);
                let next_cost = if at_capacity {
                    None
                } else {
                    Some(formula::building_cost(def, &self.config, slot.owned))
                };
                BuildingView {
                    id: def.id.clone(),
                    name: def.name.clone(),
                    owned: slot.owned,
                    unlocked: slot.unlocked,
                    next_cost,
                    affordable: slot.unlocked
                        && next_cost.is_some_and(|c| formula::can_afford(self.state.money, c)),
                }
            })
            .collect()
    }

    /// Per-staff hire views, in registry order.
    pub fn staff_views(&self) -> Vec<StaffView> {
        self.registry
            .staff()
            .iter()
            .zip(&self.state.staff)
            .map(|(def, slot)| {
                let next_cost = formula::staff_cost(def, &self.config, slot.owned);
                StaffView {
                    id: def.id.clone(),
                    name: def.name.clone(),
                    owned: slot.owned,
                    unlocked: slot.unlocked,
                    next_cost,
                    affordable: slot.unlocked && formula::can_afford(self.state.money, next_cost),
                }
            })
            .collect()
    }

    /// Per-upgrade purchase views, in registry order.
    pub fn upgrade_views(&self) -> Vec<UpgradeView> {
        self.registry
            .upgrades()
            .iter()
            .zip(&self.state.upgrades)
            .map(|(def, slot)| UpgradeView {
                id: def.id.clone(),
                name: def.name.clone(),
                purchased: slot.purchased,
                unlocked: slot.unlocked,
                cost: def.cost,
                affordable: slot.unlocked
                    && !slot.purchased
                    && formula::can_afford(self.state.money, def.cost),
            })
            .collect()
    }

    /// Notifications, oldest to newest.
    pub fn notifications(&self) -> NotificationIter<'_> {
        self.notifications.iter()
    }

    /// The most recent notification, if any.
    pub fn latest_notification(&self) -> Option<&Notification> {
        self.notifications.iter().last()
    }
}
