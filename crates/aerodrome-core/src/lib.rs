//! Aerodrome Core -- the economy engine for airport management idle games.
//!
//! This crate provides the progression formulas, transaction processing,
//! notification log, and persistence codec that an airport clicker game
//! depends on. It is strictly headless: rendering code drives the engine
//! through actions and reads state back through the query API.
//!
//! # Control Flow
//!
//! Two invocation sources feed the engine, both on a single thread:
//!
//! 1. **User actions** -- [`engine::Engine::click`] and the purchase/hire/
//!    upgrade transactions, arriving at unpredictable times.
//! 2. **Tick driver** -- [`engine::Engine::tick`] at a fixed 1 Hz cadence,
//!    applying passive yield and scheduling periodic checkpoints.
//!
//! Every action is a single atomic unit of work: preconditions are checked
//! in order, the first failure aborts with a named error and no state
//! change, and success applies the full effect before returning.
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- Owns all mutable state and processes actions.
//! - [`registry::Registry`] -- Immutable catalog of buildings, staff, and
//!   upgrades (frozen at startup).
//! - [`state::EconomyState`] -- The mutable resource ledger.
//! - [`formula`] -- Pure progression math: costs, yields, reputation, level.
//! - [`notify::NotificationLog`] -- Severity-tagged ring buffer read by the
//!   rendering collaborator.
//! - [`persist`] -- Versioned save record with id-keyed reconciliation and
//!   the [`persist::SaveStore`] storage seam.

pub mod engine;
pub mod formula;
pub mod id;
pub mod notify;
pub mod persist;
pub mod query;
pub mod registry;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
