//! Raw deserialization structs mirroring the RON content format.
//!
//! These are the on-disk shapes only; [`crate::loader`] resolves them into
//! a validated [`aerodrome_core::registry::Registry`]. Most fields default,
//! so content files only spell out what deviates from a plain entity.

use aerodrome_core::registry::UpgradeEffect;
use serde::Deserialize;

fn default_true() -> bool {
    true
}

/// One building template as written in content files.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildingData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_cost: f64,
    /// Overrides the category default cost curve when set.
    #[serde(default)]
    pub cost_scaling: Option<f64>,
    #[serde(default)]
    pub money_per_tick: f64,
    #[serde(default)]
    pub passengers_per_tick: f64,
    #[serde(default)]
    pub click_boost: f64,
    #[serde(default)]
    pub boost_efficiency: f64,
    #[serde(default = "default_true")]
    pub unlocked: bool,
    #[serde(default)]
    pub max_owned: Option<u32>,
}

/// One staff role as written in content files.
#[derive(Debug, Clone, Deserialize)]
pub struct StaffData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_cost: f64,
    #[serde(default)]
    pub cost_scaling: Option<f64>,
    #[serde(default)]
    pub click_bonus: f64,
    #[serde(default)]
    pub passive_bonus: f64,
    #[serde(default = "default_true")]
    pub unlocked: bool,
}

/// One upgrade as written in content files. The effect enum is shared with
/// the core crate, so content names variants directly.
#[derive(Debug, Clone, Deserialize)]
pub struct UpgradeData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cost: f64,
    pub effect: UpgradeEffect,
    #[serde(default = "default_true")]
    pub unlocked: bool,
}

/// One unlock rule, referencing entities by string id.
#[derive(Debug, Clone, Deserialize)]
pub struct UnlockData {
    pub level: u32,
    #[serde(default)]
    pub buildings: Vec<String>,
    #[serde(default)]
    pub staff: Vec<String>,
    #[serde(default)]
    pub upgrades: Vec<String>,
}

/// A complete content document.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    #[serde(default)]
    pub buildings: Vec<BuildingData>,
    #[serde(default)]
    pub staff: Vec<StaffData>,
    #[serde(default)]
    pub upgrades: Vec<UpgradeData>,
    #[serde(default)]
    pub unlocks: Vec<UnlockData>,
}
