//! Read-only query API for the rendering collaborator.
//!
//! Owned snapshot types aggregating engine state into convenient views.
//! All types are copies -- no references into internal engine storage --
//! so a renderer can hold them across frames.

// ---------------------------------------------------------------------------
// Resource snapshot
// ---------------------------------------------------------------------------

/// Current scalar resources plus the derived display rates.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSnapshot {
    pub money: f64,
    pub passengers: f64,
    pub reputation: u64,
    pub total_flights: u64,
    pub total_passengers: f64,
    pub level: u32,
    /// What one click would currently earn.
    pub click_value: f64,
    pub money_per_tick: f64,
    pub passengers_per_tick: f64,
}

// ---------------------------------------------------------------------------
// Entity views
// ---------------------------------------------------------------------------

/// Purchase-relevant view of one building template.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingView {
    pub id: String,
    pub name: String,
    pub owned: u32,
    pub unlocked: bool,
    /// Cost of the next unit; `None` once `max_owned` is reached.
    pub next_cost: Option<f64>,
    /// Whether a purchase would currently succeed.
    pub affordable: bool,
}

/// Hire-relevant view of one staff role.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffView {
    pub id: String,
    pub name: String,
    pub owned: u32,
    pub unlocked: bool,
    pub next_cost: f64,
    pub affordable: bool,
}

/// Purchase-relevant view of one upgrade.
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeView {
    pub id: String,
    pub name: String,
    pub purchased: bool,
    pub unlocked: bool,
    pub cost: f64,
    /// False once purchased, regardless of funds.
    pub affordable: bool,
}
