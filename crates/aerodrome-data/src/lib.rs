//! Data-driven content for the aerodrome engine: the RON schema, the
//! loader that resolves it into a registry, and the bundled default
//! airport content set.

pub mod loader;
pub mod schema;

pub use loader::{load_content, DataLoadError};

use aerodrome_core::registry::Registry;

/// The content document compiled into this crate.
pub const DEFAULT_CONTENT: &str = include_str!("../data/airport.ron");

/// Build the registry for the bundled airport content set.
pub fn default_registry() -> Result<Registry, DataLoadError> {
    load_content(DEFAULT_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_content_loads() {
        let reg = default_registry().unwrap();
        assert_eq!(reg.building_count(), 5);
        assert_eq!(reg.staff_count(), 3);
        assert_eq!(reg.upgrade_count(), 2);
    }

    #[test]
    fn bundled_runway_is_capped() {
        let reg = default_registry().unwrap();
        let runway = reg.get_building(reg.building_id("runway").unwrap()).unwrap();
        assert_eq!(runway.max_owned, Some(8));
        assert_eq!(runway.cost_scaling, Some(2.5));
    }

    #[test]
    fn bundled_unlock_schedule_is_sorted() {
        let reg = default_registry().unwrap();
        let levels: Vec<u32> = reg.unlocks().iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![2, 3]);
    }

    #[test]
    fn level_gated_entities_start_locked() {
        let reg = default_registry().unwrap();
        for id in ["control-tower", "parking-garage"] {
            let def = reg.get_building(reg.building_id(id).unwrap()).unwrap();
            assert!(!def.start_unlocked, "{id} should start locked");
        }
        let mechanic = reg.get_staff(reg.staff_id("mechanic").unwrap()).unwrap();
        assert!(!mechanic.start_unlocked);
    }
}
