use serde::{Deserialize, Serialize};

/// Identifies a building template in the registry. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingTypeId(pub u32);

/// Identifies a staff role in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffTypeId(pub u32);

/// Identifies a one-time upgrade in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpgradeId(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_compare_by_value() {
        assert_eq!(BuildingTypeId(0), BuildingTypeId(0));
        assert_ne!(BuildingTypeId(0), BuildingTypeId(1));
        assert_eq!(StaffTypeId(3), StaffTypeId(3));
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(BuildingTypeId(0), "runway");
        map.insert(BuildingTypeId(1), "terminal");
        assert_eq!(map[&BuildingTypeId(0)], "runway");
    }
}
