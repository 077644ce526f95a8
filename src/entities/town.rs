use std::collections::HashMap;

/// Region - broad HDB planning regions used to group towns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Central,
    East,
    North,
    NorthEast,
    West,
}

impl Region {
    pub fn name(&self) -> &str {
        match self {
            Region::Central => "Central",
            Region::East => "East",
            Region::North => "North",
            Region::NorthEast => "North-East",
            Region::West => "West",
        }
    }
}

/// One HDB town as it appears in the dataset's town column.
#[derive(Debug, Clone, PartialEq)]
pub struct Town {
    pub name: &'static str,
    pub region: Region,
}

/// The 26 towns with resale transactions, keyed by dataset label.
static TOWNS: &[(&str, Region)] = &[
    ("ANG MO KIO", Region::NorthEast),
    ("BEDOK", Region::East),
    ("BISHAN", Region::Central),
    ("BUKIT BATOK", Region::West),
    ("BUKIT MERAH", Region::Central),
    ("BUKIT PANJANG", Region::West),
    ("BUKIT TIMAH", Region::Central),
    ("CENTRAL AREA", Region::Central),
    ("CHOA CHU KANG", Region::West),
    ("CLEMENTI", Region::West),
    ("GEYLANG", Region::Central),
    ("HOUGANG", Region::NorthEast),
    ("JURONG EAST", Region::West),
    ("JURONG WEST", Region::West),
    ("KALLANG/WHAMPOA", Region::Central),
    ("MARINE PARADE", Region::Central),
    ("PASIR RIS", Region::East),
    ("PUNGGOL", Region::NorthEast),
    ("QUEENSTOWN", Region::Central),
    ("SEMBAWANG", Region::North),
    ("SENGKANG", Region::NorthEast),
    ("SERANGOON", Region::NorthEast),
    ("TAMPINES", Region::East),
    ("TOA PAYOH", Region::Central),
    ("WOODLANDS", Region::North),
    ("YISHUN", Region::North),
];

/// Registry of known towns with case-insensitive lookup.
pub struct TownRegistry {
    by_name: HashMap<String, Town>,
}

impl TownRegistry {
    pub fn new() -> Self {
        let mut by_name = HashMap::new();
        for (name, region) in TOWNS {
            by_name.insert(
                name.to_string(),
                Town {
                    name,
                    region: *region,
                },
            );
        }
        Self { by_name }
    }

    pub fn lookup(&self, name: &str) -> Option<&Town> {
        self.by_name.get(name.trim().to_uppercase().as_str())
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Region for a town label, Unknown towns get no region.
    pub fn region_of(&self, name: &str) -> Option<Region> {
        self.lookup(name).map(|t| t.region)
    }

    /// All towns sorted by name, the filter-widget order.
    pub fn all(&self) -> Vec<&Town> {
        let mut towns: Vec<&Town> = self.by_name.values().collect();
        towns.sort_by_key(|t| t.name);
        towns
    }

    pub fn towns_in_region(&self, region: Region) -> Vec<&Town> {
        let mut towns: Vec<&Town> = self
            .by_name
            .values()
            .filter(|t| t.region == region)
            .collect();
        towns.sort_by_key(|t| t.name);
        towns
    }
}

impl Default for TownRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_26_towns() {
        let registry = TownRegistry::new();
        assert_eq!(registry.all().len(), 26);
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let registry = TownRegistry::new();

        let town = registry.lookup("ang mo kio").unwrap();
        assert_eq!(town.name, "ANG MO KIO");
        assert_eq!(town.region, Region::NorthEast);
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = TownRegistry::new();
        assert!(registry.lookup("GOTHAM").is_none());
        assert!(!registry.is_known("GOTHAM"));
    }

    #[test]
    fn test_all_sorted_by_name() {
        let registry = TownRegistry::new();
        let names: Vec<&str> = registry.all().iter().map(|t| t.name).collect();

        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names[0], "ANG MO KIO");
    }

    #[test]
    fn test_towns_in_region() {
        let registry = TownRegistry::new();
        let east = registry.towns_in_region(Region::East);

        let names: Vec<&str> = east.iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["BEDOK", "PASIR RIS", "TAMPINES"]);
    }
}
