// Filtering of the in-memory record table.
// Mirrors the dashboard widgets: single-select town ("All" = no
// constraint), multi-select everything else where an empty selection
// means unconstrained.

use crate::bands::{FloorLevel, LeaseBand};
use crate::db::ResaleRecord;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Single town, None = all towns
    pub town: Option<String>,
    pub flat_types: Vec<String>,
    pub floor_levels: Vec<FloorLevel>,
    pub lease_bands: Vec<LeaseBand>,
    pub years: Vec<i32>,
    pub months: Vec<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: restrict to one town
    pub fn with_town(mut self, town: impl Into<String>) -> Self {
        self.town = Some(town.into());
        self
    }

    /// Builder pattern: restrict to a set of flat types
    pub fn with_flat_types(mut self, flat_types: Vec<String>) -> Self {
        self.flat_types = flat_types;
        self
    }

    /// Builder pattern: restrict to floor bands
    pub fn with_floor_levels(mut self, floor_levels: Vec<FloorLevel>) -> Self {
        self.floor_levels = floor_levels;
        self
    }

    /// Builder pattern: restrict to remaining-lease bands
    pub fn with_lease_bands(mut self, lease_bands: Vec<LeaseBand>) -> Self {
        self.lease_bands = lease_bands;
        self
    }

    /// Builder pattern: restrict to transaction years
    pub fn with_years(mut self, years: Vec<i32>) -> Self {
        self.years = years;
        self
    }

    /// Builder pattern: restrict to "YYYY-MM" months
    pub fn with_months(mut self, months: Vec<String>) -> Self {
        self.months = months;
        self
    }

    /// True when no criterion constrains anything
    pub fn is_unconstrained(&self) -> bool {
        self.town.is_none()
            && self.flat_types.is_empty()
            && self.floor_levels.is_empty()
            && self.lease_bands.is_empty()
            && self.years.is_empty()
            && self.months.is_empty()
    }

    pub fn matches(&self, record: &ResaleRecord) -> bool {
        if let Some(town) = &self.town {
            if &record.town != town {
                return false;
            }
        }

        if !self.flat_types.is_empty() && !self.flat_types.contains(&record.flat_type) {
            return false;
        }

        if !self.floor_levels.is_empty() && !self.floor_levels.contains(&record.floor_level()) {
            return false;
        }

        if !self.lease_bands.is_empty() && !self.lease_bands.contains(&record.lease_band()) {
            return false;
        }

        if !self.years.is_empty() {
            match record.year() {
                Some(year) if self.years.contains(&year) => {}
                _ => return false,
            }
        }

        if !self.months.is_empty() && !self.months.contains(&record.month) {
            return false;
        }

        true
    }

    /// Apply all criteria, yielding the filtered copy of the table.
    pub fn apply(&self, records: &[ResaleRecord]) -> Vec<ResaleRecord> {
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }

    /// Build criteria from the dashboard's comma-separated query values.
    /// Unknown floor/lease codes are ignored rather than erroring, the
    /// widgets only ever emit known codes.
    pub fn from_query_values(
        town: Option<&str>,
        flat_types: Option<&str>,
        floors: Option<&str>,
        leases: Option<&str>,
        years: Option<&str>,
        months: Option<&str>,
    ) -> Self {
        let town = town
            .map(str::trim)
            .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("all"))
            .map(str::to_string);

        let split = |v: Option<&str>| -> Vec<String> {
            v.map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
        };

        let floor_levels = split(floors)
            .iter()
            .filter_map(|c| FloorLevel::from_code(c))
            .collect();
        let lease_bands = split(leases)
            .iter()
            .filter_map(|c| LeaseBand::from_code(c))
            .collect();
        let years = split(years)
            .iter()
            .filter_map(|y| y.parse().ok())
            .collect();

        Self {
            town,
            flat_types: split(flat_types),
            floor_levels,
            lease_bands,
            years,
            months: split(months),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::sample_record;

    fn records() -> Vec<ResaleRecord> {
        let a = sample_record(); // ANG MO KIO, 4 ROOM, 04 TO 06, 2024-11, 72yr

        let mut b = sample_record();
        b.town = "BEDOK".to_string();
        b.flat_type = "3 ROOM".to_string();
        b.storey_range = "10 TO 12".to_string();
        b.month = "2025-01".to_string();
        b.remaining_lease = "52 years 01 month".to_string();

        let mut c = sample_record();
        c.town = "ANG MO KIO".to_string();
        c.flat_type = "EXECUTIVE".to_string();
        c.storey_range = "13 TO 15".to_string();
        c.month = "2025-02".to_string();
        c.remaining_lease = "91 years".to_string();

        vec![a, b, c]
    }

    #[test]
    fn test_unconstrained_returns_all() {
        let all = records();
        let filtered = FilterCriteria::new().apply(&all);
        assert_eq!(filtered.len(), all.len());
    }

    #[test]
    fn test_filter_by_town_returns_only_that_town() {
        let filtered = FilterCriteria::new()
            .with_town("ANG MO KIO")
            .apply(&records());

        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.town == "ANG MO KIO"));
    }

    #[test]
    fn test_filter_by_flat_types() {
        let filtered = FilterCriteria::new()
            .with_flat_types(vec!["3 ROOM".to_string(), "EXECUTIVE".to_string()])
            .apply(&records());

        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.flat_type != "4 ROOM"));
    }

    #[test]
    fn test_filter_by_floor_level() {
        let filtered = FilterCriteria::new()
            .with_floor_levels(vec![FloorLevel::High])
            .apply(&records());

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].storey_range, "13 TO 15");
    }

    #[test]
    fn test_filter_by_lease_band() {
        let filtered = FilterCriteria::new()
            .with_lease_bands(vec![LeaseBand::Under60])
            .apply(&records());

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].town, "BEDOK");
    }

    #[test]
    fn test_filter_by_year_and_month() {
        let filtered = FilterCriteria::new()
            .with_years(vec![2025])
            .with_months(vec!["2025-02".to_string()])
            .apply(&records());

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].flat_type, "EXECUTIVE");
    }

    #[test]
    fn test_combined_criteria_intersect() {
        let filtered = FilterCriteria::new()
            .with_town("ANG MO KIO")
            .with_years(vec![2025])
            .apply(&records());

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].month, "2025-02");
    }

    #[test]
    fn test_from_query_values() {
        let criteria = FilterCriteria::from_query_values(
            Some("BEDOK"),
            Some("3 ROOM,4 ROOM"),
            Some("low,high"),
            Some("lt60"),
            Some("2024,2025"),
            None,
        );

        assert_eq!(criteria.town.as_deref(), Some("BEDOK"));
        assert_eq!(criteria.flat_types, vec!["3 ROOM", "4 ROOM"]);
        assert_eq!(
            criteria.floor_levels,
            vec![FloorLevel::Low, FloorLevel::High]
        );
        assert_eq!(criteria.lease_bands, vec![LeaseBand::Under60]);
        assert_eq!(criteria.years, vec![2024, 2025]);
        assert!(criteria.months.is_empty());
    }

    #[test]
    fn test_from_query_values_all_town_is_unconstrained() {
        let criteria = FilterCriteria::from_query_values(Some("All"), None, None, None, None, None);
        assert!(criteria.is_unconstrained());
    }
}
