// Derived bands for filtering: storey range → floor level,
// remaining lease text → lease bucket, month string → year.

/// FloorLevel - band from the storey range midpoint
///
/// "04 TO 06" averages 5 → Low. Malformed input never errors, it lands
/// in Unknown so the row still shows up under an explicit bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FloorLevel {
    Low,
    Mid,
    High,
    Unknown,
}

impl FloorLevel {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            FloorLevel::Low => "Low floor (01-05)",
            FloorLevel::Mid => "Mid floor (06-11)",
            FloorLevel::High => "High floor (12+)",
            FloorLevel::Unknown => "Unknown",
        }
    }

    /// Short code for query parameters
    pub fn code(&self) -> &str {
        match self {
            FloorLevel::Low => "low",
            FloorLevel::Mid => "mid",
            FloorLevel::High => "high",
            FloorLevel::Unknown => "unknown",
        }
    }

    pub fn from_code(code: &str) -> Option<FloorLevel> {
        match code.trim().to_lowercase().as_str() {
            "low" => Some(FloorLevel::Low),
            "mid" => Some(FloorLevel::Mid),
            "high" => Some(FloorLevel::High),
            "unknown" => Some(FloorLevel::Unknown),
            _ => None,
        }
    }

    /// Categorize a storey range string ("04 TO 06") by its average floor.
    pub fn from_storey_range(storey_range: &str) -> FloorLevel {
        let mut parts = storey_range.split(" TO ");

        let start: f64 = match parts.next().and_then(|s| s.trim().parse().ok()) {
            Some(v) => v,
            None => return FloorLevel::Unknown,
        };
        let end: f64 = match parts.next().and_then(|s| s.trim().parse().ok()) {
            Some(v) => v,
            None => return FloorLevel::Unknown,
        };

        let avg = (start + end) / 2.0;
        if avg <= 5.0 {
            FloorLevel::Low
        } else if avg <= 11.0 {
            FloorLevel::Mid
        } else {
            FloorLevel::High
        }
    }

    /// Display order for filter widgets
    pub fn all() -> [FloorLevel; 3] {
        [FloorLevel::Low, FloorLevel::Mid, FloorLevel::High]
    }
}

/// LeaseBand - remaining-lease bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LeaseBand {
    Under60,
    From60To69,
    From70To79,
    From80To89,
    Over90,
    Unknown,
}

impl LeaseBand {
    pub fn name(&self) -> &str {
        match self {
            LeaseBand::Under60 => "<60 years",
            LeaseBand::From60To69 => "60-69 years",
            LeaseBand::From70To79 => "70-79 years",
            LeaseBand::From80To89 => "80-89 years",
            LeaseBand::Over90 => "90+ years",
            LeaseBand::Unknown => "Unknown",
        }
    }

    pub fn code(&self) -> &str {
        match self {
            LeaseBand::Under60 => "lt60",
            LeaseBand::From60To69 => "60-69",
            LeaseBand::From70To79 => "70-79",
            LeaseBand::From80To89 => "80-89",
            LeaseBand::Over90 => "90plus",
            LeaseBand::Unknown => "unknown",
        }
    }

    pub fn from_code(code: &str) -> Option<LeaseBand> {
        match code.trim().to_lowercase().as_str() {
            "lt60" => Some(LeaseBand::Under60),
            "60-69" => Some(LeaseBand::From60To69),
            "70-79" => Some(LeaseBand::From70To79),
            "80-89" => Some(LeaseBand::From80To89),
            "90plus" => Some(LeaseBand::Over90),
            "unknown" => Some(LeaseBand::Unknown),
            _ => None,
        }
    }

    /// Bucket the remaining lease years
    pub fn from_years(years: Option<u32>) -> LeaseBand {
        match years {
            None => LeaseBand::Unknown,
            Some(y) if y < 60 => LeaseBand::Under60,
            Some(y) if y < 70 => LeaseBand::From60To69,
            Some(y) if y < 80 => LeaseBand::From70To79,
            Some(y) if y < 90 => LeaseBand::From80To89,
            Some(_) => LeaseBand::Over90,
        }
    }

    /// Display order for filter widgets (ascending lease)
    pub fn all() -> [LeaseBand; 5] {
        [
            LeaseBand::Under60,
            LeaseBand::From60To69,
            LeaseBand::From70To79,
            LeaseBand::From80To89,
            LeaseBand::Over90,
        ]
    }
}

/// Extract whole years from a remaining-lease string.
///
/// The dataset writes "61 years 04 months" or "99 years"; only the
/// leading year count matters for banding.
pub fn extract_lease_years(lease_text: &str) -> Option<u32> {
    let before_year = lease_text.split("year").next()?;
    before_year.trim().parse().ok()
}

/// Year component of a "YYYY-MM" month string
pub fn year_of_month(month: &str) -> Option<i32> {
    month.split('-').next()?.trim().parse().ok()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_level_low() {
        // avg 2 and the boundary avg 5 are both Low
        assert_eq!(FloorLevel::from_storey_range("01 TO 03"), FloorLevel::Low);
        assert_eq!(FloorLevel::from_storey_range("04 TO 06"), FloorLevel::Low);
    }

    #[test]
    fn test_floor_level_mid() {
        assert_eq!(FloorLevel::from_storey_range("06 TO 08"), FloorLevel::Mid);
        // avg 11 is the upper Mid boundary
        assert_eq!(FloorLevel::from_storey_range("10 TO 12"), FloorLevel::Mid);
    }

    #[test]
    fn test_floor_level_high() {
        assert_eq!(FloorLevel::from_storey_range("13 TO 15"), FloorLevel::High);
        assert_eq!(FloorLevel::from_storey_range("40 TO 42"), FloorLevel::High);
    }

    #[test]
    fn test_floor_level_malformed() {
        assert_eq!(FloorLevel::from_storey_range(""), FloorLevel::Unknown);
        assert_eq!(FloorLevel::from_storey_range("GROUND"), FloorLevel::Unknown);
        assert_eq!(FloorLevel::from_storey_range("04 TO SKY"), FloorLevel::Unknown);
    }

    #[test]
    fn test_floor_level_codes_round_trip() {
        for level in FloorLevel::all() {
            assert_eq!(FloorLevel::from_code(level.code()), Some(level));
        }
    }

    #[test]
    fn test_extract_lease_years() {
        assert_eq!(extract_lease_years("61 years 04 months"), Some(61));
        assert_eq!(extract_lease_years("99 years"), Some(99));
        assert_eq!(extract_lease_years("1 year 1 month"), Some(1));
    }

    #[test]
    fn test_extract_lease_years_malformed() {
        assert_eq!(extract_lease_years(""), None);
        assert_eq!(extract_lease_years("freehold"), None);
    }

    #[test]
    fn test_lease_band_boundaries() {
        assert_eq!(LeaseBand::from_years(Some(59)), LeaseBand::Under60);
        assert_eq!(LeaseBand::from_years(Some(60)), LeaseBand::From60To69);
        assert_eq!(LeaseBand::from_years(Some(69)), LeaseBand::From60To69);
        assert_eq!(LeaseBand::from_years(Some(70)), LeaseBand::From70To79);
        assert_eq!(LeaseBand::from_years(Some(89)), LeaseBand::From80To89);
        assert_eq!(LeaseBand::from_years(Some(90)), LeaseBand::Over90);
        assert_eq!(LeaseBand::from_years(None), LeaseBand::Unknown);
    }

    #[test]
    fn test_lease_band_codes_round_trip() {
        for band in LeaseBand::all() {
            assert_eq!(LeaseBand::from_code(band.code()), Some(band));
        }
    }

    #[test]
    fn test_year_of_month() {
        assert_eq!(year_of_month("2024-11"), Some(2024));
        assert_eq!(year_of_month("2017-01"), Some(2017));
        assert_eq!(year_of_month("nonsense"), None);
    }
}
