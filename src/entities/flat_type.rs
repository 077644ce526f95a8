/// FlatType - the fixed set of flat type labels in the resale dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlatType {
    OneRoom,
    TwoRoom,
    ThreeRoom,
    FourRoom,
    FiveRoom,
    Executive,
    MultiGeneration,
}

impl FlatType {
    /// Dataset label, as it appears in the town/flat_type columns
    pub fn label(&self) -> &str {
        match self {
            FlatType::OneRoom => "1 ROOM",
            FlatType::TwoRoom => "2 ROOM",
            FlatType::ThreeRoom => "3 ROOM",
            FlatType::FourRoom => "4 ROOM",
            FlatType::FiveRoom => "5 ROOM",
            FlatType::Executive => "EXECUTIVE",
            FlatType::MultiGeneration => "MULTI-GENERATION",
        }
    }

    /// Sort rank: by size, room flats first, then executive and
    /// multi-generation
    pub fn rank(&self) -> u8 {
        match self {
            FlatType::OneRoom => 0,
            FlatType::TwoRoom => 1,
            FlatType::ThreeRoom => 2,
            FlatType::FourRoom => 3,
            FlatType::FiveRoom => 4,
            FlatType::Executive => 5,
            FlatType::MultiGeneration => 6,
        }
    }

    /// Parse a dataset label. The live feed has written both
    /// "MULTI-GENERATION" and "MULTI GENERATION" over the years.
    pub fn from_label(label: &str) -> Option<FlatType> {
        match label.trim().to_uppercase().as_str() {
            "1 ROOM" => Some(FlatType::OneRoom),
            "2 ROOM" => Some(FlatType::TwoRoom),
            "3 ROOM" => Some(FlatType::ThreeRoom),
            "4 ROOM" => Some(FlatType::FourRoom),
            "5 ROOM" => Some(FlatType::FiveRoom),
            "EXECUTIVE" => Some(FlatType::Executive),
            "MULTI-GENERATION" | "MULTI GENERATION" => Some(FlatType::MultiGeneration),
            _ => None,
        }
    }

    /// Rank of an arbitrary label; unknown labels sort after known ones.
    pub fn rank_of(label: &str) -> u8 {
        FlatType::from_label(label).map(|t| t.rank()).unwrap_or(u8::MAX)
    }

    pub fn all() -> [FlatType; 7] {
        [
            FlatType::OneRoom,
            FlatType::TwoRoom,
            FlatType::ThreeRoom,
            FlatType::FourRoom,
            FlatType::FiveRoom,
            FlatType::Executive,
            FlatType::MultiGeneration,
        ]
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for flat_type in FlatType::all() {
            assert_eq!(FlatType::from_label(flat_type.label()), Some(flat_type));
        }
    }

    #[test]
    fn test_from_label_case_insensitive() {
        assert_eq!(FlatType::from_label("4 room"), Some(FlatType::FourRoom));
        assert_eq!(
            FlatType::from_label("multi generation"),
            Some(FlatType::MultiGeneration)
        );
    }

    #[test]
    fn test_from_label_unknown() {
        assert_eq!(FlatType::from_label("PENTHOUSE"), None);
    }

    #[test]
    fn test_rank_ordering() {
        assert!(FlatType::ThreeRoom.rank() < FlatType::FourRoom.rank());
        assert!(FlatType::FiveRoom.rank() < FlatType::Executive.rank());
        // Unknown labels sort last
        assert!(FlatType::rank_of("PENTHOUSE") > FlatType::MultiGeneration.rank());
    }
}
