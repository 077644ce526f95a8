// CSV ingest and source tagging.
// Two fixed sources share one schema: the historical CSV extract and
// the live data.gov.sg feed (see api.rs for the latter).

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use crate::db::ResaleRecord;

/// SourceType - identifies where a batch of records came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    HistoricalCsv,
    DataGovSg,
}

impl SourceType {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            SourceType::HistoricalCsv => "Historical CSV (2017-2024)",
            SourceType::DataGovSg => "data.gov.sg live feed",
        }
    }

    /// Short code stored in the source column
    pub fn code(&self) -> &str {
        match self {
            SourceType::HistoricalCsv => "historical_csv",
            SourceType::DataGovSg => "data_gov_sg",
        }
    }
}

/// Deserialize resale records from any CSV reader.
/// Headers must match the dataset schema (month, town, flat_type, ...).
pub fn read_records<R: Read>(reader: R) -> Result<Vec<ResaleRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let mut records = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let record: ResaleRecord =
            result.with_context(|| format!("Failed to deserialize record at line {}", line + 2))?;
        records.push(record);
    }

    Ok(records)
}

pub fn load_csv(csv_path: &Path) -> Result<Vec<ResaleRecord>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file: {}", csv_path.display()))?;
    read_records(file)
}

/// Concatenate the two sources into the full dataset.
/// Row count is the sum of both inputs; dedup happens at insert time,
/// not here.
pub fn merge_sources(
    historical: Vec<ResaleRecord>,
    live: Vec<ResaleRecord>,
) -> Vec<ResaleRecord> {
    let mut merged = historical;
    merged.extend(live);
    merged
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::sample_record;

    const SAMPLE_CSV: &str = "\
month,town,flat_type,block,street_name,storey_range,floor_area_sqm,flat_model,lease_commence_date,remaining_lease,resale_price
2024-11,ANG MO KIO,4 ROOM,318B,ANG MO KIO AVE 1,04 TO 06,92,Model A,1998,72 years 04 months,545000
2024-12,BEDOK,3 ROOM,112,BEDOK NTH ST 2,07 TO 09,67,New Generation,1978,52 years 01 month,380000
";

    #[test]
    fn test_read_records_from_csv() {
        let records = read_records(SAMPLE_CSV.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].town, "ANG MO KIO");
        assert_eq!(records[0].floor_area_sqm, 92.0);
        assert_eq!(records[1].flat_type, "3 ROOM");
        assert_eq!(records[1].resale_price, 380000.0);
    }

    #[test]
    fn test_read_records_rejects_bad_row() {
        let csv = "\
month,town,flat_type,block,street_name,storey_range,floor_area_sqm,flat_model,lease_commence_date,remaining_lease,resale_price
2024-11,ANG MO KIO,4 ROOM,318B,ANG MO KIO AVE 1,04 TO 06,not_a_number,Model A,1998,72 years,545000
";
        assert!(read_records(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_merge_sources_row_count() {
        let historical = read_records(SAMPLE_CSV.as_bytes()).unwrap();
        let live = vec![sample_record(), sample_record()];

        let expected = historical.len() + live.len();
        let merged = merge_sources(historical, live);

        assert_eq!(merged.len(), expected);
    }

    #[test]
    fn test_merge_sources_preserves_order() {
        let historical = read_records(SAMPLE_CSV.as_bytes()).unwrap();
        let mut live = vec![sample_record()];
        live[0].month = "2025-01".to_string();

        let merged = merge_sources(historical, live);

        assert_eq!(merged[0].month, "2024-11");
        assert_eq!(merged[2].month, "2025-01");
    }

    #[test]
    fn test_source_type_names() {
        assert_eq!(SourceType::HistoricalCsv.code(), "historical_csv");
        assert_eq!(SourceType::DataGovSg.code(), "data_gov_sg");
        assert_eq!(SourceType::DataGovSg.name(), "data.gov.sg live feed");
    }
}
