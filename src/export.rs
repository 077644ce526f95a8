// CSV export of a filtered view. The download must round-trip: reading
// the exported bytes back yields the same row set.

use anyhow::{Context, Result};
use std::io::Write;

use crate::db::ResaleRecord;

/// Serialize records as CSV with the dataset's headers.
pub fn write_csv<W: Write>(records: &[ResaleRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    for record in records {
        wtr.serialize(record)
            .context("Failed to serialize record to CSV")?;
    }

    wtr.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

/// Export to an in-memory buffer, for the download endpoint.
pub fn export_csv_bytes(records: &[ResaleRecord]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(records, &mut buffer)?;
    Ok(buffer)
}

/// Export to a file on disk.
pub fn export_csv_file(records: &[ResaleRecord], path: &std::path::Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    write_csv(records, file)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::sample_record;
    use crate::ingest::read_records;

    #[test]
    fn test_export_round_trips() {
        let mut other = sample_record();
        other.town = "BEDOK".to_string();
        other.resale_price = 380000.0;
        let records = vec![sample_record(), other];

        let bytes = export_csv_bytes(&records).unwrap();
        let parsed = read_records(bytes.as_slice()).unwrap();

        assert_eq!(parsed, records);
    }

    #[test]
    fn test_export_has_headers() {
        let bytes = export_csv_bytes(&[sample_record()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let header = text.lines().next().unwrap();
        assert!(header.starts_with("month,town,flat_type"));
        assert!(header.ends_with("resale_price"));
    }

    #[test]
    fn test_export_empty_is_valid() {
        let bytes = export_csv_bytes(&[]).unwrap();
        let parsed = read_records(bytes.as_slice()).unwrap();
        assert!(parsed.is_empty());
    }
}
