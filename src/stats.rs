// Aggregate views over a (filtered) record table: monthly mean price,
// transactions per town, resale price distribution per flat type.

use serde::Serialize;
use std::collections::HashMap;

use crate::db::ResaleRecord;
use crate::entities::FlatType;

/// One point of the average-price time series
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceTrendPoint {
    pub month: String,
    pub avg_price: f64,
    pub count: usize,
}

/// Transactions per town
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TownCount {
    pub town: String,
    pub count: usize,
}

/// Five-number summary of resale prices for one flat type
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FlatTypeDistribution {
    pub flat_type: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Mean resale price per month, ascending by month.
pub fn price_trend(records: &[ResaleRecord]) -> Vec<PriceTrendPoint> {
    let mut by_month: HashMap<String, (f64, usize)> = HashMap::new();

    for record in records {
        let entry = by_month.entry(record.month.clone()).or_insert((0.0, 0));
        entry.0 += record.resale_price;
        entry.1 += 1;
    }

    let mut points: Vec<PriceTrendPoint> = by_month
        .into_iter()
        .map(|(month, (total, count))| PriceTrendPoint {
            month,
            avg_price: total / count as f64,
            count,
        })
        .collect();

    points.sort_by(|a, b| a.month.cmp(&b.month));
    points
}

/// Transactions per town, most active town first.
pub fn town_counts(records: &[ResaleRecord]) -> Vec<TownCount> {
    let mut by_town: HashMap<String, usize> = HashMap::new();

    for record in records {
        *by_town.entry(record.town.clone()).or_insert(0) += 1;
    }

    let mut counts: Vec<TownCount> = by_town
        .into_iter()
        .map(|(town, count)| TownCount { town, count })
        .collect();

    // Descending by count, ties alphabetical so the order is stable
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.town.cmp(&b.town)));
    counts
}

/// Price distribution per flat type, ordered by room count.
pub fn price_distribution_by_flat_type(records: &[ResaleRecord]) -> Vec<FlatTypeDistribution> {
    let mut by_type: HashMap<String, Vec<f64>> = HashMap::new();

    for record in records {
        by_type
            .entry(record.flat_type.clone())
            .or_default()
            .push(record.resale_price);
    }

    let mut distributions: Vec<FlatTypeDistribution> = by_type
        .into_iter()
        .map(|(flat_type, mut prices)| {
            prices.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let (q1, median, q3) = quartiles(&prices);

            FlatTypeDistribution {
                flat_type,
                count: prices.len(),
                min: prices[0],
                q1,
                median,
                q3,
                max: prices[prices.len() - 1],
            }
        })
        .collect();

    distributions.sort_by_key(|d| FlatType::rank_of(&d.flat_type));
    distributions
}

/// Median of a sorted slice. Callers guarantee non-empty input.
fn median_of(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Quartiles by the median-of-halves method over a sorted slice.
/// The lower half excludes the median element on odd lengths.
fn quartiles(sorted: &[f64]) -> (f64, f64, f64) {
    let median = median_of(sorted);

    if sorted.len() == 1 {
        return (sorted[0], median, sorted[0]);
    }

    let mid = sorted.len() / 2;
    let lower = &sorted[..mid];
    let upper = if sorted.len() % 2 == 0 {
        &sorted[mid..]
    } else {
        &sorted[mid + 1..]
    };

    (median_of(lower), median, median_of(upper))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::sample_record;

    fn record(month: &str, town: &str, flat_type: &str, price: f64) -> ResaleRecord {
        let mut r = sample_record();
        r.month = month.to_string();
        r.town = town.to_string();
        r.flat_type = flat_type.to_string();
        r.resale_price = price;
        r
    }

    #[test]
    fn test_price_trend_monthly_means() {
        let records = vec![
            record("2024-11", "BEDOK", "4 ROOM", 500000.0),
            record("2024-11", "BEDOK", "4 ROOM", 540000.0),
            record("2024-12", "BEDOK", "4 ROOM", 600000.0),
        ];

        let trend = price_trend(&records);

        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].month, "2024-11");
        assert_eq!(trend[0].avg_price, 520000.0);
        assert_eq!(trend[0].count, 2);
        assert_eq!(trend[1].month, "2024-12");
        assert_eq!(trend[1].avg_price, 600000.0);
    }

    #[test]
    fn test_price_trend_empty() {
        assert!(price_trend(&[]).is_empty());
    }

    #[test]
    fn test_town_counts_descending() {
        let records = vec![
            record("2024-11", "BEDOK", "4 ROOM", 500000.0),
            record("2024-11", "BEDOK", "4 ROOM", 510000.0),
            record("2024-11", "YISHUN", "4 ROOM", 450000.0),
        ];

        let counts = town_counts(&records);

        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].town, "BEDOK");
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].town, "YISHUN");
    }

    #[test]
    fn test_town_counts_tie_is_alphabetical() {
        let records = vec![
            record("2024-11", "YISHUN", "4 ROOM", 1.0),
            record("2024-11", "BEDOK", "4 ROOM", 1.0),
        ];

        let counts = town_counts(&records);
        assert_eq!(counts[0].town, "BEDOK");
        assert_eq!(counts[1].town, "YISHUN");
    }

    #[test]
    fn test_quartiles_odd_length() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        let (q1, median, q3) = quartiles(&sorted);

        assert_eq!(median, 3.0);
        assert_eq!(q1, 1.5);
        assert_eq!(q3, 4.5);
    }

    #[test]
    fn test_quartiles_even_length() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        let (q1, median, q3) = quartiles(&sorted);

        assert_eq!(median, 2.5);
        assert_eq!(q1, 1.5);
        assert_eq!(q3, 3.5);
    }

    #[test]
    fn test_distribution_by_flat_type_ordered_by_rank() {
        let records = vec![
            record("2024-11", "BEDOK", "EXECUTIVE", 800000.0),
            record("2024-11", "BEDOK", "3 ROOM", 380000.0),
            record("2024-11", "BEDOK", "3 ROOM", 400000.0),
            record("2024-11", "BEDOK", "4 ROOM", 545000.0),
        ];

        let distributions = price_distribution_by_flat_type(&records);

        let order: Vec<&str> = distributions.iter().map(|d| d.flat_type.as_str()).collect();
        assert_eq!(order, vec!["3 ROOM", "4 ROOM", "EXECUTIVE"]);

        assert_eq!(distributions[0].count, 2);
        assert_eq!(distributions[0].min, 380000.0);
        assert_eq!(distributions[0].max, 400000.0);
        assert_eq!(distributions[0].median, 390000.0);
    }

    #[test]
    fn test_distribution_single_record() {
        let records = vec![record("2024-11", "BEDOK", "4 ROOM", 545000.0)];
        let distributions = price_distribution_by_flat_type(&records);

        assert_eq!(distributions.len(), 1);
        let d = &distributions[0];
        assert_eq!(d.min, d.max);
        assert_eq!(d.q1, 545000.0);
        assert_eq!(d.q3, 545000.0);
        assert_eq!(d.median, 545000.0);
    }

    #[test]
    fn test_distribution_empty() {
        assert!(price_distribution_by_flat_type(&[]).is_empty());
    }
}
