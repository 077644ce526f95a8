// data.gov.sg datastore client for the live resale feed.
// The datastore_search endpoint pages with offset/limit and types every
// record field as a string; rows are coerced into ResaleRecord here.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::bands;
use crate::config::ApiConfig;
use crate::db::ResaleRecord;

/// Envelope returned by /api/action/datastore_search
#[derive(Debug, Deserialize)]
pub struct DatastoreResponse {
    pub success: bool,
    pub result: Option<DatastoreResult>,
}

#[derive(Debug, Deserialize)]
pub struct DatastoreResult {
    pub records: Vec<ApiRecord>,
    pub total: usize,
}

/// One row as the datastore returns it - every field a string.
#[derive(Debug, Deserialize)]
pub struct ApiRecord {
    #[serde(rename = "_id")]
    pub id: i64,
    pub month: String,
    pub town: String,
    pub flat_type: String,
    pub block: String,
    pub street_name: String,
    pub storey_range: String,
    pub floor_area_sqm: String,
    pub flat_model: String,
    pub lease_commence_date: String,
    pub remaining_lease: String,
    pub resale_price: String,
}

impl ApiRecord {
    /// Coerce the string-typed API row into the shared record type.
    pub fn into_record(self) -> Result<ResaleRecord> {
        let floor_area_sqm: f64 = self
            .floor_area_sqm
            .trim()
            .parse()
            .with_context(|| format!("Bad floor_area_sqm in API row {}", self.id))?;
        let lease_commence_date: i32 = self
            .lease_commence_date
            .trim()
            .parse()
            .with_context(|| format!("Bad lease_commence_date in API row {}", self.id))?;
        let resale_price: f64 = self
            .resale_price
            .trim()
            .parse()
            .with_context(|| format!("Bad resale_price in API row {}", self.id))?;

        Ok(ResaleRecord {
            month: self.month,
            town: self.town,
            flat_type: self.flat_type,
            block: self.block,
            street_name: self.street_name,
            storey_range: self.storey_range,
            floor_area_sqm,
            flat_model: self.flat_model,
            lease_commence_date,
            remaining_lease: self.remaining_lease,
            resale_price,
        })
    }
}

pub struct DataGovClient {
    client: reqwest::blocking::Client,
    config: ApiConfig,
}

impl DataGovClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("hdb-resale/0.1")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, config })
    }

    fn page_url(&self, offset: usize) -> String {
        format!(
            "{}/api/action/datastore_search?resource_id={}&limit={}&offset={}",
            self.config.base_url, self.config.resource_id, self.config.page_size, offset
        )
    }

    fn fetch_page(&self, offset: usize) -> Result<DatastoreResult> {
        let url = self.page_url(offset);

        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("Request failed: {}", url))?;

        if !response.status().is_success() {
            bail!("datastore_search returned HTTP {}", response.status());
        }

        let envelope: DatastoreResponse = response
            .json()
            .context("Failed to deserialize datastore response")?;

        if !envelope.success {
            bail!("datastore_search reported success=false");
        }

        envelope
            .result
            .context("datastore_search response missing result")
    }

    /// Fetch the whole resource, page by page, until `total` rows arrived.
    pub fn fetch_all(&self) -> Result<Vec<ResaleRecord>> {
        let mut records = Vec::new();
        let mut offset = 0;

        loop {
            let page = self.fetch_page(offset)?;
            let page_len = page.records.len();

            info!(
                offset,
                page_len,
                total = page.total,
                "fetched datastore page"
            );

            for api_record in page.records {
                match api_record.into_record() {
                    Ok(record) => records.push(record),
                    // A single bad row should not sink the whole fetch
                    Err(e) => warn!("skipping malformed API row: {:#}", e),
                }
            }

            offset += page_len;
            if page_len == 0 || offset >= page.total {
                break;
            }
        }

        Ok(records)
    }

    /// Fetch the resource and keep only transactions from `year` onward.
    pub fn fetch_since_year(&self, year: i32) -> Result<Vec<ResaleRecord>> {
        let mut records = self.fetch_all()?;
        records.retain(|r| bands::year_of_month(&r.month).map_or(false, |y| y >= year));
        Ok(records)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "help": "https://data.gov.sg/api/3/action/help_show?name=datastore_search",
        "success": true,
        "result": {
            "resource_id": "d_8b84c4ee58e3cfc0ece0d773c8ca6abc",
            "records": [
                {
                    "_id": 1,
                    "month": "2025-01",
                    "town": "ANG MO KIO",
                    "flat_type": "4 ROOM",
                    "block": "318B",
                    "street_name": "ANG MO KIO AVE 1",
                    "storey_range": "04 TO 06",
                    "floor_area_sqm": "92",
                    "flat_model": "Model A",
                    "lease_commence_date": "1998",
                    "remaining_lease": "72 years 04 months",
                    "resale_price": "545000"
                }
            ],
            "total": 1,
            "limit": 100,
            "offset": 0
        }
    }"#;

    #[test]
    fn test_envelope_deserialization() {
        let envelope: DatastoreResponse = serde_json::from_str(FIXTURE).unwrap();

        assert!(envelope.success);
        let result = envelope.result.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].town, "ANG MO KIO");
    }

    #[test]
    fn test_api_record_coercion() {
        let envelope: DatastoreResponse = serde_json::from_str(FIXTURE).unwrap();
        let api_record = envelope.result.unwrap().records.remove(0);

        let record = api_record.into_record().unwrap();
        assert_eq!(record.month, "2025-01");
        assert_eq!(record.floor_area_sqm, 92.0);
        assert_eq!(record.lease_commence_date, 1998);
        assert_eq!(record.resale_price, 545000.0);
    }

    #[test]
    fn test_api_record_rejects_bad_price() {
        let api_record = ApiRecord {
            id: 2,
            month: "2025-01".to_string(),
            town: "BEDOK".to_string(),
            flat_type: "3 ROOM".to_string(),
            block: "112".to_string(),
            street_name: "BEDOK NTH ST 2".to_string(),
            storey_range: "07 TO 09".to_string(),
            floor_area_sqm: "67".to_string(),
            flat_model: "New Generation".to_string(),
            lease_commence_date: "1978".to_string(),
            remaining_lease: "52 years 01 month".to_string(),
            resale_price: "not a price".to_string(),
        };

        assert!(api_record.into_record().is_err());
    }

    #[test]
    fn test_page_url() {
        let client = DataGovClient::new(ApiConfig::default()).unwrap();
        let url = client.page_url(500);

        assert!(url.starts_with("https://data.gov.sg/api/action/datastore_search"));
        assert!(url.contains("offset=500"));
        assert!(url.contains("resource_id="));
    }
}
