// HDB Resale Explorer - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod api;
pub mod bands;
pub mod config;
pub mod db;
pub mod entities;
pub mod export;
pub mod filter;
pub mod ingest;
pub mod stats;

// Re-export commonly used types
pub use api::DataGovClient;
pub use bands::{extract_lease_years, year_of_month, FloorLevel, LeaseBand};
pub use config::{load_config, ApiConfig, AppConfig, ServerConfig};
pub use db::{
    count_by_source, distinct_flat_types, distinct_months, distinct_towns, get_all_records,
    get_ingest_log, insert_records, log_ingest, open_database, setup_database, verify_count,
    IngestRun, ResaleRecord,
};
pub use entities::{FlatType, Region, Town, TownRegistry};
pub use export::{export_csv_bytes, export_csv_file, write_csv};
pub use filter::FilterCriteria;
pub use ingest::{load_csv, merge_sources, read_records, SourceType};
pub use stats::{
    price_distribution_by_flat_type, price_trend, town_counts, FlatTypeDistribution,
    PriceTrendPoint, TownCount,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
