// HDB Resale Explorer - Web Dashboard Server

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::error;

use hdb_resale::bands::{FloorLevel, LeaseBand};
use hdb_resale::db::{self, ResaleRecord};
use hdb_resale::entities::TownRegistry;
use hdb_resale::export::export_csv_bytes;
use hdb_resale::filter::FilterCriteria;
use hdb_resale::stats;
use hdb_resale::ingest::SourceType;
use hdb_resale::{load_config, AppConfig};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

/// Filter query parameters shared by record and stats endpoints.
/// Multi-valued criteria arrive comma-separated ("floors=low,mid").
#[derive(Debug, Default, Deserialize)]
struct FilterQuery {
    town: Option<String>,
    flat_types: Option<String>,
    floors: Option<String>,
    leases: Option<String>,
    years: Option<String>,
    months: Option<String>,
}

impl FilterQuery {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria::from_query_values(
            self.town.as_deref(),
            self.flat_types.as_deref(),
            self.floors.as_deref(),
            self.leases.as_deref(),
            self.years.as_deref(),
            self.months.as_deref(),
        )
    }
}

/// Record response (adds derived bands for display)
#[derive(Serialize)]
struct RecordResponse {
    month: String,
    town: String,
    flat_type: String,
    block: String,
    street_name: String,
    storey_range: String,
    floor_level: String,
    floor_area_sqm: f64,
    flat_model: String,
    lease_commence_date: i32,
    remaining_lease: String,
    lease_band: String,
    resale_price: f64,
}

impl From<ResaleRecord> for RecordResponse {
    fn from(record: ResaleRecord) -> Self {
        let floor_level = record.floor_level().name().to_string();
        let lease_band = record.lease_band().name().to_string();
        Self {
            month: record.month,
            town: record.town,
            flat_type: record.flat_type,
            block: record.block,
            street_name: record.street_name,
            storey_range: record.storey_range,
            floor_level,
            floor_area_sqm: record.floor_area_sqm,
            flat_model: record.flat_model,
            lease_commence_date: record.lease_commence_date,
            remaining_lease: record.remaining_lease,
            lease_band,
            resale_price: record.resale_price,
        }
    }
}

/// Options payload populating the dashboard's filter widgets
#[derive(Serialize)]
struct OptionsResponse {
    towns: Vec<TownOption>,
    flat_types: Vec<String>,
    floor_levels: Vec<BandOption>,
    lease_bands: Vec<BandOption>,
    years: Vec<i32>,
    months: Vec<String>,
}

#[derive(Serialize)]
struct TownOption {
    name: String,
    region: String,
}

#[derive(Serialize)]
struct BandOption {
    code: String,
    name: String,
}

/// Per-source freshness summary
#[derive(Serialize)]
struct SourceResponse {
    source: String,
    name: String,
    record_count: i64,
    last_ingest: Option<String>,
}

// ============================================================================
// Helpers
// ============================================================================

/// Read the full table and apply the request's filter criteria.
fn filtered_records(state: &AppState, query: &FilterQuery) -> anyhow::Result<Vec<ResaleRecord>> {
    let conn = state.db.lock().unwrap();
    let records = db::get_all_records(&conn)?;
    Ok(query.criteria().apply(&records))
}

fn internal_error<T: Serialize>(context: &str, e: anyhow::Error, empty: T) -> axum::response::Response {
    error!("{}: {:#}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::ok(empty)),
    )
        .into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/records - Filtered records
async fn get_records(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> impl IntoResponse {
    match filtered_records(&state, &query) {
        Ok(records) => {
            let response: Vec<RecordResponse> =
                records.into_iter().map(|r| r.into()).collect();

            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Err(e) => internal_error("Error getting records", e, Vec::<RecordResponse>::new()),
    }
}

/// GET /api/towns/:town - Records for a single town
async fn get_town_records(
    State(state): State<AppState>,
    Path(town): Path<String>,
) -> impl IntoResponse {
    // Decode URL-encoded town name ("KALLANG%2FWHAMPOA")
    let decoded_town = urlencoding::decode(&town)
        .unwrap_or_else(|_| town.clone().into())
        .into_owned();

    let query = FilterQuery {
        town: Some(decoded_town),
        ..FilterQuery::default()
    };

    match filtered_records(&state, &query) {
        Ok(records) => {
            let response: Vec<RecordResponse> =
                records.into_iter().map(|r| r.into()).collect();

            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Err(e) => internal_error("Error getting town records", e, Vec::<RecordResponse>::new()),
    }
}

/// GET /api/options - Values for the filter widgets
async fn get_options(State(state): State<AppState>) -> impl IntoResponse {
    let result = {
        let conn = state.db.lock().unwrap();
        db::distinct_towns(&conn).and_then(|towns| {
            let flat_types = db::distinct_flat_types(&conn)?;
            let months = db::distinct_months(&conn)?;
            Ok((towns, flat_types, months))
        })
    };

    match result {
        Ok((towns, flat_types, months)) => {
            let registry = TownRegistry::new();
            let towns = towns
                .into_iter()
                .map(|name| {
                    let region = registry
                        .region_of(&name)
                        .map(|r| r.name().to_string())
                        .unwrap_or_else(|| "-".to_string());
                    TownOption { name, region }
                })
                .collect();

            let mut years: Vec<i32> = months
                .iter()
                .filter_map(|m| hdb_resale::year_of_month(m))
                .collect();
            years.dedup();

            let floor_levels = FloorLevel::all()
                .iter()
                .map(|l| BandOption {
                    code: l.code().to_string(),
                    name: l.name().to_string(),
                })
                .collect();
            let lease_bands = LeaseBand::all()
                .iter()
                .map(|b| BandOption {
                    code: b.code().to_string(),
                    name: b.name().to_string(),
                })
                .collect();

            let options = OptionsResponse {
                towns,
                flat_types,
                floor_levels,
                lease_bands,
                years,
                months,
            };

            (StatusCode::OK, Json(ApiResponse::ok(options))).into_response()
        }
        Err(e) => internal_error(
            "Error getting filter options",
            e,
            OptionsResponse {
                towns: vec![],
                flat_types: vec![],
                floor_levels: vec![],
                lease_bands: vec![],
                years: vec![],
                months: vec![],
            },
        ),
    }
}

/// GET /api/sources - Per-source record counts and last ingest time
async fn get_sources(State(state): State<AppState>) -> impl IntoResponse {
    let result = {
        let conn = state.db.lock().unwrap();
        db::get_ingest_log(&conn).and_then(|log| {
            let mut sources = Vec::new();
            for source in [SourceType::HistoricalCsv, SourceType::DataGovSg] {
                let count = db::count_by_source(&conn, source)?;
                let last_ingest = log
                    .iter()
                    .find(|run| run.source == source.code())
                    .map(|run| run.fetched_at.to_rfc3339());

                sources.push(SourceResponse {
                    source: source.code().to_string(),
                    name: source.name().to_string(),
                    record_count: count,
                    last_ingest,
                });
            }
            Ok(sources)
        })
    };

    match result {
        Ok(sources) => (StatusCode::OK, Json(ApiResponse::ok(sources))).into_response(),
        Err(e) => internal_error("Error getting sources", e, Vec::<SourceResponse>::new()),
    }
}

/// GET /api/stats/trend - Average resale price per month
async fn get_trend(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> impl IntoResponse {
    match filtered_records(&state, &query) {
        Ok(records) => {
            let trend = stats::price_trend(&records);
            (StatusCode::OK, Json(ApiResponse::ok(trend))).into_response()
        }
        Err(e) => internal_error("Error computing price trend", e, Vec::<stats::PriceTrendPoint>::new()),
    }
}

/// GET /api/stats/towns - Transaction counts by town
async fn get_town_counts(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> impl IntoResponse {
    match filtered_records(&state, &query) {
        Ok(records) => {
            let counts = stats::town_counts(&records);
            (StatusCode::OK, Json(ApiResponse::ok(counts))).into_response()
        }
        Err(e) => internal_error("Error computing town counts", e, Vec::<stats::TownCount>::new()),
    }
}

/// GET /api/stats/flat-types - Price distribution per flat type
async fn get_flat_type_distribution(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> impl IntoResponse {
    match filtered_records(&state, &query) {
        Ok(records) => {
            let distributions = stats::price_distribution_by_flat_type(&records);
            (StatusCode::OK, Json(ApiResponse::ok(distributions))).into_response()
        }
        Err(e) => internal_error(
            "Error computing flat type distribution",
            e,
            Vec::<stats::FlatTypeDistribution>::new(),
        ),
    }
}

/// GET /api/export.csv - Download the filtered rows as CSV
async fn export_filtered(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> impl IntoResponse {
    let result = filtered_records(&state, &query).and_then(|records| export_csv_bytes(&records));

    match result {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"filtered_resale_data.csv\"",
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            error!("Error exporting filtered records: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "export failed").into_response()
        }
    }
}

/// GET / - Serve the dashboard page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    println!("🏠 HDB Resale Explorer - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config: AppConfig = load_config("config.json").expect("Failed to load config");

    // Open database
    let db_path = std::path::Path::new(&config.database_path);

    if !db_path.exists() {
        eprintln!("❌ Database not found at {:?}", db_path);
        eprintln!("   Run: cargo run --release import");
        eprintln!("   and: cargo run --release fetch");
        eprintln!("   to load records first.");
        std::process::exit(1);
    }

    let conn = Connection::open(db_path).expect("Failed to open database");
    println!("✓ Database opened: {:?}", db_path);

    // Create shared state
    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/records", get(get_records))
        .route("/towns/:town", get(get_town_records))
        .route("/options", get(get_options))
        .route("/sources", get(get_sources))
        .route("/stats/trend", get(get_trend))
        .route("/stats/towns", get(get_town_counts))
        .route("/stats/flat-types", get(get_flat_type_distribution))
        .route("/export.csv", get(export_filtered))
        .with_state(state.clone());

    // Build main router
    let app = Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new("web"))
        .layer(CorsLayer::permissive());

    // Start server
    let addr = config.server.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/records", addr);
    println!("   UI:  http://{}", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
