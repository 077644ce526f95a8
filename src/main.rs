// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use std::env;
use std::path::Path;

// Use library instead of local modules
use hdb_resale::{
    count_by_source, get_all_records, insert_records, load_config, load_csv, log_ingest,
    open_database, verify_count, AppConfig, DataGovClient, SourceType,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = load_config("config.json")?;
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("import") => run_import(&config)?,
        Some("fetch") => run_fetch(&config)?,
        _ => run_ui_mode(&config)?,
    }

    Ok(())
}

fn run_import(config: &AppConfig) -> Result<()> {
    println!("🏠 Data Import - Historical CSV → SQLite + WAL");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let csv_path = Path::new(&config.static_csv_path);
    let db_path = Path::new(&config.database_path);

    // 1. Load CSV
    println!("\n📂 Loading historical CSV...");
    let records = load_csv(csv_path)?;
    println!("✓ Loaded {} records from {}", records.len(), csv_path.display());

    // 2. Setup database
    println!("\n🔧 Setting up database...");
    let conn = open_database(db_path)?;
    println!("✓ Database initialized with WAL mode");

    // 3. Insert records
    println!("\n💾 Inserting records...");
    insert_records(&conn, &records, SourceType::HistoricalCsv)?;
    log_ingest(&conn, SourceType::HistoricalCsv, records.len())?;

    // 4. Verify count
    println!("\n🔍 Verifying database...");
    let count = verify_count(&conn)?;
    println!("✓ Database contains {} records", count);

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Import complete");

    Ok(())
}

fn run_fetch(config: &AppConfig) -> Result<()> {
    println!("🌏 Live Fetch - data.gov.sg → SQLite");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db_path = Path::new(&config.database_path);

    // 1. Pull the live feed
    println!(
        "\n📡 Fetching resale records from {} onward...",
        config.fetch_since_year
    );
    let client = DataGovClient::new(config.api.clone())?;
    let records = client.fetch_since_year(config.fetch_since_year)?;
    println!("✓ Fetched {} records from the live feed", records.len());

    // 2. Insert, skipping rows the historical extract already covers
    println!("\n💾 Inserting records...");
    let conn = open_database(db_path)?;
    insert_records(&conn, &records, SourceType::DataGovSg)?;
    log_ingest(&conn, SourceType::DataGovSg, records.len())?;

    // 3. Summary
    println!("\n🔍 Verifying database...");
    let total = verify_count(&conn)?;
    let live = count_by_source(&conn, SourceType::DataGovSg)?;
    println!("✓ Database contains {} records ({} from live feed)", total, live);

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Fetch complete");

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &AppConfig) -> Result<()> {
    println!("🖥️  Loading HDB Resale Explorer UI...\n");

    let db_path = Path::new(&config.database_path);

    if !db_path.exists() {
        eprintln!("❌ Database not found!");
        eprintln!("   Run: cargo run import");
        eprintln!("   and optionally: cargo run fetch");
        eprintln!("   to load records first.");
        std::process::exit(1);
    }

    let conn = open_database(db_path)?;

    // Load records
    println!("📊 Loading records...");
    let records = get_all_records(&conn)?;
    let total_count = verify_count(&conn)?;

    println!("✓ Loaded {} records\n", records.len());
    println!("Starting UI... (Press 'q' to quit)\n");

    // Create and run app
    let mut app = ui::App::new(records, total_count);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &AppConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the web dashboard: cargo run --bin hdb-server --features server");
    std::process::exit(1);
}
