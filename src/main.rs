//! deckvault: playing-card deck collection manager.
//!
//! Entry point: loads the config, opens (and migrates) the collection database,
//! then runs one maintenance command:
//!
//! - `status` (default): schema version, collection counts, active share links
//! - `migrations`: the `schema_migrations` audit trail
//! - `rollback <version>`: run the stored rollback for one migration

use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use deckvault::app::App;
use deckvault::managers::deck_manager::DeckManagerTrait;
use deckvault::managers::market_manager::MarketManagerTrait;
use deckvault::managers::wishlist_manager::WishlistManagerTrait;
use deckvault::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use deckvault::services::share_service::ShareServiceTrait;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("deckvault=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────");
    println!("  {}", name);
    println!("───────────────────────────────────────────────");
}

fn status(app: &mut App) -> Result<(), Box<dyn std::error::Error>> {
    section("Collection");
    let version = app.database().schema_version()?;
    let latest = app.database().migrator().latest_version();
    println!("  Schema version:  {} (latest {})", version, latest);

    let stats = app.statistics()?;
    println!("  Decks:           {}", stats.total_decks);
    println!("  Purchase value:  ${:.2}", stats.total_purchase_value);
    if let Some(avg) = stats.average_purchase_price {
        println!("  Average price:   ${:.2}", avg);
    }
    println!("  Manufacturers:   {}", app.decks().manufacturers()?.len());
    println!("  Wishlist items:  {}", app.wishlist().get_wishlist()?.len());

    let summary = app.market().portfolio_summary()?;
    if summary.priced_decks > 0 {
        println!("  Market value:    ${:.2} across {} deck(s)", summary.total_market_value, summary.priced_decks);
        if let Some(change) = summary.value_change_pct {
            println!("  Value change:    {:+.1}%", change);
        }
    }

    section("Active shares");
    let shares = app.shares().get_active_shared_collections()?;
    if shares.is_empty() {
        println!("  (none)");
    }
    for share in shares {
        let expiry = share
            .expires_at
            .map(|e| e.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "  {} ({} decks, expires {}) {}",
            share.name,
            share.deck_ids.len(),
            expiry,
            app.share_url(&share.share_id)
        );
    }
    Ok(())
}

fn migrations(app: &mut App) -> Result<(), Box<dyn std::error::Error>> {
    section("Schema migrations");
    for m in app.database().migration_history()? {
        println!(
            "  v{:<3} {:<28} {:<10} {}",
            m.version,
            m.name,
            m.status.as_str(),
            m.applied_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = SettingsEngine::new(None);
    let config = settings.load()?;
    let mut app = App::startup(config)?;

    let result = match args.first().map(String::as_str) {
        None | Some("status") => status(&mut app),
        Some("migrations") => migrations(&mut app),
        Some("rollback") => {
            let version: i64 = args
                .get(1)
                .ok_or("usage: deckvault rollback <version>")?
                .parse()?;
            app.database().rollback_migration(version)?;
            println!("  Rolled back migration v{}", version);
            Ok(())
        }
        Some(other) => Err(format!("unknown command: {} (expected status, migrations, rollback)", other).into()),
    };

    app.shutdown();
    result
}

fn main() -> ExitCode {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "deckvault failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
