//! Operator CLI: seed the store from the bundled catalog, print the public
//! listing, or run the AI scanner against a local image.

use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine as _;
use clap::{Parser, Subcommand};

use blcdb_core::{DisplayBrand, Locale};
use blcdb_store::{
    load_public_listing, load_seed_catalog, ListingSource, LocalStore, PgStore, RecordStore,
};
use blcdb_vision::VisionClient;

#[derive(Debug, Parser)]
#[command(name = "blcdb-cli")]
#[command(about = "Boycott-list directory command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import the seed catalog into the configured store (idempotent by name).
    Seed {
        /// Override the catalog path from the configuration.
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Print the approved public listing.
    List {
        /// Display locale: en or km.
        #[arg(long, default_value = "en")]
        locale: String,
    },
    /// Classify a local JPEG with the vision API.
    Scan {
        /// Path to the image file.
        image: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = blcdb_core::load_app_config()?;

    match cli.command {
        Commands::Seed { path } => {
            let store = open_store(&config).await?;
            let catalog = load_seed_catalog(path.as_deref().unwrap_or(&config.seed_path))?;
            let existing = store.list_submissions(None).await?;
            let mut imported = 0usize;
            for brand in &catalog {
                let already_there = existing
                    .iter()
                    .any(|b| b.name.eq_ignore_ascii_case(&brand.name));
                if already_there {
                    tracing::debug!(name = %brand.name, "seed entry already present, skipping");
                    continue;
                }
                store
                    .insert_submission(&blcdb_core::NewSubmission {
                        name: brand.name.clone(),
                        category: brand.category,
                        purpose: brand.purpose.clone(),
                        purpose_km: brand.purpose_km.clone(),
                        location: brand.location.clone(),
                        location_km: brand.location_km.clone(),
                        website: brand.website.clone(),
                        description: brand.description.clone(),
                        description_km: brand.description_km.clone(),
                        image_url: brand.image_url.clone(),
                        evidence_url: brand.evidence_url.clone(),
                        status: brand.status,
                        submitted_by: brand.submitted_by.clone(),
                    })
                    .await?;
                imported += 1;
            }
            println!(
                "imported {imported} of {} seed entries into the {} store",
                catalog.len(),
                config.store
            );
        }
        Commands::List { locale } => {
            let locale = Locale::parse(&locale)
                .ok_or_else(|| anyhow::anyhow!("locale must be 'en' or 'km', got '{locale}'"))?;
            let store = open_store(&config).await?;
            let seed = load_seed_catalog(&config.seed_path).unwrap_or_default();
            let (records, source) = load_public_listing(store.as_ref(), &seed).await;
            if source == ListingSource::Fallback {
                println!("(store unreachable — showing bundled fallback listing)");
            }
            for record in &records {
                let view = DisplayBrand::project(record, locale);
                println!(
                    "{:<36} {:<28} {}",
                    view.name, view.category_label, view.location
                );
            }
            println!("{} listing(s)", records.len());
        }
        Commands::Scan { image } => {
            let Some(api_key) = config.vision_api_key.as_deref() else {
                anyhow::bail!("BLCDB_VISION_API_KEY is not set; the scanner is disabled");
            };
            let client = match config.vision_base_url.as_deref() {
                Some(base) => VisionClient::with_base_url(api_key, config.vision_timeout_secs, base)?,
                None => VisionClient::new(api_key, config.vision_timeout_secs)?,
            };
            let bytes = std::fs::read(&image)?;
            let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
            let verdict = client.classify_brand(&encoded).await?;
            println!("brand:          {}", verdict.brand_name);
            println!("thai-owned:     {}", verdict.is_thai);
            println!("recommendation: {:?}", verdict.recommendation);
            println!("reason (en):    {}", verdict.reason_en);
            println!("reason (km):    {}", verdict.reason_km);
        }
    }

    Ok(())
}

async fn open_store(config: &blcdb_core::AppConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    match config.store {
        blcdb_core::StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres store"))?;
            let pool_config = blcdb_db::PoolConfig::from_app_config(config);
            let pool = blcdb_db::connect_pool(database_url, pool_config).await?;
            blcdb_db::run_migrations(&pool).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        blcdb_core::StoreBackend::Local => {
            Ok(Arc::new(LocalStore::open(&config.local_store_dir)?))
        }
    }
}
