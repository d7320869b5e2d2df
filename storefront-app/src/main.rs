//! Storefront
//!
//! Loads the catalog from the storefront backend and renders it through the
//! same event-driven pipeline the interactive storefront uses.

mod api;
mod app;
mod config;
mod view;

use app::App;
use clap::Parser;
use config::ConfigLoader;
use std::path::PathBuf;
use storefront_sdk::client::ShopClient;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// Storefront - catalog, basket and two-step checkout
#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./storefront.toml")]
    config: PathBuf,

    /// Override the API origin (e.g., https://larek-api.nomoreparties.co)
    #[arg(long, env = "API_ORIGIN")]
    api_origin: Option<Url>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting storefront v{}", env!("CARGO_PKG_VERSION"));

    let api_config = ConfigLoader::new(&args.config, args.api_origin)
        .load()
        .map_err(|e| {
            tracing::error!("Failed to load configuration: {}", e);
            e
        })?;
    tracing::info!(base_url = %api_config.base_url, "Configuration loaded");

    let app = App::new(ShopClient::new(api_config));
    if !app.load_catalog().await {
        anyhow::bail!("failed to load the catalog");
    }

    let screen = app.screen();
    for card in &screen.page.catalog {
        tracing::info!(
            title = %card.title,
            price = %card.price,
            category = card.category.as_ref().map(|c| c.modifier).unwrap_or_default(),
            "Catalog card"
        );
    }
    tracing::info!(
        cards = screen.page.catalog.len(),
        basket = screen.page.counter,
        "Catalog rendered"
    );

    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront_core=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
