use axum::serve;
use std::sync::Arc;
use tokio::net::TcpListener;
use viewer_api::api::handlers::AppContext;
use viewer_api::api::routes::create_router;
use viewer_api::config::AppConfig;
use viewer_api::seed;
use viewer_api::store::traits::IndexStore;
use viewer_api::store::{MemoryStore, PostgresStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .init();

    println!("Viewer API: record change discovery and sitemap server");

    // Load configuration
    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: server={}:{}",
        config.server.host, config.server.port
    );

    match config.database_url() {
        Some(database_url) => {
            println!("Connecting to PostgreSQL...");
            let max_connections = config.database.max_connections.unwrap_or(20);
            let store = PostgresStore::new(&database_url, max_connections).await?;

            println!("Running database migrations...");
            store.migrate().await?;

            // Load seed data for demonstration (optional)
            if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
                println!("Loading seed data...");
                seed::load_postgres(&store).await?;
                println!("Seed data loaded successfully");
            }

            serve_with_store(store, &config).await
        }
        None => {
            println!("No database configured, serving from the in-memory store");
            let store = MemoryStore::new();

            if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
                println!("Loading seed data...");
                seed::load_memory(&store).await;
                println!("Seed data loaded successfully");
            }

            serve_with_store(store, &config).await
        }
    }
}

async fn serve_with_store<S: IndexStore + 'static>(
    index: S,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let state = Arc::new(AppContext::new(index, config));
    let app = create_router::<S>(&config.sitemap.output_path).with_state(state);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    println!("Viewer API running on http://{}", bind_address);
    println!(
        "API description available at http://{}/openapi.json",
        bind_address
    );

    serve(listener, app).await?;

    Ok(())
}
