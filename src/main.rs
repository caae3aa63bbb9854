use anyhow::Context;
use std::sync::Arc;

use moodmap_api::config::Config;
use moodmap_api::store::{DocumentStore, EntryStore, MemoryDocumentStore, PgDocumentStore};
use moodmap_api::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodmap_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env()?);

    let docs: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => {
            let pg = PgDocumentStore::connect(url)
                .await
                .context("Failed to connect to the document store")?;
            pg.migrate().await?;
            tracing::info!("Database migrations applied");
            Arc::new(pg)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; journal entries live in memory only");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    let state = AppState {
        store: EntryStore::new(docs).with_batch_size(config.delete_batch_size),
        config: config.clone(),
    };

    let app = build_router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
