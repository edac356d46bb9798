use anyhow::Result;

use leadflow_backend::{app, config, logging, Engine};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        bulk_chunk_size = settings.bulk_chunk_size,
        max_bulk_ids = settings.max_bulk_ids,
        "Starting leadflow backend"
    );

    // In-memory store, wall clock, in-process outbox
    let engine = Engine::in_memory(settings.engine_options());

    let state = app::AppState::new(engine, settings.clone());
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
