//! Server binary: settings from env, database bootstrap, schema, then serve the router.

use pos_backoffice::{apply_schema, build_router, connect, ensure_database_exists, resolve, AppState, Settings, CATALOGUE};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pos_backoffice=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let model = resolve(CATALOGUE, &settings.schema)?;

    ensure_database_exists(&settings.database_url).await?;
    let pool = connect(&settings).await?;
    apply_schema(&pool, &model).await?;
    tracing::info!(entities = model.entities.len(), batch_mode = ?settings.batch_mode, "model ready");

    let state = AppState::new(pool, model, settings.batch_mode);
    let app = build_router(state, settings.max_body_bytes);

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
