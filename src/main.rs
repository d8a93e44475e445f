use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fileflow::{
    build_router,
    state::AppState,
    config::Config,
    database::{init_db, init_data_context},
    storage::LocalStorage,
};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let pool = init_db(&config.database_url, config.db_max_connections).await?;

    let storage = LocalStorage::new(&config.upload_dir, &config.duplicates_dir()).await?;

    let app_state = AppState {
        data: init_data_context(pool),
        storage,
        config,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], app_state.config.server_port));
    let app = build_router(app_state);

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
