use std::sync::Arc;

use floorplan::config::AppConfig;
use floorplan::services::layout::LayoutService;
use floorplan::services::local::FileStore;
use floorplan::services::remote::{DisconnectedRemote, PgRemoteStore, RemoteStore};
use floorplan::{db, routes, state};

#[tokio::main]
async fn main() {
    // Missing .env is fine; the environment may be set directly.
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    if let Err(e) = dotenv {
        tracing::debug!(error = %e, "no .env loaded");
    }

    let config = AppConfig::from_env();

    // Remote tier is optional: without a database every save degrades to the
    // local cache.
    let remote: Arc<dyn RemoteStore> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = db::init_pool(url, config.db_max_connections)
                .await
                .expect("database init failed");
            Arc::new(PgRemoteStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; remote layout tier disabled");
            Arc::new(DisconnectedRemote)
        }
    };

    let local = FileStore::open(config.layout_cache_path.clone()).expect("failed to open layout cache");
    tracing::info!(path = %local.path().display(), "layout cache opened");

    let state = state::AppState::new(LayoutService::new(Arc::new(local), remote));

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "floorplan listening");
    axum::serve(listener, app).await.expect("server failed");
}
