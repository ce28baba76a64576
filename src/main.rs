use newsdesk::{
    article::repository::SqliteArticleRepository,
    database,
    news::{CachedNewsClient, NewsApiClient, NEWS_CACHE_TTL},
    router,
    session::revocation::{start_purge_task, PURGE_INTERVAL},
    user::SqliteUserRepository,
    AppConfig, AppState, InMemoryRevocationRegistry, SessionService, TokenConfig,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsdesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting news desk API");

    let config = AppConfig::from_env();

    let pool = database::connect(&config.database_url, 5).await?;
    database::ensure_schema(&pool).await?;

    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    if config.seed_default_user {
        database::seed_default_user(user_repository.as_ref(), config.bcrypt_cost).await?;
    }

    // Revocations live for the lifetime of this process only
    let revocation_registry = Arc::new(InMemoryRevocationRegistry::new());
    tokio::spawn(start_purge_task(revocation_registry.clone(), PURGE_INTERVAL));

    let session_service = Arc::new(SessionService::new(
        user_repository,
        revocation_registry,
        TokenConfig::new(config.jwt_secret.clone()),
        config.bcrypt_cost,
    ));

    if config.newsapi_key.is_none() {
        warn!("NEWSAPI_KEY not set, /api/news will answer with a configuration error");
    }
    let news_client = Arc::new(CachedNewsClient::new(
        Arc::new(NewsApiClient::new(
            config.newsapi_base_url.clone(),
            config.newsapi_key.clone(),
        )),
        NEWS_CACHE_TTL,
    ));

    let app_state = AppState::new(
        session_service,
        Arc::new(SqliteArticleRepository::new(pool)),
        news_client,
    );

    let app = router(app_state, config.production);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Server running on http://localhost:{}", config.port);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
