//! PAWS server entry point.

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};
use paws_api::{AppState, auth_middleware, router as api_router};
use paws_common::Config;
use paws_core::{
    AdoptionService, AnalyticsService, BlogService, NotificationService, ReportService,
    TokenService, UserService, VetService,
};
use paws_db::repositories::{
    AdoptionRequestRepository, BlogRepository, NotificationRepository, ReportRepository,
    UserRepository,
};
use sea_orm::DatabaseConnection;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::{ServeDir, ServeFile},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Human-readable logs by default; `PAWS_LOG_FORMAT=json` for one JSON object per line.
fn init_tracing() {
    let json = std::env::var("PAWS_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paws=debug,tower_http=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

fn build_state(config: &Config, db: &Arc<DatabaseConnection>) -> AppState {
    let user_repo = UserRepository::new(db.clone());
    let report_repo = ReportRepository::new(db.clone());
    let adoption_repo = AdoptionRequestRepository::new(db.clone());
    let notification_repo = NotificationRepository::new(db.clone());
    let blog_repo = BlogRepository::new(db.clone());

    let rescue = &config.rescue;
    let notification_service =
        NotificationService::new(notification_repo, rescue.notification_list_limit);

    AppState {
        user_service: UserService::new(user_repo.clone(), TokenService::new(&config.auth)),
        report_service: ReportService::new(
            report_repo.clone(),
            adoption_repo.clone(),
            user_repo.clone(),
            notification_service.clone(),
            rescue.points_per_rescue,
        ),
        adoption_service: AdoptionService::new(
            report_repo.clone(),
            adoption_repo.clone(),
            notification_service.clone(),
        ),
        notification_service: notification_service.clone(),
        analytics_service: AnalyticsService::new(
            report_repo.clone(),
            user_repo.clone(),
            rescue.leaderboard_size,
        ),
        vet_service: VetService::new(
            user_repo.clone(),
            report_repo,
            adoption_repo,
            notification_service,
            rescue.nearby_vet_radius_km,
        ),
        blog_service: BlogService::new(blog_repo, user_repo),
    }
}

fn build_app(config: &Config, state: AppState) -> Router {
    let mut app = Router::new().nest("/api", api_router());

    // Non-API paths fall through to the front-end bundle, with index.html for client routes.
    if let Some(dir) = &config.server.static_dir {
        let index = dir.join("index.html");
        app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    app.layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .map_response(|res: axum::response::Response<_>| res.map(axum::body::Body::new))
                .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_secs,
                )))
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting PAWS server...");

    let config = Config::load()?;

    let db = Arc::new(paws_db::init(&config).await?);
    info!("Connected to database");

    info!("Running database migrations...");
    paws_db::migrate(&db).await?;
    info!("Migrations completed");

    let state = build_state(&config, &db);
    let app = build_app(&config, state);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
