use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webdash_api::active_uploads::ActiveUploads;
use webdash_api::background::reminders;
use webdash_api::config::ServerConfig;
use webdash_api::middleware::rate_limit::FixedWindowLimiter;
use webdash_api::router::build_app_router;
use webdash_api::state::AppState;
use webdash_db::{DocumentStore, MemoryStore, PgStore};
use webdash_services::domains::{DomainApiClient, DomainApiConfig};
use webdash_services::email::{LogMailer, MailgunConfig, MailgunMailer, Mailer};
use webdash_services::site_builder::{SiteBuilderClient, SiteBuilderConfig};
use webdash_services::storage::LocalObjectStore;
use webdash_services::stripe::{StripeConfig, StripeGateway};

/// Verification-code requests allowed per client IP per window.
const VERIFICATION_LIMIT: u32 = 5;
const VERIFICATION_WINDOW: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "webdash_api=debug,webdash_services=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        app_env = ?config.app_env,
        "Loaded server configuration"
    );
    if config.stripe_webhook_secret.trim().is_empty() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET not set, all payment webhooks will be rejected");
    }

    // --- Document store ---
    let store: Arc<dyn DocumentStore> = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = webdash_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            webdash_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            webdash_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store (data is lost on restart)");
            Arc::new(MemoryStore::new())
        }
    };

    // --- External services ---
    let http = webdash_services::http_client().expect("Failed to build HTTP client");

    let mailer: Arc<dyn Mailer> = match MailgunConfig::from_env() {
        Some(mailgun) => {
            tracing::info!(domain = %mailgun.domain, "Sending email through Mailgun");
            Arc::new(MailgunMailer::new(http.clone(), mailgun))
        }
        None => {
            tracing::warn!("Mailgun not configured, emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let object_store = LocalObjectStore::new(&config.upload_dir, &config.upload_public_base_url);
    tracing::info!(upload_dir = %config.upload_dir, "Local object store ready");

    // --- App state ---
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        mailer,
        payments: Arc::new(StripeGateway::new(http.clone(), StripeConfig::from_env())),
        domains: Arc::new(DomainApiClient::new(http.clone(), DomainApiConfig::from_env())),
        site_builder: Arc::new(SiteBuilderClient::new(http, SiteBuilderConfig::from_env())),
        object_store: Arc::new(object_store),
        verification_limiter: Arc::new(FixedWindowLimiter::new(
            VERIFICATION_LIMIT,
            VERIFICATION_WINDOW,
        )),
        active_uploads: Arc::new(ActiveUploads::new()),
    };

    // Spawn the reminder sweep.
    let reminder_cancel = CancellationToken::new();
    let reminder_handle = tokio::spawn(reminders::run(state.clone(), reminder_cancel.clone()));

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    reminder_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), reminder_handle).await;
    tracing::info!("Reminder sweep stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
