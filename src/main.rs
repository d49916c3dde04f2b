//! Account portal server.
//!
//! Reads configuration from TOML (`$ACCOUNT_PORTAL_CONFIG` or
//! `~/.config/account-portal/config.toml`), migrates the database and serves
//! the account pages until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Instant;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use account_portal::application::{AccountService, SessionManager};
use account_portal::config::LoggingConfig;
use account_portal::infrastructure::crypto::PasswordHasher;
use account_portal::infrastructure::database::migrator::Migrator;
use account_portal::infrastructure::database::repositories::{SessionRepository, UserRepository};
use account_portal::interfaces::http::modules::health::HealthState;
use account_portal::interfaces::http::modules::metrics::MetricsState;
use account_portal::interfaces::http::{JsonPageRenderer, SessionCookie};
use account_portal::shared::{listen_for_shutdown_signals, ShutdownSignal};
use account_portal::{config_path, create_app, init_database, AppConfig, AppState, DatabaseConfig};

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = config_path();
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg.logging);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            let cfg = AppConfig::default();
            init_tracing(&cfg.logging);
            error!("Failed to load config: {}. Using defaults.", e);
            cfg
        }
    };

    info!("Starting account portal...");

    // ── Prometheus metrics recorder (before any metrics calls) ──
    let metrics = match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus metrics recorder installed");
            Some(MetricsState { handle })
        }
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            None
        }
    };

    // ── Database ───────────────────────────────────────────────
    let db_config = DatabaseConfig::from(&app_cfg.database);
    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    // ── Services ───────────────────────────────────────────────
    let users = Arc::new(UserRepository::new(db.clone()));
    let sessions = Arc::new(SessionRepository::new(db.clone()));

    let accounts = Arc::new(AccountService::new(
        users.clone(),
        sessions.clone(),
        PasswordHasher::new(app_cfg.security.bcrypt_cost),
    ));
    let session_manager = Arc::new(SessionManager::new(
        sessions,
        users,
        app_cfg.session.ttl(),
    ));

    match session_manager.purge_expired().await {
        Ok(0) => {}
        Ok(n) => info!("Purged {} expired sessions", n),
        Err(e) => warn!("Failed to purge expired sessions: {}", e),
    }

    let state = AppState {
        accounts,
        sessions: session_manager,
        renderer: Arc::new(JsonPageRenderer),
        cookie: SessionCookie {
            name: app_cfg.session.cookie_name.clone(),
            max_age_seconds: app_cfg.session.max_age_seconds(),
            secure: app_cfg.session.secure_cookie,
        },
    };
    let health = HealthState {
        db: db.clone(),
        started_at: Arc::new(Instant::now()),
    };
    let app = create_app(state, health, metrics);

    // ── Serve with graceful shutdown ───────────────────────────
    let shutdown = ShutdownSignal::new();
    tokio::spawn(listen_for_shutdown_signals(shutdown.clone()));

    let addr = app_cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Account portal listening on http://{}", addr);

    let server_shutdown = shutdown.clone();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            server_shutdown.wait().await;
            info!("HTTP server received shutdown signal");
        })
        .await;

    if let Err(e) = served {
        error!("HTTP server error: {}", e);
    }

    info!("Closing database connections...");
    db.close().await?;
    info!("Shutdown complete");
    Ok(())
}
