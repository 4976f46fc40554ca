//! ScootyGo rental service
//!
//! Reads configuration from TOML (`$RENTAL_CONFIG` or
//! `~/.config/rental-service/config.toml`) and serves the REST API.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use scootygo::application::rental::{RentalOperations, SystemClock};
use scootygo::config::LoggingConfig;
use scootygo::domain::RepositoryProvider;
use scootygo::infrastructure::database::seed::seed_demo_vehicles;
use scootygo::infrastructure::mail::LogMailer;
use scootygo::infrastructure::payments::stripe::StripeGateway;
use scootygo::infrastructure::payments::webhook::WebhookVerifier;
use scootygo::shared::shutdown::ShutdownCoordinator;
use scootygo::{
    connect_and_migrate, create_api_router, resolve_config_path, AppConfig,
    SeaOrmRepositoryProvider,
};

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Configuration & logging ────────────────────────────────
    let config_path = resolve_config_path();
    let loaded = AppConfig::load(&config_path);
    let app_cfg = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => AppConfig::default(),
    };
    init_tracing(&app_cfg.logging);
    match loaded {
        Ok(_) => info!("Configuration loaded from {}", config_path.display()),
        Err(e) => error!("Failed to load config: {}. Using defaults.", e),
    }

    info!("Starting ScootyGo rental service...");

    // Must be installed before any metrics call
    let prometheus_handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Prometheus recorder not installed, /metrics disabled");
            None
        }
    };

    let booking_policy = app_cfg.booking_policy()?;
    let checkout_policy = app_cfg.checkout_policy();
    info!(
        late_cancel_hours = app_cfg.booking.late_cancel_hours,
        penalty_rate = %booking_policy.penalty_rate,
        currency = %checkout_policy.currency,
        "Rental policy configured"
    );

    // ── Database ───────────────────────────────────────────────
    let db_config = app_cfg.database_config();
    info!("Database: {}", db_config.url);
    let db = match connect_and_migrate(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to prepare database: {}", e);
            return Err(e.into());
        }
    };

    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

    if app_cfg.seed.demo_vehicles {
        match seed_demo_vehicles(repos.as_ref()).await {
            Ok(0) => info!("Vehicle table already populated, demo seed skipped"),
            Ok(n) => info!("Seeded {} demo vehicles", n),
            Err(e) => warn!(error = %e, "Demo vehicle seed failed"),
        }
    }

    // ── Collaborators ──────────────────────────────────────────
    if app_cfg.payments.secret_key.is_empty() {
        warn!("payments.secret_key is empty, checkout sessions will be rejected by the gateway");
    }
    if app_cfg.payments.webhook_secret.is_empty() {
        warn!("payments.webhook_secret is empty, every webhook will be rejected");
    }

    let gateway = Arc::new(StripeGateway::new(app_cfg.stripe_config()));
    let mailer = Arc::new(LogMailer::new(app_cfg.mail.from.clone()));
    let webhook_verifier = Arc::new(WebhookVerifier::new(
        app_cfg.payments.webhook_secret.clone(),
        app_cfg.payments.webhook_tolerance_secs,
    ));

    let ops = Arc::new(RentalOperations::new(
        repos,
        Arc::new(SystemClock),
        mailer,
        gateway,
        booking_policy,
        checkout_policy,
    ));

    // ── HTTP server ────────────────────────────────────────────
    let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
    let shutdown_signal = shutdown.signal();
    shutdown.start_signal_listener();

    let api_router = create_api_router(
        ops,
        db.clone(),
        app_cfg.jwt_config(),
        webhook_verifier,
        prometheus_handle,
    );

    let api_addr = app_cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API server listening on http://{}", api_addr);
    info!("Swagger UI available at http://{}/docs/", api_addr);

    let api_shutdown = shutdown_signal.clone();
    let served = axum::serve(listener, api_router)
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        })
        .await;

    if let Err(e) = served {
        error!("REST API server error: {}", e);
    }

    shutdown
        .cleanup(move || async move {
            if let Err(e) = db.close().await {
                warn!("Error closing database connection: {}", e);
            } else {
                info!("Database connection closed");
            }
        })
        .await;

    info!("ScootyGo rental service shutdown complete");
    Ok(())
}
