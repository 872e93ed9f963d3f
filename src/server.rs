//! Reusable server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: storage init and migrations,
//! the booking services and their event reactor, the REST API, metrics and
//! graceful shutdown.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::application::{BookingCore, BookingOptions, SharedEventBus};
use crate::config::{AppConfig, StorageBackend};
use crate::domain::repositories::RepositoryProvider;
use crate::infrastructure::{
    init_database, DatabaseConfig, InMemoryRepositoryProvider, SeaOrmRepositoryProvider,
};
use crate::interfaces::http::{create_api_router, ApiContext};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the service.
#[derive(Default)]
pub struct ServerOptions {
    /// Application configuration.
    pub config: AppConfig,
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running booking service.
///
/// ```rust,no_run
/// use fleet_booking::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// Shared event bus carrying booking events.
    pub event_bus: SharedEventBus,
    /// Repository provider for data access.
    pub repos: Arc<dyn RepositoryProvider>,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// API port the server is listening on.
    pub api_port: u16,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
    reactor_task: tokio::task::JoinHandle<()>,
}

/// The global metrics recorder can only be installed once per process.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| {
            match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
                Ok(handle) => {
                    info!("📊 Prometheus metrics recorder installed");
                    Some(handle)
                }
                Err(e) => {
                    warn!(error = %e, "Prometheus recorder unavailable, /metrics disabled");
                    None
                }
            }
        })
        .clone()
}

impl ServerHandle {
    /// Start the service with the given options.
    ///
    /// 1. Install the Prometheus metrics recorder
    /// 2. Open storage (SQLite with migrations, or in-memory)
    /// 3. Wire the booking services and start the event reactor
    /// 4. Start the REST API server (with Swagger UI)
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting fleet booking service...");

        let prometheus = prometheus_handle();

        let jwt_config = app_cfg.security.jwt();
        if app_cfg.uses_default_secret() {
            warn!("⚠️  Using the default JWT secret; set security.jwt_secret in production");
        }
        info!(
            "JWT configured with {}h token expiration",
            jwt_config.expiration_hours
        );

        // ── Storage ────────────────────────────────────────────
        let (repos, db): (Arc<dyn RepositoryProvider>, Option<DatabaseConnection>) =
            match app_cfg.database.backend {
                StorageBackend::Sqlite => {
                    let db_config = DatabaseConfig {
                        url: app_cfg.database.connection_url(),
                    };
                    let db = init_database(&db_config).await?;
                    (Arc::new(SeaOrmRepositoryProvider::new(db.clone())), Some(db))
                }
                StorageBackend::Memory => {
                    warn!("Using in-memory storage; data is lost on shutdown");
                    (Arc::new(InMemoryRepositoryProvider::new()), None)
                }
            };

        // ── Services & reactor ─────────────────────────────────
        let core = BookingCore::new(
            repos.clone(),
            &BookingOptions {
                enforce_mileage_check: app_cfg.booking.enforce_mileage_check,
                event_bus_capacity: app_cfg.booking.event_bus_capacity,
            },
        );
        info!(
            enforce_mileage_check = app_cfg.booking.enforce_mileage_check,
            event_bus_capacity = app_cfg.booking.event_bus_capacity,
            "🔔 Booking services initialized"
        );

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let event_bus = core.events.clone();
        let reactor_task = core
            .reactor
            .start(event_bus.clone(), shutdown_signal.clone());

        // ── REST API server ────────────────────────────────────
        let api_router = create_api_router(ApiContext {
            core,
            jwt_config,
            db: db.clone(),
            prometheus,
        });

        let api_addr = format!("{}:{}", app_cfg.server.host, app_cfg.server.port);
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        let api_port = listener.local_addr()?.port();
        info!("REST API server listening on http://{}", api_addr);
        info!("Swagger UI available at http://{}/docs/", api_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("🚀 Fleet booking service started");

        Ok(Self {
            event_bus,
            repos,
            config: app_cfg,
            api_port,
            db,
            shutdown,
            api_task,
            reactor_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to fully stop after shutdown has been triggered.
    pub async fn wait(self) {
        info!("⏳ Waiting for server tasks to complete...");

        match self.api_task.await {
            Ok(()) => info!("REST API server stopped"),
            Err(e) => error!("REST API server task panicked: {}", e),
        }

        // The API can also stop on its own (bind loss); make sure the reactor follows.
        self.shutdown.signal().trigger();
        let grace = Duration::from_secs(self.shutdown.timeout_secs());
        match tokio::time::timeout(grace, self.reactor_task).await {
            Ok(Ok(())) => info!("Booking event reactor stopped"),
            Ok(Err(e)) => error!("Booking event reactor panicked: {}", e),
            Err(_) => warn!("Booking event reactor did not stop within {:?}", grace),
        }

        if let Some(db) = self.db {
            if let Err(e) = db.close().await {
                warn!("Error closing database connection: {}", e);
            } else {
                info!("✅ Database connection closed");
            }
        }

        info!("👋 Fleet booking service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down fleet booking service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    /// Check if the server is still running.
    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
/// `RUST_LOG` takes precedence over `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
