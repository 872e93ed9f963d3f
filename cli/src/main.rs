//! Fleet booking: CLI server
//!
//! Headless booking API suitable for deployment as a systemd service,
//! Docker container, or standalone process.
//!
//! ```sh
//! # Run with default config (~/.config/fleet-booking/config.toml)
//! fleet-booking
//!
//! # Custom config path and port
//! fleet-booking --config /etc/fleet-booking/config.toml --port 8080
//!
//! # Throwaway in-memory instance
//! fleet-booking --memory
//!
//! # Validate config without starting
//! fleet-booking --check
//!
//! # Mint a bearer token for a host profile
//! fleet-booking --issue-token host --subject usr_1 --host-id hst_1
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::{error, info};

use fleet_booking::config::{AppConfig, StorageBackend};
use fleet_booking::domain::Principal;
use fleet_booking::infrastructure::crypto::jwt::create_token;
use fleet_booking::server::{init_tracing, ServerHandle, ServerOptions};

/// Fleet booking: availability, reservations and trips over REST.
#[derive(Parser, Debug)]
#[command(
    name = "fleet-booking",
    version,
    about = "Vehicle fleet booking service",
    long_about = "Fleet booking: REST API server for vehicle availability, \
                  reservations, trips and host revenue.\n\n\
                  Default config: ~/.config/fleet-booking/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "FLEET_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Override the database connection URL (SQLite).
    #[arg(long, env = "FLEET_DATABASE_URL")]
    database_url: Option<String>,

    /// Run on the in-memory backend; nothing is persisted.
    #[arg(long, conflicts_with = "database_url")]
    memory: bool,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Print a signed bearer token for the given role and exit.
    #[arg(long, value_name = "ROLE")]
    issue_token: Option<TokenRole>,

    /// User id carried in the issued token.
    #[arg(long, default_value = "usr_cli")]
    subject: String,

    /// Host profile id for host tokens.
    #[arg(long, required_if_eq("issue_token", "host"))]
    host_id: Option<String>,

    /// Driver profile id for driver tokens.
    #[arg(long, required_if_eq("issue_token", "driver"))]
    driver_id: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TokenRole {
    Admin,
    Host,
    Driver,
}

impl Cli {
    fn principal(&self, role: TokenRole) -> Principal {
        let subject = self.subject.clone();
        match role {
            TokenRole::Admin => Principal::admin(subject),
            TokenRole::Host => Principal::host(subject, self.host_id.clone().unwrap_or_default()),
            TokenRole::Driver => {
                Principal::driver(subject, self.driver_id.clone().unwrap_or_default())
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(fleet_booking::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
            AppConfig::default()
        }
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }
    if let Some(ref level) = cli.log_level {
        info!("CLI override: log_level = {}", level);
        config.logging.level = level.clone();
    }
    if let Some(ref url) = cli.database_url {
        info!("CLI override: database_url = {}", url);
        config.database.backend = StorageBackend::Sqlite;
        config.database.url = Some(url.clone());
    }
    if cli.memory {
        info!("CLI override: in-memory storage");
        config.database.backend = StorageBackend::Memory;
    }

    // ── Token issuing mode ─────────────────────────────────────
    if let Some(role) = cli.issue_token {
        let token = create_token(&cli.principal(role), &config.security.jwt())?;
        println!("{}", token);
        return Ok(());
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        config.validate()?;
        println!("✅ Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}:{}", config.server.host, config.server.port);
        match config.database.backend {
            StorageBackend::Sqlite => {
                println!("   Database    : {}", config.database.connection_url())
            }
            StorageBackend::Memory => println!("   Database    : in-memory"),
        }
        println!("   Log level   : {}", config.logging.level);
        println!(
            "   Mileage     : {}",
            if config.booking.enforce_mileage_check {
                "enforced"
            } else {
                "not enforced"
            }
        );
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions { config }).await?;

    // Install OS signal handlers (SIGTERM, SIGINT)
    handle.install_signal_handler();

    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
