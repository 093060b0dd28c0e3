//! `pii-vault` — service binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (JSON logs, optional OTLP spans).
//! 3. Resolve the key configuration and apply the passthrough policy.
//! 4. Build the cipher gateway and field mapper.
//! 5. Build the Axum router and start the HTTP server.

use anyhow::Result;
use tracing::info;

use pii_vault::config::Config;
use pii_vault::server::{self, state::AppState};
use pii_vault::{keys, kms, telemetry, PiiFieldMapper};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otlp_endpoint(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        "pii-vault starting"
    );

    // -----------------------------------------------------------------------
    // 3. Key configuration
    // -----------------------------------------------------------------------
    let keys = keys::resolve(&cfg).enforce(cfg.allow_unencrypted_pii)?;

    // -----------------------------------------------------------------------
    // 4. Cipher gateway + field mapper
    // -----------------------------------------------------------------------
    let gateway = kms::build_gateway(&keys).await;
    let mapper = PiiFieldMapper::new(gateway);

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let router = server::router::build(AppState::new(mapper));

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
