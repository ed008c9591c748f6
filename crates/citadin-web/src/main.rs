//! Observatoire Citadin proxy server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use citadin_core::{ProxySettings, ReqwestHttpClient};
use citadin_store::{IndicatorStore, StoreConfig};
use citadin_web::{build_router, AppState};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Observatoire Citadin proxy
#[derive(Parser, Debug)]
#[command(name = "citadin-web")]
#[command(about = "Proxy aggregating French public-data providers behind one API")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8000", env = "CITADIN_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "CITADIN_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Indicator store database file
    #[arg(long, default_value = "data/citadin.duckdb", env = "CITADIN_DB_PATH")]
    db_path: PathBuf,
}

fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level);

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = match runtime_builder.build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run_server(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();
}

async fn run_server(args: Args) -> Result<(), BoxError> {
    let settings = ProxySettings::from_env()?;
    info!(
        atmo = %settings.atmo.base_url,
        geodair = %settings.geodair.base_url,
        timeout_ms = settings.timeout_ms(),
        "loaded provider settings"
    );

    let http_client = Arc::new(ReqwestHttpClient::new(settings.upstream_timeout)?);
    let store = IndicatorStore::open(StoreConfig::new(&args.db_path))?;
    info!(db_path = %store.db_path().display(), "indicator store ready");

    let state = Arc::new(AppState::new(settings, http_client).with_store(store));
    let app = build_router(state);

    let addr: SocketAddr = args.listen.parse()?;
    info!("Observatoire Citadin API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
