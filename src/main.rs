use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

use devcamper_api::config::AppConfig;
use devcamper_api::database::DatabaseManager;
use devcamper_api::geo::MapQuestGeocoder;
use devcamper_api::mailer::LogMailer;
use devcamper_api::storage::LocalFileStorage;
use devcamper_api::{app, AppState};

/// Set by the panic hook; the process exits non-zero after draining.
static FATAL: AtomicBool = AtomicBool::new(false);

#[derive(Parser)]
#[command(name = "devcamper-api")]
#[command(about = "Bootcamp directory REST API")]
#[command(version)]
struct Args {
    #[arg(long, help = "Bind address (overrides HOST)")]
    host: Option<String>,

    #[arg(long, help = "Listen port (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Apply database migrations and exit")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional .env in development
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    tracing::info!("Starting DevCamper API in {:?} mode", config.environment);
    if config.is_production() && !config.security.secure_cookies {
        tracing::warn!("Session cookies are not marked Secure in production");
    }

    let pool = DatabaseManager::connect(&config.database).await.context("database connection failed")?;
    DatabaseManager::migrate(&pool).await.context("database migration failed")?;
    if args.migrate {
        pool.close().await;
        return Ok(());
    }

    let geocoder = MapQuestGeocoder::new(&config.geocoder).context("geocoder setup failed")?;
    let storage = LocalFileStorage::new(config.uploads.upload_path.clone());
    tokio::fs::create_dir_all(storage.root())
        .await
        .with_context(|| format!("cannot create upload dir {}", storage.root().display()))?;

    let bind_addr = config.addr();
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config),
        geocoder: Arc::new(geocoder),
        storage: Arc::new(storage),
        mailer: Arc::new(LogMailer),
    };

    let fatal = Arc::new(Notify::new());
    install_panic_hook(fatal.clone());

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("DevCamper API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal(fatal))
        .await
        .context("server error")?;

    pool.close().await;
    if FATAL.load(Ordering::SeqCst) {
        tracing::error!("Shut down after a fatal error");
        std::process::exit(1);
    }
    tracing::info!("Shut down cleanly");
    Ok(())
}

fn install_panic_hook(fatal: Arc<Notify>) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!("Unhandled panic: {}", info);
        FATAL.store(true, Ordering::SeqCst);
        fatal.notify_one();
        default_hook(info);
    }));
}

async fn shutdown_signal(fatal: Arc<Notify>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received ctrl-c, draining connections"),
        _ = terminate => tracing::info!("Received SIGTERM, draining connections"),
        _ = fatal.notified() => tracing::error!("Fatal error, draining connections"),
    }
}
