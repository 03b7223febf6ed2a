mod cli;
mod seed;

use crate::cli::{LogFormatArg, StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use jokester_core::Repository;
use jokester_gateway::{App, AppState, HeaderAuthenticator};
use jokester_service::JokeService;
use jokester_storage::{InMemoryRepository, MySqlRepository};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

fn init_tracing(format: LogFormatArg) -> anyhow::Result<()> {
    tracing_log::LogTracer::init().context("install log bridge")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = Registry::default().with(filter);
    match format {
        LogFormatArg::Text => tracing::subscriber::set_global_default(registry.with(fmt::layer())),
        LogFormatArg::Json => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().json()))
        }
    }
    .context("install tracing subscriber")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::try_parse()?;
    init_tracing(config.log_format)?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        list_limit = config.list_limit,
        seed_demo = config.seed_demo,
        "starting jokester gateway"
    );

    warn!(
        header = jokester_gateway::auth::USER_HEADER,
        "callers are identified by an unverified request header"
    );
    let auth = HeaderAuthenticator::new();
    match config.storage {
        StorageBackendArg::InMemory => {
            run_server(&config, InMemoryRepository::new(), auth).await?;
        }
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(mysql_dsn)
                .await
                .context("connect to mysql")?;
            run_server(&config, repository, auth).await?;
        }
    }

    Ok(())
}

async fn run_server<R: Repository>(
    config: &CLI,
    repository: R,
    auth: HeaderAuthenticator,
) -> anyhow::Result<()> {
    if config.seed_demo {
        seed::seed_demo(&repository, &auth)
            .await
            .context("seed demo data")?;
    }

    let state = AppState::new(Arc::new(JokeService::new(repository)), Arc::new(auth))
        .with_list_limit(usize::from(config.list_limit));

    serve(config.listen_addr, App::router(state)).await
}

async fn serve(listen_addr: SocketAddr, router: axum::Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("bind {listen_addr}"))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve http")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
