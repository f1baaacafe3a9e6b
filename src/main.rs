#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;
use std::sync::Arc;

use anyhow::Error;

use crate::application::cli;
use crate::application::server;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendName;
use crate::domain::services::datasets::DatasetStore;
use crate::domain::services::orchestrator::ChatOrchestrator;
use crate::domain::services::rate_limiter::RateLimiter;
use crate::infrastructure::backends::BackendManager;

fn handle_error(err: Error) {
    eprintln!(
        "Driftboard has failed with the following app version and error.\n\nVersion: {}\nCommit: {}\nError: {}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE"),
        err
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

async fn run() -> anyhow::Result<()> {
    let backend = BackendManager::get(BackendName::parse(Config::get(ConfigKey::Backend))?)?;

    // Missing or bad credentials should fail here, not on the first chat.
    backend.health_check().await?;
    tracing::info!(backend = %backend.name(), "backend healthy");

    let datasets = DatasetStore::load()?;
    let orchestrator = ChatOrchestrator::new(Arc::new(backend), RateLimiter::from_config());

    return server::serve(datasets, orchestrator).await;
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| return tracing_subscriber::EnvFilter::new("driftboard=info")),
        )
        .init();

    let ready_res = cli::parse().await;
    if let Err(ready_err) = ready_res {
        handle_error(ready_err);
        return;
    }
    if !ready_res.unwrap() {
        process::exit(0);
    }

    if let Err(err) = run().await {
        handle_error(err);
    }

    process::exit(0);
}
