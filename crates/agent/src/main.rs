//! Stale-pod agent
//!
//! Long-running operator that watches a namespace (or one deployment's
//! pods), flags pods whose resource usage stopped changing, and deletes
//! them unless running dry. Terminates on SIGINT or the configured
//! run-length timeout.

use anyhow::{Context, Result};
use clap::Parser;
use stalepod_lib::{
    health::components, AgentMetrics, HealthRegistry, HistoryJanitor, KubeClusterClient,
    LifecycleController, MetricsProbe, PodSelector, RemediationLoop, RetryPolicy,
    StalenessEvaluator, UsageHistory,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = config::Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(fmt::layer().json())
        .init();

    info!("Starting stalepod-agent");

    let mut settings = config::AgentSettings::load()?;
    settings.apply_cli(&cli);
    let monitor_config = settings.monitor_config();
    info!(
        namespace = %monitor_config.namespace,
        deployment = monitor_config.deployment.as_deref().unwrap_or(""),
        dry_run = monitor_config.dry_run,
        check_ram = monitor_config.check_ram,
        threshold = monitor_config.threshold,
        period_secs = monitor_config.period.as_secs(),
        "Agent configured"
    );

    // A client that cannot be built (bad kubeconfig, missing credentials)
    // aborts startup before any loop runs.
    let cluster = Arc::new(
        KubeClusterClient::connect(&monitor_config.namespace, cli.kubeconfig.as_deref())
            .await
            .context("failed to construct kubernetes client")?,
    );

    let health = HealthRegistry::new();
    health.register(components::MONITOR).await;
    health.register(components::JANITOR).await;
    health.register(components::CLUSTER).await;

    let metrics = AgentMetrics::new();
    let history = Arc::new(UsageHistory::new());
    let lifecycle = LifecycleController::new();

    let probe = MetricsProbe::new(
        cluster.clone(),
        monitor_config.check_ram,
        RetryPolicy::default(),
    );
    let evaluator = StalenessEvaluator::new(probe, history.clone(), monitor_config.threshold);
    let selector = PodSelector::new(cluster.clone(), monitor_config.deployment.clone());

    let monitor = RemediationLoop::new(
        selector,
        evaluator,
        cluster.clone(),
        monitor_config.period,
        monitor_config.dry_run,
        health.clone(),
        metrics.clone(),
    );
    tokio::spawn(monitor.run(lifecycle.subscribe()));

    let janitor = HistoryJanitor::new(
        history,
        cluster,
        monitor_config.janitor_period,
        health.clone(),
        metrics.clone(),
    );
    tokio::spawn(janitor.run(lifecycle.subscribe()));

    if let Some(timeout) = monitor_config.timeout {
        lifecycle.arm_timeout(timeout);
    }

    let state = Arc::new(api::AppState::new(health.clone(), metrics));
    tokio::spawn(api::serve(settings.api_port, state));

    health.set_ready(true).await;

    let shutdown = lifecycle.shutdown();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("SIGINT received");
            shutdown.cancel();
        }
    });

    lifecycle.wait().await;
    info!("Agent terminated");

    Ok(())
}
