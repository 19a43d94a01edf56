//! Agent configuration
//!
//! Two sources, flags over environment: `STALEPOD_*` variables supply the
//! base settings, command-line flags override them.

use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use stalepod_lib::MonitorConfig;
use std::time::Duration;

/// Stale-pod agent: detects pods whose resource usage stopped changing
/// and optionally deletes them
#[derive(Debug, Parser)]
#[command(name = "stalepod-agent", version, about, long_about = None)]
pub struct Cli {
    /// Path to kubeconfig file (in-cluster config is inferred when omitted)
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<String>,

    /// Namespace to watch
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// Only evaluate pods belonging to this deployment
    #[arg(long)]
    pub deployment: Option<String>,

    /// Log stale pods without deleting them
    #[arg(long)]
    pub dry_run: bool,

    /// Seconds between remediation passes
    #[arg(long)]
    pub period: Option<u64>,

    /// Usage delta below which a pod counts as stale
    #[arg(long)]
    pub threshold: Option<i64>,

    /// Compare memory bytes instead of CPU millicores
    #[arg(long)]
    pub check_ram: bool,

    /// Stop the agent after this many seconds (0 = run indefinitely)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Seconds between history pruning passes
    #[arg(long)]
    pub janitor_period: Option<u64>,

    /// Port for the health/metrics HTTP server
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// Resolved agent settings
#[derive(Debug, Clone, Deserialize)]
pub struct AgentSettings {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Empty string means no deployment filter
    #[serde(default)]
    pub deployment: String,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default = "default_period")]
    pub period_secs: u64,

    #[serde(default = "default_threshold")]
    pub threshold: i64,

    #[serde(default)]
    pub check_ram: bool,

    /// Zero means run indefinitely
    #[serde(default)]
    pub timeout_secs: u64,

    #[serde(default = "default_janitor_period")]
    pub janitor_period_secs: u64,

    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_period() -> u64 {
    60
}

fn default_threshold() -> i64 {
    100
}

fn default_janitor_period() -> u64 {
    300
}

fn default_api_port() -> u16 {
    8080
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            deployment: String::new(),
            dry_run: false,
            period_secs: default_period(),
            threshold: default_threshold(),
            check_ram: false,
            timeout_secs: 0,
            janitor_period_secs: default_janitor_period(),
            api_port: default_api_port(),
        }
    }
}

impl AgentSettings {
    /// Load settings from STALEPOD_* environment variables
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("STALEPOD"))
            .build()?;

        Ok(settings.try_deserialize().unwrap_or_default())
    }

    /// Apply command-line overrides on top of the environment values
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(namespace) = &cli.namespace {
            self.namespace = namespace.clone();
        }
        if let Some(deployment) = &cli.deployment {
            self.deployment = deployment.clone();
        }
        if cli.dry_run {
            self.dry_run = true;
        }
        if let Some(period) = cli.period {
            self.period_secs = period;
        }
        if let Some(threshold) = cli.threshold {
            self.threshold = threshold;
        }
        if cli.check_ram {
            self.check_ram = true;
        }
        if let Some(timeout) = cli.timeout {
            self.timeout_secs = timeout;
        }
        if let Some(janitor_period) = cli.janitor_period {
            self.janitor_period_secs = janitor_period;
        }
        if let Some(api_port) = cli.api_port {
            self.api_port = api_port;
        }
    }

    /// Bind the settings into the immutable monitoring configuration
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            namespace: self.namespace.clone(),
            deployment: if self.deployment.is_empty() {
                None
            } else {
                Some(self.deployment.clone())
            },
            check_ram: self.check_ram,
            threshold: self.threshold,
            period: Duration::from_secs(self.period_secs),
            dry_run: self.dry_run,
            timeout: if self.timeout_secs > 0 {
                Some(Duration::from_secs(self.timeout_secs))
            } else {
                None
            },
            janitor_period: Duration::from_secs(self.janitor_period_secs),
        }
    }
}
