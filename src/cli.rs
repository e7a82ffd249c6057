use anyhow::{Context as AnyhowContext, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::DiscoveryConfig;
use crate::container::{ModuleHost, WorkspaceManifest};
use crate::discovery::{create_strategy, StrategyKind};
use crate::model::TestUnit;
use crate::observer::ModuleLifecycleObserver;
use crate::registry::TestRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "modscout")]
#[command(about = "Module-aware test discovery - list the test types each module contains", long_about = None)]
pub struct Args {
    /// Workspace manifest describing the modules (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub manifest: PathBuf,

    /// Discovery config file (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Discovery strategy, overriding the config file
    #[arg(long)]
    pub strategy: Option<StrategyKind>,

    /// Output file path (prints to stdout if not specified)
    #[arg(short = 'O', long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short = 'f', long, default_value = "text")]
    pub format: OutputFormat,

    /// Only report units with this external id. Can be specified multiple times.
    #[arg(long, value_name = "ID")]
    pub id: Vec<String>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        validate_file(&self.manifest, "Manifest")?;
        if let Some(ref config) = self.config {
            validate_file(config, "Config file")?;
        }
        Ok(())
    }

    pub fn discovery_config(&self) -> Result<DiscoveryConfig> {
        let mut config = match &self.config {
            Some(path) => DiscoveryConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => DiscoveryConfig::default(),
        };
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        Ok(config)
    }
}

fn validate_file(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("{what} does not exist: {}", path.display());
    }
    if !path.is_file() {
        anyhow::bail!("{what} is not a file: {}", path.display());
    }
    Ok(())
}

/// Loads the workspace, lets the lifecycle observer index it, and returns
/// the selected units ordered by external id.
pub fn run(args: &Args) -> Result<Vec<TestUnit>> {
    let config = args.discovery_config()?;
    let manifest = WorkspaceManifest::load(&args.manifest)
        .with_context(|| format!("Failed to load manifest: {}", args.manifest.display()))?;

    let host = Arc::new(ModuleHost::with_platform_prefixes(config.platform_prefixes.clone()));
    manifest
        .install_into(&host)
        .context("Failed to install workspace modules")?;

    let registry = Arc::new(TestRegistry::new(create_strategy(&config), host.clone()));
    let observer = ModuleLifecycleObserver::new(registry.clone());
    observer.activate(&*host);

    let units = if args.id.is_empty() {
        registry.all_units()
    } else {
        let ids: HashSet<String> = args.id.iter().cloned().collect();
        registry.units(&ids)
    };

    info!(
        modules = registry.module_count(),
        units = units.len(),
        strategy = registry.strategy_name(),
        "discovery finished"
    );
    Ok(units)
}

#[derive(Serialize)]
struct UnitRecord<'a> {
    id: String,
    module: &'a str,
    type_name: &'a str,
}

pub fn render(units: &[TestUnit], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(units
            .iter()
            .map(|u| format!("{}\n", u.id()))
            .collect()),
        OutputFormat::Json => {
            let records: Vec<UnitRecord<'_>> = units
                .iter()
                .map(|u| UnitRecord {
                    id: u.id(),
                    module: u.module().as_str(),
                    type_name: u.type_name(),
                })
                .collect();
            serde_json::to_string_pretty(&records).context("Failed to serialize units")
        }
    }
}
