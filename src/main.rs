// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use global_model_lifecycle::backends::{FileSink, FsBlobStore, SimulatedProvider, TracingSink};
use global_model_lifecycle::config::{load_and_validate_config, RegionRegistry, RuntimeBuilder};
use global_model_lifecycle::model::{InventoryInput, WorkflowKind, WorkflowRequest};
use global_model_lifecycle::traits::NotificationSink;
use global_model_lifecycle::workflows::{ManifestTrigger, ManifestUpload};

/// Run multi-region model lifecycle workflows against the simulated provider.
#[derive(Parser)]
#[command(name = "global-model-lifecycle", version, about)]
struct Cli {
    /// Region registry, policies and simulation settings (YAML or TOML)
    #[arg(short, long, default_value = "configs/simulated-demo.yaml")]
    config: PathBuf,

    /// Append notifications as JSON lines to this file instead of logging them
    #[arg(long)]
    notify_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a model version in every region
    Build {
        /// Workflow input document (JSON)
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Stop model versions in every region
    Stop {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Delete model versions (and optionally the project) in every region
    Delete {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// List projects and versions per region
    Describe {
        #[arg(short, long)]
        project: Option<String>,
    },
    /// Copy a manifest to every region's training location, then build
    Ingest {
        /// Local manifest file
        manifest: PathBuf,
        #[arg(long)]
        project: String,
        #[arg(long)]
        version: String,
        /// Object key; defaults to the manifest's file name
        #[arg(long)]
        key: Option<String>,
        /// Directory standing in for the regional buckets
        #[arg(long, default_value = "store")]
        store_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_and_validate_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let provider = Arc::new(SimulatedProvider::from_config(&config.simulation));
    let sink: Arc<dyn NotificationSink> = match &cli.notify_file {
        Some(path) => Arc::new(FileSink::new(path)),
        None => Arc::new(TracingSink),
    };
    let runner = RuntimeBuilder::from_config(&config, provider, sink);

    let request = match cli.command {
        Command::Build { input } => read_request(WorkflowKind::Build, &input)?,
        Command::Stop { input } => read_request(WorkflowKind::Stop, &input)?,
        Command::Delete { input } => read_request(WorkflowKind::Delete, &input)?,
        Command::Describe { project } => {
            let inventory = runner
                .describe(InventoryInput {
                    project_name: project,
                    regions: Vec::new(),
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&inventory)?);
            return Ok(());
        }
        Command::Ingest {
            manifest,
            project,
            version,
            key,
            store_dir,
        } => {
            let key = match key {
                Some(key) => key,
                None => manifest
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .context("manifest path has no file name")?,
            };
            let body = fs::read(&manifest)
                .with_context(|| format!("reading {}", manifest.display()))?;
            let trigger = ManifestTrigger::new(
                Arc::new(FsBlobStore::new(store_dir)),
                RegionRegistry::from_config(&config),
            );
            let input = trigger
                .ingest(&ManifestUpload {
                    project_name: project,
                    version_name: version,
                    key,
                    body,
                })
                .await?;
            WorkflowRequest::Build(input)
        }
    };

    let report = runner.run(request).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.result.all_succeeded() {
        std::process::exit(2);
    }
    Ok(())
}

fn read_request(kind: WorkflowKind, path: &Path) -> Result<WorkflowRequest> {
    let document =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(WorkflowRequest::from_json(kind, &document)?)
}
