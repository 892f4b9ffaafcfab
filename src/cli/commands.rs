use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{load_effective_config, GeneratorConfig};
use crate::generator::StubProcessor;
use crate::model::{EndpointModel, ModelPolicy};
use crate::scan::{scan, CollectingMessager, Round, TracingMessager};
use crate::source::collect_round;

/// Command-line interface for stubgen
#[derive(Parser)]
#[command(name = "stubgen")]
#[command(about = "Generate HTTP mock stubs from annotated endpoint declarations", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Where declarations come from
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Rust source tree to scan (repeatable)
    #[arg(long = "src")]
    pub src: Vec<PathBuf>,

    /// YAML or JSON declaration manifest (repeatable)
    #[arg(long)]
    pub manifest: Vec<PathBuf>,

    /// Package prefix for declarations found in Rust sources
    #[arg(long)]
    pub root_package: Option<String>,
}

/// Config file and output root overrides
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Path to stubgen.toml (default: ./stubgen.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Root of the canonical generated-sources tree
    #[arg(long)]
    pub generated_root: Option<PathBuf>,

    /// Root of the mirror tree
    #[arg(long)]
    pub mirror_root: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Scan declarations and write the stub sources
    Generate {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Handling of incomplete endpoint models
        #[arg(long, value_enum)]
        mode: Option<ModelPolicy>,

        /// Directory with stub_base.rs.j2 / stub.rs.j2 overrides
        #[arg(long)]
        templates: Option<PathBuf>,

        /// Remove both output roots before writing
        #[arg(long, default_value_t = false)]
        clean: bool,
    },
    /// Scan declarations and print the endpoint model without writing files
    Inspect {
        #[command(flatten)]
        source: SourceArgs,

        /// Path to stubgen.toml (default: ./stubgen.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Remove the generated output roots
    Clean {
        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Execute the parsed command.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    match cli.command {
        Commands::Generate {
            source,
            output,
            mode,
            templates,
            clean,
        } => {
            let mut config = effective_config(&cwd, &output, &source)?;
            if let Some(mode) = mode {
                config.mode = mode;
            }
            if templates.is_some() {
                config.templates = templates;
            }
            if clean {
                clean_outputs(&config, &cwd)?;
            }
            let round = collect_for(&source, &config)?;
            let processor = StubProcessor::from_config(&config)?;
            let report = processor.process_round(&round, &mut TracingMessager)?;
            if report.artifacts.is_empty() {
                println!("No markers found, nothing generated");
            }
            for path in report.written_files() {
                println!("✅ {}", path.display());
            }
            Ok(())
        }
        Commands::Inspect { source, config } => {
            let output = OutputArgs {
                config,
                ..OutputArgs::default()
            };
            let config = effective_config(&cwd, &output, &source)?;
            let round = collect_for(&source, &config)?;
            let (notes, model) = inspect_round(&round);
            for note in &notes {
                eprintln!("{note}");
            }
            let json = serde_json::to_string_pretty(&model_summary(&model))
                .context("Failed to serialize endpoint model")?;
            println!("{json}");
            Ok(())
        }
        Commands::Clean { output } => {
            let config = effective_config(&cwd, &output, &SourceArgs::default())?;
            clean_outputs(&config, &cwd)
        }
    }
}

/// Config file and environment, then the flags given on the command line.
fn effective_config(
    base_dir: &Path,
    output: &OutputArgs,
    source: &SourceArgs,
) -> anyhow::Result<GeneratorConfig> {
    let mut config = load_effective_config(output.config.as_deref(), base_dir)?;
    if let Some(root) = &output.generated_root {
        config.generated_root = root.clone();
    }
    if let Some(root) = &output.mirror_root {
        config.mirror_root = root.clone();
    }
    if let Some(package) = &source.root_package {
        config.root_package = Some(package.clone()).filter(|p| !p.is_empty());
    }
    Ok(config)
}

fn collect_for(source: &SourceArgs, config: &GeneratorConfig) -> anyhow::Result<Round> {
    if source.src.is_empty() && source.manifest.is_empty() {
        anyhow::bail!("Nothing to scan: pass at least one --src or --manifest");
    }
    collect_round(&source.src, &source.manifest, config.root_package.as_deref())
}

pub(crate) fn inspect_round(round: &Round) -> (Vec<String>, EndpointModel) {
    let mut messager = CollectingMessager::default();
    let model = scan(&round.declarations, &mut messager);
    (messager.notes, model)
}

pub(crate) fn model_summary(model: &EndpointModel) -> serde_json::Value {
    serde_json::json!({
        "package_name": model.package_name(),
        "stub_class_name": model.stub_class_name(),
        "stub_fully_qualified_name": model.stub_fully_qualified_name(),
        "stub_base_fully_qualified_name": model.stub_base_fully_qualified_name(),
        "method_name": model.method_name(),
        "response_type": model.response_type(),
        "root_resource": model.root_resource(),
        "sub_resource": model.sub_resource(),
        "missing": model.missing_fields(),
    })
}

/// Remove both output roots. Relative roots resolve against `cwd`.
///
/// Refuses to remove `cwd` or any directory containing it, and checks both
/// roots before removing either.
pub(crate) fn clean_outputs(config: &GeneratorConfig, cwd: &Path) -> anyhow::Result<()> {
    let cwd = cwd
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", cwd.display()))?;
    let mut existing = Vec::new();
    for root in [&config.generated_root, &config.mirror_root] {
        let resolved = cwd.join(root);
        if !resolved.exists() {
            continue;
        }
        let resolved = resolved
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", root.display()))?;
        if cwd.starts_with(&resolved) {
            anyhow::bail!(
                "Refusing to remove {}: it is or contains the working directory",
                root.display()
            );
        }
        existing.push(resolved);
    }
    for root in existing {
        // Already gone when one root is nested in the other.
        if !root.exists() {
            continue;
        }
        std::fs::remove_dir_all(&root)
            .with_context(|| format!("Failed to remove {}", root.display()))?;
        tracing::info!(path = %root.display(), "removed output root");
    }
    Ok(())
}
