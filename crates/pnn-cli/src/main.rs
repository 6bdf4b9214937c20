//! paramnn CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};

use pnn_core::{AnalysisConfig, ArtifactKind, ArtifactStore};
use pnn_io::export::export_records_parquet;
use pnn_io::{concatenate_all, extract_dir, toy};
use pnn_train::analysis::{fixed_reference, fixed_self, parameterized_sweep};
use pnn_train::{evaluate_alpha, train_fixed, train_parameterized};

mod pipeline;
mod plots;

use pipeline::{Pipeline, Stage};

#[derive(Parser)]
#[command(name = "paramnn")]
#[command(about = "paramnn - JES-parameterized neural network analysis")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write toy signal/background event files for every configured scale
    Generate(StageArgs),
    /// Extract event tables from the Parquet files in `input_dir`
    Extract(StageArgs),
    /// Concatenate signal and background tables per scale
    Concat(StageArgs),
    /// Train one fixed model per scale
    TrainFixed(StageArgs),
    /// Train the parameterized model (and holdout models)
    TrainParam(StageArgs),
    /// Validate the parameterized model at the `evaluation.alpha` scales
    Evaluate(StageArgs),
    /// Write the fixed reference, fixed self and parameterized sweep tables
    Analysis(StageArgs),
    /// Export the analysis tables to Parquet
    Export(StageArgs),
    /// Build and render every plot whose inputs exist
    Plot(StageArgs),
    /// Run the stages listed in a pipeline file, in order
    Run {
        /// Pipeline file (YAML, or JSON by extension)
        #[arg(short, long)]
        config: PathBuf,

        /// Output file for the run summary (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render one plot artifact JSON to SVG/PNG/PDF
    Render {
        /// Artifact JSON
        #[arg(short, long)]
        input: PathBuf,

        /// Artifact kind (roc, outputs, heatmap, comparison, histogram)
        #[arg(short, long)]
        kind: String,

        /// Output file; the format comes from the extension
        #[arg(short, long)]
        output: PathBuf,

        /// Pipeline file whose `render` section styles the plot
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct StageArgs {
    /// Pipeline file (YAML, or JSON by extension). Defaults to the reference analysis.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file for the stage summary (pretty JSON). Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    match cli.command {
        Commands::Generate(args) => cmd_stage(Stage::Generate, &args),
        Commands::Extract(args) => cmd_stage(Stage::Extract, &args),
        Commands::Concat(args) => cmd_stage(Stage::Concat, &args),
        Commands::TrainFixed(args) => cmd_stage(Stage::TrainFixed, &args),
        Commands::TrainParam(args) => cmd_stage(Stage::TrainParam, &args),
        Commands::Evaluate(args) => cmd_stage(Stage::Evaluate, &args),
        Commands::Analysis(args) => cmd_stage(Stage::Analysis, &args),
        Commands::Export(args) => cmd_stage(Stage::Export, &args),
        Commands::Plot(args) => cmd_stage(Stage::Plot, &args),
        Commands::Run { config, output } => cmd_run(&config, output.as_ref()),
        Commands::Render { input, kind, output, config } => {
            cmd_render(&input, &kind, &output, config.as_deref())
        }
    }
}

fn write_json(output: Option<&PathBuf>, value: serde_json::Value) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&value)?)?;
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}

fn cmd_stage(stage: Stage, args: &StageArgs) -> Result<()> {
    let pipeline = pipeline::load(args.config.as_deref())?;
    let summary = run_stage(stage, &pipeline)?;
    write_json(args.output.as_ref(), summary)
}

fn cmd_run(config: &Path, output: Option<&PathBuf>) -> Result<()> {
    let pipeline = pipeline::read_pipeline(config)?;
    if pipeline.stages.is_empty() {
        anyhow::bail!("pipeline file {} lists no stages", config.display());
    }
    let mut stages = Vec::with_capacity(pipeline.stages.len());
    for &stage in &pipeline.stages {
        tracing::info!(stage = %stage, "running stage");
        let summary = run_stage(stage, &pipeline)?;
        stages.push(json!({ "stage": stage.name(), "summary": summary }));
    }
    write_json(output, json!({ "stages": stages }))
}

fn cmd_render(input: &Path, kind: &str, output: &Path, config: Option<&Path>) -> Result<()> {
    let render = pipeline::load(config)?.render;
    let artifact = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read artifact {}", input.display()))?;
    pnn_viz_render::render_to_file(&artifact, kind, output, &render)
        .with_context(|| format!("failed to render {} as {kind}", input.display()))?;
    tracing::info!(output = %output.display(), "rendered artifact");
    Ok(())
}

fn open_store(config: &AnalysisConfig) -> Result<ArtifactStore> {
    ArtifactStore::open(&config.data_dir)
        .with_context(|| format!("failed to open artifact store {}", config.data_dir.display()))
}

fn run_stage(stage: Stage, pipeline: &Pipeline) -> Result<serde_json::Value> {
    let cfg = &pipeline.config;
    let ctx = || format!("stage '{stage}' failed");
    let summary = match stage {
        Stage::Generate => {
            let files = toy::generate(&cfg.toy, &cfg.jes_keys()?, &cfg.tree, &cfg.input_dir)
                .with_context(ctx)?;
            json!({ "files": files })
        }
        Stage::Extract => {
            let mut store = open_store(cfg)?;
            let extracted = extract_dir(&mut store, &cfg.input_dir, &cfg.tree).with_context(ctx)?;
            let rows: Vec<_> = extracted
                .iter()
                .map(|e| {
                    json!({
                        "source": e.source,
                        "path": e.path,
                        "class": e.class.to_string(),
                        "jes": e.jes,
                        "mx": e.mx,
                        "n_events": e.n_events,
                    })
                })
                .collect();
            json!({ "extracted": rows })
        }
        Stage::Concat => {
            let mut store = open_store(cfg)?;
            let keys = concatenate_all(&mut store).with_context(ctx)?;
            json!({ "datasets": keys })
        }
        Stage::TrainFixed => {
            let mut store = open_store(cfg)?;
            let results = train_fixed(&mut store, cfg).with_context(ctx)?;
            let rows: Vec<_> = results
                .iter()
                .map(|r| json!({ "jes": r.jes, "n_events": r.n_events, "score": r.score, "auc": r.auc }))
                .collect();
            json!({ "fixed": rows })
        }
        Stage::TrainParam => {
            let mut store = open_store(cfg)?;
            let results = train_parameterized(&mut store, cfg).with_context(ctx)?;
            let rows: Vec<_> = results
                .iter()
                .map(|r| {
                    json!({
                        "holdout": r.holdout,
                        "conditions": r.conditions,
                        "n_events": r.n_events,
                        "score": r.score,
                    })
                })
                .collect();
            json!({ "parameterized": rows })
        }
        Stage::Evaluate => {
            let mut store = open_store(cfg)?;
            let results = evaluate_alpha(&mut store, cfg).with_context(ctx)?;
            let rows: Vec<_> = results
                .iter()
                .map(|r| {
                    json!({
                        "jes": r.jes,
                        "model": r.model.to_string(),
                        "n_events": r.n_events,
                        "auc": r.auc,
                    })
                })
                .collect();
            json!({ "evaluation": rows })
        }
        Stage::Analysis => {
            let mut store = open_store(cfg)?;
            let reference = fixed_reference(&mut store, cfg).with_context(ctx)?;
            let self_rows = fixed_self(&mut store, cfg).with_context(ctx)?;
            let sweep_rows = parameterized_sweep(&mut store, cfg).with_context(ctx)?;
            let reference: Vec<_> =
                reference.iter().map(|r| json!({ "jes": r.jes, "auc": r.auc })).collect();
            json!({
                "reference_jes": cfg.analysis.reference_jes,
                "reference_auc": reference,
                "self_records": self_rows,
                "sweep_records": sweep_rows,
            })
        }
        Stage::Export => {
            let mut store = open_store(cfg)?;
            json!({ "exported": export_tables(&mut store).with_context(ctx)? })
        }
        Stage::Plot => {
            let store = open_store(cfg)?;
            let written = plots::plot_all(&store, cfg, &pipeline.render).with_context(ctx)?;
            json!({ "plots": written })
        }
    };
    Ok(summary)
}

/// Export every recorded analysis table to its columnar counterpart.
fn export_tables(store: &mut ArtifactStore) -> Result<Vec<serde_json::Value>> {
    let mut jobs = Vec::new();
    if store.entry(ArtifactKind::ReferenceAnalysis, None).is_some() {
        jobs.push((ArtifactKind::ReferenceAnalysis, ArtifactKind::ReferenceColumnar, None));
    }
    for key in store.keys(ArtifactKind::SelfAnalysis) {
        jobs.push((ArtifactKind::SelfAnalysis, ArtifactKind::SelfColumnar, Some(key)));
    }
    if store.entry(ArtifactKind::SweepAnalysis, None).is_some() {
        jobs.push((ArtifactKind::SweepAnalysis, ArtifactKind::SweepColumnar, None));
    }
    if jobs.is_empty() {
        anyhow::bail!(
            "no analysis tables recorded in {}; run the analysis stage first",
            store.root().display()
        );
    }

    let mut out = Vec::with_capacity(jobs.len());
    for (source, target, key) in jobs {
        let csv = store.resolve(source, key)?;
        let parquet = store.path(target, key)?;
        let title = match key {
            Some(k) => format!("{source} {k}"),
            None => source.to_string(),
        };
        let rows = export_records_parquet(&csv, &parquet, &title)?;
        store.record(target, key, &parquet)?;
        out.push(json!({ "table": title, "path": parquet, "rows": rows }));
    }
    Ok(out)
}
