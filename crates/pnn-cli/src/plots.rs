//! `paramnn plot`: build every plot artifact the store can feed and render it.
//!
//! Artifact JSON lands under `<plot_dir>/artifacts/`, rendered files under
//! `<plot_dir>/` in each configured format.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use pnn_core::{AnalysisConfig, ArtifactKind, ArtifactStore, JesKey, PlotFormat};
use pnn_train::fixed::load_fixed_model;
use pnn_train::interpolate::select_param_model;
use pnn_viz::heatmap::{fixed_heatmap, grid_comparison, param_heatmap};
use pnn_viz::histogram::mass_histogram;
use pnn_viz::outputs::output_curves;
use pnn_viz::roc::roc_artifact;
use pnn_viz::{MassVariable, OutputSource, RocSource};
use pnn_viz_render::config::VizConfig;

struct PlotWriter<'a> {
    dir: PathBuf,
    formats: &'a [PlotFormat],
    render: &'a VizConfig,
    written: Vec<PathBuf>,
}

impl PlotWriter<'_> {
    fn emit<T: Serialize>(&mut self, name: &str, kind: &str, artifact: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(artifact)?;
        let artifact_path = self.dir.join("artifacts").join(format!("{name}.json"));
        write_file(&artifact_path, json.as_bytes())?;

        let svg = pnn_viz_render::render_svg(&json, kind, self.render)
            .with_context(|| format!("failed to render {name}"))?;
        for format in self.formats {
            let ext = format.extension();
            let bytes = pnn_viz_render::svg_to_bytes(svg.clone(), ext, self.render)
                .with_context(|| format!("failed to convert {name} to {ext}"))?;
            let path = self.dir.join(format!("{name}.{ext}"));
            write_file(&path, &bytes)?;
            tracing::debug!(path = %path.display(), "wrote plot");
            self.written.push(path);
        }
        Ok(())
    }
}

fn write_file(path: &std::path::Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

/// Keys of `candidates` whose artifact of `kind` can be resolved.
fn available(store: &ArtifactStore, kind: ArtifactKind, candidates: &[JesKey]) -> Vec<JesKey> {
    candidates.iter().copied().filter(|&k| store.resolve(kind, Some(k)).is_ok()).collect()
}

/// Render every plot whose inputs exist. Returns the written plot files.
pub fn plot_all(store: &ArtifactStore, config: &AnalysisConfig, render: &VizConfig) -> Result<Vec<PathBuf>> {
    config.validate()?;
    let overlay = JesKey::from_values(&config.plots.overlay_jes)?;
    let mut w = PlotWriter {
        dir: config.plot_dir.clone(),
        formats: &config.plots.formats,
        render,
        written: Vec::new(),
    };
    tracing::info!(plot_dir = %w.dir.display(), "processing plots");

    // ROC
    let fixed_roc = available(store, ArtifactKind::FixedRoc, &overlay);
    if !fixed_roc.is_empty() {
        let entries: Vec<_> = fixed_roc.iter().map(|&k| (RocSource::Fixed, k)).collect();
        w.emit("roc/fixed_roc", "roc", &roc_artifact(store, "Fixed training", &entries)?)?;
    }
    let param_roc = store.keys(ArtifactKind::ParamRoc);
    if !param_roc.is_empty() {
        let entries: Vec<_> = param_roc.iter().map(|&k| (RocSource::Parameterized, k)).collect();
        w.emit("roc/param_roc", "roc", &roc_artifact(store, "Parameterized validation", &entries)?)?;
    }
    for key in available(store, ArtifactKind::FixedRoc, &param_roc) {
        let entries = [(RocSource::Fixed, key), (RocSource::Parameterized, key)];
        let title = format!("Fixed vs parameterized, JES = {key}");
        w.emit(&format!("roc/compare_roc_{key}"), "roc", &roc_artifact(store, title, &entries)?)?;
    }
    let reference_roc = available(store, ArtifactKind::ReferenceRoc, &overlay);
    if !reference_roc.is_empty() {
        let entries: Vec<_> = reference_roc.iter().map(|&k| (RocSource::Reference, k)).collect();
        let title = format!("Reference model, JES = {:.3}", config.analysis.reference_jes);
        w.emit("roc/reference_roc", "roc", &roc_artifact(store, title, &entries)?)?;
    }

    // Output curves
    let fixed_out = available(store, ArtifactKind::FixedOutputs, &overlay);
    let param_out = store.keys(ArtifactKind::ParamOutputs);
    let mut entries: Vec<_> = fixed_out.iter().map(|&k| (OutputSource::Fixed, k)).collect();
    entries.extend(param_out.iter().map(|&k| (OutputSource::Parameterized, k)));
    if !entries.is_empty() {
        for variable in [MassVariable::Mwwbb, MassVariable::Mjj] {
            let art = output_curves(store, "NN output", variable, &entries, config.plots.decimate)?;
            w.emit(&format!("outputs/{}_outputs", variable.name()), "outputs", &art)?;
        }
    }

    // Histograms
    let shape_keys: Vec<JesKey> = available(store, ArtifactKind::SignalEvents, &overlay)
        .into_iter()
        .filter(|&k| store.resolve(ArtifactKind::BackgroundEvents, Some(k)).is_ok())
        .collect();
    for variable in [MassVariable::Mwwbb, MassVariable::Mjj] {
        for &key in &shape_keys {
            let art = mass_histogram(store, variable, &[key])?;
            w.emit(&format!("histograms/{}_histogram_{key}", variable.name()), "histogram", &art)?;
        }
        if shape_keys.len() > 1 {
            let art = mass_histogram(store, variable, &shape_keys)?;
            w.emit(&format!("histograms/{}_shapes", variable.name()), "histogram", &art)?;
        }
    }

    // Heat maps
    for key in fixed_out {
        let art = fixed_heatmap(store, key, &config.heatmap)?;
        w.emit(&format!("output_heat_map/fixed_{key}"), "heatmap", &art)?;
    }
    for key in param_out {
        let art = param_heatmap(store, key, &config.heatmap)?;
        w.emit(&format!("output_heat_map/param_{key}"), "heatmap", &art)?;
    }

    // Fixed vs parameterized on the comparison grid
    let complete = store.resolve(ArtifactKind::ParamModel, None).is_ok();
    let use_holdout = config.evaluation.use_holdout;
    for key in config.grid_alpha_keys()? {
        let holdout = use_holdout && store.entry(ArtifactKind::HoldoutModel, Some(key)).is_some();
        if !complete && !holdout {
            tracing::warn!(jes = %key, "no parameterized model recorded, skipping grid comparison");
            continue;
        }
        let fixed = load_fixed_model(store, key)
            .with_context(|| format!("comparison at JES = {key} needs the fixed model"))?;
        let (param, choice) = select_param_model(store, key, use_holdout)?;
        tracing::debug!(jes = %key, model = %choice, "grid comparison");
        let art = grid_comparison(&fixed, &param, key, &config.comparison)?;
        w.emit(&format!("output_heat_map/comparison_{key}"), "comparison", &art)?;
    }

    if w.written.is_empty() {
        anyhow::bail!(
            "no plot inputs found in {}; run the extract and training stages first",
            store.root().display()
        );
    }
    tracing::info!(plots = w.written.len(), "plots written");
    Ok(w.written)
}
