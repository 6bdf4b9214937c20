use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_paramnn"))
}

fn tmp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let mut p = std::env::temp_dir();
    p.push(format!("paramnn_cli_{}_{}_{}", std::process::id(), nanos, name));
    p
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn write_pipeline(dir: &Path, stages: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let yaml = format!(
        r#"config:
  data_dir: "{data}"
  plot_dir: "{plots}"
  input_dir: "{events}"
  jes: [0.9, 1.0, 1.1]
  fixed:
    network:
      epochs: 3
  parameterized:
    network:
      epochs: 5
  evaluation:
    alpha: [0.9, 1.1]
    probe: [0.9, 1.1]
    use_holdout: false
  heatmap:
    grid_points: 10
    sample_size: 40
  comparison:
    grid_alpha: [1.0]
    grid_points: 8
  plots:
    overlay_jes: [0.9, 1.1]
    formats: [svg]
  toy:
    events_per_file: 40
render:
  theme: paper
stages: {stages}
"#,
        data = dir.join("data").display(),
        plots = dir.join("plots").display(),
        events = dir.join("events").display(),
    );
    let path = dir.join("pipeline.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}

#[test]
fn run_full_pipeline_writes_tables_and_plots() {
    let dir = tmp_path("full");
    let cfg = write_pipeline(
        &dir,
        "[generate, extract, concat, train-fixed, train-param, evaluate, analysis, export, plot]",
    );

    let out = run(&["run", "--config", cfg.to_str().unwrap()]);
    assert!(out.status.success(), "paramnn run should succeed, stderr={}", stderr(&out));

    let v: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("stdout should be valid JSON");
    let stages = v.get("stages").and_then(|s| s.as_array()).expect("stages array");
    assert_eq!(stages.len(), 9);
    assert_eq!(stages[0]["stage"], "generate");
    assert_eq!(stages[8]["stage"], "plot");

    let fixed = stages[3]["summary"]["fixed"].as_array().expect("fixed results");
    assert_eq!(fixed.len(), 3);
    for r in fixed {
        let auc = r["auc"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&auc), "fixed auc out of range: {auc}");
    }
    assert_eq!(stages[6]["summary"]["sweep_records"], 3 * 80 * 2);

    let data = dir.join("data");
    for rel in [
        "manifest.json",
        "concatenated/ttbar_mx_1.000.dat",
        "models/fixed_0.900.json",
        "models/param_complete.json",
        "plot_data/roc/param_roc_1.100.dat",
        "analysis_data/fixed.csv",
        "analysis_data/parameterized.csv",
        "analysis_data/parameterized.parquet",
        "analysis_data/fixed_1.000.parquet",
    ] {
        assert!(data.join(rel).is_file(), "missing {rel}");
    }

    let plots = dir.join("plots");
    for rel in [
        "roc/fixed_roc.svg",
        "roc/param_roc.svg",
        "roc/compare_roc_0.900.svg",
        "roc/reference_roc.svg",
        "outputs/mwwbb_outputs.svg",
        "outputs/mjj_outputs.svg",
        "histograms/mwwbb_histogram_0.900.svg",
        "histograms/mjj_shapes.svg",
        "output_heat_map/fixed_1.100.svg",
        "output_heat_map/param_0.900.svg",
        "output_heat_map/comparison_1.000.svg",
        "artifacts/roc/fixed_roc.json",
    ] {
        assert!(plots.join(rel).is_file(), "missing plot {rel}");
    }
    assert!(!plots.join("roc/fixed_roc.png").exists(), "only svg was requested");

    let svg = std::fs::read_to_string(plots.join("roc/fixed_roc.svg")).unwrap();
    assert!(svg.starts_with("<svg"), "rendered plot should be SVG");
    assert!(svg.contains("AUC"));

    // Standalone render of a written artifact.
    let artifact = plots.join("artifacts/roc/fixed_roc.json");
    let rendered = dir.join("rerender/roc.svg");
    let out = run(&[
        "render",
        "--input",
        artifact.to_str().unwrap(),
        "--kind",
        "roc",
        "--output",
        rendered.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "render should succeed, stderr={}", stderr(&out));
    assert!(rendered.is_file());

    let out = run(&[
        "render",
        "--input",
        artifact.to_str().unwrap(),
        "--kind",
        "pie",
        "--output",
        rendered.to_str().unwrap(),
    ]);
    assert!(!out.status.success(), "unknown kind should fail");
    assert!(stderr(&out).contains("unknown artifact kind"));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn stage_subcommand_writes_summary_file() {
    let dir = tmp_path("stage");
    let cfg = write_pipeline(&dir, "[]");
    let summary = dir.join("generate.json");

    let out = run(&["generate", "--config", cfg.to_str().unwrap(), "--output", summary.to_str().unwrap()]);
    assert!(out.status.success(), "generate should succeed, stderr={}", stderr(&out));
    let v: serde_json::Value = serde_json::from_slice(&std::fs::read(&summary).unwrap()).unwrap();
    assert_eq!(v["files"].as_array().map(|a| a.len()), Some(6));
    assert!(dir.join("events").is_dir());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_event_directory_aborts() {
    let dir = tmp_path("missing");
    let cfg = write_pipeline(&dir, "[extract]");

    let out = run(&["run", "--config", cfg.to_str().unwrap()]);
    assert!(!out.status.success(), "extract without inputs should fail");
    let err = stderr(&out);
    assert!(err.contains("stage 'extract' failed"), "stderr={err}");
    assert!(err.contains("missing input"), "stderr={err}");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn training_without_datasets_aborts() {
    let dir = tmp_path("untrained");
    let cfg = write_pipeline(&dir, "[]");

    let out = run(&["train-fixed", "--config", cfg.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("missing input"));
    assert!(!dir.join("data/models").exists(), "no model may be written");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn run_rejects_empty_stage_list() {
    let dir = tmp_path("empty");
    let cfg = write_pipeline(&dir, "[]");

    let out = run(&["run", "--config", cfg.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("lists no stages"));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn invalid_pipeline_file_is_rejected() {
    let dir = tmp_path("invalid");
    std::fs::create_dir_all(&dir).unwrap();
    let cfg = dir.join("pipeline.json");
    std::fs::write(&cfg, r#"{"config":{"jes_list":[1.0]},"stages":["plot"]}"#).unwrap();

    let out = run(&["run", "--config", cfg.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("invalid pipeline file"));

    std::fs::remove_dir_all(&dir).ok();
}
