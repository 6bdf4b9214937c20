//! Plot artifacts built from a small trained toy store.

use std::path::{Path, PathBuf};

use pnn_core::{AnalysisConfig, ArtifactStore, ComparisonConfig, Error, HeatmapConfig, JesKey, LearningRule, Window};
use pnn_io::{concatenate_all, extract_dir, toy};
use pnn_train::fixed::load_fixed_model;
use pnn_train::parameterized::load_param_model;
use pnn_train::{evaluate_alpha, train_fixed, train_parameterized};
use pnn_viz::heatmap::{fixed_heatmap, grid_comparison, param_heatmap};
use pnn_viz::histogram::mass_histogram;
use pnn_viz::outputs::output_curves;
use pnn_viz::roc::roc_artifact;
use pnn_viz::{HeatmapArtifact, MassVariable, OutputSource, RocSource, SurfaceKind};

fn tmp_dir(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let p = std::env::temp_dir().join(format!("pnn_viz_{}_{}_{}", name, std::process::id(), nanos));
    std::fs::create_dir_all(&p).unwrap();
    p
}

fn key(v: f64) -> JesKey {
    JesKey::from_value(v).unwrap()
}

fn trained_store(dir: &Path) -> (AnalysisConfig, ArtifactStore) {
    let mut cfg = AnalysisConfig {
        data_dir: dir.join("data"),
        plot_dir: dir.join("plots"),
        input_dir: dir.join("events"),
        jes: vec![0.9, 1.0, 1.1],
        ..AnalysisConfig::default()
    };
    cfg.toy.events_per_file = 50;
    cfg.fixed.network.epochs = 5;
    cfg.parameterized.network.epochs = 10;
    cfg.parameterized.network.learning_rate = 0.05;
    cfg.parameterized.network.learning_rule = LearningRule::Nesterov;
    cfg.evaluation.alpha = Some(vec![0.9, 1.1]);
    cfg.evaluation.use_holdout = false;

    toy::generate(&cfg.toy, &cfg.jes_keys().unwrap(), &cfg.tree, &cfg.input_dir).unwrap();
    let mut store = ArtifactStore::open(&cfg.data_dir).unwrap();
    extract_dir(&mut store, &cfg.input_dir, &cfg.tree).unwrap();
    concatenate_all(&mut store).unwrap();
    train_fixed(&mut store, &cfg).unwrap();
    train_parameterized(&mut store, &cfg).unwrap();
    evaluate_alpha(&mut store, &cfg).unwrap();
    (cfg, store)
}

#[test]
fn artifacts_from_trained_store() {
    let dir = tmp_dir("all");
    let (_cfg, store) = trained_store(&dir);

    // ROC overlay: fixed and parameterized at the same scale.
    let roc = roc_artifact(
        &store,
        "ROC",
        &[(RocSource::Fixed, key(0.9)), (RocSource::Parameterized, key(0.9))],
    )
    .unwrap();
    assert_eq!(roc.curves.len(), 2);
    for c in &roc.curves {
        assert_eq!(c.fpr.len(), c.tpr.len());
        assert_eq!((c.fpr[0], c.tpr[0]), (0.0, 0.0));
        assert_eq!(*c.fpr.last().unwrap(), 1.0);
        assert!((0.0..=1.0).contains(&c.auc));
    }
    assert!(roc.curves[1].label.starts_with("parameterized"));

    // Output curves are sorted by mass and decimated.
    let curves = output_curves(
        &store,
        "outputs",
        MassVariable::Mwwbb,
        &[(OutputSource::Fixed, key(1.0)), (OutputSource::Parameterized, key(1.1))],
        2,
    )
    .unwrap();
    assert_eq!(curves.series[0].x.len(), 50);
    assert_eq!(curves.series[1].x.len(), 50);
    for s in &curves.series {
        assert!(s.x.windows(2).all(|w| w[0] <= w[1]));
    }

    // Histograms integrate to one per series.
    let hist = mass_histogram(&store, MassVariable::Mjj, &[key(0.9), key(1.1)]).unwrap();
    assert_eq!(hist.series.len(), 4);
    for s in &hist.series {
        assert_eq!(s.density.len(), hist.bin_edges.len() - 1);
        let area: f64 = s.density.iter().zip(hist.bin_edges.windows(2)).map(|(d, w)| d * (w[1] - w[0])).sum();
        assert!(area == 0.0 || (area - 1.0).abs() < 1e-9, "area={area}");
    }

    // Heat maps on a coarse grid.
    let hcfg = HeatmapConfig { grid_points: 12, sample_size: 40, ..HeatmapConfig::default() };
    let fixed = fixed_heatmap(&store, key(1.0), &hcfg).unwrap();
    assert_eq!(fixed.surface.z.len(), 144);
    assert_eq!(fixed.scatter.len(), 40);
    let param = param_heatmap(&store, key(1.1), &hcfg).unwrap();
    assert_eq!(param.kind, SurfaceKind::Output);
    let json = serde_json::to_string(&param).unwrap();
    let back: HeatmapArtifact = serde_json::from_str(&json).unwrap();
    assert_eq!(back.surface.z.len(), 144);

    // Grid comparison: difference is fixed minus parameterized.
    let fixed_model = load_fixed_model(&store, key(1.0)).unwrap();
    let param_model = load_param_model(&store).unwrap();
    let ccfg = ComparisonConfig {
        grid_alpha: Some(vec![1.0]),
        grid_points: 8,
        window: Window { x: [0.0, 3000.0], y: [0.0, 500.0] },
    };
    let cmp = grid_comparison(&fixed_model, &param_model, key(1.0), &ccfg).unwrap();
    assert_eq!(cmp.difference.kind, SurfaceKind::Difference);
    for i in 0..cmp.difference.surface.z.len() {
        let d = cmp.fixed.surface.z[i] - cmp.parameterized.surface.z[i];
        assert!((cmp.difference.surface.z[i] - d).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&cmp.fixed.surface.z[i]));
    }

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_tables_surface_as_missing_input() {
    let dir = tmp_dir("missing");
    let store = ArtifactStore::open(dir.join("data")).unwrap();
    let err = roc_artifact(&store, "ROC", &[(RocSource::Reference, key(1.0))]).unwrap_err();
    assert!(matches!(err, Error::MissingInput { .. }), "{err}");
    let err = mass_histogram(&store, MassVariable::Mwwbb, &[key(1.0)]).unwrap_err();
    assert!(matches!(err, Error::MissingInput { .. }), "{err}");
    std::fs::remove_dir_all(&dir).ok();
}
