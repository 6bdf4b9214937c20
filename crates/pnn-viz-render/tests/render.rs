//! Every artifact kind through the SVG renderer and the raster/vector
//! conversions.

use pnn_core::{EventClass, JesKey};
use pnn_viz::heatmap::GridComparison;
use pnn_viz::histogram::{HistogramArtifact, HistogramSeries};
use pnn_viz::outputs::{OutputCurvesArtifact, OutputSeries, OutputSource};
use pnn_viz::roc::{RocArtifact, RocSeries, RocSource};
use pnn_viz::{ARTIFACT_SCHEMA_V1, HeatmapArtifact, MassVariable, Surface, SurfaceKind, difference};
use pnn_viz_render::config::{VizConfig, resolve_config};
use pnn_viz_render::layout::multi_panel::RowLayout;
use pnn_viz_render::{RenderError, render_svg, render_to_bytes, render_to_file};

fn key(v: f64) -> JesKey {
    JesKey::from_value(v).unwrap()
}

fn roc() -> RocArtifact {
    RocArtifact {
        schema_version: ARTIFACT_SCHEMA_V1.into(),
        title: "Receiver Operating Characteristic".into(),
        curves: vec![RocSeries {
            label: "fixed JES = 1.000".into(),
            source: RocSource::Fixed,
            jes: key(1.0),
            fpr: vec![0.0, 0.1, 0.4, 1.0],
            tpr: vec![0.0, 0.6, 0.9, 1.0],
            auc: 0.835,
        }],
    }
}

fn heatmap(kind: SurfaceKind) -> HeatmapArtifact {
    let surface = Surface::from_fn(vec![0.0, 1500.0, 3000.0], vec![0.0, 250.0, 500.0], |x, y| {
        Ok(x / 3000.0 * 0.5 + y / 500.0 * 0.5)
    })
    .unwrap();
    HeatmapArtifact {
        schema_version: ARTIFACT_SCHEMA_V1.into(),
        title: "JES = 1.000".into(),
        x_label: "m_WWbb [GeV]".into(),
        y_label: "m_jj [GeV]".into(),
        z_label: "NN output".into(),
        kind,
        z_range: [0.0, 1.0],
        surface,
        scatter: vec![[100.0, 50.0, 0.2], [2900.0, 450.0, 0.9]],
    }
}

fn json<T: serde::Serialize>(v: &T) -> String {
    serde_json::to_string(v).unwrap()
}

#[test]
fn roc_svg_lists_auc_and_diagonal() {
    let svg = render_svg(&json(&roc()), "roc", &VizConfig::default()).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("fixed JES = 1.000 (AUC = 0.835)"));
    assert!(svg.contains("stroke-dasharray"));
    assert!(svg.contains("Background efficiency"));

    let no_diag = resolve_config(Some("roc:\n  show_diagonal: false\ngrid:\n  show: false\n")).unwrap();
    let svg = render_svg(&json(&roc()), "roc", &no_diag).unwrap();
    assert!(!svg.contains("stroke-dasharray"));
}

#[test]
fn outputs_and_histogram_svg() {
    let outputs = OutputCurvesArtifact {
        schema_version: ARTIFACT_SCHEMA_V1.into(),
        title: "Fixed training".into(),
        variable: MassVariable::Mjj,
        x_label: MassVariable::Mjj.label().into(),
        y_label: "NN output".into(),
        series: vec![
            OutputSeries {
                label: "fixed JES = 0.900".into(),
                source: OutputSource::Fixed,
                jes: key(0.9),
                x: vec![10.0, 80.0, 300.0],
                y: vec![0.1, 0.8, 0.3],
            },
            OutputSeries {
                label: "parameterized JES = 0.900".into(),
                source: OutputSource::Parameterized,
                jes: key(0.9),
                x: vec![20.0, 90.0],
                y: vec![0.2, 0.7],
            },
        ],
    };
    let svg = render_svg(&json(&outputs), "outputs", &VizConfig::default()).unwrap();
    assert_eq!(svg.matches("<circle").count(), 5 + 2);
    assert!(svg.contains("m_jj [GeV]"));

    let edges = MassVariable::Mjj.histogram_edges();
    let n = edges.len() - 1;
    let hist = HistogramArtifact {
        schema_version: ARTIFACT_SCHEMA_V1.into(),
        title: "JES = 1.000".into(),
        variable: MassVariable::Mjj,
        x_label: MassVariable::Mjj.label().into(),
        y_label: "Fraction of events / 15 GeV".into(),
        bin_edges: edges,
        series: vec![
            HistogramSeries { label: "signal".into(), class: EventClass::Signal, jes: key(1.0), density: vec![1.0 / 495.0; n] },
            HistogramSeries { label: "background".into(), class: EventClass::Background, jes: key(1.0), density: vec![0.0; n] },
        ],
    };
    let svg = render_svg(&json(&hist), "histogram", &VizConfig::default()).unwrap();
    assert!(svg.contains(">Signal<"));
    assert!(svg.contains(">Background<"));

    let mut bad = hist.clone();
    bad.series[0].density.pop();
    assert!(matches!(
        render_svg(&json(&bad), "histogram", &VizConfig::default()),
        Err(RenderError::Layout(_))
    ));
}

#[test]
fn heatmap_and_comparison_use_configured_colormaps() {
    let out = heatmap(SurfaceKind::Output);
    let svg = render_svg(&json(&out), "heatmap", &VizConfig::default()).unwrap();
    // Low corner in viridis.
    assert!(svg.contains("#440154"));
    assert!(svg.contains("NN output"));

    let par = heatmap(SurfaceKind::Output);
    let diff_surface = difference(&out.surface, &par.surface).unwrap();
    let cmp = GridComparison {
        jes: key(1.0),
        fixed: out.clone(),
        parameterized: par,
        difference: HeatmapArtifact {
            kind: SurfaceKind::Difference,
            z_range: [-1.0, 1.0],
            surface: diff_surface,
            scatter: Vec::new(),
            ..out.clone()
        },
    };
    let cfg = resolve_config(Some("colormaps:\n  difference: greys\n")).unwrap();
    let svg = render_svg(&json(&cmp), "comparison", &cfg).unwrap();
    // Zero difference is mid grey.
    assert!(svg.contains("#808080"));
    let row = RowLayout::new(3, cfg.figure.width, cfg.figure.height, 0.0);
    assert!(svg.contains(&format!("width=\"{}\"", row.total_width())));
}

#[test]
fn bad_kind_format_and_json() {
    let cfg = VizConfig::default();
    assert!(matches!(render_svg("{}", "pie", &cfg), Err(RenderError::UnknownKind(_))));
    assert!(matches!(render_svg("{", "roc", &cfg), Err(RenderError::Deserialize(_))));
    assert!(matches!(
        render_to_bytes(&json(&roc()), "roc", "gif", &cfg),
        Err(RenderError::UnknownFormat(_))
    ));
}

#[cfg(feature = "png")]
#[test]
fn png_has_signature_and_dpi_size() {
    let cfg = resolve_config(Some("output:\n  dpi: 72\n")).unwrap();
    let bytes = render_to_bytes(&json(&roc()), "roc", "png", &cfg).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    // IHDR width at 72 dpi equals the canvas width in points (rounded up).
    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    assert_eq!(width, cfg.figure.width.ceil() as u32);
}

#[cfg(feature = "pdf")]
#[test]
fn pdf_file_from_extension() {
    let dir = std::env::temp_dir().join(format!("pnn_render_{}", std::process::id()));
    let path = dir.join("nested/roc.pdf");
    render_to_file(&json(&roc()), "roc", &path, &VizConfig::default()).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    std::fs::remove_dir_all(&dir).ok();
}
