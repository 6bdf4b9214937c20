pub mod heatmap;
pub mod histogram;
pub mod outputs;
pub mod roc;

mod axes_draw;

/// Placeholder document for an artifact with nothing to draw.
fn empty_svg(message: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="160" height="50"><text x="10" y="30">{message}</text></svg>"#
    )
}
