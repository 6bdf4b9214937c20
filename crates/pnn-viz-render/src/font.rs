/// Parse options for rasterising or converting our SVG: system fonts with
/// the first face of [`crate::text::FONT_FAMILY`] as the fallback family.
pub fn usvg_options() -> usvg::Options<'static> {
    let mut opt = usvg::Options::default();
    if let Some(first) = crate::text::FONT_FAMILY.split(',').next() {
        opt.font_family = first.trim().to_string();
    }
    opt.fontdb_mut().load_system_fonts();
    opt
}
