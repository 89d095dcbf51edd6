use egui::Color32;

pub mod history;

pub use history::{ListeningHistoryApp, config::AppConfig};

pub(crate) const PALETTE_BLACK: Color32 = Color32::from_rgb(12, 12, 12);
pub(crate) const PALETTE_VINYL: Color32 = Color32::from_rgb(26, 26, 26);
pub(crate) const PALETTE_GROOVE: Color32 = Color32::from_rgb(48, 48, 48);
pub(crate) const PALETTE_SAND: Color32 = Color32::from_rgb(230, 217, 178);
pub(crate) const PALETTE_OCHRE: Color32 = Color32::from_rgb(183, 157, 79);
pub(crate) const PALETTE_MAROON: Color32 = Color32::from_rgb(155, 57, 34);
pub(crate) const PALETTE_ORANGE: Color32 = Color32::from_rgb(242, 97, 63);
pub(crate) const PALETTE_SILVER: Color32 = Color32::from_rgb(192, 192, 192);

/// Linear blend between two colors, `y` in [0, 1].
pub(crate) fn stroke_shade(start: Color32, end: Color32, y: f32) -> Color32 {
    let y = y.clamp(0., 1.);
    let channel = |from: u8, to: u8| -> u8 {
        (from as f32 + y * (to as f32 - from as f32)).round().clamp(0., 255.) as u8
    };
    Color32::from_rgb(
        channel(start.r(), end.r()),
        channel(start.g(), end.g()),
        channel(start.b(), end.b()),
    )
}
