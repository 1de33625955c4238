use image::Rgb;
use palette::{Hsl, IntoColor, Srgb, named};

// ---------------------------------------------------------------------------
// Colour helpers
// ---------------------------------------------------------------------------

/// Convert an 8-bit sRGB colour into an image pixel.
pub fn to_pixel(color: Srgb<u8>) -> Rgb<u8> {
    Rgb([color.red, color.green, color.blue])
}

/// A pale tint of `hue` (degrees), used for grid lines.
pub fn tint(hue: f32, lightness: f32) -> Rgb<u8> {
    let hsl = Hsl::new(hue, 0.25, lightness);
    let rgb: Srgb = hsl.into_color();
    Rgb([
        (rgb.red * 255.0).round() as u8,
        (rgb.green * 255.0).round() as u8,
        (rgb.blue * 255.0).round() as u8,
    ])
}

// ---------------------------------------------------------------------------
// Plot theme
// ---------------------------------------------------------------------------

/// Colours used by the regression plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotTheme {
    pub background: Rgb<u8>,
    pub frame: Rgb<u8>,
    pub grid: Rgb<u8>,
    /// "Actual Targets" markers.
    pub markers: Rgb<u8>,
    /// Predictions line.
    pub line: Rgb<u8>,
    pub title: Rgb<u8>,
    pub labels: Rgb<u8>,
}

impl Default for PlotTheme {
    fn default() -> Self {
        Self {
            background: to_pixel(named::WHITE),
            frame: to_pixel(named::BLACK),
            grid: tint(220.0, 0.92),
            markers: to_pixel(named::ROYALBLUE),
            line: to_pixel(named::BLACK),
            title: to_pixel(named::MAROON),
            labels: to_pixel(named::DARKMAGENTA),
        }
    }
}
