use image::{Rgb, RgbImage};

use super::font::{self, ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};

// ---------------------------------------------------------------------------
// Canvas – clipped drawing primitives over an RGB buffer
// ---------------------------------------------------------------------------

/// An RGB raster with drawing helpers. Every primitive clips to the image,
/// so callers can pass coordinates outside it.
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgb<u8>) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, background),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Set one pixel; out-of-bounds coordinates are ignored.
    pub fn put(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        self.image.put_pixel(x as u32, y as u32, color);
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, color: Rgb<u8>) {
        for dy in 0..h as i64 {
            for dx in 0..w as i64 {
                self.put(x + dx, y + dy, color);
            }
        }
    }

    pub fn stroke_rect(&mut self, x: i64, y: i64, w: u32, h: u32, color: Rgb<u8>) {
        let (w, h) = (w as i64, h as i64);
        self.line(x, y, x + w - 1, y, color);
        self.line(x, y + h - 1, x + w - 1, y + h - 1, color);
        self.line(x, y, x, y + h - 1, color);
        self.line(x + w - 1, y, x + w - 1, y + h - 1, color);
    }

    /// Bresenham line, endpoints inclusive.
    pub fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y) = (x0, y0);
        let mut err = dx + dy;

        for _ in 0..=(dx - dy) {
            self.put(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// A line `width` pixels thick, offset perpendicular to its main axis.
    pub fn thick_line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, width: u32, color: Rgb<u8>) {
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        let half = width as i64 / 2;
        for off in -half..(width as i64 - half) {
            if steep {
                self.line(x0 + off, y0, x1 + off, y1, color);
            } else {
                self.line(x0, y0 + off, x1, y1 + off, color);
            }
        }
    }

    /// An "x" marker centred on `(cx, cy)`.
    pub fn cross(&mut self, cx: i64, cy: i64, radius: i64, color: Rgb<u8>) {
        self.thick_line(cx - radius, cy - radius, cx + radius, cy + radius, 2, color);
        self.thick_line(cx - radius, cy + radius, cx + radius, cy - radius, 2, color);
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn text(&mut self, x: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let mut pen = x;
        for c in text.chars() {
            if let Some(rows) = font::glyph(c) {
                self.glyph(pen, y, &rows, scale, color);
            }
            pen += (ADVANCE * scale) as i64;
        }
    }

    /// Draw `text` centred horizontally on `cx`.
    pub fn text_centered(&mut self, cx: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let w = font::text_width(text, scale) as i64;
        self.text(cx - w / 2, y, text, scale, color);
    }

    /// Draw `text` as a column of upright characters centred on `cy`.
    pub fn text_vertical(&mut self, x: i64, cy: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let step = ((GLYPH_HEIGHT + 2) * scale) as i64;
        let total = step * text.chars().count() as i64;
        let mut pen = cy - total / 2;
        for c in text.chars() {
            if let Some(rows) = font::glyph(c) {
                self.glyph(x, pen, &rows, scale, color);
            }
            pen += step;
        }
    }

    fn glyph(&mut self, x: i64, y: i64, rows: &[u8], scale: u32, color: Rgb<u8>) {
        for (row_idx, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                    let px = x + (col * scale) as i64;
                    let py = y + (row_idx as u32 * scale) as i64;
                    self.fill_rect(px, py, scale, scale, color);
                }
            }
        }
    }
}
