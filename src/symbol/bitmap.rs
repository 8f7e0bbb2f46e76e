//! CPU rasterization of marker symbols and cluster badges.
//!
//! Badges are a filled disc with an outline ring and a centered count label
//! drawn from an embedded 5x7 glyph table. Counts at or above the configured
//! cap render a `+` glyph instead, since multi-digit labels become unreadable
//! at badge sizes.

use crate::{
    core::config::{Color, MarkerConfig},
    Error, Result,
};
use image::{Rgba, RgbaImage};

/// Largest canvas edge accepted by the rasterizer
const MAX_CANVAS_SIZE: u32 = 4096;

/// Style parameters a badge bitmap depends on.
///
/// Any change to these invalidates every cached badge; they are deliberately
/// not parameterized per bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeStyle {
    /// Badge diameter in pixels
    pub symbol_size: u32,
    /// Outline ring thickness in pixels
    pub symbol_weight: u32,
    /// Outline and label color
    pub foreground: Color,
    /// Disc fill color
    pub background: Color,
    /// Counts at or above this render a `+` glyph
    pub count_cap: u32,
}

impl BadgeStyle {
    pub fn from_config(config: &MarkerConfig) -> Self {
        Self {
            symbol_size: config.symbol_size,
            symbol_weight: config.symbol_weight,
            foreground: config.foreground_color,
            background: config.background_color,
            count_cap: config.cluster_count_cap,
        }
    }
}

/// An immutable RGBA bitmap with a hotspot offset.
///
/// The hotspot is the pixel that is pinned to the symbol's screen position;
/// `(0, 0)` is the bitmap's top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    image: RgbaImage,
    hotspot_x: f32,
    hotspot_y: f32,
}

impl Bitmap {
    pub fn new(image: RgbaImage, hotspot_x: f32, hotspot_y: f32) -> Self {
        Self {
            image,
            hotspot_x,
            hotspot_y,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn hotspot(&self) -> (f32, f32) {
        (self.hotspot_x, self.hotspot_y)
    }
}

/// Renders a cluster badge for the given member count
pub fn render_badge(count: u32, style: &BadgeStyle) -> Result<Bitmap> {
    let size = style.symbol_size;
    if size == 0 || size > MAX_CANVAS_SIZE {
        return Err(Error::Bitmap(format!("invalid badge canvas size {}", size)));
    }

    let mut image = RgbaImage::new(size, size);
    let center = (size as f64 - 1.0) / 2.0;
    let radius = size as f64 / 2.0;
    let inner = radius - style.symbol_weight.min(size / 2) as f64;

    let fill = to_rgba(style.background);
    let outline = to_rgba(style.foreground);

    for y in 0..size {
        for x in 0..size {
            let dx = x as f64 - center;
            let dy = y as f64 - center;
            let dist = (dx * dx + dy * dy).sqrt();

            if dist <= inner {
                image.put_pixel(x, y, fill);
            } else if dist <= radius {
                image.put_pixel(x, y, outline);
            }
        }
    }

    let label = if count >= style.count_cap {
        "+".to_string()
    } else {
        count.to_string()
    };
    draw_label(&mut image, &label, outline);

    let hotspot = size as f32 / 2.0;
    Ok(Bitmap::new(image, hotspot, hotspot))
}

/// Renders the default pin symbol used for unclustered markers without a
/// custom bitmap: a small disc with its hotspot at the bottom center.
pub fn render_default_pin(style: &BadgeStyle) -> Result<Bitmap> {
    let size = (style.symbol_size / 2).max(8);
    if size > MAX_CANVAS_SIZE {
        return Err(Error::Bitmap(format!("invalid pin canvas size {}", size)));
    }

    let mut image = RgbaImage::new(size, size);
    let center = (size as f64 - 1.0) / 2.0;
    let radius = size as f64 / 2.0;
    let inner = radius - style.symbol_weight.min(size / 2) as f64;

    let fill = to_rgba(style.background);
    let outline = to_rgba(style.foreground);

    for y in 0..size {
        for x in 0..size {
            let dx = x as f64 - center;
            let dy = y as f64 - center;
            let dist = (dx * dx + dy * dy).sqrt();

            if dist <= inner {
                image.put_pixel(x, y, fill);
            } else if dist <= radius {
                image.put_pixel(x, y, outline);
            }
        }
    }

    Ok(Bitmap::new(image, size as f32 / 2.0, size as f32))
}

fn to_rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, color.a])
}

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

/// 5x7 glyphs for '0'-'9' and '+', one row per byte, MSB-first in the low
/// five bits
const GLYPHS: [[u8; 7]; 11] = [
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E], // 0
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E], // 1
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F], // 2
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E], // 3
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02], // 4
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E], // 5
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E], // 6
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08], // 7
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E], // 8
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C], // 9
    [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00], // +
];

fn glyph_for(ch: char) -> Option<&'static [u8; 7]> {
    match ch {
        '0'..='9' => Some(&GLYPHS[ch as usize - '0' as usize]),
        '+' => Some(&GLYPHS[10]),
        _ => None,
    }
}

/// Draws the label centered on the badge, scaled to roughly half the badge
/// height
fn draw_label(image: &mut RgbaImage, label: &str, color: Rgba<u8>) {
    let size = image.width();
    let glyph_count = label.chars().count() as u32;
    if glyph_count == 0 {
        return;
    }

    let target_height = size / 2;
    let scale = (target_height / GLYPH_HEIGHT).max(1);

    // One scaled column of spacing between glyphs
    let advance = (GLYPH_WIDTH + 1) * scale;
    let text_width = advance * glyph_count - scale;
    let text_height = GLYPH_HEIGHT * scale;

    let origin_x = (size.saturating_sub(text_width)) / 2;
    let origin_y = (size.saturating_sub(text_height)) / 2;

    for (i, ch) in label.chars().enumerate() {
        let Some(glyph) = glyph_for(ch) else { continue };
        let glyph_x = origin_x + advance * i as u32;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        let px = glyph_x + col * scale + sx;
                        let py = origin_y + row as u32 * scale + sy;
                        if px < size && py < image.height() {
                            image.put_pixel(px, py, color);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> BadgeStyle {
        BadgeStyle::from_config(&MarkerConfig::default())
    }

    #[test]
    fn test_badge_has_configured_size_and_centered_hotspot() {
        let badge = render_badge(5, &style()).unwrap();
        assert_eq!(badge.width(), 40);
        assert_eq!(badge.height(), 40);
        assert_eq!(badge.hotspot(), (20.0, 20.0));
    }

    #[test]
    fn test_badge_corners_stay_transparent() {
        let badge = render_badge(12, &style()).unwrap();
        assert_eq!(badge.image().get_pixel(0, 0)[3], 0);

        // Center carries the label or fill, never transparency
        let c = badge.width() / 2;
        assert_ne!(badge.image().get_pixel(c, c)[3], 0);
    }

    #[test]
    fn test_count_at_cap_renders_plus() {
        let s = style();
        let capped = render_badge(s.count_cap, &s).unwrap();
        let plus = render_badge(s.count_cap + 500, &s).unwrap();
        assert_eq!(capped, plus);
    }

    #[test]
    fn test_zero_size_canvas_is_rejected() {
        let bad = BadgeStyle {
            symbol_size: 0,
            ..style()
        };
        assert!(render_badge(5, &bad).is_err());
    }

    #[test]
    fn test_pin_hotspot_is_bottom_center() {
        let pin = render_default_pin(&style()).unwrap();
        let (hx, hy) = pin.hotspot();
        assert_eq!(hx, pin.width() as f32 / 2.0);
        assert_eq!(hy, pin.height() as f32);
    }
}
