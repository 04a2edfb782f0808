// ============================================================================
// FRAMEBUFFER
// ============================================================================

use std::convert::Infallible;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Point as EgPoint, Size};
use embedded_graphics::mono_font::iso_8859_1::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use embedded_graphics::{Drawable, Pixel};
use log::info;
use rusttype::{point, Font, Scale};

use crate::config::{Color, FontConfig};
use crate::scene::{DrawCommand, Point, Scene, TextAnchor};
use crate::HorizonError;

/// RGBA8 frame borrowed from the window's pixel buffer.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<(u8, u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        self.frame
            .get(idx..idx + 3)
            .map(|px| (px[0], px[1], px[2]))
    }

    /// Paints every command in order.
    pub fn render(&mut self, scene: &Scene, text: &TextRenderer) {
        for command in scene.commands() {
            match command {
                DrawCommand::Fill { points, color } => {
                    self.fill_polygon(points, *color);
                }
                DrawCommand::Stroke {
                    points,
                    closed,
                    width,
                    color,
                } => {
                    for segment in points.windows(2) {
                        self.draw_thick_line_aa(segment[0], segment[1], *width, *color);
                    }
                    if *closed && points.len() > 2 {
                        if let (Some(last), Some(first)) = (points.last(), points.first()) {
                            self.draw_thick_line_aa(*last, *first, *width, *color);
                        }
                    }
                }
                DrawCommand::Text {
                    origin,
                    rotation,
                    anchor,
                    text: string,
                    size,
                    color,
                } => {
                    text.draw(self, *origin, *rotation, *anchor, string, *size, *color);
                }
            }
        }
    }

    fn blend(&mut self, x: i32, y: i32, color: Color, alpha: f32) {
        if x < 0 || y < 0 {
            return;
        }
        set_pixel(
            self.frame,
            self.width,
            x as usize,
            y as usize,
            color.r,
            color.g,
            color.b,
            alpha * color.alpha(),
        );
    }

    /// Even-odd scanline fill sampled at pixel centers.
    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        if points.len() < 3 || self.width == 0 || self.height == 0 {
            return;
        }
        let (min_y, max_y) = points
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
        let first_row = min_y.floor().max(0.0) as i32;
        let last_row = max_y.ceil().min(self.height as f64 - 1.0) as i32;
        let mut crossings: Vec<f64> = Vec::with_capacity(points.len());

        for row in first_row..=last_row {
            let sample_y = row as f64 + 0.5;
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                if (a.y <= sample_y && b.y > sample_y) || (b.y <= sample_y && a.y > sample_y) {
                    let t = (sample_y - a.y) / (b.y - a.y);
                    crossings.push(a.x + t * (b.x - a.x));
                }
            }
            crossings.sort_by(|l, r| l.total_cmp(r));
            for span in crossings.chunks_exact(2) {
                let start = (span[0] - 0.5).ceil().max(0.0) as i32;
                let end = (span[1] - 0.5).floor().min(self.width as f64 - 1.0) as i32;
                for x in start..=end {
                    self.blend(x, row, color, 1.0);
                }
            }
        }
    }

    fn draw_thick_line_aa(&mut self, from: Point, to: Point, thickness: f32, color: Color) {
        let pad = thickness.ceil() as f64 + 1.0;
        let min_x = (from.x.min(to.x) - pad).floor().max(0.0) as i32;
        let max_x = (from.x.max(to.x) + pad).ceil().min(self.width as f64 - 1.0) as i32;
        let min_y = (from.y.min(to.y) - pad).floor().max(0.0) as i32;
        let max_y = (from.y.max(to.y) + pad).ceil().min(self.height as f64 - 1.0) as i32;
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let len_sq = (dx * dx + dy * dy).max(f64::EPSILON);
        let half = thickness as f64 / 2.0;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f64 - from.x;
                let py = y as f64 - from.y;
                let t = ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0);
                let lx = from.x + t * dx;
                let ly = from.y + t * dy;
                let dist = ((lx - x as f64).powi(2) + (ly - y as f64).powi(2)).sqrt();
                let aa = (1.0 - (dist - half).clamp(0.0, 1.0)).clamp(0.0, 1.0);
                if aa > 0.01 {
                    self.blend(x, y, color, aa as f32);
                }
            }
        }
    }

    fn draw_antialiased_pixel(&mut self, x: f64, y: f64, color: Color, alpha: f32) {
        let x_floor = x.floor() as i32;
        let y_floor = y.floor() as i32;
        let x_frac = x - x_floor as f64;
        let y_frac = y - y_floor as f64;

        // Bilinear split across the four nearest pixels.
        let samples = [
            (x_floor, y_floor, (1.0 - x_frac) * (1.0 - y_frac)),
            (x_floor + 1, y_floor, x_frac * (1.0 - y_frac)),
            (x_floor, y_floor + 1, (1.0 - x_frac) * y_frac),
            (x_floor + 1, y_floor + 1, x_frac * y_frac),
        ];
        for (px, py, weight) in samples {
            let final_alpha = alpha * weight as f32;
            if final_alpha > 0.001 {
                self.blend(px, py, color, final_alpha);
            }
        }
    }
}

fn set_pixel(frame: &mut [u8], width: usize, x: usize, y: usize, r: u8, g: u8, b: u8, alpha: f32) {
    if x < width && y < frame.len() / (width * 4) {
        let idx = (y * width + x) * 4;
        let src = [r as f32, g as f32, b as f32];
        let a = alpha.clamp(0.0, 1.0);
        let out = [
            (src[0] * a + frame[idx] as f32 * (1.0 - a)).round() as u8,
            (src[1] * a + frame[idx + 1] as f32 * (1.0 - a)).round() as u8,
            (src[2] * a + frame[idx + 2] as f32 * (1.0 - a)).round() as u8,
            0xff,
        ];
        frame[idx..idx + 4].copy_from_slice(&out);
    }
}

// ============================================================================
// TEXT
// ============================================================================

/// Glyph source for text commands.
pub enum TextRenderer {
    TrueType(Font<'static>),
    /// embedded-graphics mono font, used when no font file is configured.
    Builtin,
}

impl TextRenderer {
    pub fn from_config(config: &FontConfig) -> Result<Self, HorizonError> {
        let Some(path) = &config.path else {
            info!("no font file configured, using built-in mono font");
            return Ok(TextRenderer::Builtin);
        };
        let data = std::fs::read(path).map_err(|source| HorizonError::FontRead {
            path: path.clone(),
            source,
        })?;
        let font = Font::try_from_vec(data).ok_or_else(|| HorizonError::FontParse(path.clone()))?;
        info!("loaded font {}", path.display());
        Ok(TextRenderer::TrueType(font))
    }

    #[allow(clippy::too_many_arguments)]
    fn draw(
        &self,
        canvas: &mut Canvas,
        origin: Point,
        rotation: f64,
        anchor: TextAnchor,
        text: &str,
        size: f32,
        color: Color,
    ) {
        match self {
            TextRenderer::TrueType(font) => {
                draw_truetype(canvas, font, origin, rotation, anchor, text, size, color)
            }
            TextRenderer::Builtin => draw_builtin(canvas, origin, rotation, anchor, text, size, color),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_truetype(
    canvas: &mut Canvas,
    font: &Font,
    origin: Point,
    rotation: f64,
    anchor: TextAnchor,
    text: &str,
    size: f32,
    color: Color,
) {
    let scale = Scale::uniform(size);
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<_> = font.layout(text, scale, point(0.0, 0.0)).collect();
    let advance = glyphs
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0) as f64;
    let (offset_x, offset_y) = match anchor {
        TextAnchor::Baseline => (0.0, 0.0),
        TextAnchor::Center => (-advance / 2.0, (v_metrics.ascent + v_metrics.descent) as f64 / 2.0),
    };
    let (sin, cos) = rotation.sin_cos();

    for glyph in &glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                if v > 0.001 {
                    let lx = (bb.min.x + gx as i32) as f64 + offset_x;
                    let ly = (bb.min.y + gy as i32) as f64 + offset_y;
                    let x = origin.x + lx * cos - ly * sin;
                    let y = origin.y + lx * sin + ly * cos;
                    canvas.draw_antialiased_pixel(x, y, color, v);
                }
            });
        }
    }
}

/// Maps glyph pixels laid out around the origin onto the canvas through a rotation.
struct RotatedTarget<'c, 'a> {
    canvas: &'c mut Canvas<'a>,
    origin: Point,
    sin: f64,
    cos: f64,
    color: Color,
}

impl OriginDimensions for RotatedTarget<'_, '_> {
    fn size(&self) -> Size {
        Size::new(self.canvas.width as u32, self.canvas.height as u32)
    }
}

impl DrawTarget for RotatedTarget<'_, '_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, _) in pixels {
            let (lx, ly) = (p.x as f64 + 0.5, p.y as f64 + 0.5);
            let x = self.origin.x + lx * self.cos - ly * self.sin;
            let y = self.origin.y + lx * self.sin + ly * self.cos;
            self.canvas
                .blend(x.floor() as i32, y.floor() as i32, self.color, 1.0);
        }
        Ok(())
    }
}

fn builtin_font(size: f32) -> &'static MonoFont<'static> {
    if size >= 18.0 {
        &FONT_10X20
    } else {
        &FONT_6X10
    }
}

fn draw_builtin(
    canvas: &mut Canvas,
    origin: Point,
    rotation: f64,
    anchor: TextAnchor,
    text: &str,
    size: f32,
    color: Color,
) {
    let style = MonoTextStyle::new(builtin_font(size), Rgb888::new(color.r, color.g, color.b));
    let layout = match anchor {
        TextAnchor::Baseline => TextStyleBuilder::new()
            .alignment(Alignment::Left)
            .baseline(Baseline::Alphabetic)
            .build(),
        TextAnchor::Center => TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build(),
    };
    let (sin, cos) = rotation.sin_cos();
    let mut target = RotatedTarget {
        canvas,
        origin,
        sin,
        cos,
        color,
    };
    Text::with_text_style(text, EgPoint::zero(), style, layout)
        .draw(&mut target)
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Pen, Rect, Surface};

    const BG: Color = Color::new(0, 0, 0);

    fn frame(width: usize, height: usize) -> Vec<u8> {
        vec![0u8; width * height * 4]
    }

    #[test]
    fn test_fill_rect_covers_exact_pixels() {
        let mut buffer = frame(20, 20);
        let mut canvas = Canvas::new(&mut buffer, 20, 20);
        canvas.clear(BG);
        let mut scene = Scene::new(10.0);
        scene.fill_rect(Rect::new(5.0, 5.0, 10.0, 4.0), Color::RED);
        canvas.render(&scene, &TextRenderer::Builtin);

        assert_eq!(canvas.pixel(5, 5), Some((0xff, 0, 0)));
        assert_eq!(canvas.pixel(14, 8), Some((0xff, 0, 0)));
        assert_eq!(canvas.pixel(15, 8), Some((0, 0, 0)));
        assert_eq!(canvas.pixel(5, 9), Some((0, 0, 0)));
        assert_eq!(canvas.pixel(4, 5), Some((0, 0, 0)));
    }

    #[test]
    fn test_fill_blends_translucent_color() {
        let mut buffer = frame(4, 4);
        let mut canvas = Canvas::new(&mut buffer, 4, 4);
        canvas.clear(Color::WHITE);
        let mut scene = Scene::new(10.0);
        scene.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Color::rgba(0, 0, 0, 0x80));
        canvas.render(&scene, &TextRenderer::Builtin);

        let (r, _, _) = canvas.pixel(1, 1).unwrap();
        assert!((126..=128).contains(&r), "blended red channel {r}");
    }

    #[test]
    fn test_offscreen_geometry_is_clipped() {
        let mut buffer = frame(10, 10);
        let mut canvas = Canvas::new(&mut buffer, 10, 10);
        let mut scene = Scene::new(10.0);
        scene.fill_rect(Rect::new(-300.0, -300.0, 1000.0, 305.0), Color::GREEN);
        scene.set_pen(Pen::new(Color::WHITE, 2.0));
        scene.draw_line(Point::new(-500.0, 7.0), Point::new(900.0, 7.0));
        canvas.render(&scene, &TextRenderer::Builtin);

        assert_eq!(canvas.pixel(0, 0), Some((0, 0xff, 0)));
        assert_eq!(canvas.pixel(9, 7), Some((0xff, 0xff, 0xff)));
        assert_eq!(canvas.pixel(3, 5), Some((0, 0, 0)));
    }

    #[test]
    fn test_builtin_text_marks_pixels_near_anchor() {
        let mut buffer = frame(60, 30);
        let mut canvas = Canvas::new(&mut buffer, 60, 30);
        canvas.clear(BG);
        let mut scene = Scene::new(10.0);
        scene.set_pen(Pen::new(Color::YELLOW, 2.0));
        scene.draw_text_in_rect(Rect::new(0.0, 0.0, 60.0, 30.0), "W");
        canvas.render(&scene, &TextRenderer::Builtin);

        let lit = (20..40)
            .flat_map(|x| (8..22).map(move |y| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y) == Some((0xff, 0xff, 0)))
            .count();
        assert!(lit > 5, "only {lit} glyph pixels near the center");
        assert_eq!(canvas.pixel(2, 2), Some((0, 0, 0)));
    }

    #[test]
    fn test_missing_font_file_is_reported() {
        let config = FontConfig {
            path: Some("/nonexistent/horizon-font.ttf".into()),
            size: 12.0,
        };
        assert!(matches!(
            TextRenderer::from_config(&config),
            Err(HorizonError::FontRead { .. })
        ));
    }
}
