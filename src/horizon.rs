use crate::config::{Palette, GROUND_MARGIN, PITCH_INTERVAL};
use crate::frame::FrameContext;
use crate::scene::{Pen, Point, Rect, Surface};

const LADDER_PEN_WIDTH: f32 = 2.0;
const COMMANDED_PEN_WIDTH: f32 = 4.0;

pub fn draw_sky<S: Surface>(surface: &mut S, frame: &FrameContext, palette: &Palette) {
    let vp = frame.viewport;
    surface.fill_rect(Rect::new(0.0, 0.0, vp.w(), vp.h()), palette.sky);
}

/// Oversize of the ground past the viewport edges; never less than the
/// diagonal so rotated corners stay covered.
pub fn ground_margin(frame: &FrameContext) -> f64 {
    GROUND_MARGIN.max(frame.viewport.diagonal())
}

/// Must be drawn inside the roll+pitch frame.
pub fn draw_ground<S: Surface>(surface: &mut S, frame: &FrameContext, palette: &Palette) {
    let (w, h) = (frame.viewport.w(), frame.viewport.h());
    let margin = ground_margin(frame);
    surface.fill_rect(
        Rect::new(
            -margin,
            h / 2.0,
            w + 2.0 * margin,
            h * (0.5 + PITCH_INTERVAL * 180.0) + margin,
        ),
        palette.ground,
    );
    surface.set_pen(Pen::new(palette.horizon_line, LADDER_PEN_WIDTH));
    surface.draw_line(Point::new(-margin, h / 2.0), Point::new(w + margin, h / 2.0));
}

/// Ladder visibility window, exclusive at both ends.
pub fn ladder_visible(height: f64, pitch: i32) -> bool {
    let min_height = 0.15 - pitch as f64 * PITCH_INTERVAL;
    let max_height = 0.85 - pitch as f64 * PITCH_INTERVAL;
    min_height < height && height < max_height
}

/// Must be drawn inside the roll+pitch frame.
pub fn draw_pitch_ladder<S: Surface>(surface: &mut S, frame: &FrameContext, palette: &Palette) {
    let (w, h) = (frame.viewport.w(), frame.viewport.h());
    surface.set_pen(Pen::new(palette.ladder, LADDER_PEN_WIDTH));

    for i in -9..=9 {
        let label = (10 * i32::abs(i)).to_string();
        let height = 0.5 - PITCH_INTERVAL * 10.0 * i as f64;
        if ladder_visible(height, frame.pitch) {
            let y = h * height;
            surface.draw_line(Point::new(w * 0.4, y), Point::new(w * 0.6, y));
            surface.draw_text(Point::new(w * 0.6 + 5.0, y + 5.0), &label);
            surface.draw_text(Point::new(w * 0.4 - 22.0, y + 5.0), &label);
        }

        // Half-step line above each major, up to 85 degrees.
        if i < 9 {
            let height = height - PITCH_INTERVAL * 5.0;
            if ladder_visible(height, frame.pitch) {
                let y = h * height;
                surface.draw_line(Point::new(w * 0.45, y), Point::new(w * 0.55, y));
            }
        }
    }

    if let Some(commanded) = frame.commanded_pitch {
        surface.scoped(|surface| {
            surface.set_pen(Pen::new(palette.commanded, COMMANDED_PEN_WIDTH));
            let height = 0.5 - PITCH_INTERVAL * commanded;
            if ladder_visible(height, frame.pitch) {
                let y = h * height;
                surface.draw_line(Point::new(w * 0.4, y), Point::new(w * 0.6, y));
                surface.draw_text(Point::new(w * 0.6 + 5.0, y + 5.0), "<");
                surface.draw_text(Point::new(w * 0.4 - 22.0, y + 5.0), ">");
            }
        });
    }
}
