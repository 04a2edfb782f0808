// ============================================================================
// FRAME PIPELINE
// ============================================================================

use crate::config::Palette;
use crate::frame::FrameContext;
use crate::scene::{Point, Surface};
use crate::{horizon, overlay, tape, turn_bank};

/// Draws one complete instrument frame, back to front.
pub fn render_frame<S: Surface>(surface: &mut S, frame: &FrameContext, palette: &Palette) {
    horizon::draw_sky(surface, frame, palette);

    with_roll_frame(surface, frame, |surface| {
        with_pitch_frame(surface, frame, |surface| {
            horizon::draw_ground(surface, frame, palette);
            horizon::draw_pitch_ladder(surface, frame, palette);
        });
        turn_bank::draw_turn_indicator(surface, frame, palette);
    });

    overlay::draw_aircraft_symbol(surface, frame, palette);
    tape::draw_speed_tape(surface, frame, palette);
    tape::draw_altitude_tape(surface, frame, palette);
    tape::draw_heading_tape(surface, frame, palette);
    overlay::draw_satellites(surface, frame, palette);
    overlay::draw_battery(surface, frame, palette);
}

/// Rotates by `-roll` about the viewport center for the duration of `f`.
pub fn with_roll_frame<S: Surface, R>(
    surface: &mut S,
    frame: &FrameContext,
    f: impl FnOnce(&mut S) -> R,
) -> R {
    let (cx, cy) = frame.viewport.center();
    surface.rotated_about(Point::new(cx, cy), -(frame.roll as f64), f)
}

/// Shifts the horizon plane down by the pitch offset for the duration of `f`.
pub fn with_pitch_frame<S: Surface, R>(
    surface: &mut S,
    frame: &FrameContext,
    f: impl FnOnce(&mut S) -> R,
) -> R {
    surface.scoped(|surface| {
        surface.translate(0.0, frame.pitch_offset());
        f(surface)
    })
}
