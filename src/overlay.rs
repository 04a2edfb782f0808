use crate::config::Palette;
use crate::frame::FrameContext;
use crate::scene::{Pen, Point, Rect, Surface};

/// Fewer satellites than this is shown as a degraded fix.
pub const MIN_SATELLITES_FOR_FIX: u32 = 4;

const SYMBOL_WIDTH_FRACTION: f64 = 0.10;
const SYMBOL_HEIGHT_FRACTION: f64 = 0.05;
const WING_SPACE: f64 = 0.25;
const WING_LENGTH: f64 = 0.1;
const BATTERY_TOP: f64 = 0.8;
const BATTERY_WIDTH: f64 = 0.13;
const BATTERY_HEIGHT: f64 = 0.05;

/// Fixed chevron and wing bars on the viewport center line.
pub fn draw_aircraft_symbol<S: Surface>(surface: &mut S, frame: &FrameContext, palette: &Palette) {
    let (w, h) = (frame.viewport.w(), frame.viewport.h());
    surface.set_pen(Pen::new(palette.aircraft, 5.0));
    surface.set_brush(Some(palette.aircraft));
    surface.draw_polygon(&[
        Point::new(w * 0.5, h * 0.5),
        Point::new(
            w * (0.5 + SYMBOL_WIDTH_FRACTION / 2.0),
            h * (0.5 + SYMBOL_HEIGHT_FRACTION),
        ),
        Point::new(w * 0.5, h * (0.5 + SYMBOL_HEIGHT_FRACTION / 2.0)),
        Point::new(
            w * (0.5 - SYMBOL_WIDTH_FRACTION / 2.0),
            h * (0.5 + SYMBOL_HEIGHT_FRACTION),
        ),
    ]);
    surface.draw_line(
        Point::new(w * WING_SPACE, h / 2.0),
        Point::new(w * (WING_SPACE + WING_LENGTH), h / 2.0),
    );
    surface.draw_line(
        Point::new(w * (1.0 - WING_SPACE - WING_LENGTH), h / 2.0),
        Point::new(w * (1.0 - WING_SPACE), h / 2.0),
    );
}

pub fn satellite_color(count: u32, palette: &Palette) -> crate::config::Color {
    if count < MIN_SATELLITES_FOR_FIX {
        palette.gps_warning
    } else {
        palette.gps_nominal
    }
}

pub fn draw_satellites<S: Surface>(surface: &mut S, frame: &FrameContext, palette: &Palette) {
    let (w, h) = (frame.viewport.w(), frame.viewport.h());
    let rect = Rect::from_corners(Point::new(0.0, 0.0), Point::new(w * 0.25, h * 0.1));
    surface.set_pen(Pen::new(satellite_color(frame.satellite_count, palette), 2.0));
    surface.draw_text_in_rect(rect, &format!("GPS: {} satellites", frame.satellite_count));
}

/// Red bar with a green charge fill; nothing when no battery is reported.
pub fn draw_battery<S: Surface>(surface: &mut S, frame: &FrameContext, palette: &Palette) {
    let Some(battery) = frame.battery else {
        return;
    };
    let (w, h) = (frame.viewport.w(), frame.viewport.h());
    let width = w * BATTERY_WIDTH;
    let height = h * BATTERY_HEIGHT;
    let bar = Rect::new(0.0, h * BATTERY_TOP, width, height);
    let charge = Rect::new(
        0.0,
        h * BATTERY_TOP,
        (width * battery.percent / 100.0).floor(),
        height,
    );

    surface.fill_rect(bar, palette.battery_empty);
    surface.fill_rect(charge, palette.battery_fill);
    surface.set_pen(Pen::new(palette.battery_label, 1.0));
    surface.draw_text_in_rect(bar, &format!("{:.1}V", battery.voltage));
}
