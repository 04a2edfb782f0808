// ============================================================================
// SCROLLING TAPES
// ============================================================================

use crate::config::{Palette, TapeLayout, TAPE_SCALE};
use crate::frame::{normalize_heading, FrameContext};
use crate::scene::{Pen, Point, Rect, Surface};

const TICK_LENGTH: f64 = 5.0;
const INK_WIDTH: f32 = 2.0;

/// Viewport edge a tape is docked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapeEdge {
    Left,
    Right,
    Bottom,
}

impl TapeEdge {
    fn is_vertical(self) -> bool {
        !matches!(self, TapeEdge::Bottom)
    }
}

/// One scrolling ruled tape.
///
/// Candidates are enumerated over `[value - half_window, value + half_window)`
/// and kept when `is_tick` accepts them and they are not below `floor`.
#[derive(Debug, Clone)]
pub struct Tape {
    pub edge: TapeEdge,
    pub value: i32,
    pub half_window: i32,
    pub floor: Option<i32>,
    pub is_tick: fn(i32) -> bool,
    pub label: fn(i32) -> String,
    pub readout: String,
    pub caption: Option<&'static str>,
    pub commanded: Option<f64>,
}

pub fn speed_tape(frame: &FrameContext) -> Tape {
    Tape {
        edge: TapeEdge::Left,
        value: frame.airspeed,
        half_window: 29,
        floor: Some(0),
        is_tick: decade,
        label: |v| v.to_string(),
        readout: format!("{} m/s", frame.airspeed),
        caption: Some("Airspeed (m/s IAS)"),
        commanded: frame.commanded_speed,
    }
}

pub fn altitude_tape(frame: &FrameContext) -> Tape {
    Tape {
        edge: TapeEdge::Right,
        value: frame.altitude,
        half_window: 29,
        floor: None,
        is_tick: decade,
        label: |v| v.to_string(),
        readout: format!("{} m", frame.altitude),
        caption: Some("Altitude"),
        commanded: frame.commanded_altitude,
    }
}

/// Ticks every 10° and also at 45/135/225/315, which a decade-only scale
/// would never reach, so NE/SE/SW/NW show on the tape.
pub fn heading_tape(frame: &FrameContext) -> Tape {
    Tape {
        edge: TapeEdge::Bottom,
        value: frame.heading,
        half_window: 49,
        floor: None,
        is_tick: |v| decade(v) || compass_point(normalize_heading(v)).is_some(),
        label: heading_label,
        readout: format!("{}°", frame.heading),
        caption: None,
        commanded: None,
    }
}

pub fn draw_speed_tape<S: Surface>(surface: &mut S, frame: &FrameContext, palette: &Palette) {
    speed_tape(frame).draw(surface, frame, palette);
}

pub fn draw_altitude_tape<S: Surface>(surface: &mut S, frame: &FrameContext, palette: &Palette) {
    altitude_tape(frame).draw(surface, frame, palette);
}

pub fn draw_heading_tape<S: Surface>(surface: &mut S, frame: &FrameContext, palette: &Palette) {
    heading_tape(frame).draw(surface, frame, palette);
}

fn decade(value: i32) -> bool {
    value % 10 == 0
}

pub fn compass_point(degrees: i32) -> Option<&'static str> {
    match degrees {
        0 => Some("N"),
        45 => Some("NE"),
        90 => Some("E"),
        135 => Some("SE"),
        180 => Some("S"),
        225 => Some("SW"),
        270 => Some("W"),
        315 => Some("NW"),
        _ => None,
    }
}

/// Wraps into `[0, 360)` and substitutes compass names.
pub fn heading_label(value: i32) -> String {
    let degrees = normalize_heading(value);
    compass_point(degrees)
        .map(str::to_string)
        .unwrap_or_else(|| degrees.to_string())
}

/// Panel extent test, inclusive of both edges.
pub fn marker_in_panel(position: f64, low: f64, high: f64) -> bool {
    low <= position && position <= high
}

/// Screen placement of a tape for one viewport.
struct TapeGeometry {
    edge: TapeEdge,
    w: f64,
    h: f64,
    panel: Rect,
}

impl TapeGeometry {
    fn new(edge: TapeEdge, frame: &FrameContext, layout: &TapeLayout) -> Self {
        let (w, h) = (frame.viewport.w(), frame.viewport.h());
        let panel = match edge {
            TapeEdge::Left => {
                let (bw, bh) = (w * layout.side_width, h * layout.side_height);
                Rect::new(0.0, (h - bh) / 2.0, bw, bh)
            }
            TapeEdge::Right => {
                let (bw, bh) = (w * layout.side_width, h * layout.side_height);
                Rect::new(w - bw, (h - bh) / 2.0, bw, bh)
            }
            TapeEdge::Bottom => {
                let (bw, bh) = (w * layout.heading_width, h * layout.heading_height);
                Rect::new((w - bw) / 2.0, h - bh, bw, bh)
            }
        };
        Self { edge, w, h, panel }
    }

    /// Coordinate along the tape axis for `value` while showing `current`.
    fn position(&self, current: i32, value: f64) -> f64 {
        let delta = current as f64 - value;
        if self.edge.is_vertical() {
            self.h * 0.5 + delta * TAPE_SCALE * self.h
        } else {
            self.w * 0.5 - delta * TAPE_SCALE * self.w
        }
    }

    /// Panel edge facing the center of the viewport.
    fn inner_edge(&self) -> f64 {
        match self.edge {
            TapeEdge::Left => self.panel.x + self.panel.width,
            TapeEdge::Right => self.panel.x,
            TapeEdge::Bottom => self.panel.y,
        }
    }

    /// Extent of the panel along the tape axis.
    fn span(&self) -> (f64, f64) {
        if self.edge.is_vertical() {
            (self.panel.y, self.panel.y + self.panel.height)
        } else {
            (self.panel.x, self.panel.x + self.panel.width)
        }
    }

    fn tick(&self, pos: f64) -> (Point, Point) {
        let edge = self.inner_edge();
        match self.edge {
            TapeEdge::Left => (Point::new(edge - TICK_LENGTH, pos), Point::new(edge, pos)),
            TapeEdge::Right => (Point::new(edge, pos), Point::new(edge + TICK_LENGTH, pos)),
            TapeEdge::Bottom => (Point::new(pos, edge), Point::new(pos, edge + TICK_LENGTH)),
        }
    }

    fn label_origin(&self, pos: f64, label: &str) -> Point {
        let edge = self.inner_edge();
        let len = label.chars().count() as f64;
        match self.edge {
            TapeEdge::Left => Point::new(edge - 10.0 - 8.0 * len, pos + 5.0),
            TapeEdge::Right => Point::new(edge + 10.0, pos + 5.0),
            TapeEdge::Bottom => Point::new(pos + 7.0 - 8.0 * len, edge + 22.0),
        }
    }

    /// Pentagon at the tape center, pointing at the current value.
    fn pointer(&self) -> [Point; 5] {
        let inner = self.inner_edge();
        match self.edge {
            TapeEdge::Left | TapeEdge::Right => {
                let outer = if self.edge == TapeEdge::Left { 0.0 } else { self.w };
                let shoulder = outer + 0.9 * (inner - outer);
                [
                    Point::new(outer, self.h * 0.46),
                    Point::new(shoulder, self.h * 0.46),
                    Point::new(inner, self.h * 0.5),
                    Point::new(shoulder, self.h * 0.54),
                    Point::new(outer, self.h * 0.54),
                ]
            }
            TapeEdge::Bottom => {
                let outer = self.h;
                let shoulder = outer + 0.9 * (inner - outer);
                [
                    Point::new(self.w * 0.46, outer),
                    Point::new(self.w * 0.46, shoulder),
                    Point::new(self.w * 0.5, inner),
                    Point::new(self.w * 0.54, shoulder),
                    Point::new(self.w * 0.54, outer),
                ]
            }
        }
    }

    /// Triangle with its apex on the inner edge, opening away from the panel.
    fn marker(&self, pos: f64, layout: &TapeLayout) -> [Point; 3] {
        let inner = self.inner_edge();
        let depth = self.w * layout.marker_width;
        let half = self.h * layout.marker_height;
        match self.edge {
            TapeEdge::Left => [
                Point::new(inner, pos),
                Point::new(inner + depth, pos + half),
                Point::new(inner + depth, pos - half),
            ],
            TapeEdge::Right => [
                Point::new(inner, pos),
                Point::new(inner - depth, pos + half),
                Point::new(inner - depth, pos - half),
            ],
            TapeEdge::Bottom => [
                Point::new(pos, inner),
                Point::new(pos + half, inner - depth),
                Point::new(pos - half, inner - depth),
            ],
        }
    }
}

impl Tape {
    pub fn candidates(&self) -> impl Iterator<Item = i32> + '_ {
        let low = self.value.saturating_sub(self.half_window);
        let high = self.value.saturating_add(self.half_window);
        (low..high)
            .filter(move |&v| self.floor.map_or(true, |floor| v >= floor))
            .filter(move |&v| (self.is_tick)(v))
    }

    pub fn draw<S: Surface>(&self, surface: &mut S, frame: &FrameContext, palette: &Palette) {
        let layout = TapeLayout::STANDARD;
        let geometry = TapeGeometry::new(self.edge, frame, &layout);
        let ink = Pen::new(palette.tape_ink, INK_WIDTH);

        surface.scoped(|surface| {
            surface.set_pen(ink);
            surface.fill_rect(geometry.panel, palette.tape_panel);

            for value in self.candidates() {
                let pos = geometry.position(self.value, value as f64);
                let (from, to) = geometry.tick(pos);
                surface.draw_line(from, to);
                let label = (self.label)(value);
                surface.draw_text(geometry.label_origin(pos, &label), &label);
            }

            if let Some(commanded) = self.commanded {
                let pos = geometry.position(self.value, commanded);
                let (low, high) = geometry.span();
                if marker_in_panel(pos, low, high) {
                    surface.set_brush(Some(palette.commanded));
                    surface.draw_convex_polygon(&geometry.marker(pos, &layout));
                }
            }

            let pointer = geometry.pointer();
            surface.set_brush(Some(palette.pointer_box));
            surface.set_pen(Pen::NONE);
            surface.draw_polygon(&pointer);

            surface.set_pen(ink);
            surface.draw_text_in_rect(Rect::from_corners(pointer[0], pointer[3]), &self.readout);
            if let Some(caption) = self.caption {
                surface.draw_text(
                    Point::new(geometry.panel.x + 5.0, geometry.panel.y - 5.0),
                    caption,
                );
            }
        });
    }
}
