use crate::config::Palette;
use crate::frame::FrameContext;
use crate::scene::{Pen, Point, Rect, Surface};

pub const BANK_ANGLES: [i32; 11] = [-60, -45, -30, -20, -10, 0, 10, 20, 30, 45, 60];

const RADIUS_FRACTION: f64 = 0.3;
const TOP_FRACTION: f64 = 0.1;
const TICK_FRACTION: f64 = 0.02;
const POINTER_FRACTION: f64 = 0.025;

/// Arc geometry shared by the scale and the pointer.
struct BankArc {
    radius: f64,
    top: Point,
    center: Point,
}

impl BankArc {
    fn new(frame: &FrameContext) -> Self {
        let (w, h) = (frame.viewport.w(), frame.viewport.h());
        let radius = w * RADIUS_FRACTION;
        let top = Point::new(w / 2.0, h * TOP_FRACTION);
        Self {
            radius,
            top,
            center: Point::new(top.x, top.y + radius),
        }
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.top.x - self.radius,
            self.top.y,
            2.0 * self.radius,
            2.0 * self.radius,
        )
    }
}

/// Must be drawn inside the roll frame.
pub fn draw_turn_indicator<S: Surface>(surface: &mut S, frame: &FrameContext, palette: &Palette) {
    let h = frame.viewport.h();
    let arc = BankArc::new(frame);

    surface.set_brush(Some(palette.bank_scale));
    surface.set_pen(Pen::new(palette.bank_scale, 2.0));
    surface.draw_arc(arc.bounds(), 30.0, 120.0);

    let tick_end = Point::new(arc.top.x, arc.top.y - h * TICK_FRACTION);
    for angle in BANK_ANGLES {
        surface.rotated_about(arc.center, angle as f64, |surface| {
            surface.draw_line(arc.top, tick_end);
            let label = angle.to_string();
            surface.draw_text(
                Point::new(tick_end.x - 4.0 * label.len() as f64, tick_end.y - 5.0),
                &label,
            );
        });
    }

    let size = h * POINTER_FRACTION;
    let (x, y) = (arc.top.x, arc.top.y);
    let pointer = [
        Point::new(x, y),
        Point::new(x - size / 2.0, y + size),
        Point::new(x + size / 2.0, y + size),
    ];
    surface.rotated_about(arc.center, frame.roll as f64, |surface| {
        surface.draw_polygon(&pointer);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::{find_text, level_frame, record};
    use crate::render::with_roll_frame;
    use crate::scene::{DrawCommand, Scene, Transform};
    use pretty_assertions::assert_eq;

    fn rolled_scene(roll: i32) -> Scene {
        rolled_scene_with_frame(roll).0
    }

    /// Also returns the roll frame the indicator was drawn in.
    fn rolled_scene_with_frame(roll: i32) -> (Scene, Transform) {
        let mut frame = level_frame();
        frame.roll = roll;
        let mut scene = Scene::new(12.0);
        let roll_frame = with_roll_frame(&mut scene, &frame, |s| {
            draw_turn_indicator(s, &frame, &Palette::default());
            s.transform()
        });
        (scene, roll_frame)
    }

    fn pointer(scene: &Scene) -> Vec<Point> {
        scene
            .commands()
            .iter()
            .find_map(|c| match c {
                DrawCommand::Fill { points, .. } if points.len() == 3 => Some(points.clone()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_every_angle_gets_tick_and_label() {
        let scene = rolled_scene(0);
        for angle in BANK_ANGLES {
            assert!(find_text(&scene, &angle.to_string()).is_some(), "{angle}");
        }
        // One arc plus one tick per angle plus the pointer outline.
        let strokes = scene
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Stroke { .. }))
            .count();
        assert_eq!(strokes, 1 + BANK_ANGLES.len() + 1);
    }

    #[test]
    fn test_level_pointer_sits_on_arc_top() {
        let scene = rolled_scene(0);
        let tip = pointer(&scene)[0];
        assert!((tip.x - 300.0).abs() < 1e-9);
        assert!((tip.y - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_pointer_stays_upright_while_scale_rolls() {
        for roll in [-45, -10, 25, 30, 60, 170] {
            let (scene, roll_frame) = rolled_scene_with_frame(roll);
            let points = pointer(&scene);
            // The arc center moves with the roll frame; the tip stays one
            // radius straight above wherever it lands.
            let center = roll_frame.map(Point::new(300.0, 240.0));
            assert!((points[1].y - points[2].y).abs() < 1e-9, "roll {roll}");
            assert!((points[0].x - center.x).abs() < 1e-9, "roll {roll}");
            assert!((points[0].y - (center.y - 180.0)).abs() < 1e-9, "roll {roll}");

            match find_text(&scene, "0") {
                Some((_, DrawCommand::Text { rotation, .. })) => {
                    assert!((rotation.to_degrees() + roll as f64).abs() < 1e-9)
                }
                other => panic!("no zero label: {other:?}"),
            }
        }
    }

    #[test]
    fn test_labels_are_rotated_by_their_angle() {
        let scene = rolled_scene(0);
        match find_text(&scene, "30") {
            Some((_, DrawCommand::Text { rotation, color, .. })) => {
                assert!((rotation.to_degrees() - 30.0).abs() < 1e-9);
                assert_eq!(*color, Palette::default().bank_scale);
            }
            other => panic!("no 30 label: {other:?}"),
        }
    }

    #[test]
    fn test_rendered_pipeline_includes_indicator() {
        let scene = record(&level_frame());
        assert!(find_text(&scene, "45").is_some());
        assert!(find_text(&scene, "-45").is_some());
    }
}
