// ============================================================================
// GEOMETRY
// ============================================================================

use crate::config::Color;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in the coordinates of the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Spanned by two opposite corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(
            a.x.min(b.x),
            a.y.min(b.y),
            (a.x - b.x).abs(),
            (a.y - b.y).abs(),
        )
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ]
    }
}

/// 2D affine map `p' = (a*x + c*y + e, b*x + d*y + f)` on a y-down surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Appends a translation in local coordinates.
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self {
            e: self.a * dx + self.c * dy + self.e,
            f: self.b * dx + self.d * dy + self.f,
            ..self
        }
    }

    /// Appends a rotation in local coordinates; positive is clockwise on screen.
    pub fn rotated(self, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            a: self.a * cos + self.c * sin,
            b: self.b * cos + self.d * sin,
            c: self.c * cos - self.a * sin,
            d: self.d * cos - self.b * sin,
            ..self
        }
    }

    pub fn map(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Screen rotation of the local x axis, radians.
    pub fn angle(&self) -> f64 {
        self.b.atan2(self.a)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ============================================================================
// SURFACE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub color: Color,
    pub width: f32,
}

impl Pen {
    pub const fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }

    pub const NONE: Pen = Pen::new(Color::TRANSPARENT, 0.0);
}

/// Fill used by polygons; `None` leaves them hollow.
pub type Brush = Option<Color>;

#[derive(Debug, Clone, Copy, PartialEq)]
struct PainterState {
    transform: Transform,
    pen: Pen,
    brush: Brush,
}

impl Default for PainterState {
    fn default() -> Self {
        Self {
            transform: Transform::IDENTITY,
            pen: Pen::new(Color::BLACK, 1.0),
            brush: None,
        }
    }
}

/// Painter-style drawing target.
///
/// Geometry is given in the coordinates of the current frame, which
/// `translate`/`rotate` modify and `save`/`restore` bracket.
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f64, dy: f64);
    fn rotate(&mut self, degrees: f64);
    fn set_pen(&mut self, pen: Pen);
    fn set_brush(&mut self, brush: Brush);

    /// Fills with an explicit color, ignoring pen and brush.
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn draw_line(&mut self, from: Point, to: Point);
    /// Filled with the brush, outlined with the pen.
    fn draw_polygon(&mut self, points: &[Point]);
    fn draw_convex_polygon(&mut self, points: &[Point]);
    /// Angles in degrees, counter-clockwise from 3 o'clock.
    fn draw_arc(&mut self, bounds: Rect, start: f64, span: f64);
    /// `at` is the left end of the baseline.
    fn draw_text(&mut self, at: Point, text: &str);
    fn draw_text_in_rect(&mut self, rect: Rect, text: &str);

    /// Runs `f` between a `save` and its matching `restore`.
    fn scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        self.save();
        let result = f(self);
        self.restore();
        result
    }

    /// Runs `f` in a frame rotated by `degrees` about `center`.
    fn rotated_about<R>(&mut self, center: Point, degrees: f64, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        self.scoped(|s| {
            s.translate(center.x, center.y);
            s.rotate(degrees);
            s.translate(-center.x, -center.y);
            f(s)
        })
    }
}

// ============================================================================
// RETAINED MODE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Baseline,
    Center,
}

/// Screen-space command; every transform is already applied.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Fill {
        points: Vec<Point>,
        color: Color,
    },
    Stroke {
        points: Vec<Point>,
        closed: bool,
        width: f32,
        color: Color,
    },
    Text {
        origin: Point,
        /// Radians, clockwise on screen.
        rotation: f64,
        anchor: TextAnchor,
        text: String,
        size: f32,
        color: Color,
    },
}

const ARC_SEGMENTS_PER_TURN: f64 = 144.0;

/// Records surface calls as screen-space [`DrawCommand`]s.
pub struct Scene {
    commands: Vec<DrawCommand>,
    state: PainterState,
    saved: Vec<PainterState>,
    font_size: f32,
}

impl Scene {
    pub fn new(font_size: f32) -> Self {
        Self {
            commands: Vec::new(),
            state: PainterState::default(),
            saved: Vec::new(),
            font_size,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn transform(&self) -> Transform {
        self.state.transform
    }

    pub fn pen(&self) -> Pen {
        self.state.pen
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    fn add_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    fn map_all(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.state.transform.map(*p)).collect()
    }

    fn stroke(&mut self, points: Vec<Point>, closed: bool) {
        let pen = self.state.pen;
        if pen.color.is_transparent() || points.len() < 2 {
            return;
        }
        self.add_command(DrawCommand::Stroke {
            points,
            closed,
            width: pen.width,
            color: pen.color,
        });
    }

    fn text(&mut self, at: Point, anchor: TextAnchor, text: &str) {
        let color = self.state.pen.color;
        if color.is_transparent() || text.is_empty() {
            return;
        }
        self.add_command(DrawCommand::Text {
            origin: self.state.transform.map(at),
            rotation: self.state.transform.angle(),
            anchor,
            text: text.to_string(),
            size: self.font_size,
            color,
        });
    }
}

impl Surface for Scene {
    fn save(&mut self) {
        self.saved.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        } else {
            log::warn!("unbalanced restore on scene");
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.state.transform = self.state.transform.translated(dx, dy);
    }

    fn rotate(&mut self, degrees: f64) {
        self.state.transform = self.state.transform.rotated(degrees);
    }

    fn set_pen(&mut self, pen: Pen) {
        self.state.pen = pen;
    }

    fn set_brush(&mut self, brush: Brush) {
        self.state.brush = brush;
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if color.is_transparent() {
            return;
        }
        let points = self.map_all(&rect.corners());
        self.add_command(DrawCommand::Fill { points, color });
    }

    fn draw_line(&mut self, from: Point, to: Point) {
        let points = self.map_all(&[from, to]);
        self.stroke(points, false);
    }

    fn draw_polygon(&mut self, points: &[Point]) {
        let mapped = self.map_all(points);
        if let Some(color) = self.state.brush.filter(|c| !c.is_transparent()) {
            if mapped.len() >= 3 {
                self.add_command(DrawCommand::Fill {
                    points: mapped.clone(),
                    color,
                });
            }
        }
        self.stroke(mapped, true);
    }

    fn draw_convex_polygon(&mut self, points: &[Point]) {
        self.draw_polygon(points);
    }

    fn draw_arc(&mut self, bounds: Rect, start: f64, span: f64) {
        let center = bounds.center();
        let (rx, ry) = (bounds.width / 2.0, bounds.height / 2.0);
        let segments = ((span.abs() / 360.0) * ARC_SEGMENTS_PER_TURN).ceil().max(1.0) as usize;
        let points: Vec<Point> = (0..=segments)
            .map(|i| {
                let angle = (start + span * i as f64 / segments as f64).to_radians();
                Point::new(center.x + rx * angle.cos(), center.y - ry * angle.sin())
            })
            .collect();
        let mapped = self.map_all(&points);
        self.stroke(mapped, false);
    }

    fn draw_text(&mut self, at: Point, text: &str) {
        self.text(at, TextAnchor::Baseline, text);
    }

    fn draw_text_in_rect(&mut self, rect: Rect, text: &str) {
        self.text(rect.center(), TextAnchor::Center, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_rotation_is_clockwise_on_screen() {
        let t = Transform::IDENTITY.rotated(90.0);
        assert!(close(t.map(Point::new(1.0, 0.0)), Point::new(0.0, 1.0)));
        assert!((t.angle() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_translate_rotate_translate_pivots_about_center() {
        let center = Point::new(300.0, 200.0);
        let t = Transform::IDENTITY
            .translated(center.x, center.y)
            .rotated(180.0)
            .translated(-center.x, -center.y);
        assert!(close(t.map(center), center));
        assert!(close(t.map(Point::new(310.0, 200.0)), Point::new(290.0, 200.0)));
    }

    #[test]
    fn test_scoped_restores_transform_and_pen() {
        let mut scene = Scene::new(12.0);
        scene.set_pen(Pen::new(Color::WHITE, 2.0));
        let before = (scene.transform(), scene.pen());

        scene.scoped(|s| {
            s.translate(10.0, 5.0);
            s.rotate(33.0);
            s.set_pen(Pen::new(Color::YELLOW, 4.0));
            s.scoped(|inner| inner.rotate(-12.0));
        });

        assert_eq!((scene.transform(), scene.pen()), before);
        assert_eq!(scene.depth(), 0);
    }

    #[test]
    fn test_rotated_about_leaves_pivot_fixed() {
        let mut scene = Scene::new(12.0);
        scene.set_pen(Pen::new(Color::WHITE, 1.0));
        let pivot = Point::new(50.0, 50.0);
        scene.rotated_about(pivot, 90.0, |s| s.draw_line(pivot, Point::new(60.0, 50.0)));

        match &scene.commands()[0] {
            DrawCommand::Stroke { points, .. } => {
                assert!(close(points[0], pivot));
                assert!(close(points[1], Point::new(50.0, 60.0)));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_transparent_pen_records_no_stroke() {
        let mut scene = Scene::new(12.0);
        scene.set_pen(Pen::NONE);
        scene.set_brush(Some(Color::BLACK));
        scene.draw_polygon(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 5.0),
        ]);
        scene.draw_text(Point::new(0.0, 0.0), "hidden");

        assert_eq!(scene.commands().len(), 1);
        assert!(matches!(scene.commands()[0], DrawCommand::Fill { .. }));
    }

    #[test]
    fn test_arc_endpoints_follow_qt_angles() {
        let mut scene = Scene::new(12.0);
        scene.set_pen(Pen::new(Color::WHITE, 2.0));
        // Upper half of a circle of radius 10 centered at (10, 10).
        scene.draw_arc(Rect::new(0.0, 0.0, 20.0, 20.0), 0.0, 180.0);

        match &scene.commands()[0] {
            DrawCommand::Stroke { points, closed, .. } => {
                assert!(!closed);
                assert!(close(points[0], Point::new(20.0, 10.0)));
                assert!(close(*points.last().unwrap(), Point::new(0.0, 10.0)));
                let apex = points[points.len() / 2];
                assert!(close(apex, Point::new(10.0, 0.0)));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_text_in_rect_anchors_at_center() {
        let mut scene = Scene::new(12.0);
        scene.set_pen(Pen::new(Color::YELLOW, 2.0));
        scene.draw_text_in_rect(
            Rect::from_corners(Point::new(40.0, 60.0), Point::new(20.0, 10.0)),
            "42",
        );

        assert_eq!(
            scene.commands()[0],
            DrawCommand::Text {
                origin: Point::new(30.0, 35.0),
                rotation: 0.0,
                anchor: TextAnchor::Center,
                text: "42".to_string(),
                size: 12.0,
                color: Color::YELLOW,
            }
        );
    }
}
