/// Fraction of viewport height used to display one degree of pitch.
///
/// Horizon offset, ladder spacing and the ladder visibility window all read
/// this one value.
pub const PITCH_INTERVAL: f64 = 0.013;

/// Screen fraction per telemetry unit on every tape.
pub const TAPE_SCALE: f64 = 0.01;

/// Horizontal oversize of the ground fill on each side, in pixels.
pub const GROUND_MARGIN: f64 = 300.0;

/// Color representation for instrument elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(0xff, 0xff, 0xff);
    pub const RED: Color = Color::new(0xff, 0x00, 0x00);
    pub const GREEN: Color = Color::new(0x00, 0xff, 0x00);
    pub const YELLOW: Color = Color::new(0xff, 0xff, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    pub fn alpha(self) -> f32 {
        self.a as f32 / 255.0
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }
}

/// Every color the instrument paints with
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub sky: Color,
    pub ground: Color,
    pub horizon_line: Color,
    pub ladder: Color,
    pub commanded: Color,
    pub bank_scale: Color,
    pub aircraft: Color,
    pub tape_panel: Color,
    pub tape_ink: Color,
    pub pointer_box: Color,
    pub gps_warning: Color,
    pub gps_nominal: Color,
    pub battery_empty: Color,
    pub battery_fill: Color,
    pub battery_label: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            sky: Color::new(38, 89, 242),
            ground: Color::new(84, 54, 10),
            horizon_line: Color::WHITE,
            ladder: Color::WHITE,
            commanded: Color::YELLOW,
            bank_scale: Color::WHITE,
            aircraft: Color::YELLOW,
            tape_panel: Color::rgba(100, 100, 100, 200),
            tape_ink: Color::YELLOW,
            pointer_box: Color::BLACK,
            gps_warning: Color::RED,
            gps_nominal: Color::GREEN,
            battery_empty: Color::RED,
            battery_fill: Color::GREEN,
            battery_label: Color::BLACK,
        }
    }
}

/// Panel proportions of the three tapes, as fractions of the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapeLayout {
    pub side_width: f64,
    pub side_height: f64,
    pub heading_width: f64,
    pub heading_height: f64,
    pub marker_width: f64,
    pub marker_height: f64,
}

impl TapeLayout {
    pub const STANDARD: TapeLayout = TapeLayout {
        side_width: 0.13,
        side_height: 0.6,
        heading_width: 1.0,
        heading_height: 0.1,
        marker_width: 0.02,
        marker_height: 0.01,
    };
}

/// Configuration for fonts and text rendering
#[derive(Debug, Clone, PartialEq)]
pub struct FontConfig {
    /// TrueType/OpenType file; the built-in mono font is used when unset.
    pub path: Option<std::path::PathBuf>,
    pub size: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: None,
            size: 14.0,
        }
    }
}
