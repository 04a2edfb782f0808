use crate::config::PITCH_INTERVAL;
use crate::telemetry::{BatteryStatus, TelemetrySnapshot};

/// Drawing surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn w(&self) -> f64 {
        self.width as f64
    }

    pub fn h(&self) -> f64 {
        self.height as f64
    }

    pub fn center(&self) -> (f64, f64) {
        (self.w() / 2.0, self.h() / 2.0)
    }

    pub fn diagonal(&self) -> f64 {
        self.w().hypot(self.h())
    }
}

/// Per-redraw view of the telemetry, already converted to display units.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameContext {
    pub viewport: Viewport,
    /// Degrees.
    pub roll: i32,
    /// Degrees.
    pub pitch: i32,
    /// Degrees in `0..360`.
    pub heading: i32,
    pub airspeed: i32,
    pub altitude: i32,
    pub satellite_count: u32,
    pub commanded_speed: Option<f64>,
    pub commanded_altitude: Option<f64>,
    /// Degrees, not floored.
    pub commanded_pitch: Option<f64>,
    pub battery: Option<BatteryStatus>,
}

impl FrameContext {
    pub fn new(viewport: Viewport, snapshot: &TelemetrySnapshot) -> Self {
        let vehicle = &snapshot.vehicle;
        Self {
            viewport,
            roll: floor_degrees(vehicle.roll),
            pitch: floor_degrees(vehicle.pitch),
            heading: normalize_heading(floor_degrees(vehicle.heading)),
            airspeed: vehicle.airspeed.floor() as i32,
            altitude: vehicle.altitude.floor() as i32,
            satellite_count: snapshot.satellites,
            commanded_speed: snapshot.control_command.map(|c| c.airspeed),
            commanded_altitude: snapshot.control_command.map(|c| c.altitude),
            commanded_pitch: snapshot.attitude_command.map(|c| c.pitch.to_degrees()),
            battery: snapshot.battery,
        }
    }

    /// Vertical shift of the horizon plane in pixels.
    pub fn pitch_offset(&self) -> f64 {
        self.viewport.h() * (self.pitch as f64 * PITCH_INTERVAL)
    }
}

pub fn floor_degrees(radians: f64) -> i32 {
    radians.to_degrees().floor() as i32
}

pub fn normalize_heading(degrees: i32) -> i32 {
    degrees.rem_euclid(360)
}
