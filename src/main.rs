use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use clap::Parser;
use env_logger::Env;
use horizon::{
    BatteryStatus, CommandedAttitude, CommandedControl, FontConfig, Horizon, HorizonConfig,
    TelemetryUpdate, VehicleState,
};
use log::info;
use rand::Rng;

/// Artificial horizon driven by a random-walk telemetry feed
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Window width in logical pixels
    #[arg(long, default_value_t = 600)]
    width: u32,

    /// Window height in logical pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Maximum redraw rate
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// TrueType/OpenType font file; the built-in mono font is used otherwise
    #[arg(long)]
    font: Option<PathBuf>,

    #[arg(long, default_value_t = 14.0)]
    font_size: f32,

    /// Disable the commanded pitch, airspeed and altitude channels
    #[arg(long)]
    no_commands: bool,

    /// Disable the battery channel
    #[arg(long)]
    no_battery: bool,

    /// Interval between telemetry updates in milliseconds
    #[arg(long, default_value_t = 100)]
    update_ms: u64,
}

/// Bounded random walk over the vehicle state.
struct RandomWalk {
    state: VehicleState,
    commanded_pitch: f64,
    commanded_airspeed: f64,
    commanded_altitude: f64,
    voltage: f64,
}

impl RandomWalk {
    fn new() -> Self {
        Self {
            state: VehicleState {
                airspeed: 18.0,
                altitude: 100.0,
                ..VehicleState::default()
            },
            commanded_pitch: 0.0,
            commanded_airspeed: 18.0,
            commanded_altitude: 100.0,
            voltage: 12.6,
        }
    }

    fn step(&mut self, rng: &mut impl Rng) {
        let s = &mut self.state;
        s.roll = (s.roll + rng.random_range(-0.03..0.03)).clamp(-1.0, 1.0);
        s.pitch = (s.pitch + rng.random_range(-0.01..0.01)).clamp(-0.4, 0.4);
        s.heading = (s.heading + s.roll * 0.02).rem_euclid(std::f64::consts::TAU);
        s.airspeed = (s.airspeed + rng.random_range(-0.3..0.3)).max(0.0);
        s.altitude += s.pitch * s.airspeed * 0.1;

        if rng.random_bool(0.02) {
            self.commanded_pitch = rng.random_range(-0.2..0.2);
            self.commanded_airspeed = rng.random_range(12.0..25.0);
            self.commanded_altitude = s.altitude + rng.random_range(-20.0..20.0);
        }
        self.voltage = (self.voltage - 0.0005).max(10.5);
    }

    fn battery_percent(&self) -> f64 {
        (self.voltage - 10.5) / (12.6 - 10.5) * 100.0
    }

    fn updates(&self, args: &CliArgs, satellites: u32) -> Vec<TelemetryUpdate> {
        let mut updates = vec![
            TelemetryUpdate::Vehicle(self.state),
            TelemetryUpdate::Satellites(satellites),
        ];
        if args.no_commands {
            updates.push(TelemetryUpdate::AttitudeCommand(None));
            updates.push(TelemetryUpdate::ControlCommand(None));
        } else {
            updates.push(TelemetryUpdate::AttitudeCommand(Some(CommandedAttitude {
                pitch: self.commanded_pitch,
            })));
            updates.push(TelemetryUpdate::ControlCommand(Some(CommandedControl {
                airspeed: self.commanded_airspeed,
                altitude: self.commanded_altitude,
            })));
        }
        updates.push(TelemetryUpdate::Battery((!args.no_battery).then(|| BatteryStatus {
            voltage: self.voltage,
            percent: self.battery_percent(),
        })));
        updates
    }
}

fn spawn_producer(args: CliArgs, sender: Sender<TelemetryUpdate>) {
    thread::spawn(move || {
        let mut rng = rand::rng();
        let mut walk = RandomWalk::new();
        let mut satellites: u32 = 6;
        loop {
            walk.step(&mut rng);
            if rng.random_bool(0.05) {
                satellites = (satellites as i32 + rng.random_range(-1..=1)).clamp(0, 14) as u32;
            }

            if walk
                .updates(&args, satellites)
                .into_iter()
                .any(|update| sender.send(update).is_err())
            {
                break;
            }

            thread::sleep(Duration::from_millis(args.update_ms));
        }
    });
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();

    let config = HorizonConfig::builder()
        .window_width(args.width)
        .window_height(args.height)
        .max_framerate(args.fps)
        .font(FontConfig {
            path: args.font.clone(),
            size: args.font_size,
        })
        .build();

    let (sender, receiver) = mpsc::channel();
    info!("feeding random-walk telemetry every {} ms", args.update_ms);
    spawn_producer(args, sender);

    Horizon::new(config)
        .show_with_updates(receiver)
        .map_err(|err| anyhow::anyhow!("running horizon window: {err}"))
}
