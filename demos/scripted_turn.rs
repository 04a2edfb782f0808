use horizon::{
    BatteryStatus, CommandedAttitude, CommandedControl, Horizon, HorizonConfig, TelemetryUpdate,
    VehicleState,
};
use std::f64::consts::{PI, TAU};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(40);

/// Roll in, hold a 30 degree bank through a full circle, roll out; repeat.
fn turn_at(t: f64) -> VehicleState {
    let period = 60.0;
    let phase = (t % period) / period;
    let bank = 30f64.to_radians() * (phase * PI).sin();
    VehicleState {
        roll: bank,
        pitch: 3f64.to_radians() * (phase * TAU).cos(),
        heading: (phase * TAU).rem_euclid(TAU),
        airspeed: 20.0 - 2.0 * (phase * PI).sin(),
        altitude: 150.0 + 12.0 * (phase * TAU).sin(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = HorizonConfig::builder()
        .title("Scripted turn".to_string())
        .window_width(720)
        .window_height(720)
        .build();

    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let mut t = 0.0;
        loop {
            let state = turn_at(t);
            let updates = [
                TelemetryUpdate::Vehicle(state),
                TelemetryUpdate::Satellites(if t % 20.0 < 4.0 { 3 } else { 9 }),
                TelemetryUpdate::AttitudeCommand(Some(CommandedAttitude { pitch: 0.0 })),
                TelemetryUpdate::ControlCommand(Some(CommandedControl {
                    airspeed: 20.0,
                    altitude: 150.0,
                })),
                TelemetryUpdate::Battery(Some(BatteryStatus {
                    voltage: 12.6 - t * 0.002,
                    percent: (100.0 - t * 0.1).max(0.0),
                })),
            ];
            if updates.into_iter().any(|update| sender.send(update).is_err()) {
                break;
            }
            t += TICK.as_secs_f64();
            thread::sleep(TICK);
        }
    });

    log::info!("flying a scripted 30 degree bank turn");
    Horizon::new(config).show_with_updates(receiver)?;
    Ok(())
}
