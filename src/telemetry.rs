// ============================================================================
// TELEMETRY SOURCES
// ============================================================================

use std::sync::mpsc::{Receiver, TryRecvError};

use log::{debug, info};

/// Attitude and air data as delivered by the vehicle-state feed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VehicleState {
    /// Radians, right wing down positive.
    pub roll: f64,
    /// Radians, nose up positive.
    pub pitch: f64,
    /// Radians, course over ground.
    pub heading: f64,
    pub airspeed: f64,
    pub altitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandedAttitude {
    /// Radians.
    pub pitch: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandedControl {
    pub airspeed: f64,
    pub altitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryStatus {
    pub voltage: f64,
    /// Expected in 0..=100; left unchecked.
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TelemetryError {
    #[error("no {0} telemetry received yet")]
    Unavailable(Channel),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    VehicleState,
    Gps,
    CommandedAttitude,
    CommandedControl,
    Battery,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Channel::VehicleState => "vehicle state",
            Channel::Gps => "GPS",
            Channel::CommandedAttitude => "commanded attitude",
            Channel::CommandedControl => "commanded control",
            Channel::Battery => "battery",
        })
    }
}

pub trait VehicleStateSource {
    fn vehicle_state(&self) -> Result<VehicleState, TelemetryError>;
}

pub trait GpsSource {
    fn satellite_count(&self) -> Result<u32, TelemetryError>;
}

/// `Ok(None)` means the command source is disabled.
pub trait CommandedAttitudeSource {
    fn commanded_attitude(&self) -> Result<Option<CommandedAttitude>, TelemetryError>;
}

/// `Ok(None)` means the command source is disabled.
pub trait CommandedControlSource {
    fn commanded_control(&self) -> Result<Option<CommandedControl>, TelemetryError>;
}

/// `Ok(None)` means battery telemetry is disabled.
pub trait BatterySource {
    fn battery(&self) -> Result<Option<BatteryStatus>, TelemetryError>;
}

/// Everything one redraw reads.
pub trait Telemetry:
    VehicleStateSource + GpsSource + CommandedAttitudeSource + CommandedControlSource + BatterySource
{
}

impl<T> Telemetry for T where
    T: VehicleStateSource
        + GpsSource
        + CommandedAttitudeSource
        + CommandedControlSource
        + BatterySource
        + ?Sized
{
}

// ============================================================================
// SNAPSHOTS
// ============================================================================

/// One complete read of every source, taken together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySnapshot {
    pub vehicle: VehicleState,
    pub satellites: u32,
    pub attitude_command: Option<CommandedAttitude>,
    pub control_command: Option<CommandedControl>,
    pub battery: Option<BatteryStatus>,
}

impl TelemetrySnapshot {
    /// Reads all sources; any failure discards the whole read.
    pub fn acquire<T: Telemetry + ?Sized>(telemetry: &T) -> Result<Self, TelemetryError> {
        Ok(Self {
            vehicle: telemetry.vehicle_state()?,
            satellites: telemetry.satellite_count()?,
            attitude_command: telemetry.commanded_attitude()?,
            control_command: telemetry.commanded_control()?,
            battery: telemetry.battery()?,
        })
    }
}

/// Holds the last complete snapshot so a failed read never mixes old and new values.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    last: Option<TelemetrySnapshot>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh snapshot when every source answers, else the previous one.
    pub fn refresh<T: Telemetry + ?Sized>(&mut self, telemetry: &T) -> Option<TelemetrySnapshot> {
        match TelemetrySnapshot::acquire(telemetry) {
            Ok(snapshot) => {
                self.last = Some(snapshot);
            }
            Err(err) => match self.last {
                Some(_) => debug!("reusing previous telemetry snapshot: {err}"),
                None => debug!("no telemetry snapshot available: {err}"),
            },
        }
        self.last
    }
}

// ============================================================================
// CHANNEL HUB
// ============================================================================

/// Message type for feeding a [`TelemetryHub`] from another thread
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryUpdate {
    Vehicle(VehicleState),
    Satellites(u32),
    AttitudeCommand(Option<CommandedAttitude>),
    ControlCommand(Option<CommandedControl>),
    Battery(Option<BatteryStatus>),
}

/// Latest-value store behind an `mpsc` receiver; implements every source.
pub struct TelemetryHub {
    receiver: Receiver<TelemetryUpdate>,
    connected: bool,
    vehicle: Option<VehicleState>,
    satellites: Option<u32>,
    attitude_command: Option<CommandedAttitude>,
    control_command: Option<CommandedControl>,
    battery: Option<BatteryStatus>,
}

impl TelemetryHub {
    pub fn new(receiver: Receiver<TelemetryUpdate>) -> Self {
        Self {
            receiver,
            connected: true,
            vehicle: None,
            satellites: None,
            attitude_command: None,
            control_command: None,
            battery: None,
        }
    }

    /// Drains every pending update without blocking.
    pub fn poll(&mut self) {
        loop {
            match self.receiver.try_recv() {
                Ok(update) => self.apply(update),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.connected {
                        info!("telemetry producer disconnected, holding last values");
                        self.connected = false;
                    }
                    break;
                }
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn apply(&mut self, update: TelemetryUpdate) {
        match update {
            TelemetryUpdate::Vehicle(state) => self.vehicle = Some(state),
            TelemetryUpdate::Satellites(count) => self.satellites = Some(count),
            TelemetryUpdate::AttitudeCommand(command) => self.attitude_command = command,
            TelemetryUpdate::ControlCommand(command) => self.control_command = command,
            TelemetryUpdate::Battery(status) => self.battery = status,
        }
    }
}

impl VehicleStateSource for TelemetryHub {
    fn vehicle_state(&self) -> Result<VehicleState, TelemetryError> {
        self.vehicle
            .ok_or(TelemetryError::Unavailable(Channel::VehicleState))
    }
}

impl GpsSource for TelemetryHub {
    fn satellite_count(&self) -> Result<u32, TelemetryError> {
        self.satellites.ok_or(TelemetryError::Unavailable(Channel::Gps))
    }
}

impl CommandedAttitudeSource for TelemetryHub {
    fn commanded_attitude(&self) -> Result<Option<CommandedAttitude>, TelemetryError> {
        Ok(self.attitude_command)
    }
}

impl CommandedControlSource for TelemetryHub {
    fn commanded_control(&self) -> Result<Option<CommandedControl>, TelemetryError> {
        Ok(self.control_command)
    }
}

impl BatterySource for TelemetryHub {
    fn battery(&self) -> Result<Option<BatteryStatus>, TelemetryError> {
        Ok(self.battery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::mpsc;

    fn level_flight() -> VehicleState {
        VehicleState {
            airspeed: 20.0,
            altitude: 100.0,
            ..VehicleState::default()
        }
    }

    #[test]
    fn test_hub_without_vehicle_state_fails_acquire() {
        let (sender, receiver) = mpsc::channel();
        let mut hub = TelemetryHub::new(receiver);
        sender.send(TelemetryUpdate::Satellites(7)).unwrap();
        hub.poll();

        assert_eq!(
            TelemetrySnapshot::acquire(&hub),
            Err(TelemetryError::Unavailable(Channel::VehicleState))
        );
    }

    #[test]
    fn test_hub_keeps_latest_value_per_channel() {
        let (sender, receiver) = mpsc::channel();
        let mut hub = TelemetryHub::new(receiver);
        sender.send(TelemetryUpdate::Vehicle(level_flight())).unwrap();
        sender.send(TelemetryUpdate::Satellites(3)).unwrap();
        sender.send(TelemetryUpdate::Satellites(9)).unwrap();
        sender
            .send(TelemetryUpdate::Battery(Some(BatteryStatus {
                voltage: 12.4,
                percent: 80.0,
            })))
            .unwrap();
        hub.poll();

        let snapshot = TelemetrySnapshot::acquire(&hub).unwrap();
        assert_eq!(snapshot.satellites, 9);
        assert_eq!(snapshot.vehicle, level_flight());
        assert_eq!(snapshot.attitude_command, None);
        assert_eq!(snapshot.battery.map(|b| b.percent), Some(80.0));
    }

    #[test]
    fn test_disabling_a_channel_clears_it() {
        let (sender, receiver) = mpsc::channel();
        let mut hub = TelemetryHub::new(receiver);
        let command = CommandedControl {
            airspeed: 25.0,
            altitude: 120.0,
        };
        sender.send(TelemetryUpdate::ControlCommand(Some(command))).unwrap();
        hub.poll();
        assert_eq!(hub.commanded_control(), Ok(Some(command)));

        sender.send(TelemetryUpdate::ControlCommand(None)).unwrap();
        hub.poll();
        assert_eq!(hub.commanded_control(), Ok(None));
    }

    #[test]
    fn test_disconnected_producer_keeps_values() {
        let (sender, receiver) = mpsc::channel();
        let mut hub = TelemetryHub::new(receiver);
        sender.send(TelemetryUpdate::Vehicle(level_flight())).unwrap();
        sender.send(TelemetryUpdate::Satellites(5)).unwrap();
        drop(sender);
        hub.poll();

        assert!(!hub.is_connected());
        assert!(TelemetrySnapshot::acquire(&hub).is_ok());
    }

    struct Flaky {
        healthy: std::cell::Cell<bool>,
        satellites: u32,
    }

    impl VehicleStateSource for Flaky {
        fn vehicle_state(&self) -> Result<VehicleState, TelemetryError> {
            Ok(level_flight())
        }
    }

    impl GpsSource for Flaky {
        fn satellite_count(&self) -> Result<u32, TelemetryError> {
            if self.healthy.get() {
                Ok(self.satellites)
            } else {
                Err(TelemetryError::Unavailable(Channel::Gps))
            }
        }
    }

    impl CommandedAttitudeSource for Flaky {
        fn commanded_attitude(&self) -> Result<Option<CommandedAttitude>, TelemetryError> {
            Ok(None)
        }
    }

    impl CommandedControlSource for Flaky {
        fn commanded_control(&self) -> Result<Option<CommandedControl>, TelemetryError> {
            Ok(None)
        }
    }

    impl BatterySource for Flaky {
        fn battery(&self) -> Result<Option<BatteryStatus>, TelemetryError> {
            Ok(None)
        }
    }

    #[test]
    fn test_cache_skips_until_first_complete_snapshot() {
        let source = Flaky {
            healthy: std::cell::Cell::new(false),
            satellites: 6,
        };
        let mut cache = SnapshotCache::new();
        assert_eq!(cache.refresh(&source), None);

        source.healthy.set(true);
        assert_eq!(cache.refresh(&source).map(|s| s.satellites), Some(6));
    }

    #[test]
    fn test_cache_reuses_whole_snapshot_on_failure() {
        let mut source = Flaky {
            healthy: std::cell::Cell::new(true),
            satellites: 6,
        };
        let mut cache = SnapshotCache::new();
        let first = cache.refresh(&source);

        source.satellites = 2;
        source.healthy.set(false);
        assert_eq!(cache.refresh(&source), first);
    }
}
