#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[macro_use]
mod logging;

pub mod analog;
pub mod assist;
pub mod config;
pub mod control_loop;
pub mod diagnostics;
pub mod hall;
pub mod inputs_dump;
pub mod pedaling;
pub mod ports;
pub mod time;
pub mod wheel;

pub use assist::{AssistMode, AssistPhase, CurrentCommand, CurrentCommandPolicy};
pub use config::AssistConfig;
pub use control_loop::ControlLoop;
pub use diagnostics::{RateLimiter, Snapshot};
pub use inputs_dump::{DataInputs, DataInputsBit, InputsDump};
pub use pedaling::{CadenceState, Direction};
pub use ports::{MotorLimits, MotorOutput, Watchdog};
pub use time::{Clock, TickClock, Timestamp};

use analog::Throttle;
use hall::EdgeDetector;
use pedaling::{CadenceClassifier, DirectionEstimator};
use wheel::SpeedEstimator;

/// The pedal assist controller, holding all the state of the control loop.
pub struct PedelecController {
    wheel: EdgeDetector,            // Debounced wheel hall channel
    crank: EdgeDetector,            // Debounced crank hall channel
    speed: SpeedEstimator,          // Wheel rpm and vehicle speed
    direction: DirectionEstimator,  // Crank direction from phase durations
    cadence: CadenceClassifier,     // Is the rider pedaling
    policy: CurrentCommandPolicy,   // Motor current command
    throttle: Throttle,             // Throttle ADC normalization
    stall_timeout_ms: u32,          // Wheel silence that means the wheel stopped
}

impl PedelecController {
    /// Create a new controller.
    ///
    /// # Arguments
    /// * `config` - Thresholds, timings and the current policy mode of this deployment
    pub fn new(config: &AssistConfig) -> Self {
        info!("PEDELEC: controller in {} mode", config.mode);
        Self {
            wheel: EdgeDetector::new(),
            crank: EdgeDetector::new(),
            speed: SpeedEstimator::new(config),
            direction: DirectionEstimator::new(),
            cadence: CadenceClassifier::new(config),
            policy: CurrentCommandPolicy::new(config),
            throttle: Throttle::new(config.throttle_full_scale),
            stall_timeout_ms: config.stall_timeout_ms,
        }
    }

    /// Main update method, called once per loop period.
    ///
    /// # Arguments
    /// * `now` - Time of this tick
    /// * `input` - Hall levels and throttle reading sampled for this tick
    /// * `max_current` - Motor current limit in amps
    ///
    /// Order: edges -> speed -> direction -> cadence -> current command.
    pub fn tick(&mut self, now: Timestamp, input: DataInputs, max_current: f32) -> Snapshot {
        let previous_wheel_edge = self.wheel.last_edge();
        let wheel_edge = self.wheel.tick(input.wheel_level, now);
        let crank_edge = self.crank.tick(input.crank_level, now);

        let stalled = self.wheel.is_stalled(now, self.stall_timeout_ms);
        let velocity = self.speed.tick(wheel_edge, previous_wheel_edge, stalled, now);

        let direction = self.direction.tick(input.crank_level, now);
        let is_pedaling = self.cadence.tick(
            crank_edge,
            direction,
            self.direction.last_transition(),
            velocity,
            now,
        );

        let throttle = self.throttle.tick(input.throttle_adc);
        let command = self.policy.evaluate(is_pedaling, throttle, max_current, now);

        Snapshot {
            timestamp: now,
            is_pedaling,
            direction,
            cadence: self.cadence.state(),
            pedal_count: self.cadence.pedal_count(),
            wheel_rpm: self.speed.rpm(),
            velocity_kmh: velocity,
            throttle,
            phase: self.policy.phase(),
            command,
        }
    }

    pub fn is_pedaling(&self) -> bool {
        self.cadence.is_pedaling()
    }

    pub fn mode(&self) -> AssistMode {
        self.policy.mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_A: f32 = 20.0;

    /// Crank and wheel waveform generator sampled every 2 ms.
    struct Ride {
        controller: PedelecController,
        t: u32,
    }

    impl Ride {
        fn new(config: AssistConfig) -> Self {
            Self {
                controller: PedelecController::new(&config),
                t: 0,
            }
        }

        fn sample(&mut self, wheel: bool, crank: bool, throttle_adc: u16) -> Snapshot {
            let input = DataInputs {
                wheel_level: wheel,
                crank_level: crank,
                throttle_adc,
            };
            let snapshot = self
                .controller
                .tick(Timestamp::from_millis(self.t), input, MAX_A);
            self.t += 2;
            snapshot
        }

        /// Pedal with the given crank low/high phase durations while the wheel turns every `wheel_ms`.
        fn pedal(&mut self, strokes: u32, low_ms: u32, high_ms: u32, wheel_ms: u32) -> Snapshot {
            let mut last = None;
            for _ in 0..strokes {
                for (crank, duration) in [(false, low_ms), (true, high_ms)] {
                    let end = self.t + duration;
                    while self.t < end {
                        let wheel = self.t % wheel_ms < 20;
                        last = Some(self.sample(wheel, crank, 2048));
                    }
                }
            }
            last.unwrap()
        }
    }

    #[test]
    fn test_idle_bike_releases_motor() {
        let mut ride = Ride::new(AssistConfig::default());
        for _ in 0..1000 {
            let snapshot = ride.sample(false, false, 4095);
            assert!(!snapshot.is_pedaling);
            assert_eq!(snapshot.command, CurrentCommand::ReleaseMotor);
        }
    }

    #[test]
    fn test_forward_pedaling_at_speed_assists() {
        let mut ride = Ride::new(AssistConfig::default());
        // Wheel every 500 ms is ~16 km/h, above the 6 km/h gate.
        // Direction is known after the first full low phase, so pedaling starts at the second stroke.
        let snapshot = ride.pedal(2, 300, 200, 500);
        assert_eq!(snapshot.direction, Direction::Forward);
        assert!(snapshot.velocity_kmh > 6.0);
        assert!(snapshot.is_pedaling);
        assert_eq!(snapshot.command, CurrentCommand::SetCurrent(4.0));

        let snapshot = ride.pedal(4, 300, 200, 500);
        assert_eq!(snapshot.phase, AssistPhase::Full);
        match snapshot.command {
            CurrentCommand::SetCurrent(amps) => {
                let expected = MAX_A * (2048.0 / 4095.0) + 10.0;
                assert!((amps - expected).abs() < 1e-3);
            }
            CurrentCommand::ReleaseMotor => panic!("expected current"),
        }
    }

    #[test]
    fn test_too_slow_never_assists() {
        let mut ride = Ride::new(AssistConfig::default());
        // Wheel every 2 s is ~4 km/h
        let snapshot = ride.pedal(10, 300, 200, 2000);
        assert_eq!(snapshot.direction, Direction::Forward);
        assert!(!snapshot.is_pedaling);
        assert_eq!(snapshot.command, CurrentCommand::ReleaseMotor);
    }

    #[test]
    fn test_backpedaling_releases() {
        let mut ride = Ride::new(AssistConfig::default());
        assert!(ride.pedal(4, 300, 200, 500).is_pedaling);

        let snapshot = ride.pedal(1, 100, 300, 500);
        assert_eq!(snapshot.direction, Direction::Reverse);
        assert!(!snapshot.is_pedaling);
        assert_eq!(snapshot.command, CurrentCommand::ReleaseMotor);
    }

    #[test]
    fn test_crank_stop_releases_after_timeout() {
        let mut ride = Ride::new(AssistConfig::default());
        assert!(ride.pedal(4, 300, 200, 500).is_pedaling);

        // Crank parked low, bike still rolling
        let stop = ride.t;
        let mut snapshot = ride.sample(false, false, 2048);
        while ride.t - stop <= 8000 {
            snapshot = ride.sample(ride.t % 500 < 20, false, 2048);
        }
        assert!(snapshot.is_pedaling);
        let snapshot = ride.sample(false, false, 2048);
        assert!(!snapshot.is_pedaling);
        assert_eq!(snapshot.pedal_count, 0);
        assert_eq!(snapshot.command, CurrentCommand::ReleaseMotor);
    }

    #[test]
    fn test_wheel_stop_zeroes_speed() {
        let mut ride = Ride::new(AssistConfig::default());
        ride.pedal(4, 300, 200, 500);
        let mut snapshot = ride.sample(false, false, 0);
        for _ in 0..1600 {
            snapshot = ride.sample(false, false, 0);
        }
        assert_eq!(snapshot.velocity_kmh, 0.0);
        assert_eq!(snapshot.wheel_rpm, 0.0);
    }

    #[test]
    fn test_throttle_direct_mode() {
        let mut ride = Ride::new(AssistConfig::with_mode(AssistMode::ThrottleDirect));
        let snapshot = ride.sample(false, false, 4095);
        assert!(!snapshot.is_pedaling);
        assert_eq!(snapshot.command, CurrentCommand::SetCurrent(MAX_A));
        let snapshot = ride.sample(false, false, 0);
        assert_eq!(snapshot.command, CurrentCommand::ReleaseMotor);
    }
}
