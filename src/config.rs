//! Configuration constants for the drilling course, plus runtime knobs.

use crate::error::SimError;
use crate::types::Point;
use std::time::Duration;

// Course geometry
pub const COURSE_WIDTH: f64 = 800.0;
pub const COURSE_HEIGHT: f64 = 200.0;
pub const FINISH_LINE: f64 = COURSE_WIDTH - 50.0;

// Robot and obstacle footprints
pub const ROBOT_SIZE: f64 = 50.0;
pub const OBSTACLE_WIDTH: f64 = 50.0;
pub const OBSTACLE_HEIGHT: f64 = 50.0;

// Movement per tick
pub const STEP_X: f64 = 10.0; // Horizontal advance per running tick
pub const STEP_Y: f64 = 5.0; // Vertical steering correction per running tick

// Event log clock
pub const LOG_TIME_STEP: f64 = 0.5; // Counter increment per appended entry

// Scheduling
pub const DEFAULT_TICK_MS: u64 = 500; // Reference cadence of the external scheduler

pub const ROBOT_START: Point = Point::new(0.0, 75.0);

/// Waypoints of the reference course, ordered by `x`.
pub const COURSE_PATH: [Point; 7] = [
    Point::new(0.0, 75.0),
    Point::new(150.0, 50.0),
    Point::new(300.0, 75.0),
    Point::new(450.0, 100.0),
    Point::new(600.0, 75.0),
    Point::new(750.0, 50.0),
    Point::new(COURSE_WIDTH, 75.0),
];

/// Which robot `x` is used to look up the steering waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SteeringMode {
    /// Position before this tick's horizontal step; steering lags one tick.
    #[default]
    PreMove,
    /// Position after this tick's horizontal step.
    PostMove,
}

/// Runtime knobs. Every default reproduces the reference run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub tick_interval: Duration,
    pub steering: SteeringMode,
    /// Multiplier on the wall-clock clearance wait. Reported times stay nominal.
    pub delay_scale: f64,
    pub max_ticks: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            steering: SteeringMode::PreMove,
            delay_scale: 1.0,
            max_ticks: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if !self.delay_scale.is_finite() || self.delay_scale < 0.0 {
            return Err(SimError::InvalidConfiguration(format!(
                "delay scale must be a finite non-negative number, got {}",
                self.delay_scale
            )));
        }
        Ok(())
    }

    /// Wall-clock wait for a nominal clearance delay under this config.
    ///
    /// Saturates at `Duration::MAX` when the scaled wait does not fit.
    pub fn scaled_delay(&self, nominal: Duration) -> Duration {
        Duration::try_from_secs_f64(nominal.as_secs_f64() * self.delay_scale)
            .unwrap_or(Duration::MAX)
    }
}
