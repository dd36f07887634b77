//! The tick-driven state machine that moves the robot along the course.
//!
//! [`Simulation`] is single-threaded and knows nothing about wall-clock
//! time. Entering [`EngineState::Blocked`] hands back a [`ClearanceRequest`];
//! whoever drives the simulation is responsible for calling
//! [`Simulation::complete_clearance`] once the delay has elapsed.

use crate::clock::{EventLog, LogEntry};
use crate::config::{FINISH_LINE, ROBOT_SIZE, ROBOT_START, STEP_X, SimConfig, SteeringMode};
use crate::error::SimError;
use crate::metrics::{MetricsAggregator, PerformanceReport};
use crate::obstacle::{Obstacle, ObstacleRegistry};
use crate::path::Path;
use crate::robot::{Robot, Steer};
use crate::types::Point;
use crate::{debug_collision, debug_engine};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineState {
    Running,
    /// Frozen in front of an obstacle until its clearance completes.
    Blocked { obstacle: Obstacle },
    Finished,
}

impl EngineState {
    pub fn is_running(&self) -> bool {
        matches!(self, EngineState::Running)
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, EngineState::Blocked { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, EngineState::Finished)
    }

    pub fn name(&self) -> &'static str {
        match self {
            EngineState::Running => "Running",
            EngineState::Blocked { .. } => "Blocked",
            EngineState::Finished => "Finished",
        }
    }
}

/// Issued when the robot runs into an obstacle: clear it after `delay`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearanceRequest {
    pub obstacle: Obstacle,
    pub delay: Duration,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    path: Path,
    registry: ObstacleRegistry,
    robot: Robot,
    log: EventLog,
    metrics: MetricsAggregator,
    state: EngineState,
    steering: SteeringMode,
    ticks: u64,
}

impl Simulation {
    /// Simulation over the reference course and obstacle layout.
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self::from_parts(Path::course(), ObstacleRegistry::course(), config))
    }

    /// Simulation over an explicit path and obstacle list, both validated.
    pub fn with_layout(
        waypoints: Vec<Point>,
        obstacles: Vec<Obstacle>,
        config: &SimConfig,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let path = Path::new(waypoints)?;
        let registry = ObstacleRegistry::new(obstacles)?;
        Ok(Self::from_parts(path, registry, config))
    }

    fn from_parts(path: Path, registry: ObstacleRegistry, config: &SimConfig) -> Self {
        Simulation {
            path,
            registry,
            robot: Robot::new(ROBOT_START),
            log: EventLog::new(),
            metrics: MetricsAggregator::new(),
            state: EngineState::Running,
            steering: config.steering,
            ticks: 0,
        }
    }

    /// Advances the simulation by one step.
    ///
    /// Returns a clearance request on the tick the robot becomes blocked.
    pub fn tick(&mut self) -> Option<ClearanceRequest> {
        match self.state {
            EngineState::Finished => None,
            EngineState::Blocked { obstacle } => {
                self.ticks += 1;
                debug_engine!(
                    self.ticks,
                    "Still blocked by {} obstacle at {}",
                    obstacle.difficulty,
                    obstacle.position
                );
                None
            }
            EngineState::Running => {
                self.ticks += 1;
                self.advance()
            }
        }
    }

    fn advance(&mut self) -> Option<ClearanceRequest> {
        let position = self.robot.position;
        self.log
            .log(format!("Robot moved forward {} units.", STEP_X), None);

        let lookup_x = match self.steering {
            SteeringMode::PreMove => position.x,
            SteeringMode::PostMove => position.x + STEP_X,
        };
        let steer = self
            .path
            .next_waypoint_after(lookup_x)
            .map_or(Steer::Hold, |waypoint| Steer::towards(position.y, waypoint.y));
        match steer {
            Steer::Down => self.log.log("Robot moved down.", None),
            Steer::Up => self.log.log("Robot moved up.", None),
            Steer::Hold => {}
        }

        let candidate = self.robot.candidate(steer);
        if let Some(obstacle) = self.registry.first_collision(candidate.x, ROBOT_SIZE) {
            debug_collision!(
                self.ticks,
                "Footprint {:?} overlaps obstacle at {}",
                Robot::footprint_at(candidate.x),
                obstacle.position
            );
            self.log.log(
                format!(
                    "Encountered {} obstacle at {}.",
                    obstacle.difficulty, obstacle.position
                ),
                None,
            );
            self.state = EngineState::Blocked { obstacle };
            debug_engine!(self.ticks, "Running -> Blocked");
            return Some(ClearanceRequest {
                obstacle,
                delay: obstacle.difficulty.clearance_delay(),
            });
        }

        self.robot.position = candidate;
        if candidate.x >= FINISH_LINE {
            self.log.log("Robot has reached the finish line.", None);
            self.state = EngineState::Finished;
            self.log.seal();
            debug_engine!(
                self.ticks,
                "Running -> Finished, total clearance time {}s",
                self.metrics.snapshot().total_time
            );
        }
        None
    }

    /// Clears the obstacle the robot is blocked on and resumes motion.
    ///
    /// Returns `Ok(false)` and changes nothing when the engine is not blocked
    /// on the obstacle at `obstacle_x` (a stale or duplicate completion).
    pub fn complete_clearance(&mut self, obstacle_x: f64) -> Result<bool, SimError> {
        match self.state {
            EngineState::Blocked { obstacle } if obstacle.position.x == obstacle_x => {}
            state => {
                log::warn!(
                    target: "engine",
                    "Ignoring clearance of obstacle at x={} while {}",
                    obstacle_x,
                    state.name()
                );
                return Ok(false);
            }
        }

        let cleared = self.registry.clear(obstacle_x)?;
        let difficulty = cleared.difficulty;
        self.log.log(
            format!("Cleared {} obstacle at {}.", difficulty, cleared.position),
            Some(difficulty.color()),
        );
        self.metrics
            .record_clearance(difficulty, difficulty.clearance_delay().as_secs_f64());
        self.state = EngineState::Running;
        debug_engine!(self.ticks, "Blocked -> Running");
        Ok(true)
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn robot_position(&self) -> Point {
        self.robot.position
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        self.registry.all()
    }

    pub fn logs(&self) -> &[LogEntry] {
        self.log.entries()
    }

    pub fn clock(&self) -> f64 {
        self.log.current()
    }

    pub fn performance_report(&self) -> PerformanceReport {
        self.metrics.snapshot()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacle::{Difficulty, DifficultyColor, ObstacleState};
    use assert_approx_eq::assert_approx_eq;

    fn course() -> Simulation {
        Simulation::new(&SimConfig::default()).unwrap()
    }

    // Ticks until the robot blocks, returning the request
    fn tick_until_blocked(sim: &mut Simulation) -> ClearanceRequest {
        for _ in 0..1000 {
            if let Some(request) = sim.tick() {
                return request;
            }
        }
        panic!("robot never blocked");
    }

    // Runs to completion, clearing every obstacle as soon as it is hit
    fn run_to_finish(sim: &mut Simulation) {
        for _ in 0..1000 {
            if sim.state().is_finished() {
                return;
            }
            if let Some(request) = sim.tick() {
                assert!(sim.complete_clearance(request.obstacle.position.x).unwrap());
            }
        }
        panic!("robot never finished");
    }

    fn messages(sim: &Simulation) -> Vec<&str> {
        sim.logs().iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn test_first_tick() {
        let mut sim = course();
        assert!(sim.tick().is_none());
        assert_eq!(sim.robot_position(), Point::new(10.0, 70.0));
        assert_eq!(
            messages(&sim),
            vec!["Robot moved forward 10 units.", "Robot moved up."]
        );
        assert_approx_eq!(sim.clock(), 1.0);
        assert!(sim.state().is_running());
    }

    #[test]
    fn test_no_vertical_log_when_on_course() {
        let mut sim = course();
        for _ in 0..5 {
            sim.tick();
        }
        assert_approx_eq!(sim.robot_position().y, 50.0);
        let before = sim.logs().len();
        sim.tick();
        assert_eq!(sim.logs().len(), before + 1);
        assert_eq!(sim.logs()[before].message, "Robot moved forward 10 units.");
    }

    #[test]
    fn test_blocks_on_first_obstacle_without_moving() {
        let mut sim = course();
        let request = tick_until_blocked(&mut sim);
        assert_eq!(request.obstacle.difficulty, Difficulty::Easy);
        assert_eq!(request.delay, Duration::ZERO);
        // Candidate 110 overlaps [150, 200); the robot stays at 100
        assert_approx_eq!(sim.robot_position().x, 100.0);
        assert_eq!(
            sim.state(),
            EngineState::Blocked {
                obstacle: request.obstacle
            }
        );
        assert_eq!(
            sim.logs().last().unwrap().message,
            "Encountered easy obstacle at 150,75."
        );
    }

    #[test]
    fn test_blocked_ticks_change_nothing() {
        let mut sim = course();
        let request = tick_until_blocked(&mut sim);
        let position = sim.robot_position();
        let logs = sim.logs().len();
        for _ in 0..10 {
            assert!(sim.tick().is_none());
            assert_eq!(sim.state(), EngineState::Blocked { obstacle: request.obstacle });
        }
        assert_eq!(sim.robot_position(), position);
        assert_eq!(sim.logs().len(), logs);
    }

    #[test]
    fn test_clearance_resumes_motion() {
        let mut sim = course();
        tick_until_blocked(&mut sim);
        let request = tick_until_blocked_after_clearing(&mut sim);
        assert_eq!(request.obstacle.difficulty, Difficulty::Medium);
        assert_eq!(request.delay, Duration::from_millis(3000));

        assert!(sim.complete_clearance(300.0).unwrap());
        let entry = sim.logs().last().unwrap();
        assert_eq!(entry.message, "Cleared medium obstacle at 300,75.");
        assert_eq!(entry.tag, Some(DifficultyColor::Yellow));
        assert!(sim.state().is_running());
        let report = sim.performance_report();
        assert_approx_eq!(report.time_for(Difficulty::Medium), 3.0);
        assert_approx_eq!(report.total_time, 3.0);

        let x = sim.robot_position().x;
        sim.tick();
        assert_approx_eq!(sim.robot_position().x, x + STEP_X);
    }

    fn tick_until_blocked_after_clearing(sim: &mut Simulation) -> ClearanceRequest {
        if let EngineState::Blocked { obstacle } = sim.state() {
            sim.complete_clearance(obstacle.position.x).unwrap();
        }
        tick_until_blocked(sim)
    }

    #[test]
    fn test_stale_clearance_is_ignored() {
        let mut sim = course();
        assert_eq!(sim.complete_clearance(150.0), Ok(false));

        tick_until_blocked(&mut sim);
        let logs = sim.logs().len();
        assert_eq!(sim.complete_clearance(300.0), Ok(false));
        assert!(sim.state().is_blocked());
        assert_eq!(sim.logs().len(), logs);

        assert_eq!(sim.complete_clearance(150.0), Ok(true));
        assert_eq!(sim.complete_clearance(150.0), Ok(false));
        assert_eq!(sim.performance_report().total_time, 0.0);
    }

    #[test]
    fn test_full_run_reaches_finish() {
        let mut sim = course();
        run_to_finish(&mut sim);
        // 75 forward steps plus one blocked tick per obstacle
        assert_eq!(sim.ticks(), 78);
        assert!(sim.robot_position().x >= FINISH_LINE);
        assert_eq!(
            sim.logs().last().unwrap().message,
            "Robot has reached the finish line."
        );
        assert!(
            sim.obstacles()
                .iter()
                .all(|o| o.state == ObstacleState::Cleared)
        );

        let report = sim.performance_report();
        assert_approx_eq!(report.time_for(Difficulty::Easy), 0.0);
        assert_approx_eq!(report.time_for(Difficulty::Medium), 3.0);
        assert_approx_eq!(report.time_for(Difficulty::Hard), 5.0);
        assert_eq!(report.total_time, report.per_difficulty.values().sum::<f64>());
        assert_approx_eq!(report.total_time, 8.0);
    }

    #[test]
    fn test_ticks_after_finish_are_noops() {
        let mut sim = course();
        run_to_finish(&mut sim);
        let position = sim.robot_position();
        let logs = sim.logs().to_vec();
        let report = sim.performance_report();
        let clock = sim.clock();
        for _ in 0..20 {
            assert!(sim.tick().is_none());
        }
        assert!(sim.state().is_finished());
        assert_eq!(sim.robot_position(), position);
        assert_eq!(sim.logs(), logs.as_slice());
        assert_eq!(sim.performance_report(), report);
        assert_eq!(sim.clock(), clock);
    }

    #[test]
    fn test_log_clock_is_monotonic() {
        let mut sim = course();
        run_to_finish(&mut sim);
        for (i, entry) in sim.logs().iter().enumerate() {
            assert_approx_eq!(entry.timestamp, i as f64 * 0.5);
        }
    }

    #[test]
    fn test_first_obstacle_in_registry_order_wins() {
        let waypoints = vec![Point::new(0.0, 75.0), Point::new(800.0, 75.0)];
        let obstacles = vec![
            Obstacle::new(125.0, 75.0, Difficulty::Hard),
            Obstacle::new(121.0, 75.0, Difficulty::Medium),
        ];
        let mut sim = Simulation::with_layout(waypoints, obstacles, &SimConfig::default()).unwrap();
        let request = tick_until_blocked(&mut sim);
        // Footprint [80, 130) hits both; the nearer medium one is listed second
        assert_approx_eq!(sim.robot_position().x, 70.0);
        assert_eq!(request.obstacle.difficulty, Difficulty::Hard);
        assert_eq!(request.obstacle.position.x, 125.0);
        assert_eq!(sim.complete_clearance(121.0), Ok(false));
    }

    #[test]
    fn test_post_move_steering_looks_one_step_ahead() {
        let waypoints = crate::config::COURSE_PATH.to_vec();
        let pre = SimConfig::default();
        let post = SimConfig {
            steering: SteeringMode::PostMove,
            ..SimConfig::default()
        };
        let mut lagging = Simulation::with_layout(waypoints.clone(), Vec::new(), &pre).unwrap();
        let mut tracking = Simulation::with_layout(waypoints, Vec::new(), &post).unwrap();
        for _ in 0..15 {
            lagging.tick();
            tracking.tick();
        }
        // At x=140 the lagging robot still aims at (150, 50); the tracking one at (300, 75)
        assert_eq!(lagging.robot_position(), Point::new(150.0, 50.0));
        assert_eq!(tracking.robot_position(), Point::new(150.0, 55.0));
    }

    #[test]
    fn test_invalid_layouts_are_rejected() {
        let config = SimConfig::default();
        assert!(matches!(
            Simulation::with_layout(Vec::new(), Vec::new(), &config),
            Err(SimError::InvalidConfiguration(_))
        ));
        let duplicate = vec![
            Obstacle::new(150.0, 75.0, Difficulty::Easy),
            Obstacle::new(150.0, 75.0, Difficulty::Medium),
        ];
        assert!(matches!(
            Simulation::with_layout(crate::config::COURSE_PATH.to_vec(), duplicate, &config),
            Err(SimError::InvalidConfiguration(_))
        ));
        let bad_scale = SimConfig {
            delay_scale: -2.0,
            ..SimConfig::default()
        };
        assert!(Simulation::new(&bad_scale).is_err());
    }
}
