//! Thread-safe handle around [`Simulation`] that owns the clearance timers.
//!
//! The tick handler and the timer callback both go through one mutex, so
//! only one of them mutates the simulation at a time. Timers hold a weak
//! reference to the shared state; once the engine is gone they cannot
//! touch it.

use crate::clock::LogEntry;
use crate::config::{FINISH_LINE, SimConfig};
use crate::debug_timer;
use crate::engine::{ClearanceRequest, EngineState, Simulation};
use crate::error::SimError;
use crate::metrics::PerformanceReport;
use crate::obstacle::Obstacle;
use crate::scheduler::ClearanceTimer;
use crate::types::Point;
use log::error;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

#[derive(Debug)]
struct Inner {
    sim: Simulation,
    timer: Option<ClearanceTimer>,
    shut_down: bool,
}

#[derive(Debug)]
struct Shared {
    inner: Mutex<Inner>,
    unblocked: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn complete(&self, obstacle_x: f64) {
        let mut inner = self.lock();
        if inner.shut_down {
            return;
        }
        match inner.sim.complete_clearance(obstacle_x) {
            Ok(true) => {
                inner.timer = None;
                self.unblocked.notify_all();
            }
            Ok(false) => {}
            Err(e) => {
                error!(target: "engine", "Clearance failed: {}", e);
                debug_assert!(false, "clearance of a non-intact obstacle: {}", e);
            }
        }
    }
}

/// The in-process interface a rendering or reporting consumer polls.
#[derive(Debug)]
pub struct DrillEngine {
    shared: Arc<Shared>,
    config: SimConfig,
}

impl DrillEngine {
    /// Engine over the reference course.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let sim = Simulation::new(&config)?;
        Ok(Self::from_simulation(sim, config))
    }

    pub fn with_layout(
        waypoints: Vec<Point>,
        obstacles: Vec<Obstacle>,
        config: SimConfig,
    ) -> Result<Self, SimError> {
        let sim = Simulation::with_layout(waypoints, obstacles, &config)?;
        Ok(Self::from_simulation(sim, config))
    }

    fn from_simulation(sim: Simulation, config: SimConfig) -> Self {
        DrillEngine {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    sim,
                    timer: None,
                    shut_down: false,
                }),
                unblocked: Condvar::new(),
            }),
            config,
        }
    }

    /// Advances the simulation one step and returns the state it left behind.
    ///
    /// Never waits on a clearance. A zero-delay clearance may complete right
    /// after this returns, so the returned state is the only reliable view
    /// of a momentary block.
    pub fn tick(&self) -> EngineState {
        let mut inner = self.shared.lock();
        if !inner.shut_down {
            if let Some(request) = inner.sim.tick() {
                self.schedule_clearance(&mut inner, request);
            }
        }
        inner.sim.state()
    }

    fn schedule_clearance(&self, inner: &mut Inner, request: ClearanceRequest) {
        let obstacle_x = request.obstacle.position.x;
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let wait = self.config.scaled_delay(request.delay);
        let scheduled = ClearanceTimer::schedule(wait, move || match weak.upgrade() {
            Some(shared) => shared.complete(obstacle_x),
            None => debug_timer!("Engine dropped before clearance of x={}", obstacle_x),
        });
        match scheduled {
            Ok(timer) => inner.timer = Some(timer),
            Err(e) => {
                // No timer thread available: clear on the spot rather than stall forever
                error!(target: "timer", "Could not schedule clearance: {}", e);
                if let Err(e) = inner.sim.complete_clearance(obstacle_x) {
                    error!(target: "engine", "Clearance failed: {}", e);
                }
            }
        }
    }

    /// Cancels any pending clearance and stops accepting ticks.
    pub fn shutdown(&self) {
        let mut inner = self.shared.lock();
        if let Some(mut timer) = inner.timer.take() {
            timer.cancel();
            debug_timer!("Pending clearance cancelled on shutdown");
        }
        inner.shut_down = true;
        self.shared.unblocked.notify_all();
    }

    /// Waits up to `timeout` for a pending clearance. True when not blocked afterwards.
    pub fn wait_until_unblocked(&self, timeout: Duration) -> bool {
        let inner = self.shared.lock();
        let (inner, _) = self
            .shared
            .unblocked
            .wait_timeout_while(inner, timeout, |inner| {
                inner.sim.state().is_blocked() && !inner.shut_down
            })
            .unwrap_or_else(PoisonError::into_inner);
        !inner.sim.state().is_blocked()
    }

    pub fn state(&self) -> EngineState {
        self.shared.lock().sim.state()
    }

    pub fn robot_position(&self) -> Point {
        self.shared.lock().sim.robot_position()
    }

    pub fn obstacles(&self) -> Vec<Obstacle> {
        self.shared.lock().sim.obstacles().to_vec()
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.shared.lock().sim.logs().to_vec()
    }

    /// Entries appended after the first `seen` ones.
    pub fn logs_since(&self, seen: usize) -> Vec<LogEntry> {
        let inner = self.shared.lock();
        inner.sim.logs().get(seen..).map(<[LogEntry]>::to_vec).unwrap_or_default()
    }

    pub fn performance_report(&self) -> PerformanceReport {
        self.shared.lock().sim.performance_report()
    }

    pub fn clock(&self) -> f64 {
        self.shared.lock().sim.clock()
    }

    pub fn ticks(&self) -> u64 {
        self.shared.lock().sim.ticks()
    }

    pub fn path(&self) -> Vec<Point> {
        self.shared.lock().sim.path().waypoints().to_vec()
    }

    pub fn finish_line(&self) -> f64 {
        FINISH_LINE
    }

    /// Wall-clock time until the pending clearance fires, if one is pending.
    pub fn pending_clearance(&self) -> Option<Duration> {
        let inner = self.shared.lock();
        inner
            .timer
            .as_ref()
            .filter(|_| inner.sim.state().is_blocked())
            .map(ClearanceTimer::remaining)
    }
}

impl Drop for DrillEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
