//! Headless fixed-cadence driver: the external scheduler that ticks the engine.

use crate::config::SimConfig;
use crate::drill::DrillEngine;
use crate::error::SimError;
use crate::metrics::PerformanceReport;
use log::info;
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub finished: bool,
    pub report: PerformanceReport,
}

pub struct Runner {
    engine: DrillEngine,
    tick_interval: Duration,
    max_ticks: Option<u64>,
    printed: usize, // Log entries already written out
}

impl Runner {
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let tick_interval = config.tick_interval;
        if tick_interval.is_zero() {
            return Err(SimError::InvalidConfiguration(
                "tick interval must be greater than zero".to_string(),
            ));
        }
        let max_ticks = config.max_ticks;
        let engine = DrillEngine::new(config)?;
        info!(
            "Course ready: finish line at x={}, ticking every {:?}",
            engine.finish_line(),
            tick_interval
        );
        Ok(Runner {
            engine,
            tick_interval,
            max_ticks,
            printed: 0,
        })
    }

    pub fn engine(&self) -> &DrillEngine {
        &self.engine
    }

    /// Ticks at the configured cadence until the robot finishes or the tick
    /// limit is hit, writing each new log entry to `out` as it appears.
    pub fn run<W: Write>(&mut self, out: &mut W) -> io::Result<RunSummary> {
        info!("Starting run...");
        let started = Instant::now();
        let mut ticks: u64 = 0;
        let mut accumulator = Duration::ZERO;
        let mut last = Instant::now();

        while !self.is_done(ticks) {
            let now = Instant::now();
            accumulator += now - last;
            last = now;

            // Fixed-step update loop
            while accumulator >= self.tick_interval && !self.is_done(ticks) {
                accumulator -= self.tick_interval;
                self.engine.tick();
                ticks += 1;
                self.flush_logs(out)?;
            }

            thread::sleep(self.tick_interval.saturating_sub(accumulator));
        }

        // Clearances can land between ticks; pick up anything still unprinted
        self.flush_logs(out)?;
        let finished = self.engine.state().is_finished();
        if finished {
            info!("Run finished after {} ticks in {:?}", ticks, started.elapsed());
        } else {
            info!("Stopped after {} ticks without reaching the finish line", ticks);
        }
        Ok(RunSummary {
            ticks,
            finished,
            report: self.engine.performance_report(),
        })
    }

    fn is_done(&self, ticks: u64) -> bool {
        self.engine.state().is_finished() || self.max_ticks.is_some_and(|max| ticks >= max)
    }

    fn flush_logs<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let fresh = self.engine.logs_since(self.printed);
        for entry in &fresh {
            writeln!(out, "{}", entry)?;
        }
        self.printed += fresh.len();
        out.flush()
    }
}
