//! Clearance time accounting.

use crate::obstacle::Difficulty;
use std::collections::BTreeMap;
use std::fmt;

/// Immutable view of the accumulated clearance times, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub total_time: f64,
    pub per_difficulty: BTreeMap<Difficulty, f64>,
}

impl PerformanceReport {
    pub fn time_for(&self, difficulty: Difficulty) -> f64 {
        self.per_difficulty.get(&difficulty).copied().unwrap_or(0.0)
    }
}

impl fmt::Display for PerformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total time: {}s", self.total_time)?;
        for difficulty in Difficulty::ALL {
            writeln!(
                f,
                "Time to break {} obstacles: {}s",
                difficulty,
                self.time_for(difficulty)
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    per_difficulty: BTreeMap<Difficulty, f64>,
    total_time: f64,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        MetricsAggregator {
            per_difficulty: Difficulty::ALL.iter().map(|d| (*d, 0.0)).collect(),
            total_time: 0.0,
        }
    }

    pub fn record_clearance(&mut self, difficulty: Difficulty, seconds: f64) {
        *self.per_difficulty.entry(difficulty).or_insert(0.0) += seconds;
        // Recomputed rather than accumulated so the sum invariant holds exactly
        self.total_time = self.per_difficulty.values().sum();
        log::debug!(
            target: "metrics",
            "Recorded {}s for {} obstacle, total {}s",
            seconds,
            difficulty,
            self.total_time
        );
    }

    pub fn snapshot(&self) -> PerformanceReport {
        PerformanceReport {
            total_time: self.total_time,
            per_difficulty: self.per_difficulty.clone(),
        }
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}
