//! Drilling robot course simulation.
//!
//! A robot advances along a fixed course, stops at each obstacle for a
//! difficulty-dependent drilling delay, and records a timestamped event log
//! and per-difficulty clearance times. [`DrillEngine`] is the interface a
//! renderer or reporter polls; [`Runner`] ticks it at a fixed cadence.

pub mod clock;
pub mod config;
pub mod drill;
pub mod engine;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod obstacle;
pub mod path;
pub mod robot;
pub mod runner;
pub mod scheduler;
pub mod types;
pub mod utils;

pub use clock::LogEntry;
pub use config::{SimConfig, SteeringMode};
pub use drill::DrillEngine;
pub use engine::{EngineState, Simulation};
pub use error::SimError;
pub use metrics::PerformanceReport;
pub use obstacle::{Difficulty, DifficultyColor, Obstacle, ObstacleState};
pub use runner::{RunSummary, Runner};
pub use types::Point;
