// Simulation error types: construction-time configuration faults and illegal obstacle transitions

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid transition: obstacle at x={x} is not intact")]
    InvalidTransition { x: f64 },
}
