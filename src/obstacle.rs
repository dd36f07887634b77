//! Obstacles on the course and the registry that tracks their lifecycle.

use crate::config::OBSTACLE_WIDTH;
use crate::error::SimError;
use crate::types::Point;
use crate::utils;
use std::fmt;
use std::time::Duration;

/// Difficulty class of an obstacle. Closed set; every table below is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Colour tag attached to clearance log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyColor {
    Green,
    Yellow,
    Red,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Time needed to drill through an obstacle of this class.
    pub fn clearance_delay(self) -> Duration {
        match self {
            Difficulty::Easy => Duration::ZERO,
            Difficulty::Medium => Duration::from_millis(3000),
            Difficulty::Hard => Duration::from_millis(5000),
        }
    }

    pub fn color(self) -> DifficultyColor {
        match self {
            Difficulty::Easy => DifficultyColor::Green,
            Difficulty::Medium => DifficultyColor::Yellow,
            Difficulty::Hard => DifficultyColor::Red,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl DifficultyColor {
    pub fn name(self) -> &'static str {
        match self {
            DifficultyColor::Green => "green",
            DifficultyColor::Yellow => "yellow",
            DifficultyColor::Red => "red",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleState {
    Intact,
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub position: Point, // Left edge and vertical placement
    pub difficulty: Difficulty,
    pub state: ObstacleState,
}

impl Obstacle {
    pub fn new(x: f64, y: f64, difficulty: Difficulty) -> Self {
        Obstacle {
            position: Point::new(x, y),
            difficulty,
            state: ObstacleState::Intact,
        }
    }

    pub fn is_intact(&self) -> bool {
        self.state == ObstacleState::Intact
    }

    /// Whether a horizontal span `[x, x + width)` runs into this obstacle.
    pub fn overlaps(&self, x: f64, width: f64) -> bool {
        utils::spans_overlap(x, width, self.position.x, OBSTACLE_WIDTH)
    }
}

/// All obstacles of a run, in layout order, keyed by their unique `x`.
///
/// Cleared obstacles are kept so consumers can still draw them; only intact
/// ones take part in collision checks.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleRegistry {
    obstacles: Vec<Obstacle>,
}

impl ObstacleRegistry {
    pub fn new(obstacles: Vec<Obstacle>) -> Result<Self, SimError> {
        for (i, obstacle) in obstacles.iter().enumerate() {
            if obstacles[..i]
                .iter()
                .any(|other| other.position.x == obstacle.position.x)
            {
                return Err(SimError::InvalidConfiguration(format!(
                    "duplicate obstacle position x={}",
                    obstacle.position.x
                )));
            }
        }
        log::debug!(target: "registry", "Registry holds {} obstacles", obstacles.len());
        Ok(ObstacleRegistry { obstacles })
    }

    /// The reference layout: one obstacle of each class along the course.
    pub fn course() -> Self {
        ObstacleRegistry {
            obstacles: vec![
                Obstacle::new(150.0, 75.0, Difficulty::Easy),
                Obstacle::new(300.0, 75.0, Difficulty::Medium),
                Obstacle::new(450.0, 75.0, Difficulty::Hard),
            ],
        }
    }

    pub fn active_obstacles(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter().filter(|o| o.is_intact())
    }

    pub fn all(&self) -> &[Obstacle] {
        &self.obstacles
    }


    /// First intact obstacle, in registry order, hit by the span `[x, x + width)`.
    pub fn first_collision(&self, x: f64, width: f64) -> Option<Obstacle> {
        self.active_obstacles().find(|o| o.overlaps(x, width)).copied()
    }

    /// Moves the obstacle at `x` from Intact to Cleared and returns it.
    pub fn clear(&mut self, x: f64) -> Result<Obstacle, SimError> {
        match self.obstacles.iter_mut().find(|o| o.position.x == x) {
            Some(obstacle) if obstacle.is_intact() => {
                obstacle.state = ObstacleState::Cleared;
                Ok(*obstacle)
            }
            _ => Err(SimError::InvalidTransition { x }),
        }
    }
}

impl Default for ObstacleRegistry {
    fn default() -> Self {
        Self::course()
    }
}
