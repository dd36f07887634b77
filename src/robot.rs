use crate::config::{ROBOT_SIZE, ROBOT_START, STEP_X, STEP_Y};
use crate::types::Point;

/// Vertical correction chosen for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    Down, // Towards larger y
    Up,   // Towards smaller y
    Hold,
}

impl Steer {
    /// Correction that moves `y` towards `target_y`.
    pub fn towards(y: f64, target_y: f64) -> Self {
        if y < target_y {
            Steer::Down
        } else if y > target_y {
            Steer::Up
        } else {
            Steer::Hold
        }
    }

    pub fn dy(self) -> f64 {
        match self {
            Steer::Down => STEP_Y,
            Steer::Up => -STEP_Y,
            Steer::Hold => 0.0,
        }
    }
}

// The drilling robot: a square of ROBOT_SIZE anchored at its position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Robot {
    pub position: Point,
}

impl Robot {
    pub fn new(position: Point) -> Self {
        Robot { position }
    }

    /// Horizontal extent `[x, x + ROBOT_SIZE)` at a given `x`.
    pub fn footprint_at(x: f64) -> (f64, f64) {
        (x, x + ROBOT_SIZE)
    }

    /// Where the robot would be after one forward step with the given correction.
    pub fn candidate(&self, steer: Steer) -> Point {
        Point {
            x: self.position.x + STEP_X,
            y: self.position.y + steer.dy(),
        }
    }
}

impl Default for Robot {
    fn default() -> Self {
        Robot::new(ROBOT_START)
    }
}
