//! The fixed course the robot tracks vertically while it advances.

use crate::config::COURSE_PATH;
use crate::error::SimError;
use crate::types::Point;

/// Ordered waypoints, strictly increasing in `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    waypoints: Vec<Point>,
}

impl Path {
    pub fn new(waypoints: Vec<Point>) -> Result<Self, SimError> {
        if waypoints.is_empty() {
            return Err(SimError::InvalidConfiguration(
                "path must contain at least one waypoint".to_string(),
            ));
        }
        for pair in waypoints.windows(2) {
            if pair[1].x <= pair[0].x {
                return Err(SimError::InvalidConfiguration(format!(
                    "waypoint x values must be strictly increasing ({} follows {})",
                    pair[1].x, pair[0].x
                )));
            }
        }
        log::debug!(target: "path", "Path built with {} waypoints", waypoints.len());
        Ok(Path { waypoints })
    }

    /// The reference course.
    pub fn course() -> Self {
        Path {
            waypoints: COURSE_PATH.to_vec(),
        }
    }

    /// First waypoint strictly ahead of `x`, or `None` once past the last one.
    pub fn next_waypoint_after(&self, x: f64) -> Option<Point> {
        // Linear scan; the course is a handful of points.
        self.waypoints.iter().find(|wp| wp.x > x).copied()
    }

    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::course()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_is_rejected() {
        assert!(matches!(
            Path::new(Vec::new()),
            Err(SimError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_non_increasing_path_is_rejected() {
        let repeated = vec![Point::new(0.0, 0.0), Point::new(0.0, 10.0)];
        assert!(Path::new(repeated).is_err());

        let backwards = vec![Point::new(10.0, 0.0), Point::new(5.0, 10.0)];
        assert!(Path::new(backwards).is_err());
    }

    #[test]
    fn test_course_passes_validation() {
        let course = Path::course();
        assert_eq!(Path::new(course.waypoints().to_vec()), Ok(course));
    }

    #[test]
    fn test_next_waypoint_is_strictly_ahead() {
        let path = Path::course();
        assert_eq!(path.next_waypoint_after(0.0), Some(Point::new(150.0, 50.0)));
        assert_eq!(path.next_waypoint_after(149.0), Some(Point::new(150.0, 50.0)));
        // A waypoint exactly at x is behind, not ahead.
        assert_eq!(path.next_waypoint_after(150.0), Some(Point::new(300.0, 75.0)));
        assert_eq!(path.next_waypoint_after(-5.0), Some(Point::new(0.0, 75.0)));
    }

    #[test]
    fn test_no_waypoint_past_the_end() {
        let path = Path::course();
        assert_eq!(path.next_waypoint_after(800.0), None);
        assert_eq!(path.next_waypoint_after(1000.0), None);
    }
}
