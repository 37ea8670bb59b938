use std::time::Duration;

use crate::config::AnimatorConfig;
use crate::error::ConfigError;
use crate::model::{Coordinate, Direction};

/// An immutable waypoint sequence together with how many ticks one full traversal takes.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    waypoints: Vec<Coordinate>,
    total_steps: u64,
}

impl Route {
    pub fn new(waypoints: Vec<Coordinate>, total_steps: u64) -> Result<Self, ConfigError> {
        if waypoints.len() < 2 {
            return Err(ConfigError::TooFewWaypoints {
                count: waypoints.len(),
            });
        }
        if let Some(index) = waypoints.iter().position(|w| !w.is_finite()) {
            return Err(ConfigError::NonFiniteWaypoint { index });
        }
        if total_steps == 0 {
            return Err(ConfigError::NonPositive {
                field: "total_steps",
            });
        }
        Ok(Self {
            waypoints,
            total_steps,
        })
    }

    pub fn waypoints(&self) -> &[Coordinate] {
        &self.waypoints
    }

    pub fn segments(&self) -> usize {
        self.waypoints.len() - 1
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Ticks spent on each segment. Not necessarily a whole number.
    pub fn steps_per_segment(&self) -> f64 {
        self.total_steps as f64 / self.segments() as f64
    }

    /// First waypoint of a traversal in the given direction.
    pub fn start(&self, direction: Direction) -> Coordinate {
        match direction {
            Direction::Forward => self.waypoints[0],
            Direction::Reverse => self.waypoints[self.waypoints.len() - 1],
        }
    }

    /// Segment `index` as `(start, end)` in traversal order.
    pub fn segment(&self, direction: Direction, index: usize) -> (Coordinate, Coordinate) {
        let n = self.waypoints.len();
        match direction {
            Direction::Forward => (self.waypoints[index], self.waypoints[index + 1]),
            Direction::Reverse => (self.waypoints[n - 1 - index], self.waypoints[n - 2 - index]),
        }
    }

    /// Position after `step` ticks of a traversal, or None once every segment is consumed.
    ///
    /// Segment and progress come from integer arithmetic
    /// (`segment = floor(step * segments / total_steps)`), so boundaries land exactly on
    /// waypoints even when `steps_per_segment` is not a whole number, and progress is always
    /// in `[0, 1)`.
    pub fn position_at(&self, direction: Direction, step: u64) -> Option<Coordinate> {
        let segments = self.segments() as u128;
        let total = self.total_steps as u128;
        let scaled = step as u128 * segments;
        let segment = scaled / total;
        if segment >= segments {
            return None;
        }
        let progress = (scaled - segment * total) as f64 / total as f64;
        let (start, end) = self.segment(direction, segment as usize);
        Some(start.lerp(end, progress))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    pub position: Coordinate,
    pub direction: Direction,
    /// Ticks already emitted in the current traversal
    pub step: u64,
}

/// Moves a position back and forth along a route forever, one step per `advance()`.
#[derive(Debug, Clone)]
pub struct RouteAnimator {
    route: Route,
    tick_interval: Duration,
    state: AnimationState,
}

impl RouteAnimator {
    pub fn new(cfg: &AnimatorConfig) -> Result<Self, ConfigError> {
        if cfg.tick_interval_ms == 0 {
            return Err(ConfigError::NonPositive {
                field: "tick_interval_ms",
            });
        }
        if cfg.total_duration_ms == 0 {
            return Err(ConfigError::NonPositive {
                field: "total_duration_ms",
            });
        }
        if cfg.waypoints.len() < 2 {
            return Err(ConfigError::TooFewWaypoints {
                count: cfg.waypoints.len(),
            });
        }
        let total_steps = cfg.total_duration_ms / cfg.tick_interval_ms;
        if total_steps == 0 {
            return Err(ConfigError::DurationShorterThanTick {
                total_ms: cfg.total_duration_ms,
                tick_ms: cfg.tick_interval_ms,
            });
        }

        let route = Route::new(cfg.waypoints.clone(), total_steps)?;
        Ok(Self::with_route(
            route,
            Duration::from_millis(cfg.tick_interval_ms),
        ))
    }

    pub fn with_route(route: Route, tick_interval: Duration) -> Self {
        let state = AnimationState {
            position: route.start(Direction::Forward),
            direction: Direction::Forward,
            step: 0,
        };
        Self {
            route,
            tick_interval,
            state,
        }
    }

    /// Emits the position for the current step and moves on by one.
    ///
    /// Once the traversal is consumed the direction flips and the step counter restarts; the
    /// position emitted on that tick is snapped to the endpoint just reached.
    pub fn advance(&mut self) -> Coordinate {
        let position = match self
            .route
            .position_at(self.state.direction, self.state.step)
        {
            Some(position) => position,
            None => {
                self.state.direction = self.state.direction.flipped();
                self.state.step = 0;
                tracing::debug!(direction = ?self.state.direction, "route end reached; reversing");
                self.route.start(self.state.direction)
            }
        };
        self.state.position = position;
        self.state.step += 1;
        position
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> AnimatorConfig {
        AnimatorConfig {
            waypoints: vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(10.0, 0.0),
                Coordinate::new(10.0, 10.0),
            ],
            total_duration_ms: 1000,
            tick_interval_ms: 100,
        }
    }

    #[test]
    fn derived_constants_are_fixed_at_construction() {
        let anim = RouteAnimator::new(&square()).unwrap();
        assert_eq!(anim.route().total_steps(), 10);
        assert_eq!(anim.route().segments(), 2);
        assert_eq!(anim.route().steps_per_segment(), 5.0);
        assert_eq!(anim.tick_interval(), Duration::from_millis(100));
    }

    #[test]
    fn segment_boundary_is_exact() {
        let mut anim = RouteAnimator::new(&square()).unwrap();
        let mut last = anim.advance();
        for _ in 1..=5 {
            last = anim.advance();
        }
        // six advances emit steps 0..=5
        assert_eq!(last, Coordinate::new(10.0, 0.0));
        assert_eq!(anim.state().direction, Direction::Forward);
    }

    #[test]
    fn reverses_at_route_end_and_snaps_to_endpoint() {
        let mut anim = RouteAnimator::new(&square()).unwrap();
        for _ in 0..10 {
            anim.advance();
        }
        assert_eq!(anim.state().direction, Direction::Forward);
        assert_eq!(anim.state().position, Coordinate::new(10.0, 8.0));

        let flipped = anim.advance();
        assert_eq!(flipped, Coordinate::new(10.0, 10.0));
        assert_eq!(anim.state().direction, Direction::Reverse);

        let next = anim.advance();
        assert_eq!(next, Coordinate::new(10.0, 8.0));
    }

    #[test]
    fn two_waypoints_is_a_single_segment() {
        let route = Route::new(
            vec![Coordinate::new(0.0, 0.0), Coordinate::new(4.0, 0.0)],
            4,
        )
        .unwrap();
        assert_eq!(route.segments(), 1);
        assert_eq!(
            route.position_at(Direction::Forward, 2),
            Some(Coordinate::new(2.0, 0.0))
        );
        assert_eq!(
            route.position_at(Direction::Reverse, 1),
            Some(Coordinate::new(3.0, 0.0))
        );
        assert_eq!(route.position_at(Direction::Forward, 4), None);
    }

    #[test]
    fn non_integral_steps_per_segment_never_overshoot() {
        // 10 steps over 3 segments
        let route = Route::new(
            vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(3.0, 0.0),
                Coordinate::new(6.0, 0.0),
                Coordinate::new(9.0, 0.0),
            ],
            10,
        )
        .unwrap();
        for step in 0..10 {
            let p = route.position_at(Direction::Forward, step).unwrap();
            assert!(p.lat >= 0.0 && p.lat < 9.0, "step {step} at {p:?}");
        }
        assert_eq!(route.position_at(Direction::Forward, 10), None);
    }

    #[test]
    fn rejects_bad_config() {
        let mut cfg = square();
        cfg.waypoints.truncate(1);
        assert!(matches!(
            RouteAnimator::new(&cfg),
            Err(ConfigError::TooFewWaypoints { count: 1 })
        ));

        let mut cfg = square();
        cfg.tick_interval_ms = 0;
        assert!(matches!(
            RouteAnimator::new(&cfg),
            Err(ConfigError::NonPositive { field: "tick_interval_ms" })
        ));

        let mut cfg = square();
        cfg.total_duration_ms = 0;
        assert!(matches!(
            RouteAnimator::new(&cfg),
            Err(ConfigError::NonPositive { field: "total_duration_ms" })
        ));

        let mut cfg = square();
        cfg.total_duration_ms = 50;
        assert!(matches!(
            RouteAnimator::new(&cfg),
            Err(ConfigError::DurationShorterThanTick { .. })
        ));

        let mut cfg = square();
        cfg.waypoints[1] = Coordinate::new(f64::NAN, 0.0);
        assert!(matches!(
            RouteAnimator::new(&cfg),
            Err(ConfigError::NonFiniteWaypoint { index: 1 })
        ));
    }
}
