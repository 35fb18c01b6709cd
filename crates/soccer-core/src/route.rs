use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{RobotId, Vec2};

/// Ordered waypoints from the robot's position to its destination.
///
/// `waypoints[0]` is the requested start and `waypoints.last()` the requested destination.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Route {
    pub waypoints: Vec<Vec2>,
}

impl Route {
    pub fn new(waypoints: Vec<Vec2>) -> Self {
        Self { waypoints }
    }

    pub fn destination(&self) -> Option<Vec2> {
        self.waypoints.last().copied()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Distance from `position` to the nearest point of the route's polyline.
    pub fn distance_to(&self, position: Vec2) -> Option<f32> {
        self.closest_leg(position).map(|(_, d)| d)
    }

    /// The same route restarted at `position`.
    ///
    /// Waypoints up to the start of the leg nearest to `position` are dropped, so `position`
    /// becomes `waypoints[0]` and the destination is kept.
    pub fn rejoined_at(&self, position: Vec2) -> Option<Route> {
        let (leg, _) = self.closest_leg(position)?;
        let mut waypoints = Vec::with_capacity(self.waypoints.len() - leg + 1);
        waypoints.push(position);
        match self.waypoints.get(leg + 1..) {
            Some(rest) if !rest.is_empty() => waypoints.extend_from_slice(rest),
            _ => waypoints.extend(self.destination()),
        }
        Some(Route::new(waypoints))
    }

    /// Index `i` of the leg `waypoints[i]..waypoints[i + 1]` closest to `position`, with its
    /// distance. A single-waypoint route has one degenerate leg.
    fn closest_leg(&self, position: Vec2) -> Option<(usize, f32)> {
        match self.waypoints.as_slice() {
            [] => None,
            [only] => Some((0, position.distance(*only))),
            points => points
                .windows(2)
                .map(|leg| distance_to_segment(position, leg[0], leg[1]))
                .enumerate()
                .min_by(|(_, a), (_, b)| a.total_cmp(b)),
        }
    }

    /// Next waypoint to steer towards from `position`.
    ///
    /// Starts from the waypoint closest to `position` and skips every waypoint already within
    /// `reached` meters. Falls back to the destination once all intermediate points are behind.
    pub fn next_after(&self, position: Vec2, reached: f32) -> Option<Vec2> {
        let closest = self
            .waypoints
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                position
                    .distance(**a)
                    .total_cmp(&position.distance(**b))
            })
            .map(|(i, _)| i)?;

        self.waypoints[closest..]
            .iter()
            .copied()
            .find(|p| position.distance(*p) > reached)
            .or_else(|| self.destination())
    }
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.dot(ab);
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a.lerp(b, t))
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RouteError {
    #[error("no route from ({}, {}) to ({}, {})", .from.x, .from.y, .to.x, .to.y)]
    Unreachable { from: Vec2, to: Vec2 },

    #[error("point ({}, {}) is outside the field", .point.x, .point.y)]
    OutsideField { point: Vec2 },

    /// The request was accepted but the route is not ready yet.
    #[error("route for {0} is still being computed")]
    Pending(RobotId),
}

/// Route/next-step service consumed by task nodes.
///
/// Calls must not block the control loop: an implementation backed by slow search should answer
/// from a cache or return [`RouteError::Pending`].
pub trait Pathfinder: Send + Sync {
    fn find_route(&self, robot: RobotId, from: Vec2, to: Vec2) -> Result<Route, RouteError>;

    fn next_step(&self, _robot: RobotId, route: &Route, position: Vec2) -> Option<Vec2> {
        route.next_after(position, 0.05)
    }

    /// Abandon any outstanding request for `robot`; a late result must be discarded.
    fn cancel(&self, _robot: RobotId) {}
}

impl<P: Pathfinder + ?Sized> Pathfinder for &P {
    fn find_route(&self, robot: RobotId, from: Vec2, to: Vec2) -> Result<Route, RouteError> {
        (**self).find_route(robot, from, to)
    }

    fn next_step(&self, robot: RobotId, route: &Route, position: Vec2) -> Option<Vec2> {
        (**self).next_step(robot, route, position)
    }

    fn cancel(&self, robot: RobotId) {
        (**self).cancel(robot)
    }
}
