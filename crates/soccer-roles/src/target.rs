use soccer_core::{RobotId, SnapshotError, TickContext, Vec2};

type Resolver<W> =
    Box<dyn FnMut(&TickContext, RobotId, &W) -> Result<Vec2, SnapshotError> + Send>;

/// Where a movement task should go, fixed or recomputed from the snapshot every tick.
pub enum Target<W> {
    Fixed(Vec2),
    Dynamic(Resolver<W>),
}

impl<W> Target<W> {
    pub fn dynamic(
        resolve: impl FnMut(&TickContext, RobotId, &W) -> Result<Vec2, SnapshotError>
            + Send
            + 'static,
    ) -> Self {
        Target::Dynamic(Box::new(resolve))
    }

    pub fn resolve(
        &mut self,
        ctx: &TickContext,
        agent: RobotId,
        world: &W,
    ) -> Result<Vec2, SnapshotError> {
        match self {
            Target::Fixed(p) => Ok(*p),
            Target::Dynamic(resolve) => resolve(ctx, agent, world),
        }
    }
}

impl<W> From<Vec2> for Target<W> {
    fn from(p: Vec2) -> Self {
        Target::Fixed(p)
    }
}

/// Point on the segment from `ball` towards `own_goal`, `distance` meters from the ball.
///
/// Never overshoots the goal.
pub fn defend_point(ball: Vec2, own_goal: Vec2, distance: f32) -> Vec2 {
    let to_goal = own_goal - ball;
    ball + to_goal.normalized() * distance.min(to_goal.length())
}

/// `point` pushed radially out of the circle around `center`.
///
/// A point exactly on the center is pushed towards negative x (our own half).
pub fn outside_circle(point: Vec2, center: Vec2, radius: f32) -> Vec2 {
    let offset = point - center;
    if offset.length() >= radius {
        return point;
    }
    let dir = offset.normalized();
    let dir = if dir == Vec2::ZERO {
        Vec2::new(-1.0, 0.0)
    } else {
        dir
    };
    center + dir * radius
}
