//! Condition closures for [`soccer_bt::Node::condition`].

use soccer_core::{GameView, RobotId, SnapshotError, TickContext};

use crate::target::Target;

pub fn near_ball<W: GameView>(
    radius: f32,
) -> impl FnMut(&TickContext, RobotId, &W) -> Result<bool, SnapshotError> + Send + 'static {
    move |_ctx, agent, world| {
        let robot = world.robot_position(agent)?;
        let ball = world.ball_position()?;
        Ok(robot.distance(ball) <= radius)
    }
}

/// Errors (and so fails) once the snapshot is older than `max_age_cycles`.
pub fn fresh<W: GameView>(
    max_age_cycles: u64,
) -> impl FnMut(&TickContext, RobotId, &W) -> Result<bool, SnapshotError> + Send + 'static {
    move |ctx, _agent, world| world.ensure_fresh(ctx, max_age_cycles).map(|()| true)
}

/// True once the robot is within `tolerance` of `target`.
pub fn at_target<W: GameView + 'static>(
    mut target: Target<W>,
    tolerance: f32,
) -> impl FnMut(&TickContext, RobotId, &W) -> Result<bool, SnapshotError> + Send + 'static {
    move |ctx, agent, world| {
        let robot = world.robot_position(agent)?;
        let goal = target.resolve(ctx, agent, world)?;
        Ok(robot.distance(goal) <= tolerance)
    }
}
