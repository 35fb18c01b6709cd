use soccer_bt::{Collaborators, NodeState, Task};
use soccer_core::{
    Channel, Command, GameView, RobotId, Route, RouteError, TickContext, Vec2, Velocity,
};

use crate::target::Target;

/// Publish `command`, logging a rejection. Returns whether it was accepted.
fn publish(io: &Collaborators<'_>, channel: &Channel, command: Command, cycle: u64) -> bool {
    match io.publisher.publish(channel, command) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(
                robot = %command.robot,
                cycle,
                error = %err,
                "command rejected"
            );
            false
        }
    }
}

/// Drive towards a target along a route from the pathfinder.
///
/// - SUCCESS (after a stop command) once within `tolerance` of the target.
/// - RUNNING with one velocity command per tick while travelling.
/// - RUNNING with a hold command while the first route is still pending.
/// - FAILURE without publishing when the robot, target or route is unavailable.
///
/// The route is kept between ticks and replanned once the target moves, or the robot strays
/// from the route, by more than `replan_distance`. Cancelling drops it and abandons the
/// outstanding route request.
pub struct MoveToPosition<W> {
    target: Target<W>,
    max_speed: f32,
    tolerance: f32,
    replan_distance: f32,
    channel: Channel,
    route: Option<Route>,
    planned_for: Option<Vec2>,
}

impl<W> MoveToPosition<W> {
    pub fn new(target: impl Into<Target<W>>, max_speed: f32) -> Self {
        Self {
            target: target.into(),
            max_speed,
            tolerance: 0.05,
            replan_distance: 0.25,
            channel: Channel::BIASED_ROBOT_COMMAND,
            route: None,
            planned_for: None,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_replan_distance(mut self, distance: f32) -> Self {
        self.replan_distance = distance;
        self
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    fn reset(&mut self) {
        self.route = None;
        self.planned_for = None;
    }

    fn needs_plan(&self, position: Vec2, target: Vec2) -> bool {
        let Some(planned) = self.planned_for else {
            return true;
        };
        let off_route = self
            .route
            .as_ref()
            .and_then(|route| route.distance_to(position))
            .is_some_and(|d| d > self.replan_distance);
        off_route || planned.distance(target) > self.replan_distance
    }
}

impl<W> Task<W> for MoveToPosition<W>
where
    W: GameView + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: RobotId,
        world: &W,
        io: &Collaborators<'_>,
    ) -> NodeState {
        let located = world
            .robot_position(agent)
            .and_then(|position| Ok((position, self.target.resolve(ctx, agent, world)?)));
        let (position, target) = match located {
            Ok(located) => located,
            Err(err) => {
                tracing::warn!(
                    robot = %agent,
                    cycle = ctx.cycle,
                    error = %err,
                    "cannot locate move target"
                );
                self.reset();
                return NodeState::Failure;
            }
        };

        if position.distance(target) <= self.tolerance {
            self.reset();
            let sent = publish(io, &self.channel, Command::stop(agent), ctx.cycle);
            return if sent {
                NodeState::Success
            } else {
                NodeState::Failure
            };
        }

        if self.needs_plan(position, target) {
            match io.pathfinder.find_route(agent, position, target) {
                Ok(route) => {
                    if self.planned_for.is_some() {
                        tracing::debug!(robot = %agent, cycle = ctx.cycle, "route replanned");
                    }
                    self.route = Some(route);
                    self.planned_for = Some(target);
                }
                // Keep following the old route, if any, until the new one arrives.
                Err(RouteError::Pending(_)) if self.route.is_some() => {}
                Err(RouteError::Pending(_)) => {
                    tracing::debug!(robot = %agent, cycle = ctx.cycle, "route pending, holding");
                    let sent = publish(io, &self.channel, Command::stop(agent), ctx.cycle);
                    return if sent {
                        NodeState::Running
                    } else {
                        NodeState::Failure
                    };
                }
                Err(err) => {
                    tracing::debug!(robot = %agent, cycle = ctx.cycle, error = %err, "no route");
                    self.reset();
                    return NodeState::Failure;
                }
            }
        }

        let next = self
            .route
            .as_ref()
            .and_then(|route| io.pathfinder.next_step(agent, route, position));
        let Some(next) = next else {
            self.reset();
            return NodeState::Failure;
        };

        // Never overshoot the next waypoint within one control period.
        let to_next = next - position;
        let dt = ctx.dt_seconds.max(f32::EPSILON);
        let speed = self.max_speed.max(0.0).min(to_next.length() / dt);
        let velocity = Velocity::linear(to_next.normalized() * speed);

        if publish(io, &self.channel, Command::velocity(agent, velocity), ctx.cycle) {
            NodeState::Running
        } else {
            self.reset();
            NodeState::Failure
        }
    }

    fn cancel(&mut self, _ctx: &TickContext, agent: RobotId, io: &Collaborators<'_>) {
        self.reset();
        io.pathfinder.cancel(agent);
    }
}

/// Publish a zero-velocity command every tick. Never finishes on its own.
#[derive(Debug, Clone)]
pub struct Hold {
    channel: Channel,
}

impl Hold {
    pub fn new() -> Self {
        Self {
            channel: Channel::BIASED_ROBOT_COMMAND,
        }
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }
}

impl Default for Hold {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Task<W> for Hold
where
    W: GameView + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: RobotId,
        _world: &W,
        io: &Collaborators<'_>,
    ) -> NodeState {
        if publish(io, &self.channel, Command::stop(agent), ctx.cycle) {
            NodeState::Running
        } else {
            NodeState::Failure
        }
    }
}

/// Single kick command; SUCCESS once published.
#[derive(Debug, Clone)]
pub struct Kick {
    speed: f32,
    channel: Channel,
}

impl Kick {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            channel: Channel::BIASED_ROBOT_COMMAND,
        }
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }
}

impl<W> Task<W> for Kick
where
    W: GameView + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: RobotId,
        _world: &W,
        io: &Collaborators<'_>,
    ) -> NodeState {
        let sent = publish(io, &self.channel, Command::kick(agent, self.speed), ctx.cycle);
        NodeState::from_bool(sent)
    }
}
