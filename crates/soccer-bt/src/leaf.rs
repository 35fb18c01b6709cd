use soccer_core::{GameView, RobotId, SnapshotError, TickContext};

use crate::node::{Collaborators, NodeId, NodeState};

/// Side-effect-free check against the shared game state.
///
/// An `Err` means the state needed to answer was missing or stale; the node reports FAILURE.
pub type Predicate<W> =
    Box<dyn FnMut(&TickContext, RobotId, &W) -> Result<bool, SnapshotError> + Send>;

pub struct ConditionalNode<W>
where
    W: GameView + 'static,
{
    predicate: Predicate<W>,
}

impl<W> ConditionalNode<W>
where
    W: GameView + 'static,
{
    pub fn new(
        predicate: impl FnMut(&TickContext, RobotId, &W) -> Result<bool, SnapshotError>
            + Send
            + 'static,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
        }
    }

    pub(crate) fn tick(&mut self, id: &NodeId, ctx: &TickContext, world: &W) -> NodeState {
        match (self.predicate)(ctx, id.agent, world) {
            Ok(holds) => NodeState::from_bool(holds),
            Err(err) => {
                tracing::warn!(
                    robot = %id.agent,
                    node = %id.label,
                    cycle = ctx.cycle,
                    error = %err,
                    "condition could not be evaluated"
                );
                NodeState::Failure
            }
        }
    }
}

/// Side-effecting leaf behavior.
///
/// A task consults the snapshot, optionally calls the pathfinder, publishes at most one command
/// per tick, and reports its state. Any progress it keeps between ticks must be dropped by
/// `cancel`, and a terminal result must leave it ready for a fresh activation.
pub trait Task<W>: Send + 'static
where
    W: GameView + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: RobotId,
        world: &W,
        io: &Collaborators<'_>,
    ) -> NodeState;

    fn cancel(&mut self, _ctx: &TickContext, _agent: RobotId, _io: &Collaborators<'_>) {}
}

pub struct TaskNode<W>
where
    W: GameView + 'static,
{
    task: Box<dyn Task<W>>,
}

impl<W> TaskNode<W>
where
    W: GameView + 'static,
{
    pub fn new(task: impl Task<W>) -> Self {
        Self {
            task: Box::new(task),
        }
    }

    pub(crate) fn tick(
        &mut self,
        ctx: &TickContext,
        agent: RobotId,
        world: &W,
        io: &Collaborators<'_>,
    ) -> NodeState {
        self.task.tick(ctx, agent, world, io)
    }

    pub(crate) fn cancel(&mut self, ctx: &TickContext, agent: RobotId, io: &Collaborators<'_>) {
        self.task.cancel(ctx, agent, io);
    }
}

/// Stateless task from a closure.
pub struct FnTask<F> {
    run: F,
}

impl<F> FnTask<F> {
    pub fn new(run: F) -> Self {
        Self { run }
    }
}

impl<F, W> Task<W> for FnTask<F>
where
    F: FnMut(&TickContext, RobotId, &W, &Collaborators<'_>) -> NodeState + Send + 'static,
    W: GameView + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: RobotId,
        world: &W,
        io: &Collaborators<'_>,
    ) -> NodeState {
        (self.run)(ctx, agent, world, io)
    }
}
