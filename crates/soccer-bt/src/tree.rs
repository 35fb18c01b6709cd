use soccer_core::{GameView, RobotId, TickContext};

use crate::error::BuildError;
use crate::node::{Collaborators, Node, NodeState};
use crate::supervisor::RootSupervisor;

/// One robot's behavior tree. Owns the root and nothing else.
pub struct BehaviorTree<W>
where
    W: GameView + 'static,
{
    root: Node<W>,
}

impl<W> BehaviorTree<W>
where
    W: GameView + 'static,
{
    /// Validates that every node in `root` belongs to the root's robot.
    pub fn new(root: Node<W>) -> Result<Self, BuildError> {
        root.validate(root.agent())?;
        Ok(Self { root })
    }

    pub fn agent(&self) -> RobotId {
        self.root.agent()
    }

    pub fn root(&self) -> &Node<W> {
        &self.root
    }

    pub fn supervisor(&self) -> Option<&RootSupervisor<W>> {
        self.root.as_supervisor()
    }

    /// Tick the root once for this control cycle.
    pub fn tick(&mut self, ctx: &TickContext, world: &W, io: &Collaborators<'_>) -> NodeState {
        self.root.tick(ctx, world, io)
    }
}
