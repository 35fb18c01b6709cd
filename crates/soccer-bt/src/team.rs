use rayon::prelude::*;
use soccer_core::{GameView, RobotId, TickContext};

use crate::error::BuildError;
use crate::node::{Collaborators, NodeState};
use crate::tree::BehaviorTree;

/// The trees of every robot on the field, one per robot.
///
/// Trees share no node state, so they can be ticked in any order or concurrently as long as they
/// all read the same snapshot.
pub struct Team<W>
where
    W: GameView + 'static,
{
    trees: Vec<BehaviorTree<W>>,
}

impl<W> Team<W>
where
    W: GameView + 'static,
{
    pub fn new(mut trees: Vec<BehaviorTree<W>>) -> Result<Self, BuildError> {
        trees.sort_by_key(|t| t.agent());
        if let Some(dup) = trees.windows(2).find(|w| w[0].agent() == w[1].agent()) {
            return Err(BuildError::DuplicateRobot(dup[0].agent()));
        }
        Ok(Self { trees })
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn robots(&self) -> impl Iterator<Item = RobotId> + '_ {
        self.trees.iter().map(|t| t.agent())
    }

    pub fn tree(&self, robot: RobotId) -> Option<&BehaviorTree<W>> {
        self.trees
            .binary_search_by_key(&robot, |t| t.agent())
            .ok()
            .map(|i| &self.trees[i])
    }

    /// Tick every tree once, in ascending robot order.
    pub fn tick(
        &mut self,
        ctx: &TickContext,
        world: &W,
        io: &Collaborators<'_>,
    ) -> Vec<(RobotId, NodeState)> {
        self.trees
            .iter_mut()
            .map(|tree| (tree.agent(), tree.tick(ctx, world, io)))
            .collect()
    }

    /// Tick every tree once on the rayon pool. Results come back in ascending robot order.
    pub fn tick_parallel(
        &mut self,
        ctx: &TickContext,
        world: &W,
        io: &Collaborators<'_>,
    ) -> Vec<(RobotId, NodeState)>
    where
        W: Sync,
    {
        self.trees
            .par_iter_mut()
            .map(|tree| (tree.agent(), tree.tick(ctx, world, io)))
            .collect()
    }
}
