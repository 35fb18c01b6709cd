use soccer_core::{GameView, TickContext};

use crate::node::{Collaborators, Node, NodeState};

/// How many children of a parallel node must succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    All,
    Any,
    AtLeast(usize),
}

impl Threshold {
    pub fn required(self, children: usize) -> usize {
        match self {
            Threshold::All => children,
            Threshold::Any => 1,
            Threshold::AtLeast(n) => n,
        }
    }
}

/// Composition policy of a [`CompositeNode`].
///
/// `Sequence` and `Selector` keep their place across ticks and resume the RUNNING child.
/// The reactive variants restart from the first child every tick, so earlier children act as
/// guards that can preempt a RUNNING later child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Sequence,
    Selector,
    ReactiveSequence,
    ReactiveSelector,
    Parallel(Threshold),
}

pub struct CompositeNode<W>
where
    W: GameView + 'static,
{
    policy: Policy,
    children: Vec<Node<W>>,
    index: usize,
}

impl<W> CompositeNode<W>
where
    W: GameView + 'static,
{
    pub fn new(policy: Policy, children: Vec<Node<W>>) -> Self {
        Self {
            policy,
            children,
            index: 0,
        }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn children(&self) -> &[Node<W>] {
        &self.children
    }

    pub(crate) fn tick(
        &mut self,
        ctx: &TickContext,
        world: &W,
        io: &Collaborators<'_>,
    ) -> NodeState {
        match self.policy {
            Policy::Sequence => self.tick_in_order(NodeState::Success, ctx, world, io),
            Policy::Selector => self.tick_in_order(NodeState::Failure, ctx, world, io),
            Policy::ReactiveSequence => self.tick_reactive(NodeState::Success, ctx, world, io),
            Policy::ReactiveSelector => self.tick_reactive(NodeState::Failure, ctx, world, io),
            Policy::Parallel(threshold) => self.tick_parallel(threshold, ctx, world, io),
        }
    }

    pub(crate) fn cancel(&mut self, ctx: &TickContext, io: &Collaborators<'_>) {
        self.finish(ctx, io);
    }

    /// `advance_on` is the child result that moves on to the next child: SUCCESS for a
    /// sequence, FAILURE for a selector. Running out of children returns that same result.
    fn tick_in_order(
        &mut self,
        advance_on: NodeState,
        ctx: &TickContext,
        world: &W,
        io: &Collaborators<'_>,
    ) -> NodeState {
        while self.index < self.children.len() {
            let state = self.children[self.index].tick(ctx, world, io);
            if state == advance_on {
                self.index += 1;
                continue;
            }
            if state.is_terminal() {
                self.finish(ctx, io);
            }
            return state;
        }

        self.finish(ctx, io);
        advance_on
    }

    fn tick_reactive(
        &mut self,
        advance_on: NodeState,
        ctx: &TickContext,
        world: &W,
        io: &Collaborators<'_>,
    ) -> NodeState {
        for i in 0..self.children.len() {
            let state = self.children[i].tick(ctx, world, io);
            if state == advance_on {
                continue;
            }
            if state.is_running() {
                if self.index != i {
                    self.cancel_except(i, ctx, io);
                    self.index = i;
                }
            } else {
                self.finish(ctx, io);
            }
            return state;
        }

        self.finish(ctx, io);
        advance_on
    }

    /// Every child is ticked every cycle; the threshold is checked against this cycle's
    /// results only.
    fn tick_parallel(
        &mut self,
        threshold: Threshold,
        ctx: &TickContext,
        world: &W,
        io: &Collaborators<'_>,
    ) -> NodeState {
        let mut successes = 0;
        let mut running = 0;
        for child in self.children.iter_mut() {
            match child.tick(ctx, world, io) {
                NodeState::Success => successes += 1,
                NodeState::Running => running += 1,
                NodeState::Failure => {}
            }
        }

        let required = threshold.required(self.children.len());
        let state = if successes >= required {
            NodeState::Success
        } else if successes + running < required {
            NodeState::Failure
        } else {
            NodeState::Running
        };

        if state.is_terminal() {
            self.finish(ctx, io);
        }
        state
    }

    fn cancel_except(&mut self, keep: usize, ctx: &TickContext, io: &Collaborators<'_>) {
        for (i, child) in self.children.iter_mut().enumerate() {
            if i != keep {
                child.cancel(ctx, io);
            }
        }
    }

    /// End the current activation: cancel whatever is still RUNNING and drop progress.
    fn finish(&mut self, ctx: &TickContext, io: &Collaborators<'_>) {
        for child in self.children.iter_mut() {
            child.cancel(ctx, io);
        }
        self.index = 0;
    }
}
