use std::borrow::Cow;
use std::fmt;

use soccer_core::{CommandPublisher, GameView, Pathfinder, RobotId, SnapshotError, TickContext};

use crate::composite::{CompositeNode, Policy, Threshold};
use crate::error::BuildError;
use crate::leaf::{ConditionalNode, Task, TaskNode};
use crate::supervisor::RootSupervisor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    Success,
    Failure,
    Running,
}

impl NodeState {
    pub fn from_bool(ok: bool) -> Self {
        if ok {
            NodeState::Success
        } else {
            NodeState::Failure
        }
    }

    pub fn is_running(self) -> bool {
        self == NodeState::Running
    }

    pub fn is_terminal(self) -> bool {
        !self.is_running()
    }

    pub fn is_success(self) -> bool {
        self == NodeState::Success
    }

    pub fn is_failure(self) -> bool {
        self == NodeState::Failure
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Success => f.write_str("SUCCESS"),
            NodeState::Failure => f.write_str("FAILURE"),
            NodeState::Running => f.write_str("RUNNING"),
        }
    }
}

/// Owning robot plus a human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub agent: RobotId,
    pub label: Cow<'static, str>,
}

impl NodeId {
    pub fn new(agent: RobotId, label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            agent,
            label: label.into(),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.agent)
    }
}

/// External services a tick may call. Both are shared by every robot's tree.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub pathfinder: &'a dyn Pathfinder,
    pub publisher: &'a dyn CommandPublisher,
}

impl<'a> Collaborators<'a> {
    pub fn new(pathfinder: &'a dyn Pathfinder, publisher: &'a dyn CommandPublisher) -> Self {
        Self {
            pathfinder,
            publisher,
        }
    }
}

pub enum NodeKind<W>
where
    W: GameView + 'static,
{
    Conditional(ConditionalNode<W>),
    Task(TaskNode<W>),
    Composite(CompositeNode<W>),
    Supervisor(Box<RootSupervisor<W>>),
}

/// A single tree node: identity, behavior, and whether the last tick left it RUNNING.
///
/// The running flag is what makes [`Node::cancel`] precise: only the nodes on the currently
/// RUNNING path see a cancel, and cancelling a finished node is a no-op.
pub struct Node<W>
where
    W: GameView + 'static,
{
    id: NodeId,
    kind: NodeKind<W>,
    running: bool,
}

impl<W> Node<W>
where
    W: GameView + 'static,
{
    pub fn new(id: NodeId, kind: NodeKind<W>) -> Self {
        Self {
            id,
            kind,
            running: false,
        }
    }

    pub fn condition(
        agent: RobotId,
        label: impl Into<Cow<'static, str>>,
        predicate: impl FnMut(&TickContext, RobotId, &W) -> Result<bool, SnapshotError>
            + Send
            + 'static,
    ) -> Self {
        Self::new(
            NodeId::new(agent, label),
            NodeKind::Conditional(ConditionalNode::new(predicate)),
        )
    }

    pub fn task(
        agent: RobotId,
        label: impl Into<Cow<'static, str>>,
        task: impl Task<W>,
    ) -> Self {
        Self::new(NodeId::new(agent, label), NodeKind::Task(TaskNode::new(task)))
    }

    pub fn composite(
        agent: RobotId,
        label: impl Into<Cow<'static, str>>,
        policy: Policy,
        children: Vec<Node<W>>,
    ) -> Self {
        Self::new(
            NodeId::new(agent, label),
            NodeKind::Composite(CompositeNode::new(policy, children)),
        )
    }

    pub fn sequence(
        agent: RobotId,
        label: impl Into<Cow<'static, str>>,
        children: Vec<Node<W>>,
    ) -> Self {
        Self::composite(agent, label, Policy::Sequence, children)
    }

    pub fn selector(
        agent: RobotId,
        label: impl Into<Cow<'static, str>>,
        children: Vec<Node<W>>,
    ) -> Self {
        Self::composite(agent, label, Policy::Selector, children)
    }

    pub fn reactive_sequence(
        agent: RobotId,
        label: impl Into<Cow<'static, str>>,
        children: Vec<Node<W>>,
    ) -> Self {
        Self::composite(agent, label, Policy::ReactiveSequence, children)
    }

    pub fn reactive_selector(
        agent: RobotId,
        label: impl Into<Cow<'static, str>>,
        children: Vec<Node<W>>,
    ) -> Self {
        Self::composite(agent, label, Policy::ReactiveSelector, children)
    }

    pub fn parallel(
        agent: RobotId,
        label: impl Into<Cow<'static, str>>,
        threshold: Threshold,
        children: Vec<Node<W>>,
    ) -> Self {
        Self::composite(agent, label, Policy::Parallel(threshold), children)
    }

    pub fn supervisor(supervisor: RootSupervisor<W>) -> Self {
        let id = supervisor.id().clone();
        Self::new(id, NodeKind::Supervisor(Box::new(supervisor)))
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn agent(&self) -> RobotId {
        self.id.agent
    }

    pub fn label(&self) -> &str {
        &self.id.label
    }

    pub fn kind(&self) -> &NodeKind<W> {
        &self.kind
    }

    /// Whether the previous tick returned RUNNING and the node has not been cancelled since.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn as_supervisor(&self) -> Option<&RootSupervisor<W>> {
        match &self.kind {
            NodeKind::Supervisor(s) => Some(s),
            _ => None,
        }
    }

    pub fn tick(&mut self, ctx: &TickContext, world: &W, io: &Collaborators<'_>) -> NodeState {
        let agent = self.id.agent;
        let state = match &mut self.kind {
            NodeKind::Conditional(cond) => cond.tick(&self.id, ctx, world),
            NodeKind::Task(task) => {
                let state = task.tick(ctx, agent, world, io);
                if state.is_terminal() {
                    tracing::debug!(
                        robot = %agent,
                        node = %self.id.label,
                        cycle = ctx.cycle,
                        %state,
                        "task finished"
                    );
                }
                state
            }
            NodeKind::Composite(composite) => composite.tick(ctx, world, io),
            NodeKind::Supervisor(supervisor) => supervisor.tick(ctx, world, io),
        };

        tracing::trace!(robot = %agent, node = %self.id.label, %state, "tick");
        self.running = state.is_running();
        state
    }

    /// Abandon this node's RUNNING activation and everything running below it.
    ///
    /// Completes synchronously: once this returns no node in the subtree holds progress from
    /// the abandoned activation, and no task in it will publish again until it is re-ticked.
    pub fn cancel(&mut self, ctx: &TickContext, io: &Collaborators<'_>) {
        if !self.running {
            return;
        }
        self.running = false;

        tracing::debug!(
            robot = %self.id.agent,
            node = %self.id.label,
            cycle = ctx.cycle,
            "cancelling running node"
        );

        let agent = self.id.agent;
        match &mut self.kind {
            NodeKind::Conditional(_) => {}
            NodeKind::Task(task) => task.cancel(ctx, agent, io),
            NodeKind::Composite(composite) => composite.cancel(ctx, io),
            NodeKind::Supervisor(supervisor) => supervisor.cancel(ctx, io),
        }
    }

    /// Check that every node below (and including) this one belongs to `owner`.
    pub fn validate(&self, owner: RobotId) -> Result<(), BuildError> {
        if self.id.agent != owner {
            return Err(BuildError::ForeignNode {
                tree_owner: owner,
                node_owner: self.id.agent,
                label: self.id.label.clone(),
            });
        }

        match &self.kind {
            NodeKind::Conditional(_) | NodeKind::Task(_) => Ok(()),
            NodeKind::Composite(composite) => {
                if let Policy::Parallel(Threshold::AtLeast(0)) = composite.policy() {
                    return Err(BuildError::EmptyThreshold {
                        label: self.id.label.clone(),
                    });
                }
                composite
                    .children()
                    .iter()
                    .try_for_each(|child| child.validate(owner))
            }
            NodeKind::Supervisor(supervisor) => supervisor
                .subtrees()
                .try_for_each(|(_, subtree)| subtree.validate(owner)),
        }
    }
}

impl<W> fmt::Debug for Node<W>
where
    W: GameView + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            NodeKind::Conditional(_) => "conditional",
            NodeKind::Task(_) => "task",
            NodeKind::Composite(_) => "composite",
            NodeKind::Supervisor(_) => "supervisor",
        };
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &kind)
            .field("running", &self.running)
            .finish()
    }
}
