use std::borrow::Cow;
use std::collections::BTreeMap;

use soccer_core::{GameView, RobotId, SituationKey, TickContext};

use crate::error::BuildError;
use crate::node::{Collaborators, Node, NodeId, NodeState};

/// Record of one change of active subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SituationSwitch {
    pub from: SituationKey,
    pub to: SituationKey,
    pub cycle: u64,
}

/// Root of a role tree: one pre-built subtree per [`SituationKey`], exactly one of them active.
///
/// Every tick re-derives the situation from the snapshot. When it differs from the active one,
/// the active subtree is cancelled to completion, the new subtree becomes active and is ticked
/// in the same cycle. The supervisor returns the active subtree's result unchanged; it never
/// publishes anything itself.
pub struct RootSupervisor<W>
where
    W: GameView + 'static,
{
    id: NodeId,
    // Indexed by `SituationKey::index()`; always `SituationKey::COUNT` long.
    subtrees: Vec<Node<W>>,
    active: SituationKey,
    switches: u64,
    last_switch: Option<SituationSwitch>,
}

impl<W> RootSupervisor<W>
where
    W: GameView + 'static,
{
    pub fn builder(agent: RobotId) -> SupervisorBuilder<W> {
        SupervisorBuilder::new(agent)
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn active(&self) -> SituationKey {
        self.active
    }

    pub fn switches(&self) -> u64 {
        self.switches
    }

    pub fn last_switch(&self) -> Option<SituationSwitch> {
        self.last_switch
    }

    pub fn subtree(&self, key: SituationKey) -> &Node<W> {
        &self.subtrees[key.index()]
    }

    pub fn subtrees(&self) -> impl Iterator<Item = (SituationKey, &Node<W>)> {
        SituationKey::ALL.into_iter().zip(self.subtrees.iter())
    }

    pub(crate) fn tick(
        &mut self,
        ctx: &TickContext,
        world: &W,
        io: &Collaborators<'_>,
    ) -> NodeState {
        let observed = SituationKey::observe(world);
        if observed != self.active {
            self.switch_to(observed, ctx, io);
        }

        self.subtrees[self.active.index()].tick(ctx, world, io)
    }

    pub(crate) fn cancel(&mut self, ctx: &TickContext, io: &Collaborators<'_>) {
        self.subtrees[self.active.index()].cancel(ctx, io);
    }

    fn switch_to(&mut self, next: SituationKey, ctx: &TickContext, io: &Collaborators<'_>) {
        let previous = self.active;
        self.subtrees[previous.index()].cancel(ctx, io);

        self.active = next;
        self.switches += 1;
        self.last_switch = Some(SituationSwitch {
            from: previous,
            to: next,
            cycle: ctx.cycle,
        });

        tracing::info!(
            robot = %self.id.agent,
            from = %previous,
            to = %next,
            cycle = ctx.cycle,
            "situation changed, switching branch"
        );
    }
}

pub struct SupervisorBuilder<W>
where
    W: GameView + 'static,
{
    agent: RobotId,
    label: Cow<'static, str>,
    subtrees: BTreeMap<SituationKey, Node<W>>,
}

impl<W> SupervisorBuilder<W>
where
    W: GameView + 'static,
{
    pub fn new(agent: RobotId) -> Self {
        Self {
            agent,
            label: Cow::Borrowed("Root Supervisor"),
            subtrees: BTreeMap::new(),
        }
    }

    pub fn label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    /// Bind `subtree` to `key`, replacing any earlier binding.
    pub fn on(mut self, key: SituationKey, subtree: Node<W>) -> Self {
        self.subtrees.insert(key, subtree);
        self
    }

    /// Bind a freshly built subtree to every key not bound yet.
    pub fn on_remaining(mut self, mut make: impl FnMut(SituationKey) -> Node<W>) -> Self {
        for key in SituationKey::ALL {
            self.subtrees.entry(key).or_insert_with(|| make(key));
        }
        self
    }

    /// Fails on the first situation without a subtree, or on a subtree owned by another robot.
    /// The initial active situation is taken from `world`.
    pub fn build(mut self, world: &W) -> Result<RootSupervisor<W>, BuildError> {
        let mut subtrees = Vec::with_capacity(SituationKey::COUNT);
        for key in SituationKey::ALL {
            let subtree = self
                .subtrees
                .remove(&key)
                .ok_or(BuildError::UnmappedSituation {
                    robot: self.agent,
                    key,
                })?;
            subtree.validate(self.agent)?;
            subtrees.push(subtree);
        }

        Ok(RootSupervisor {
            id: NodeId::new(self.agent, self.label),
            subtrees,
            active: SituationKey::observe(world),
            switches: 0,
            last_switch: None,
        })
    }
}
