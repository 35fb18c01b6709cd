#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use soccer_bt::{Collaborators, Node, NodeState, Task};
use soccer_core::{
    Channel, Command, CommandAction, GameSnapshot, GameState, Pathfinder, RobotId, Route,
    RouteError, TickContext, Vec2,
};

pub type World = GameSnapshot;

pub const ROBOT: RobotId = RobotId(1);

pub fn ctx(cycle: u64) -> TickContext {
    TickContext::new(cycle, 1.0 / 60.0)
}

pub fn snapshot(cycle: u64, state: GameState, possession: bool) -> World {
    GameSnapshot::new(cycle, state)
        .with_possession(possession)
        .with_robot(ROBOT, Vec2::ZERO)
}

/// Pathfinder for trees that never ask for a route.
pub struct NoRoute;

impl Pathfinder for NoRoute {
    fn find_route(&self, _robot: RobotId, from: Vec2, to: Vec2) -> Result<Route, RouteError> {
        Err(RouteError::Unreachable { from, to })
    }
}

/// Shared, ordered log of what scripted tasks did.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == entry).count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// Replays a fixed list of results. The last entry repeats forever; a terminal result or a
/// cancel restarts the script.
pub struct Scripted {
    name: &'static str,
    script: Vec<NodeState>,
    step: usize,
    journal: Journal,
    emit: Option<CommandAction>,
}

impl Scripted {
    pub fn new(name: &'static str, script: &[NodeState], journal: &Journal) -> Self {
        Self {
            name,
            script: script.to_vec(),
            step: 0,
            journal: journal.clone(),
            emit: None,
        }
    }

    pub fn emitting(mut self, action: CommandAction) -> Self {
        self.emit = Some(action);
        self
    }

    pub fn into_node(self, agent: RobotId) -> Node<World> {
        let name = self.name;
        Node::task(agent, name, self)
    }
}

impl Task<World> for Scripted {
    fn tick(
        &mut self,
        _ctx: &TickContext,
        agent: RobotId,
        _world: &World,
        io: &Collaborators<'_>,
    ) -> NodeState {
        let state = self
            .script
            .get(self.step)
            .or(self.script.last())
            .copied()
            .unwrap_or(NodeState::Success);
        self.journal.push(format!("tick:{}", self.name));

        if let Some(action) = self.emit {
            let _ = io
                .publisher
                .publish(&Channel::BIASED_ROBOT_COMMAND, Command { robot: agent, action });
        }

        if state.is_terminal() {
            self.step = 0;
        } else {
            self.step += 1;
        }
        state
    }

    fn cancel(&mut self, _ctx: &TickContext, _agent: RobotId, _io: &Collaborators<'_>) {
        self.journal.push(format!("cancel:{}", self.name));
        self.step = 0;
    }
}

pub fn scripted(name: &'static str, script: &[NodeState], journal: &Journal) -> Node<World> {
    Scripted::new(name, script, journal).into_node(ROBOT)
}

pub fn running(name: &'static str, journal: &Journal) -> Node<World> {
    scripted(name, &[NodeState::Running], journal)
}

pub fn succeed(name: &'static str, journal: &Journal) -> Node<World> {
    scripted(name, &[NodeState::Success], journal)
}

pub fn fail(name: &'static str, journal: &Journal) -> Node<World> {
    scripted(name, &[NodeState::Failure], journal)
}
