#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use soccer_core::{
    Channel, Command, CommandPublisher, GameSnapshot, GameState, Pathfinder, PublishError,
    RobotId, Route, RouteError, TickContext, Vec2,
};

pub type World = GameSnapshot;

pub const ROBOT: RobotId = RobotId(5);

pub fn ctx(cycle: u64) -> TickContext {
    TickContext::new(cycle, 1.0 / 60.0)
}

pub fn world_at(cycle: u64, state: GameState, robot: Vec2) -> World {
    GameSnapshot::new(cycle, state).with_robot(ROBOT, robot)
}

/// Pathfinder that replays queued answers, repeating the last one. With nothing queued it
/// returns the straight segment from start to destination.
#[derive(Default)]
pub struct ScriptedRoutes {
    answers: Mutex<VecDeque<Result<Route, RouteError>>>,
    calls: AtomicUsize,
    cancels: Mutex<Vec<RobotId>>,
}

impl ScriptedRoutes {
    pub fn straight() -> Self {
        Self::default()
    }

    pub fn answering(answers: Vec<Result<Route, RouteError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            ..Self::default()
        }
    }

    pub fn push(&self, answer: Result<Route, RouteError>) {
        self.answers.lock().unwrap().push_back(answer);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn cancels(&self) -> Vec<RobotId> {
        self.cancels.lock().unwrap().clone()
    }
}

impl Pathfinder for ScriptedRoutes {
    fn find_route(&self, _robot: RobotId, from: Vec2, to: Vec2) -> Result<Route, RouteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut answers = self.answers.lock().unwrap();
        if answers.len() > 1 {
            return answers.pop_front().unwrap();
        }
        answers
            .front()
            .cloned()
            .unwrap_or_else(|| Ok(Route::new(vec![from, to])))
    }

    fn cancel(&self, robot: RobotId) {
        self.cancels.lock().unwrap().push(robot);
    }
}

/// Publisher that refuses every command, counting the attempts.
#[derive(Default)]
pub struct RejectingPublisher {
    attempts: AtomicUsize,
}

impl RejectingPublisher {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl CommandPublisher for RejectingPublisher {
    fn publish(&self, channel: &Channel, _command: Command) -> Result<(), PublishError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(PublishError::Rejected {
            channel: channel.clone(),
            reason: "transport down".into(),
        })
    }
}
