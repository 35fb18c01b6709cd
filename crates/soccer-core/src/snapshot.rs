use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{GameState, GameView, RobotId, SnapshotError, Vec2};

/// Immutable game-state snapshot produced once per control cycle by the ingestion pipeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GameSnapshot {
    pub cycle: u64,
    pub game_state: GameState,
    pub possession: bool,
    pub ball: Option<Vec2>,
    pub robots: BTreeMap<RobotId, Vec2>,
}

impl GameSnapshot {
    pub fn new(cycle: u64, game_state: GameState) -> Self {
        Self {
            cycle,
            game_state,
            possession: false,
            ball: None,
            robots: BTreeMap::new(),
        }
    }

    pub fn with_possession(mut self, possession: bool) -> Self {
        self.possession = possession;
        self
    }

    pub fn with_ball(mut self, ball: Vec2) -> Self {
        self.ball = Some(ball);
        self
    }

    pub fn with_robot(mut self, robot: RobotId, position: Vec2) -> Self {
        self.robots.insert(robot, position);
        self
    }
}

impl GameView for GameSnapshot {
    fn cycle(&self) -> u64 {
        self.cycle
    }

    fn game_state(&self) -> GameState {
        self.game_state
    }

    fn possession(&self) -> bool {
        self.possession
    }

    fn robot_position(&self, robot: RobotId) -> Result<Vec2, SnapshotError> {
        self.robots
            .get(&robot)
            .copied()
            .ok_or(SnapshotError::UnknownRobot(robot))
    }

    fn ball_position(&self) -> Result<Vec2, SnapshotError> {
        self.ball.ok_or(SnapshotError::BallNotVisible)
    }
}

impl<T: GameView + ?Sized> GameView for Arc<T> {
    fn cycle(&self) -> u64 {
        (**self).cycle()
    }

    fn game_state(&self) -> GameState {
        (**self).game_state()
    }

    fn possession(&self) -> bool {
        (**self).possession()
    }

    fn robot_position(&self, robot: RobotId) -> Result<Vec2, SnapshotError> {
        (**self).robot_position(robot)
    }

    fn ball_position(&self) -> Result<Vec2, SnapshotError> {
        (**self).ball_position()
    }
}

/// Single-writer, many-reader slot holding the latest snapshot.
///
/// `publish` replaces the whole `Arc`, so a reader holding the result of `load` keeps a
/// consistent snapshot for the rest of its cycle no matter how often the writer publishes.
#[derive(Debug)]
pub struct SnapshotCell {
    current: RwLock<Arc<GameSnapshot>>,
}

impl SnapshotCell {
    pub fn new(initial: GameSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    pub fn publish(&self, snapshot: GameSnapshot) {
        let next = Arc::new(snapshot);
        *self.current.write() = next;
    }

    pub fn load(&self) -> Arc<GameSnapshot> {
        Arc::clone(&self.current.read())
    }
}
