//! Kinematic stand-in for the vision and robot firmware.

use std::collections::{BTreeMap, VecDeque};

use soccer_core::{Command, CommandAction, GameSnapshot, GameState, RobotId, Vec2, Velocity};
use soccer_nav::Rect;

use crate::config::{MatchConfig, RefereeEvent};

/// Ball speed retained per second while rolling.
const BALL_DECAY_PER_SECOND: f32 = 0.6;
/// A kick only connects within this distance of the ball.
const KICK_REACH: f32 = 0.2;

/// Integrates the last velocity command of each robot and a rolling ball, and replays the
/// referee script. Commanded velocities persist until the next velocity command.
#[derive(Debug, Clone)]
pub struct Simulator {
    cycle: u64,
    game_state: GameState,
    possession: bool,
    ball: Option<Vec2>,
    ball_velocity: Vec2,
    robots: BTreeMap<RobotId, Vec2>,
    velocities: BTreeMap<RobotId, Vec2>,
    referee: VecDeque<RefereeEvent>,
    bounds: Rect,
}

impl Simulator {
    pub fn new(config: &MatchConfig) -> Self {
        let mut sim = Self {
            cycle: 0,
            game_state: GameState::Halt,
            possession: false,
            ball: config.ball,
            ball_velocity: Vec2::ZERO,
            robots: config
                .robots
                .iter()
                .map(|r| (r.robot(), r.start))
                .collect(),
            velocities: BTreeMap::new(),
            referee: config.referee.iter().copied().collect(),
            bounds: config.field.grid().bounds(),
        };
        sim.apply_referee();
        sim
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn game_state(&self) -> GameState {
        self.game_state
    }

    pub fn robot(&self, robot: RobotId) -> Option<Vec2> {
        self.robots.get(&robot).copied()
    }

    pub fn ball(&self) -> Option<Vec2> {
        self.ball
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut snapshot =
            GameSnapshot::new(self.cycle, self.game_state).with_possession(self.possession);
        snapshot.ball = self.ball;
        snapshot.robots = self.robots.clone();
        snapshot
    }

    pub fn apply(&mut self, command: &Command) {
        let Some(position) = self.robot(command.robot) else {
            tracing::warn!(robot = %command.robot, "command for unknown robot");
            return;
        };

        match command.action {
            CommandAction::Velocity(Velocity { x, y, .. }) => {
                self.velocities.insert(command.robot, Vec2::new(x, y));
            }
            CommandAction::Kick { speed } => {
                let Some(ball) = self.ball else { return };
                if position.distance(ball) <= KICK_REACH {
                    self.ball_velocity = (ball - position).normalized() * speed;
                    tracing::debug!(robot = %command.robot, speed, "ball kicked");
                }
            }
            CommandAction::Dribble { .. } => {}
        }
    }

    /// Advance one control period, then apply referee decisions due on the new cycle.
    pub fn step(&mut self, dt: f32) {
        let halted = self.game_state == GameState::Halt;
        for (robot, position) in self.robots.iter_mut() {
            if halted {
                continue;
            }
            let velocity = self.velocities.get(robot).copied().unwrap_or(Vec2::ZERO);
            *position = clamp(*position + velocity * dt, self.bounds);
        }

        if let Some(ball) = self.ball {
            let moved = clamp(ball + self.ball_velocity * dt, self.bounds);
            if moved != ball + self.ball_velocity * dt {
                // Hit the boundary.
                self.ball_velocity = Vec2::ZERO;
            }
            self.ball = Some(moved);
            self.ball_velocity = self.ball_velocity * BALL_DECAY_PER_SECOND.powf(dt);
        }

        self.cycle += 1;
        self.apply_referee();
    }

    fn apply_referee(&mut self) {
        while let Some(event) = self.referee.front().copied() {
            if event.cycle > self.cycle {
                break;
            }
            self.referee.pop_front();

            self.game_state = event.state;
            self.possession = event.possession;
            if let Some(ball) = event.ball {
                self.ball = Some(ball);
                self.ball_velocity = Vec2::ZERO;
            }
            if event.state == GameState::Halt {
                self.velocities.clear();
            }
            tracing::info!(
                cycle = self.cycle,
                state = ?event.state,
                possession = event.possession,
                "referee decision"
            );
        }
    }
}

fn clamp(p: Vec2, bounds: Rect) -> Vec2 {
    Vec2::new(
        p.x.clamp(bounds.min.x, bounds.max.x),
        p.y.clamp(bounds.min.y, bounds.max.y),
    )
}
