use core::fmt;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{RobotId, TickContext, Vec2};

/// Referee situation as reported by the game controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum GameState {
    OpenPlay,
    Halt,
    Stop,
    PrepareDirectFree,
    PrepareIndirectFree,
    PrepareKickoff,
    PreparePenalty,
    NormalStart,
    ForceStart,
    BallPlacement,
}

/// Which subtree a robot should be running.
///
/// Open play is split on possession; every other referee state maps to its own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SituationKey {
    Offense,
    Defense,
    Halt,
    Stop,
    PrepareDirectFree,
    PrepareIndirectFree,
    PrepareKickoff,
    PreparePenalty,
    NormalStart,
    ForceStart,
    BallPlacement,
}

impl SituationKey {
    pub const COUNT: usize = 11;

    pub const ALL: [SituationKey; Self::COUNT] = [
        SituationKey::Offense,
        SituationKey::Defense,
        SituationKey::Halt,
        SituationKey::Stop,
        SituationKey::PrepareDirectFree,
        SituationKey::PrepareIndirectFree,
        SituationKey::PrepareKickoff,
        SituationKey::PreparePenalty,
        SituationKey::NormalStart,
        SituationKey::ForceStart,
        SituationKey::BallPlacement,
    ];

    /// Possession only matters while the ball is in open play.
    pub fn derive(state: GameState, possession: bool) -> Self {
        match state {
            GameState::OpenPlay if possession => SituationKey::Offense,
            GameState::OpenPlay => SituationKey::Defense,
            GameState::Halt => SituationKey::Halt,
            GameState::Stop => SituationKey::Stop,
            GameState::PrepareDirectFree => SituationKey::PrepareDirectFree,
            GameState::PrepareIndirectFree => SituationKey::PrepareIndirectFree,
            GameState::PrepareKickoff => SituationKey::PrepareKickoff,
            GameState::PreparePenalty => SituationKey::PreparePenalty,
            GameState::NormalStart => SituationKey::NormalStart,
            GameState::ForceStart => SituationKey::ForceStart,
            GameState::BallPlacement => SituationKey::BallPlacement,
        }
    }

    pub fn observe<W: GameView + ?Sized>(world: &W) -> Self {
        Self::derive(world.game_state(), world.possession())
    }

    /// Dense index into [`SituationKey::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SituationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SituationKey::Offense => "offense",
            SituationKey::Defense => "defense",
            SituationKey::Halt => "halt",
            SituationKey::Stop => "stop",
            SituationKey::PrepareDirectFree => "prepare_direct_free",
            SituationKey::PrepareIndirectFree => "prepare_indirect_free",
            SituationKey::PrepareKickoff => "prepare_kickoff",
            SituationKey::PreparePenalty => "prepare_penalty",
            SituationKey::NormalStart => "normal_start",
            SituationKey::ForceStart => "force_start",
            SituationKey::BallPlacement => "ball_placement",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SnapshotError {
    #[error("{0} is not present in the snapshot")]
    UnknownRobot(RobotId),

    #[error("ball is not visible")]
    BallNotVisible,

    #[error("snapshot from cycle {snapshot_cycle} is stale at cycle {current_cycle}")]
    Stale {
        snapshot_cycle: u64,
        current_cycle: u64,
    },
}

/// Read-only view of the shared game state for one control cycle.
///
/// Implementations must be immutable for the duration of a cycle; the control loop hands the
/// same view to every robot's tree.
pub trait GameView {
    /// Control cycle this view was captured on.
    fn cycle(&self) -> u64;

    fn game_state(&self) -> GameState;

    /// Whether our team holds the ball.
    fn possession(&self) -> bool;

    fn robot_position(&self, robot: RobotId) -> Result<Vec2, SnapshotError>;

    fn ball_position(&self) -> Result<Vec2, SnapshotError>;

    fn ensure_fresh(&self, ctx: &TickContext, max_age_cycles: u64) -> Result<(), SnapshotError> {
        let snapshot_cycle = self.cycle();
        if ctx.cycle.saturating_sub(snapshot_cycle) > max_age_cycles {
            return Err(SnapshotError::Stale {
                snapshot_cycle,
                current_cycle: ctx.cycle,
            });
        }
        Ok(())
    }
}
