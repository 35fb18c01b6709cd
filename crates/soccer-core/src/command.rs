use std::borrow::Cow;
use std::fmt;

use crossbeam::channel::{Sender, TrySendError};
use parking_lot::Mutex;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{RobotId, Vec2};

/// Named outbound message channel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Channel(pub Cow<'static, str>);

impl Channel {
    /// Robot commands that still go through the motion-bias filter before reaching the robot.
    pub const BIASED_ROBOT_COMMAND: Channel = Channel(Cow::Borrowed("ai.biased_robot_command"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Global-frame velocity target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    pub angular: f32,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity {
        x: 0.0,
        y: 0.0,
        angular: 0.0,
    };

    pub fn linear(v: Vec2) -> Self {
        Self {
            x: v.x,
            y: v.y,
            angular: 0.0,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Velocity::ZERO
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CommandAction {
    Velocity(Velocity),
    Kick { speed: f32 },
    Dribble { on: bool },
}

/// Outbound action for a single robot. Built once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Command {
    pub robot: RobotId,
    pub action: CommandAction,
}

impl Command {
    pub fn velocity(robot: RobotId, velocity: Velocity) -> Self {
        Self {
            robot,
            action: CommandAction::Velocity(velocity),
        }
    }

    pub fn stop(robot: RobotId) -> Self {
        Self::velocity(robot, Velocity::ZERO)
    }

    pub fn kick(robot: RobotId, speed: f32) -> Self {
        Self {
            robot,
            action: CommandAction::Kick { speed },
        }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self.action, CommandAction::Velocity(v) if v.is_zero())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("channel {0} has no receiver")]
    Disconnected(Channel),

    #[error("channel {0} is full")]
    Full(Channel),

    #[error("command rejected on {channel}: {reason}")]
    Rejected { channel: Channel, reason: String },
}

/// Fire-and-forget sink for commands.
///
/// `publish` must not block; an `Err` only reports that the command was not accepted locally.
pub trait CommandPublisher: Send + Sync {
    fn publish(&self, channel: &Channel, command: Command) -> Result<(), PublishError>;
}

impl<P: CommandPublisher + ?Sized> CommandPublisher for &P {
    fn publish(&self, channel: &Channel, command: Command) -> Result<(), PublishError> {
        (**self).publish(channel, command)
    }
}

/// Keeps every published command in memory, in publish order.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    log: Mutex<Vec<(Channel, Command)>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.log.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.lock().is_empty()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.log.lock().iter().map(|(_, c)| *c).collect()
    }

    pub fn commands_for(&self, robot: RobotId) -> Vec<Command> {
        self.log
            .lock()
            .iter()
            .filter(|(_, c)| c.robot == robot)
            .map(|(_, c)| *c)
            .collect()
    }

    /// Drain the log, e.g. at the end of a control cycle.
    pub fn take(&self) -> Vec<(Channel, Command)> {
        std::mem::take(&mut *self.log.lock())
    }
}

impl CommandPublisher for RecordingPublisher {
    fn publish(&self, channel: &Channel, command: Command) -> Result<(), PublishError> {
        self.log.lock().push((channel.clone(), command));
        Ok(())
    }
}

/// Forwards commands into a bounded crossbeam channel without blocking.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    tx: Sender<(Channel, Command)>,
}

impl ChannelPublisher {
    pub fn new(tx: Sender<(Channel, Command)>) -> Self {
        Self { tx }
    }
}

impl CommandPublisher for ChannelPublisher {
    fn publish(&self, channel: &Channel, command: Command) -> Result<(), PublishError> {
        self.tx
            .try_send((channel.clone(), command))
            .map_err(|err| match err {
                TrySendError::Full(_) => PublishError::Full(channel.clone()),
                TrySendError::Disconnected(_) => PublishError::Disconnected(channel.clone()),
            })
    }
}
