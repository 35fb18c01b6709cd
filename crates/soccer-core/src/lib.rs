//! Shared game-state, geometry and collaborator contracts for robot soccer behavior trees.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod command;
pub mod math;
pub mod route;
pub mod snapshot;
pub mod tick;
pub mod world;

pub use agent::RobotId;
pub use command::{
    Channel, ChannelPublisher, Command, CommandAction, CommandPublisher, PublishError,
    RecordingPublisher, Velocity,
};
pub use math::Vec2;
pub use route::{Pathfinder, Route, RouteError};
pub use snapshot::{GameSnapshot, SnapshotCell};
pub use tick::TickContext;
pub use world::{GameState, GameView, SituationKey, SnapshotError};
