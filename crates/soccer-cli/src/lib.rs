//! Match driver: YAML configuration, a kinematic simulator and the control loop.

#![forbid(unsafe_code)]

pub mod config;
pub mod runner;
pub mod sim;

pub use config::{FieldConfig, MatchConfig, RefereeEvent, RobotConfig};
pub use runner::{build_team, CycleSummary, Match};
pub use sim::Simulator;
