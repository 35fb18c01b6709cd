//! Match configuration loading.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use soccer_core::{GameState, RobotId, Vec2};
use soccer_nav::{FieldGrid, Rect};
use soccer_roles::FielderConfig;

/// Whole-match configuration, loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Control loop frequency
    #[serde(default = "default_control_rate")]
    pub control_rate_hz: f32,

    /// Cycles to run when the command line does not say
    #[serde(default = "default_cycles")]
    pub cycles: u64,

    /// Oldest snapshot (in cycles) a tree may act on
    #[serde(default = "default_max_snapshot_age")]
    pub max_snapshot_age: u64,

    #[serde(default)]
    pub field: FieldConfig,

    #[serde(default)]
    pub robots: Vec<RobotConfig>,

    /// Shared fielder tunables; `home` is overridden per robot
    #[serde(default)]
    pub fielder: FielderConfig,

    /// Ball position at kickoff
    #[serde(default)]
    pub ball: Option<Vec2>,

    /// Scripted referee decisions; the match starts in HALT
    #[serde(default)]
    pub referee: Vec<RefereeEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(default = "default_length")]
    pub length: f32,

    #[serde(default = "default_width")]
    pub width: f32,

    #[serde(default = "default_cell_size")]
    pub cell_size: f32,

    /// Areas robots must route around
    #[serde(default)]
    pub obstacles: Vec<Rect>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    pub id: u32,
    pub start: Vec2,

    /// Defaults to `start`
    #[serde(default)]
    pub home: Option<Vec2>,
}

/// Game state change applied at the start of `cycle`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefereeEvent {
    pub cycle: u64,
    pub state: GameState,

    #[serde(default)]
    pub possession: bool,

    /// Ball placed here with the decision
    #[serde(default)]
    pub ball: Option<Vec2>,
}

fn default_control_rate() -> f32 {
    60.0
}
fn default_cycles() -> u64 {
    600
}
fn default_max_snapshot_age() -> u64 {
    3
}
fn default_length() -> f32 {
    9.0
}
fn default_width() -> f32 {
    6.0
}
fn default_cell_size() -> f32 {
    0.1
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            length: default_length(),
            width: default_width(),
            cell_size: default_cell_size(),
            obstacles: Vec::new(),
        }
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            control_rate_hz: default_control_rate(),
            cycles: default_cycles(),
            max_snapshot_age: default_max_snapshot_age(),
            field: FieldConfig::default(),
            robots: Vec::new(),
            fielder: FielderConfig::default(),
            ball: None,
            referee: Vec::new(),
        }
    }
}

impl FieldConfig {
    pub fn grid(&self) -> FieldGrid {
        let mut grid = FieldGrid::new(self.length, self.width, self.cell_size);
        for rect in &self.obstacles {
            grid.block_rect(*rect);
        }
        grid
    }
}

impl RobotConfig {
    pub fn robot(&self) -> RobotId {
        RobotId(self.id)
    }

    pub fn home(&self) -> Vec2 {
        self.home.unwrap_or(self.start)
    }
}

impl MatchConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    /// Parse and validate; referee events come back sorted by cycle.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(content).context("Failed to parse config")?;
        config.referee.sort_by_key(|e| e.cycle);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.control_rate_hz.is_finite() && self.control_rate_hz > 0.0,
            "control_rate_hz must be positive, got {}",
            self.control_rate_hz
        );
        ensure!(
            self.field.length > 0.0 && self.field.width > 0.0 && self.field.cell_size > 0.0,
            "field dimensions must be positive"
        );
        ensure!(!self.robots.is_empty(), "no robots configured");

        let mut seen = BTreeSet::new();
        let grid = self.field.grid();
        for robot in &self.robots {
            ensure!(seen.insert(robot.id), "robot {} is configured twice", robot.id);
            ensure!(
                grid.contains(robot.start),
                "robot {} starts outside the field at ({}, {})",
                robot.id,
                robot.start.x,
                robot.start.y
            );
        }
        Ok(())
    }

    pub fn dt_seconds(&self) -> f32 {
        1.0 / self.control_rate_hz
    }

    /// Fielder settings for one robot.
    pub fn fielder_for(&self, robot: &RobotConfig) -> FielderConfig {
        FielderConfig {
            home: robot.home(),
            max_snapshot_age: self.max_snapshot_age,
            ..self.fielder.clone()
        }
    }
}
