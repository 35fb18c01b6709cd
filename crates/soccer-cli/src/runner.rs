//! One match: snapshot publication, team ticking and command delivery.

use anyhow::{Context, Result};
use crossbeam::channel::{bounded, Receiver};

use soccer_bt::{BuildError, Collaborators, NodeState, Team};
use soccer_core::{
    Channel, ChannelPublisher, Command, GameSnapshot, GameView, Pathfinder, RobotId,
    SituationKey, SnapshotCell, TickContext,
};
use soccer_nav::{FieldGrid, RouteService};
use soccer_roles::FielderTree;

use crate::config::MatchConfig;
use crate::sim::Simulator;

/// Build one fielder tree per configured robot against `world`.
pub fn build_team(
    config: &MatchConfig,
    world: &GameSnapshot,
) -> Result<Team<GameSnapshot>, BuildError> {
    let trees = config
        .robots
        .iter()
        .map(|robot| FielderTree::build(robot.robot(), world, &config.fielder_for(robot)))
        .collect::<Result<Vec<_>, _>>()?;
    Team::new(trees)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleSummary {
    pub cycle: u64,
    pub situation: SituationKey,
    pub results: Vec<(RobotId, NodeState)>,
    pub commands: usize,
}

pub struct Match<P> {
    sim: Simulator,
    cell: SnapshotCell,
    team: Team<GameSnapshot>,
    pathfinder: P,
    publisher: ChannelPublisher,
    commands: Receiver<(Channel, Command)>,
    dt: f32,
    max_snapshot_age: u64,
}

impl Match<RouteService<FieldGrid>> {
    /// Routes are searched on a background worker.
    pub fn spawn(config: &MatchConfig) -> Result<Self> {
        let routes =
            RouteService::spawn(config.field.grid()).context("Failed to start route worker")?;
        Self::with_pathfinder(config, routes)
    }
}

impl<P: Pathfinder> Match<P> {
    pub fn with_pathfinder(config: &MatchConfig, pathfinder: P) -> Result<Self> {
        let sim = Simulator::new(config);
        let snapshot = sim.snapshot();
        let team = build_team(config, &snapshot).context("Failed to build robot trees")?;

        // Room for a few commands per robot per cycle.
        let (tx, rx) = bounded(config.robots.len().max(1) * 8);

        Ok(Self {
            cell: SnapshotCell::new(snapshot),
            sim,
            team,
            pathfinder,
            publisher: ChannelPublisher::new(tx),
            commands: rx,
            dt: config.dt_seconds(),
            max_snapshot_age: config.max_snapshot_age,
        })
    }

    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }

    pub fn team(&self) -> &Team<GameSnapshot> {
        &self.team
    }

    /// Tick every tree once against the latest snapshot, deliver their commands to the
    /// simulator and publish the next snapshot.
    pub fn step(&mut self, parallel: bool) -> CycleSummary {
        let snapshot = self.cell.load();
        let ctx = TickContext::new(self.sim.cycle(), self.dt);
        if let Err(err) = snapshot.ensure_fresh(&ctx, self.max_snapshot_age) {
            tracing::warn!(cycle = ctx.cycle, error = %err, "acting on stale snapshot");
        }

        let io = Collaborators::new(&self.pathfinder, &self.publisher);
        let results = if parallel {
            self.team.tick_parallel(&ctx, &*snapshot, &io)
        } else {
            self.team.tick(&ctx, &*snapshot, &io)
        };

        let mut commands = 0;
        for (_, command) in self.commands.try_iter() {
            self.sim.apply(&command);
            commands += 1;
        }

        self.sim.step(self.dt);
        self.cell.publish(self.sim.snapshot());

        CycleSummary {
            cycle: ctx.cycle,
            situation: SituationKey::observe(&*snapshot),
            results,
            commands,
        }
    }
}
