use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use soccer_bt::{BehaviorTree, BuildError, Node, RootSupervisor};
use soccer_core::{GameView, RobotId, SituationKey, Vec2};

use crate::predicates;
use crate::target::{defend_point, outside_circle, Target};
use crate::tasks::{Hold, Kick, MoveToPosition};

/// Tunables for a field player. Distances in meters, speeds in m/s.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FielderConfig {
    pub home: Vec2,
    pub own_goal: Vec2,
    pub max_speed: f32,
    /// Speed limit while the game is stopped.
    pub stop_speed: f32,
    pub tolerance: f32,
    pub kick_radius: f32,
    pub kick_speed: f32,
    /// How far in front of the ball the defender stands, towards our goal.
    pub defend_distance: f32,
    /// Keep-out radius around the ball during STOP.
    pub stop_clearance: f32,
    pub max_snapshot_age: u64,
    /// Per-situation positions for set pieces; situations without an entry use `home`.
    pub formation: BTreeMap<SituationKey, Vec2>,
}

impl Default for FielderConfig {
    fn default() -> Self {
        Self {
            home: Vec2::new(-1.0, 0.0),
            own_goal: Vec2::new(-4.5, 0.0),
            max_speed: 2.0,
            stop_speed: 1.2,
            tolerance: 0.05,
            kick_radius: 0.15,
            kick_speed: 4.0,
            defend_distance: 1.0,
            stop_clearance: 0.5,
            max_snapshot_age: 3,
            formation: BTreeMap::new(),
        }
    }
}

impl FielderConfig {
    pub fn formation_point(&self, key: SituationKey) -> Vec2 {
        self.formation.get(&key).copied().unwrap_or(self.home)
    }
}

/// Builds the situation-supervised tree of a field player.
pub struct FielderTree;

impl FielderTree {
    pub fn build<W>(
        robot: RobotId,
        world: &W,
        config: &FielderConfig,
    ) -> Result<BehaviorTree<W>, BuildError>
    where
        W: GameView + 'static,
    {
        let supervisor = RootSupervisor::builder(robot)
            .label("Fielder")
            .on_remaining(|key| Self::subtree(robot, key, config))
            .build(world)?;
        BehaviorTree::new(Node::supervisor(supervisor))
    }

    /// The subtree bound to `key`.
    pub fn subtree<W>(robot: RobotId, key: SituationKey, config: &FielderConfig) -> Node<W>
    where
        W: GameView + 'static,
    {
        match key {
            SituationKey::Offense => attack(robot, "offense", config),
            SituationKey::NormalStart => attack(robot, "normal start", config),
            SituationKey::ForceStart => attack(robot, "force start", config),
            SituationKey::Defense => defend(robot, config),
            SituationKey::Halt => Node::task(robot, "halt", Hold::new()),
            SituationKey::Stop => stop(robot, config),
            SituationKey::PrepareDirectFree => {
                take_position(robot, "prepare direct free", key, config)
            }
            SituationKey::PrepareIndirectFree => {
                take_position(robot, "prepare indirect free", key, config)
            }
            SituationKey::PrepareKickoff => take_position(robot, "prepare kickoff", key, config),
            SituationKey::PreparePenalty => take_position(robot, "prepare penalty", key, config),
            SituationKey::BallPlacement => take_position(robot, "ball placement", key, config),
        }
    }
}

fn move_to<W>(target: Target<W>, max_speed: f32, config: &FielderConfig) -> MoveToPosition<W> {
    MoveToPosition::new(target, max_speed).with_tolerance(config.tolerance)
}

fn attack<W>(robot: RobotId, label: &'static str, config: &FielderConfig) -> Node<W>
where
    W: GameView + 'static,
{
    let chase = Target::dynamic(|_ctx, _agent, world: &W| world.ball_position());
    Node::reactive_sequence(
        robot,
        label,
        vec![
            Node::condition(
                robot,
                "snapshot fresh?",
                predicates::fresh(config.max_snapshot_age),
            ),
            Node::reactive_selector(
                robot,
                "attack",
                vec![
                    Node::sequence(
                        robot,
                        "shoot",
                        vec![
                            Node::condition(
                                robot,
                                "near ball?",
                                predicates::near_ball(config.kick_radius),
                            ),
                            Node::task(robot, "kick", Kick::new(config.kick_speed)),
                        ],
                    ),
                    Node::task(robot, "chase ball", move_to(chase, config.max_speed, config)),
                ],
            ),
        ],
    )
}

fn defend<W>(robot: RobotId, config: &FielderConfig) -> Node<W>
where
    W: GameView + 'static,
{
    let own_goal = config.own_goal;
    let distance = config.defend_distance;
    let cover = Target::dynamic(move |_ctx, _agent, world: &W| {
        Ok(defend_point(world.ball_position()?, own_goal, distance))
    });
    Node::reactive_sequence(
        robot,
        "defense",
        vec![
            Node::condition(
                robot,
                "snapshot fresh?",
                predicates::fresh(config.max_snapshot_age),
            ),
            Node::task(robot, "cover goal", move_to(cover, config.max_speed, config)),
        ],
    )
}

fn stop<W>(robot: RobotId, config: &FielderConfig) -> Node<W>
where
    W: GameView + 'static,
{
    let home = config.home;
    let clearance = config.stop_clearance;
    let clear = move || {
        Target::dynamic(move |_ctx, _agent, world: &W| {
            Ok(match world.ball_position() {
                Ok(ball) => outside_circle(home, ball, clearance),
                Err(_) => home,
            })
        })
    };
    settle(robot, "stop", "clear ball", clear, config.stop_speed, config)
}

fn take_position<W>(
    robot: RobotId,
    label: &'static str,
    key: SituationKey,
    config: &FielderConfig,
) -> Node<W>
where
    W: GameView + 'static,
{
    let spot = config.formation_point(key);
    settle(
        robot,
        label,
        "take position",
        move || Target::Fixed(spot),
        config.max_speed,
        config,
    )
}

/// Hold once within tolerance of the target, otherwise move there. The arrival check runs
/// first so the robot gets a single command per tick.
fn settle<W>(
    robot: RobotId,
    label: &'static str,
    move_label: &'static str,
    target: impl Fn() -> Target<W>,
    speed: f32,
    config: &FielderConfig,
) -> Node<W>
where
    W: GameView + 'static,
{
    Node::reactive_selector(
        robot,
        label,
        vec![
            Node::reactive_sequence(
                robot,
                "in place",
                vec![
                    Node::condition(
                        robot,
                        "arrived?",
                        predicates::at_target(target(), config.tolerance),
                    ),
                    Node::task(robot, "hold", Hold::new()),
                ],
            ),
            Node::task(robot, move_label, move_to(target(), speed, config)),
        ],
    )
}
