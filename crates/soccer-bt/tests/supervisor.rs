mod common;

use common::*;
use soccer_bt::{BehaviorTree, BuildError, Collaborators, Node, NodeState, RootSupervisor};
use soccer_core::{
    CommandAction, GameState, RecordingPublisher, RobotId, SituationKey, Velocity,
};

const OFFENSE_MARK: CommandAction = CommandAction::Kick { speed: 1.0 };
const DEFENSE_MARK: CommandAction = CommandAction::Dribble { on: true };

fn fielder_root(j: &Journal, world: &World) -> RootSupervisor<World> {
    RootSupervisor::builder(ROBOT)
        .label("Fielder Root")
        .on(
            SituationKey::Offense,
            Scripted::new("offense", &[NodeState::Running], j)
                .emitting(OFFENSE_MARK)
                .into_node(ROBOT),
        )
        .on(
            SituationKey::Defense,
            Scripted::new("defense", &[NodeState::Running], j)
                .emitting(DEFENSE_MARK)
                .into_node(ROBOT),
        )
        .on(
            SituationKey::Halt,
            Scripted::new("halt", &[NodeState::Running], j)
                .emitting(CommandAction::Velocity(Velocity::ZERO))
                .into_node(ROBOT),
        )
        .on_remaining(|_| running("other", j))
        .build(world)
        .expect("every situation is bound")
}

#[test]
fn unmapped_situation_fails_at_construction() {
    let j = Journal::default();
    let world = snapshot(0, GameState::Halt, false);
    let err = RootSupervisor::builder(ROBOT)
        .on(SituationKey::Offense, running("offense", &j))
        .on(SituationKey::Defense, running("defense", &j))
        .build(&world)
        .err();

    assert_eq!(
        err,
        Some(BuildError::UnmappedSituation {
            robot: ROBOT,
            key: SituationKey::Halt
        })
    );
}

#[test]
fn subtree_owned_by_another_robot_is_rejected() {
    let j = Journal::default();
    let world = snapshot(0, GameState::Halt, false);
    let err = RootSupervisor::builder(ROBOT)
        .on(
            SituationKey::Halt,
            Scripted::new("halt", &[NodeState::Running], &j).into_node(RobotId(9)),
        )
        .on_remaining(|_| running("other", &j))
        .build(&world)
        .err();

    assert!(matches!(
        err,
        Some(BuildError::ForeignNode { tree_owner, node_owner, .. })
            if tree_owner == ROBOT && node_owner == RobotId(9)
    ));
}

#[test]
fn initial_situation_comes_from_the_snapshot() {
    let j = Journal::default();
    let sup = fielder_root(&j, &snapshot(0, GameState::OpenPlay, true));
    assert_eq!(sup.active(), SituationKey::Offense);

    let sup = fielder_root(&j, &snapshot(0, GameState::PreparePenalty, true));
    assert_eq!(sup.active(), SituationKey::PreparePenalty);
}

#[test]
fn possession_flip_cancels_offense_and_runs_defense_in_the_same_tick() {
    let j = Journal::default();
    let offense_world = snapshot(0, GameState::OpenPlay, true);
    let mut tree = BehaviorTree::new(Node::supervisor(fielder_root(&j, &offense_world))).unwrap();
    let publisher = RecordingPublisher::new();
    let io = Collaborators::new(&NoRoute, &publisher);

    assert_eq!(tree.tick(&ctx(0), &offense_world, &io), NodeState::Running);
    assert_eq!(publisher.take().len(), 1);

    let defense_world = snapshot(1, GameState::OpenPlay, false);
    assert_eq!(tree.tick(&ctx(1), &defense_world, &io), NodeState::Running);

    let sup = tree.supervisor().unwrap();
    assert_eq!(sup.active(), SituationKey::Defense);
    assert_eq!(sup.switches(), 1);
    assert_eq!(
        sup.last_switch().map(|s| (s.from, s.to, s.cycle)),
        Some((SituationKey::Offense, SituationKey::Defense, 1))
    );

    let tick_log = publisher.take();
    assert!(tick_log.iter().all(|(_, c)| c.action != OFFENSE_MARK));
    assert_eq!(tick_log.len(), 1);
    assert_eq!(tick_log[0].1.action, DEFENSE_MARK);

    let entries = j.entries();
    let cancel = entries.iter().position(|e| e == "cancel:offense").unwrap();
    let defense = entries.iter().position(|e| e == "tick:defense").unwrap();
    assert!(cancel < defense, "old branch is cancelled before the new one runs");
}

#[test]
fn halt_publishes_exactly_one_stop_per_cycle_whatever_ran_before() {
    for previous in [
        GameState::OpenPlay,
        GameState::Stop,
        GameState::PrepareKickoff,
        GameState::BallPlacement,
    ] {
        let j = Journal::default();
        let start = snapshot(0, previous, true);
        let mut tree = BehaviorTree::new(Node::supervisor(fielder_root(&j, &start))).unwrap();
        let publisher = RecordingPublisher::new();
        let io = Collaborators::new(&NoRoute, &publisher);

        tree.tick(&ctx(0), &start, &io);
        publisher.take();

        for cycle in 1..4 {
            let halt = snapshot(cycle, GameState::Halt, true);
            tree.tick(&ctx(cycle), &halt, &io);
            let log = publisher.take();
            assert_eq!(log.len(), 1, "previous state {previous:?}");
            assert!(log[0].1.is_stop());
        }
    }
}

#[test]
fn unchanged_situation_only_ticks_the_active_subtree() {
    let j = Journal::default();
    let world = snapshot(0, GameState::OpenPlay, false);
    let mut tree = BehaviorTree::new(Node::supervisor(fielder_root(&j, &world))).unwrap();
    let publisher = RecordingPublisher::new();
    let io = Collaborators::new(&NoRoute, &publisher);

    for cycle in 0..3 {
        tree.tick(&ctx(cycle), &world, &io);
    }

    assert_eq!(j.entries(), vec!["tick:defense"; 3]);
    assert_eq!(tree.supervisor().unwrap().switches(), 0);
}

#[test]
fn possession_is_ignored_outside_open_play() {
    let j = Journal::default();
    let world = snapshot(0, GameState::Stop, false);
    let mut tree = BehaviorTree::new(Node::supervisor(fielder_root(&j, &world))).unwrap();
    let publisher = RecordingPublisher::new();
    let io = Collaborators::new(&NoRoute, &publisher);

    tree.tick(&ctx(0), &world, &io);
    tree.tick(&ctx(1), &snapshot(1, GameState::Stop, true), &io);

    assert_eq!(tree.supervisor().unwrap().switches(), 0);
    assert_eq!(j.count("cancel:other"), 0);
}

#[test]
fn supervisor_forwards_the_active_subtree_result() {
    let j = Journal::default();
    let world = snapshot(0, GameState::NormalStart, false);
    let sup = RootSupervisor::builder(ROBOT)
        .on(SituationKey::NormalStart, scripted("kick", &[NodeState::Success], &j))
        .on(SituationKey::Stop, scripted("wait", &[NodeState::Failure], &j))
        .on_remaining(|_| running("other", &j))
        .build(&world)
        .unwrap();
    let mut tree = BehaviorTree::new(Node::supervisor(sup)).unwrap();
    let publisher = RecordingPublisher::new();
    let io = Collaborators::new(&NoRoute, &publisher);

    assert_eq!(tree.tick(&ctx(0), &world, &io), NodeState::Success);
    assert_eq!(
        tree.tick(&ctx(1), &snapshot(1, GameState::Stop, false), &io),
        NodeState::Failure
    );
    assert_eq!(
        tree.tick(&ctx(2), &snapshot(2, GameState::Halt, false), &io),
        NodeState::Running
    );
}

#[test]
fn cancelled_branch_never_publishes_again() {
    let j = Journal::default();
    let start = snapshot(0, GameState::OpenPlay, true);
    let mut tree = BehaviorTree::new(Node::supervisor(fielder_root(&j, &start))).unwrap();
    let publisher = RecordingPublisher::new();
    let io = Collaborators::new(&NoRoute, &publisher);

    tree.tick(&ctx(0), &start, &io);
    publisher.take();

    for cycle in 1..20 {
        let state = if cycle % 2 == 0 {
            GameState::Halt
        } else {
            GameState::Stop
        };
        tree.tick(&ctx(cycle), &snapshot(cycle, state, true), &io);
    }

    assert!(publisher.commands().iter().all(|c| c.action != OFFENSE_MARK));
}
