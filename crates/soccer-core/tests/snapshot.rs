use std::sync::Arc;
use std::thread;

use soccer_core::{
    GameSnapshot, GameState, GameView, RobotId, SituationKey, SnapshotCell, SnapshotError,
    TickContext, Vec2,
};

#[test]
fn situation_key_splits_open_play_on_possession_only() {
    assert_eq!(
        SituationKey::derive(GameState::OpenPlay, true),
        SituationKey::Offense
    );
    assert_eq!(
        SituationKey::derive(GameState::OpenPlay, false),
        SituationKey::Defense
    );
    assert_eq!(
        SituationKey::derive(GameState::Halt, true),
        SituationKey::derive(GameState::Halt, false)
    );
}

#[test]
fn situation_key_index_matches_all_order() {
    for (i, key) in SituationKey::ALL.iter().enumerate() {
        assert_eq!(key.index(), i);
    }
}

#[test]
fn snapshot_reports_missing_robot_and_ball() {
    let snap = GameSnapshot::new(3, GameState::Stop).with_robot(RobotId(1), Vec2::new(1.0, 2.0));

    assert_eq!(snap.robot_position(RobotId(1)), Ok(Vec2::new(1.0, 2.0)));
    assert_eq!(
        snap.robot_position(RobotId(2)),
        Err(SnapshotError::UnknownRobot(RobotId(2)))
    );
    assert_eq!(snap.ball_position(), Err(SnapshotError::BallNotVisible));
}

#[test]
fn ensure_fresh_flags_old_snapshots() {
    let snap = GameSnapshot::new(10, GameState::OpenPlay);

    assert!(snap.ensure_fresh(&TickContext::new(12, 0.016), 2).is_ok());
    assert_eq!(
        snap.ensure_fresh(&TickContext::new(13, 0.016), 2),
        Err(SnapshotError::Stale {
            snapshot_cycle: 10,
            current_cycle: 13
        })
    );
}

#[test]
fn loaded_snapshot_is_unaffected_by_later_publish() {
    let cell = SnapshotCell::new(GameSnapshot::new(0, GameState::Halt));
    let held = cell.load();

    cell.publish(GameSnapshot::new(1, GameState::OpenPlay).with_possession(true));

    assert_eq!(held.game_state(), GameState::Halt);
    assert_eq!(cell.load().game_state(), GameState::OpenPlay);
    assert_eq!(SituationKey::observe(&cell.load()), SituationKey::Offense);
}

#[test]
fn readers_never_observe_a_mixed_snapshot() {
    let cell = Arc::new(SnapshotCell::new(GameSnapshot::new(0, GameState::Halt)));

    let writer = {
        let cell = Arc::clone(&cell);
        thread::spawn(move || {
            for cycle in 1..500u64 {
                // Cycle parity and robot position always agree inside one snapshot.
                let x = (cycle % 2) as f32;
                cell.publish(
                    GameSnapshot::new(cycle, GameState::OpenPlay)
                        .with_robot(RobotId(1), Vec2::new(x, 0.0)),
                );
            }
        })
    };

    for _ in 0..500 {
        let snap = cell.load();
        if let Ok(pos) = snap.robot_position(RobotId(1)) {
            assert_eq!(pos.x, (snap.cycle() % 2) as f32);
        }
    }

    writer.join().unwrap();
}
