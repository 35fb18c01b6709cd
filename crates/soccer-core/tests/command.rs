use crossbeam::channel::bounded;
use soccer_core::{
    Channel, ChannelPublisher, Command, CommandAction, CommandPublisher, PublishError,
    RecordingPublisher, RobotId, Route, Vec2, Velocity,
};

#[test]
fn recording_publisher_keeps_publish_order() {
    let publisher = RecordingPublisher::new();
    let ch = Channel::BIASED_ROBOT_COMMAND;

    publisher.publish(&ch, Command::stop(RobotId(1))).unwrap();
    publisher.publish(&ch, Command::kick(RobotId(2), 4.0)).unwrap();
    publisher
        .publish(
            &ch,
            Command::velocity(RobotId(1), Velocity::linear(Vec2::new(1.0, 0.0))),
        )
        .unwrap();

    assert_eq!(publisher.len(), 3);
    assert_eq!(publisher.commands_for(RobotId(1)).len(), 2);
    assert!(publisher.commands()[0].is_stop());
    assert_eq!(
        publisher.commands()[1].action,
        CommandAction::Kick { speed: 4.0 }
    );

    let drained = publisher.take();
    assert_eq!(drained.len(), 3);
    assert!(publisher.is_empty());
}

#[test]
fn channel_publisher_reports_full_and_disconnected() {
    let (tx, rx) = bounded(1);
    let publisher = ChannelPublisher::new(tx);
    let ch = Channel::new("test");

    assert!(publisher.publish(&ch, Command::stop(RobotId(1))).is_ok());
    assert_eq!(
        publisher.publish(&ch, Command::stop(RobotId(1))),
        Err(PublishError::Full(ch.clone()))
    );

    drop(rx);
    assert_eq!(
        publisher.publish(&ch, Command::stop(RobotId(1))),
        Err(PublishError::Disconnected(ch.clone()))
    );
}

#[test]
fn route_next_after_skips_reached_waypoints() {
    let route = Route::new(vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(2.0, 0.0),
    ]);

    assert_eq!(
        route.next_after(Vec2::new(0.0, 0.0), 0.05),
        Some(Vec2::new(1.0, 0.0))
    );
    assert_eq!(
        route.next_after(Vec2::new(1.0, 0.01), 0.05),
        Some(Vec2::new(2.0, 0.0))
    );
    assert_eq!(
        route.next_after(Vec2::new(2.0, 0.0), 0.05),
        Some(Vec2::new(2.0, 0.0))
    );
    assert_eq!(Route::new(Vec::new()).next_after(Vec2::ZERO, 0.05), None);
}

#[test]
fn route_distance_is_measured_to_its_legs() {
    let route = Route::new(vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(2.0, 2.0),
    ]);

    assert_eq!(route.distance_to(Vec2::new(1.0, 0.5)), Some(0.5));
    assert_eq!(route.distance_to(Vec2::new(3.0, 1.0)), Some(1.0));
    assert_eq!(route.distance_to(Vec2::new(-1.0, 0.0)), Some(1.0));
    assert_eq!(Route::new(Vec::new()).distance_to(Vec2::ZERO), None);
}

#[test]
fn rejoined_route_starts_at_position_and_keeps_destination() {
    let route = Route::new(vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(2.0, 2.0),
    ]);

    let on_first_leg = Vec2::new(1.0, 0.1);
    assert_eq!(
        route.rejoined_at(on_first_leg).unwrap().waypoints,
        vec![on_first_leg, Vec2::new(2.0, 0.0), Vec2::new(2.0, 2.0)]
    );

    let on_last_leg = Vec2::new(2.1, 1.0);
    assert_eq!(
        route.rejoined_at(on_last_leg).unwrap().waypoints,
        vec![on_last_leg, Vec2::new(2.0, 2.0)]
    );

    let single = Route::new(vec![Vec2::new(1.0, 1.0)]);
    assert_eq!(
        single.rejoined_at(Vec2::ZERO).unwrap().waypoints,
        vec![Vec2::ZERO, Vec2::new(1.0, 1.0)]
    );
    assert_eq!(Route::new(Vec::new()).rejoined_at(Vec2::ZERO), None);
}
