use std::time::Duration;

use birthday_hunt_core::prelude::*;
use tokio::sync::mpsc;

const STAGE_ZERO: Coordinate = Coordinate::new(55.0005, -7.2698);

fn six_stage_hunt() -> HuntConfig {
    let stages = (0..6)
        .map(|i| {
            let target = Coordinate::new(STAGE_ZERO.latitude + i as f64 * 0.001, STAGE_ZERO.longitude);
            Stage::new(i + 1, format!("Spot #{}", i + 1), "clue", format!("unlock {}", i + 1), target)
        })
        .collect();
    HuntConfig::new(stages).unwrap()
}

fn drain(stream: &mut NotificationStream) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(notification) = stream.try_recv() {
        out.push(notification);
    }
    out
}

fn unlocked_count(events: &[Notification]) -> usize {
    events
        .iter()
        .filter(|n| matches!(n, Notification::Unlocked { .. }))
        .count()
}

#[test]
fn test_unlock_fires_once_while_standing_on_target() {
    let (mut session, mut notifications) =
        HuntSession::new(six_stage_hunt(), Box::new(MemoryProgressStore::default()));
    session.apply(Command::Start);
    drain(&mut notifications);

    for _ in 0..4 {
        session.handle_position(PositionEvent::Fix(Position::new(55.0005, -7.2698)));
    }

    let events = drain(&mut notifications);
    assert_eq!(unlocked_count(&events), 1);
    assert_eq!(
        events[0],
        Notification::Unlocked {
            stage: StageId(1),
            title: "Spot #1".into(),
            message: "unlock 1".into(),
        }
    );

    let view = session.view();
    assert_eq!(view.distance_m, Some(0));
    assert!(view.found);
}

#[test]
fn test_six_advances_complete_the_hunt() {
    let config = six_stage_hunt();
    let targets: Vec<Coordinate> = config.stages.iter().map(|s| s.target).collect();
    let (mut session, mut notifications) =
        HuntSession::new(config, Box::new(MemoryProgressStore::default()));
    session.apply(Command::Start);

    for (index, target) in targets.iter().enumerate() {
        // advancing before the stage is found changes nothing
        session.apply(Command::Advance);
        assert_eq!(session.view().stage_index, index);

        session.handle_position(PositionEvent::Fix((*target).into()));
        assert!(session.view().found);

        session.apply(Command::Advance);
        assert!(!session.view().found);
        assert_eq!(session.view().stage_index, index + 1);
    }

    assert_eq!(session.hunt().status(), HuntStatus::Completed);
    let events = drain(&mut notifications);
    assert_eq!(unlocked_count(&events), 6);
    assert!(events.iter().any(|n| matches!(n, Notification::Completed { .. })));

    session.handle_position(PositionEvent::Fix(STAGE_ZERO.into()));
    assert!(drain(&mut notifications).is_empty());
}

#[test]
fn test_jump_resets_found_and_follow() {
    let (mut session, _notifications) =
        HuntSession::new(six_stage_hunt(), Box::new(MemoryProgressStore::default()));
    session.apply(Command::Start);
    session.handle_position(PositionEvent::Fix(STAGE_ZERO.into()));
    session.apply(Command::ManualPan);
    assert!(session.view().found);

    session.apply(Command::JumpTo(3));

    let view = session.view();
    assert_eq!(view.stage_index, 3);
    assert!(!view.found);
    assert!(view.follow);
}

#[test]
fn test_progress_survives_restart_and_reset_round_trips() {
    let path = std::env::temp_dir().join(format!("birthday-hunt-{}.sqlite", std::process::id()));
    let _ = std::fs::remove_file(&path);

    {
        let store = SqliteProgressStore::open(&path).unwrap();
        let (mut session, _notifications) = HuntSession::new(six_stage_hunt(), Box::new(store));
        session.apply(Command::Start);
        session.handle_position(PositionEvent::Fix(STAGE_ZERO.into()));
        session.apply(Command::Advance);
    }

    {
        let store = SqliteProgressStore::open(&path).unwrap();
        let (mut session, _notifications) = HuntSession::new(six_stage_hunt(), Box::new(store));
        assert_eq!(
            session.hunt().progress(),
            HuntProgress {
                started: true,
                current_stage_index: 1
            }
        );

        session.apply(Command::Reset);
        assert_eq!(session.hunt().progress(), HuntProgress::default());
    }

    let store = SqliteProgressStore::open(&path).unwrap();
    assert_eq!(store.load().unwrap(), Some(HuntProgress::default()));

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_run_loop_subscribes_only_while_in_play() {
    let (mut source, feed) = ChannelPositionSource::new();
    let (commands, mut command_rx) = mpsc::unbounded_channel();
    let (mut session, mut notifications) =
        HuntSession::new(six_stage_hunt(), Box::new(MemoryProgressStore::default()));

    let runner = tokio::spawn(async move {
        session.run(&mut source, &mut command_rx).await;
        session
    });

    // initial view, not started, nothing subscribed yet
    assert!(matches!(notifications.recv().await, Some(Notification::ViewChanged(_))));
    assert!(!feed.is_subscribed());

    commands.send(Command::Start).unwrap();
    assert!(matches!(notifications.recv().await, Some(Notification::ViewChanged(view)) if view.locating));
    tokio::task::yield_now().await;
    assert!(feed.is_subscribed());

    feed.push(Position::new(55.0005, -7.2698));
    assert!(matches!(
        notifications.recv().await,
        Some(Notification::Unlocked { stage: StageId(1), .. })
    ));
    assert!(matches!(notifications.recv().await, Some(Notification::ViewChanged(view)) if view.found));

    commands.send(Command::JumpTo(6)).unwrap();
    assert!(matches!(notifications.recv().await, Some(Notification::ViewChanged(view)) if view.is_completed()));
    tokio::task::yield_now().await;
    assert!(!feed.is_subscribed());

    drop(commands);
    let session = tokio::time::timeout(Duration::from_secs(5), runner)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.hunt().status(), HuntStatus::Completed);
}

#[tokio::test]
async fn test_run_loop_surfaces_unavailable_source_once() {
    let (mut source, feed) = ChannelPositionSource::new();
    feed.fail(SourceError::PermissionDenied);

    let (commands, mut command_rx) = mpsc::unbounded_channel();
    let (mut session, mut notifications) =
        HuntSession::new(six_stage_hunt(), Box::new(MemoryProgressStore::default()));
    commands.send(Command::Start).unwrap();

    let runner = tokio::spawn(async move {
        session.run(&mut source, &mut command_rx).await;
        session
    });

    let mut unavailable = 0;
    loop {
        match notifications.recv().await {
            Some(Notification::PositionUnavailable(error)) => {
                assert_eq!(error, SourceError::PermissionDenied);
                unavailable += 1;
            }
            Some(Notification::ViewChanged(view)) if view.position_unavailable => break,
            Some(_) => {}
            None => panic!("session stopped early"),
        }
    }

    drop(commands);
    let session = runner.await.unwrap();
    assert_eq!(unavailable, 1);
    assert!(session.view().locating);
    assert!(drain(&mut notifications).is_empty());
}

#[tokio::test]
async fn test_start_resubscribes_after_location_restored() {
    let (mut source, feed) = ChannelPositionSource::new();
    feed.fail(SourceError::PermissionDenied);

    let (commands, mut command_rx) = mpsc::unbounded_channel();
    let (mut session, mut notifications) =
        HuntSession::new(six_stage_hunt(), Box::new(MemoryProgressStore::default()));
    commands.send(Command::Start).unwrap();

    let runner = tokio::spawn(async move {
        session.run(&mut source, &mut command_rx).await;
        session
    });

    loop {
        match notifications.recv().await {
            Some(Notification::ViewChanged(view)) if view.position_unavailable => break,
            Some(_) => {}
            None => panic!("session stopped early"),
        }
    }

    feed.clear_failure();
    commands.send(Command::Start).unwrap();
    while !feed.is_subscribed() {
        tokio::task::yield_now().await;
    }
    assert!(feed.push(STAGE_ZERO.into()));

    loop {
        match notifications.recv().await {
            Some(Notification::Unlocked { stage, .. }) => {
                assert_eq!(stage, StageId(1));
                break;
            }
            Some(_) => {}
            None => panic!("session stopped early"),
        }
    }

    drop(commands);
    let session = runner.await.unwrap();
    assert!(!session.view().position_unavailable);
    assert!(session.view().found);
}

#[tokio::test]
async fn test_replayed_trace_finds_first_stage() {
    let trace = vec![
        Position::new(55.0015, -7.2698),
        Position::new(55.0010, -7.2698),
        Position::new(55.0006, -7.2698),
        Position::new(55.0005, -7.2698),
    ];
    let mut source = ReplayPositionSource::new(trace, Duration::ZERO);
    let mut exhausted = source.exhausted();

    let (commands, mut command_rx) = mpsc::unbounded_channel();
    let (mut session, mut notifications) =
        HuntSession::new(six_stage_hunt(), Box::new(MemoryProgressStore::default()));
    commands.send(Command::Start).unwrap();

    let runner = tokio::spawn(async move {
        session.run(&mut source, &mut command_rx).await;
        session
    });

    exhausted.wait_for(|done| *done).await.unwrap();
    drop(commands);
    let session = runner.await.unwrap();

    let events = drain(&mut notifications);
    assert_eq!(unlocked_count(&events), 1);
    // 111 m, 55 m, 11 m, then on the spot
    let distances: Vec<u32> = events
        .iter()
        .filter_map(|n| match n {
            Notification::ViewChanged(view) => view.distance_m,
            _ => None,
        })
        .collect();
    assert_eq!(distances.len(), 4);
    assert_eq!(distances.last(), Some(&0));
    assert!(distances.windows(2).all(|w| w[0] >= w[1]));
    assert!(session.view().found);
}
