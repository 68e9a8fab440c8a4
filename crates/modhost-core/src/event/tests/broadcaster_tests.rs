#![cfg(test)]

use futures::StreamExt;

use crate::event::{InstallEvent, ProgressBroadcaster};
use crate::installer::InstallStep;

fn step_event(id: u64, step: InstallStep) -> InstallEvent {
    InstallEvent::Step {
        installation_id: id,
        target: "server-1".to_string(),
        plugin: "worldedit".to_string(),
        step,
        progress: step.progress(),
    }
}

#[test]
fn test_event_names() {
    assert_eq!(step_event(1, InstallStep::Downloading).name(), "install.step");
    let completed = InstallEvent::Completed {
        installation_id: 1,
        target: "t".to_string(),
        plugin: "p".to_string(),
    };
    assert_eq!(completed.name(), "install.completed");
    assert!(completed.is_terminal());
    assert_eq!(completed.installation_id(), Some(1));

    let uninstalled = InstallEvent::Uninstalled {
        target: "t".to_string(),
        plugin: "p".to_string(),
    };
    assert_eq!(uninstalled.name(), "install.uninstalled");
    assert!(!uninstalled.is_terminal());
    assert_eq!(uninstalled.installation_id(), None);
}

#[test]
fn test_publish_without_subscribers_is_not_an_error() {
    let broadcaster = ProgressBroadcaster::new();
    assert_eq!(broadcaster.subscriber_count(), 0);
    broadcaster.publish(step_event(1, InstallStep::Downloading));
}

#[tokio::test]
async fn test_all_subscribers_receive_events_in_publish_order() {
    let broadcaster = ProgressBroadcaster::new();
    let mut first = broadcaster.subscribe();
    let mut second = broadcaster.subscribe();
    assert_eq!(broadcaster.subscriber_count(), 2);

    let steps = [
        InstallStep::Downloading,
        InstallStep::Extracting,
        InstallStep::Validating,
    ];
    for step in steps {
        broadcaster.publish(step_event(7, step));
    }

    for rx in [&mut first, &mut second] {
        for expected in steps {
            match rx.recv().await.expect("subscriber should receive event") {
                InstallEvent::Step { installation_id, step, .. } => {
                    assert_eq!(installation_id, 7);
                    assert_eq!(step, expected);
                }
                other => panic!("expected Step event, got {:?}", other),
            }
        }
    }
}

#[tokio::test]
async fn test_late_subscriber_only_sees_later_events() {
    let broadcaster = ProgressBroadcaster::new();
    broadcaster.publish(step_event(1, InstallStep::Downloading));

    let mut late = broadcaster.subscribe();
    broadcaster.publish(step_event(1, InstallStep::Extracting));

    match late.recv().await.expect("should receive the later event") {
        InstallEvent::Step { step, .. } => assert_eq!(step, InstallStep::Extracting),
        other => panic!("expected Step event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dropped_subscriber_does_not_affect_others() {
    let broadcaster = ProgressBroadcaster::new();
    let dropped = broadcaster.subscribe();
    let mut kept = broadcaster.subscribe();

    drop(dropped);
    broadcaster.publish(step_event(2, InstallStep::Downloading));

    match kept.recv().await.expect("remaining subscriber should receive") {
        InstallEvent::Step { installation_id, .. } => assert_eq!(installation_id, 2),
        other => panic!("expected Step event, got {:?}", other),
    }
    assert_eq!(broadcaster.subscriber_count(), 1);
}

#[tokio::test]
async fn test_subscribe_stream_yields_events() {
    let broadcaster = ProgressBroadcaster::new();
    let mut stream = broadcaster.subscribe_stream();

    broadcaster.publish(step_event(3, InstallStep::Downloading));

    let event = stream
        .next()
        .await
        .expect("stream should yield")
        .expect("no lag expected");
    assert_eq!(event.installation_id(), Some(3));
}
