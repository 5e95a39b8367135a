//! Inactivity-driven shutdown of unobserved sessions

mod common;

use std::time::Duration;

use common::{fixture, wait_until, Recorder};
use settop_session::{Command, ConnectionState, KeyCode};

#[test]
fn unobserved_idle_session_shuts_itself_down() {
    let (registry, probe, id) = fixture();

    // no subscribers: one key press, then silence
    registry.dispatch(&id, Command::KeyPress(KeyCode::OK));
    assert!(wait_until(Duration::from_secs(2), || probe.calls().len() == 1));

    let session = registry.session(&id);
    assert!(wait_until(Duration::from_secs(2), || {
        session.state() == ConnectionState::Disconnected
    }));
    assert_eq!(probe.disconnects(), 1);
    assert_eq!(session.queued_events(), 0);
}

#[test]
fn observed_session_survives_idleness() {
    let (registry, probe, id) = fixture();
    let recorder = Recorder::new();

    registry.register_subscriber(&id, recorder.clone());
    assert!(recorder.wait_for(ConnectionState::Connected, Duration::from_secs(2)));

    // far beyond the inactivity timeout, with nothing dispatched
    std::thread::sleep(Duration::from_millis(400));

    assert_eq!(registry.session(&id).state(), ConnectionState::Connected);
    assert_eq!(probe.disconnects(), 0);
}
