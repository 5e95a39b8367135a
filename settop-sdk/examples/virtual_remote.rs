//! Drive a scripted (in-memory) set-top box through the full SDK surface.
//!
//! Run with:
//! ```sh
//! cargo run --example virtual_remote
//! ```

use std::sync::Arc;
use std::time::Duration;

use settop_driver::testing::ScriptedFactory;
use settop_sdk::prelude::*;
use settop_sdk::LoggingMode;

fn main() {
    settop_sdk::init_logging(LoggingMode::Development).expect("logging setup");

    let store = Arc::new(MemoryDeviceStore::new());
    store.insert(DeviceInfo::new("living-room", "Living Room", "10.0.0.2:5900"));

    let factory = ScriptedFactory::new();
    let probe = factory.probe();
    // make the box a little reluctant, like the real ones
    probe.fail_connects(1);

    let sdk = RemoteSdk::with_config(
        store,
        Arc::new(factory),
        SessionConfig {
            retry_backoff: Duration::from_millis(100),
            poll_interval: Duration::from_millis(500),
            ..SessionConfig::default()
        },
    );

    let id = DeviceId::new("living-room");
    let watcher = subscriber_fn(|id, state| println!("[{id}] {state}"));
    sdk.register_subscriber(&id, Arc::clone(&watcher));

    // channel surf: up twice, then jump to channel 42
    sdk.press(&id, KeyCode::CHANNEL_UP);
    sdk.press(&id, KeyCode::CHANNEL_UP);
    for digit in [4, 2] {
        if let Some(key) = KeyCode::digit(digit) {
            sdk.press(&id, key);
        }
    }

    std::thread::sleep(Duration::from_millis(600));
    println!("driver saw: {:?}", probe.calls());

    // a forced reconnect tears the link down and brings it straight back
    sdk.reconnect(&id, true);
    std::thread::sleep(Duration::from_millis(600));

    sdk.unregister_subscriber(&id, &watcher);
    println!("final state: {}", sdk.state(&id));
}
