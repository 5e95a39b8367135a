//! Background worker running one generation of the connect/poll loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

use settop_driver::{ConnectionState, DriverError, RemoteDriver};
use settop_store::{DeviceId, DeviceInfo};

use crate::command::{KeyAction, KeyEvent};
use crate::config::SessionConfig;
use crate::session::Session;

/// Handle to a spawned worker, owned by its session
///
/// Dropping the handle detaches the thread; the worker notices on its next
/// iteration that its session (or generation) is gone and winds down.
pub(crate) struct WorkerHandle {
    generation: u64,
    cancel: Arc<AtomicBool>,
    done_rx: mpsc::Receiver<()>,
    thread: thread::JoinHandle<()>,
}

impl WorkerHandle {
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Request a cooperative stop; the worker checks once per iteration
    pub(crate) fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait up to `timeout` for the worker to finish; true if it did
    pub(crate) fn wait(&self, timeout: Duration) -> bool {
        match self.done_rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => false,
        }
    }
}

/// Spawn the worker thread for `generation` of `session`
pub(crate) fn spawn(session: &Arc<Session>, generation: u64) -> WorkerHandle {
    let cancel = Arc::new(AtomicBool::new(false));
    let (done_tx, done_rx) = mpsc::channel();

    let worker = Worker {
        session: Arc::downgrade(session),
        id: session.id().clone(),
        config: session.config().clone(),
        generation,
        cancel: Arc::clone(&cancel),
    };

    let thread = thread::spawn(move || {
        worker.run();
        let _ = done_tx.send(());
    });

    WorkerHandle {
        generation,
        cancel,
        done_rx,
        thread,
    }
}

enum Establish {
    /// Link is up; the driver is handed to the run loop
    Connected(Box<dyn RemoteDriver>),
    /// Retry budget exhausted without reaching the device
    Failed,
    /// Cancelled or superseded mid-attempt
    Stopped,
}

/// One generation of the connect/retry/poll/process loop
///
/// Holds only a weak back-reference to its session: the session owns the
/// worker, never the other way around, and a worker that outlives a forced
/// restart (or the whole registry) simply fails its upgrade or generation
/// check and exits without side effects.
struct Worker {
    session: Weak<Session>,
    id: DeviceId,
    config: SessionConfig,
    generation: u64,
    cancel: Arc<AtomicBool>,
}

impl Worker {
    fn run(&self) {
        self.update_state(ConnectionState::Connecting);

        let Some(info) = self.device_info() else {
            tracing::info!(id = %self.id, "device has no stored configuration, giving up");
            self.update_state(ConnectionState::Disconnected);
            return;
        };

        tracing::debug!(
            id = %self.id,
            name = %info.name,
            address = %info.address,
            generation = self.generation,
            "session worker starting"
        );

        match self.establish(&info) {
            Establish::Connected(mut driver) => {
                self.update_state(ConnectionState::Connected);
                self.run_loop(driver.as_mut());
                driver.disconnect();
            }
            Establish::Failed => {
                tracing::warn!(id = %self.id, address = %info.address, "could not connect to device");
                self.update_state(ConnectionState::Failed);
            }
            Establish::Stopped => {}
        }

        self.update_state(ConnectionState::Disconnected);
        tracing::debug!(id = %self.id, generation = self.generation, "session worker finished");
    }

    /// Open a driver and connect, retrying on a fixed backoff
    ///
    /// Driver errors during open or connect count against the same retry
    /// budget as attempts that simply never reach the connected state.
    fn establish(&self, info: &DeviceInfo) -> Establish {
        let Some(session) = self.session.upgrade() else {
            return Establish::Stopped;
        };
        let factory = Arc::clone(session.drivers());
        drop(session);

        let mut driver: Option<Box<dyn RemoteDriver>> = None;
        let mut connected = false;

        for attempt in 0..=self.config.retry_count {
            if attempt > 0 {
                thread::sleep(self.config.retry_backoff);
            }
            if self.stopped() {
                return Establish::Stopped;
            }

            if driver.is_none() {
                match factory.open(&info.address) {
                    Ok(opened) => driver = Some(opened),
                    Err(err) => {
                        tracing::debug!(id = %self.id, attempt, error = %err, "could not open driver");
                        continue;
                    }
                }
            }
            let Some(active) = driver.as_mut() else {
                continue;
            };

            match active.connect() {
                Ok(()) => {
                    if active.state().is_connected() {
                        connected = true;
                        break;
                    }
                    tracing::debug!(id = %self.id, attempt, "connect attempt left the link down");
                }
                Err(err) => {
                    tracing::debug!(id = %self.id, attempt, error = %err, "connect attempt failed");
                }
            }
        }

        match (connected, driver) {
            (true, Some(driver)) => Establish::Connected(driver),
            _ => Establish::Failed,
        }
    }

    /// The connected run loop: drain, deliver, idle-check, heartbeat, park
    fn run_loop(&self, driver: &mut dyn RemoteDriver) {
        let mut last_event = Instant::now();
        let mut last_poll = last_event;

        loop {
            if self.stopped() {
                tracing::debug!(id = %self.id, generation = self.generation, "worker stopping");
                break;
            }
            let Some(session) = self.session.upgrade() else {
                break;
            };

            let batch = session.queue().drain();
            if !batch.is_empty() {
                if let Err(err) = self.deliver_batch(driver, &batch) {
                    tracing::warn!(id = %self.id, error = %err, "key delivery failed, dropping link");
                    break;
                }
                last_event = Instant::now();
            }

            let now = Instant::now();

            // idle shutdown: nobody watching and nothing happening
            let idle = now.duration_since(last_event);
            if idle > self.config.inactivity_timeout && session.subscribers().is_empty() {
                tracing::info!(
                    id = %self.id,
                    idle_ms = idle.as_millis() as u64,
                    "stopping unobserved session after inactivity"
                );
                break;
            }

            if now.duration_since(last_poll) > self.config.poll_interval {
                last_poll = now;
                match driver.poll() {
                    Ok(true) => {
                        // heartbeat re-broadcast also flushes out dead subscribers
                        self.update_state(ConnectionState::Connected);
                    }
                    Ok(false) => {
                        tracing::info!(id = %self.id, "device stopped answering polls");
                        break;
                    }
                    Err(err) => {
                        tracing::warn!(id = %self.id, error = %err, "poll failed");
                        break;
                    }
                }
            }

            let mut deadline = last_poll + self.config.poll_interval;
            if session.subscribers().is_empty() {
                deadline = deadline.min(last_event + self.config.inactivity_timeout);
            }
            session.queue().wait_until(deadline);
        }
    }

    fn deliver_batch(
        &self,
        driver: &mut dyn RemoteDriver,
        batch: &[KeyEvent],
    ) -> Result<(), DriverError> {
        for event in batch {
            match event.action {
                KeyAction::Press => driver.toggle_key(event.code)?,
                KeyAction::Down => driver.send_key(event.code, true)?,
                KeyAction::Up => driver.send_key(event.code, false)?,
            }
        }
        Ok(())
    }

    fn device_info(&self) -> Option<DeviceInfo> {
        let session = self.session.upgrade()?;
        session.store().lookup(&self.id)
    }

    fn update_state(&self, state: ConnectionState) {
        if let Some(session) = self.session.upgrade() {
            session.apply_state(self.generation, state);
        }
    }

    /// True once cancelled, superseded, or orphaned
    fn stopped(&self) -> bool {
        if self.cancel.load(Ordering::SeqCst) {
            return true;
        }
        match self.session.upgrade() {
            Some(session) => !session.is_current(self.generation),
            None => true,
        }
    }
}
