//! Scripted driver for tests and examples
//!
//! [`ScriptedFactory`] hands out drivers whose connect/poll/key behavior is
//! programmed through a shared [`DriverProbe`], which also records every call
//! for assertions. All drivers from one factory share a single script, so a
//! reconnecting session keeps appending to the same record.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::driver::{DriverError, DriverFactory, RemoteDriver};
use crate::keys::KeyCode;
use crate::state::ConnectionState;

/// One key delivery observed by the scripted driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCall {
    /// `toggle_key(code)`
    Toggle(KeyCode),
    /// `send_key(code, down)`
    Send(KeyCode, bool),
}

#[derive(Debug)]
struct ScriptState {
    connect_failures: usize,
    connect_errors: bool,
    open_failures: usize,
    poll_script: VecDeque<bool>,
    poll_default: bool,
    fail_keys: bool,
    state: ConnectionState,
    opened: Vec<String>,
    connects: usize,
    disconnects: usize,
    polls: usize,
    calls: Vec<DriverCall>,
}

impl Default for ScriptState {
    fn default() -> Self {
        Self {
            connect_failures: 0,
            connect_errors: false,
            open_failures: 0,
            poll_script: VecDeque::new(),
            poll_default: true,
            fail_keys: false,
            state: ConnectionState::Disconnected,
            opened: Vec::new(),
            connects: 0,
            disconnects: 0,
            polls: 0,
            calls: Vec::new(),
        }
    }
}

/// Factory producing scripted drivers
#[derive(Default)]
pub struct ScriptedFactory {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle for scripting behavior and inspecting recorded calls
    pub fn probe(&self) -> DriverProbe {
        DriverProbe {
            state: Arc::clone(&self.state),
        }
    }
}

impl DriverFactory for ScriptedFactory {
    fn open(&self, address: &str) -> Result<Box<dyn RemoteDriver>, DriverError> {
        let mut s = self.state.lock().unwrap();
        s.opened.push(address.to_string());
        if s.open_failures > 0 {
            s.open_failures -= 1;
            return Err(DriverError::Unreachable {
                address: address.to_string(),
            });
        }
        s.state = ConnectionState::Connecting;
        Ok(Box::new(ScriptedRemote {
            state: Arc::clone(&self.state),
        }))
    }
}

struct ScriptedRemote {
    state: Arc<Mutex<ScriptState>>,
}

impl RemoteDriver for ScriptedRemote {
    fn connect(&mut self) -> Result<(), DriverError> {
        let mut s = self.state.lock().unwrap();
        s.connects += 1;
        if s.connect_failures > 0 {
            s.connect_failures -= 1;
            if s.connect_errors {
                return Err(DriverError::Io("scripted connect failure".to_string()));
            }
            return Ok(());
        }
        s.state = ConnectionState::Connected;
        Ok(())
    }

    fn disconnect(&mut self) {
        let mut s = self.state.lock().unwrap();
        s.disconnects += 1;
        s.state = ConnectionState::Disconnected;
    }

    fn state(&self) -> ConnectionState {
        self.state.lock().unwrap().state
    }

    fn send_key(&mut self, code: KeyCode, down: bool) -> Result<(), DriverError> {
        let mut s = self.state.lock().unwrap();
        if s.fail_keys {
            return Err(DriverError::Io("scripted key failure".to_string()));
        }
        s.calls.push(DriverCall::Send(code, down));
        Ok(())
    }

    fn toggle_key(&mut self, code: KeyCode) -> Result<(), DriverError> {
        let mut s = self.state.lock().unwrap();
        if s.fail_keys {
            return Err(DriverError::Io("scripted key failure".to_string()));
        }
        s.calls.push(DriverCall::Toggle(code));
        Ok(())
    }

    fn poll(&mut self) -> Result<bool, DriverError> {
        let mut s = self.state.lock().unwrap();
        s.polls += 1;
        let up = s.poll_script.pop_front().unwrap_or(s.poll_default);
        Ok(up)
    }
}

/// Scripting and inspection handle shared with [`ScriptedFactory`]
#[derive(Clone)]
pub struct DriverProbe {
    state: Arc<Mutex<ScriptState>>,
}

impl DriverProbe {
    /// The next `n` connect attempts leave the driver unconnected
    pub fn fail_connects(&self, n: usize) {
        self.state.lock().unwrap().connect_failures = n;
    }

    /// Every connect attempt leaves the driver unconnected
    pub fn always_fail_connects(&self) {
        self.state.lock().unwrap().connect_failures = usize::MAX;
    }

    /// Failing connect attempts return an error instead of silently staying down
    pub fn error_connects(&self, yes: bool) {
        self.state.lock().unwrap().connect_errors = yes;
    }

    /// The next `n` factory opens fail with [`DriverError::Unreachable`]
    pub fn fail_opens(&self, n: usize) {
        self.state.lock().unwrap().open_failures = n;
    }

    /// Queue explicit poll results; once drained, the default applies
    pub fn script_polls(&self, results: impl IntoIterator<Item = bool>) {
        self.state.lock().unwrap().poll_script.extend(results);
    }

    /// Result of every unscripted poll
    pub fn set_poll_default(&self, up: bool) {
        self.state.lock().unwrap().poll_default = up;
    }

    /// Make every key delivery fail
    pub fn fail_keys(&self, yes: bool) {
        self.state.lock().unwrap().fail_keys = yes;
    }

    /// Addresses passed to the factory, in order
    pub fn opened(&self) -> Vec<String> {
        self.state.lock().unwrap().opened.clone()
    }

    pub fn connects(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    pub fn disconnects(&self) -> usize {
        self.state.lock().unwrap().disconnects
    }

    pub fn polls(&self) -> usize {
        self.state.lock().unwrap().polls
    }

    /// Every key delivery in arrival order
    pub fn calls(&self) -> Vec<DriverCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Key codes in arrival order, ignoring the press/release shape
    pub fn key_codes(&self) -> Vec<KeyCode> {
        self.calls()
            .into_iter()
            .map(|call| match call {
                DriverCall::Toggle(code) => code,
                DriverCall::Send(code, _) => code,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_succeeds_after_scripted_failures() {
        let factory = ScriptedFactory::new();
        let probe = factory.probe();
        probe.fail_connects(2);

        let mut driver = factory.open("10.0.0.2:5900").unwrap();
        driver.connect().unwrap();
        assert_eq!(driver.state(), ConnectionState::Connecting);
        driver.connect().unwrap();
        assert_eq!(driver.state(), ConnectionState::Connecting);
        driver.connect().unwrap();
        assert_eq!(driver.state(), ConnectionState::Connected);
        assert_eq!(probe.connects(), 3);
    }

    #[test]
    fn test_open_failure_is_consumed() {
        let factory = ScriptedFactory::new();
        let probe = factory.probe();
        probe.fail_opens(1);

        assert!(factory.open("10.0.0.2:5900").is_err());
        assert!(factory.open("10.0.0.2:5900").is_ok());
        assert_eq!(probe.opened().len(), 2);
    }

    #[test]
    fn test_key_deliveries_are_recorded_in_order() {
        let factory = ScriptedFactory::new();
        let probe = factory.probe();
        let mut driver = factory.open("10.0.0.2:5900").unwrap();
        driver.connect().unwrap();

        driver.toggle_key(KeyCode::OK).unwrap();
        driver.send_key(KeyCode::POWER, true).unwrap();
        driver.send_key(KeyCode::POWER, false).unwrap();

        assert_eq!(
            probe.calls(),
            vec![
                DriverCall::Toggle(KeyCode::OK),
                DriverCall::Send(KeyCode::POWER, true),
                DriverCall::Send(KeyCode::POWER, false),
            ]
        );
        assert_eq!(
            probe.key_codes(),
            vec![KeyCode::OK, KeyCode::POWER, KeyCode::POWER]
        );
    }

    #[test]
    fn test_poll_script_then_default() {
        let factory = ScriptedFactory::new();
        let probe = factory.probe();
        probe.script_polls([true, false]);
        probe.set_poll_default(true);

        let mut driver = factory.open("10.0.0.2:5900").unwrap();
        assert_eq!(driver.poll().unwrap(), true);
        assert_eq!(driver.poll().unwrap(), false);
        assert_eq!(driver.poll().unwrap(), true);
        assert_eq!(probe.polls(), 3);
    }
}
