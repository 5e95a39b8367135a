//! Native key codes of the set-top box handset

use serde::{Deserialize, Serialize};
use std::fmt;

/// A key code in the device's native input domain
///
/// The wire protocol carries key codes as unsigned 16-bit values. The
/// associated constants cover every key on the stock handset; arbitrary
/// codes can be sent with [`KeyCode::new`] for boxes with extra buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(u16);

impl KeyCode {
    pub const POWER: KeyCode = KeyCode(0xe000);
    pub const OK: KeyCode = KeyCode(0xe001);
    pub const BACK: KeyCode = KeyCode(0xe002);
    pub const CHANNEL_UP: KeyCode = KeyCode(0xe006);
    pub const CHANNEL_DOWN: KeyCode = KeyCode(0xe007);
    pub const HELP: KeyCode = KeyCode(0xe009);
    pub const MENU: KeyCode = KeyCode(0xe00a);
    pub const GUIDE: KeyCode = KeyCode(0xe00b);
    pub const INFO: KeyCode = KeyCode(0xe00e);
    pub const TEXT: KeyCode = KeyCode(0xe00f);
    pub const MENU_TV: KeyCode = KeyCode(0xe011);
    pub const MENU_VIDEO: KeyCode = KeyCode(0xe015);
    pub const DPAD_UP: KeyCode = KeyCode(0xe100);
    pub const DPAD_DOWN: KeyCode = KeyCode(0xe101);
    pub const DPAD_LEFT: KeyCode = KeyCode(0xe102);
    pub const DPAD_RIGHT: KeyCode = KeyCode(0xe103);
    pub const NUM_0: KeyCode = KeyCode(0xe300);
    pub const NUM_1: KeyCode = KeyCode(0xe301);
    pub const NUM_2: KeyCode = KeyCode(0xe302);
    pub const NUM_3: KeyCode = KeyCode(0xe303);
    pub const NUM_4: KeyCode = KeyCode(0xe304);
    pub const NUM_5: KeyCode = KeyCode(0xe305);
    pub const NUM_6: KeyCode = KeyCode(0xe306);
    pub const NUM_7: KeyCode = KeyCode(0xe307);
    pub const NUM_8: KeyCode = KeyCode(0xe308);
    pub const NUM_9: KeyCode = KeyCode(0xe309);
    pub const PAUSE: KeyCode = KeyCode(0xe400);
    pub const STOP: KeyCode = KeyCode(0xe402);
    pub const RECORD: KeyCode = KeyCode(0xe403);
    pub const FORWARD: KeyCode = KeyCode(0xe405);
    pub const REWIND: KeyCode = KeyCode(0xe407);
    pub const MENU_MAIN: KeyCode = KeyCode(0xef00);
    pub const ON_DEMAND: KeyCode = KeyCode(0xef28);
    pub const DVR: KeyCode = KeyCode(0xef29);
    pub const TV: KeyCode = KeyCode(0xef2a);

    /// Wrap a raw protocol key code
    pub const fn new(raw: u16) -> Self {
        KeyCode(raw)
    }

    /// The raw protocol value
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// The numeric key for a single decimal digit
    pub fn digit(n: u8) -> Option<KeyCode> {
        if n <= 9 {
            Some(KeyCode(Self::NUM_0.0 + u16::from(n)))
        } else {
            None
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

impl From<u16> for KeyCode {
    fn from(raw: u16) -> Self {
        KeyCode(raw)
    }
}
