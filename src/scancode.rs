//! Host input events and the vendor scancode table.
//!
//! Scancodes follow the device BSP table: extended keys carry an `0xe0`
//! prefix byte, and a release code is the press code with the key-up bit set.

use thiserror::Error;

/// Key-up bit OR'ed into a press code to form its release code.
pub const KEY_UP_BIT: u32 = 0x80;

/// `P` key press.
pub const SCANCODE_P: u32 = 0x19;
/// Left LOGO (meta) key press.
pub const SCANCODE_LEFTMETA: u32 = 0xe05b;
/// Right LOGO (meta) key press.
pub const SCANCODE_RIGHTMETA: u32 = 0xe05c;
/// Left LOGO (meta) key release.
pub const SCANCODE_LEFTMETA_REL: u32 = SCANCODE_LEFTMETA | KEY_UP_BIT;
/// Right LOGO (meta) key release.
pub const SCANCODE_RIGHTMETA_REL: u32 = SCANCODE_RIGHTMETA | KEY_UP_BIT;

/// Release code for a press code.
pub fn release_of(code: u32) -> u32 {
    code | KEY_UP_BIT
}

/// Whether a scancode is a key-up transition.
pub fn is_release(code: u32) -> bool {
    code & KEY_UP_BIT != 0
}

/// An input event as delivered by the host input subsystem.
///
/// Only [`InputEvent::Scancode`] carries raw key transitions; the other kinds
/// are the host's higher-level translations of the same keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Raw key transition from the vendor scancode table.
    Scancode(u32),
    /// Translated printable character.
    Keyboard(char),
    /// Navigation key (arrows, return, escape...).
    Navigation { key: u32, pressed: bool },
    /// Device action (power button, lid, ...).
    Action { kind: u32, pressed: bool },
}

impl InputEvent {
    /// The scancode, if this is a scancode event.
    pub fn scancode(&self) -> Option<u32> {
        match self {
            InputEvent::Scancode(code) => Some(*code),
            _ => None,
        }
    }
}

/// Errors from parsing the textual event form used by the replay harness.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseEventError {
    #[error("empty event")]
    Empty,
    #[error("invalid scancode '{0}'")]
    InvalidScancode(String),
    #[error("invalid key event '{0}': expected key:<char>")]
    InvalidKey(String),
    #[error("invalid {kind} event '{line}': expected {kind}:<code>:<down|up>")]
    InvalidCoded { kind: &'static str, line: String },
}

/// Parse one event line.
///
/// Accepted forms:
/// - `0xe05b` or `e05b` - scancode in hex
/// - `key:p` - keyboard character
/// - `nav:<code>:down` / `nav:<code>:up` - navigation key
/// - `action:<kind>:down` / `action:<kind>:up` - device action
pub fn parse_event(line: &str) -> Result<InputEvent, ParseEventError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseEventError::Empty);
    }

    if let Some(rest) = line.strip_prefix("key:") {
        let mut chars = rest.chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(InputEvent::Keyboard(c)),
            _ => Err(ParseEventError::InvalidKey(line.to_string())),
        };
    }

    if let Some(rest) = line.strip_prefix("nav:") {
        let (key, pressed) = parse_coded(rest).ok_or_else(|| ParseEventError::InvalidCoded {
            kind: "nav",
            line: line.to_string(),
        })?;
        return Ok(InputEvent::Navigation { key, pressed });
    }

    if let Some(rest) = line.strip_prefix("action:") {
        let (kind, pressed) = parse_coded(rest).ok_or_else(|| ParseEventError::InvalidCoded {
            kind: "action",
            line: line.to_string(),
        })?;
        return Ok(InputEvent::Action { kind, pressed });
    }

    parse_hex(line)
        .map(InputEvent::Scancode)
        .ok_or_else(|| ParseEventError::InvalidScancode(line.to_string()))
}

fn parse_hex(s: &str) -> Option<u32> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16).ok()
}

fn parse_coded(s: &str) -> Option<(u32, bool)> {
    let (code, state) = s.split_once(':')?;
    let pressed = match state {
        "down" => true,
        "up" => false,
        _ => return None,
    };
    Some((parse_hex(code)?, pressed))
}
