//! Status code names and resolution of the `status` field of rule records.

use crate::error::RuleError;
use crate::event::SYSTEM_STATUS_MIN;
use serde::Deserialize;

pub const NOTE_OFF: u8 = 0x80;
pub const NOTE_ON: u8 = 0x90;
pub const POLY_PRESSURE: u8 = 0xA0;
pub const CONTROLLER_CHANGE: u8 = 0xB0;
pub const PROGRAM_CHANGE: u8 = 0xC0;
pub const CHANNEL_PRESSURE: u8 = 0xD0;
pub const PITCH_BEND: u8 = 0xE0;

const STATUS_NAMES: [(&str, u8); 7] = [
    ("noteoff", NOTE_OFF),
    ("noteon", NOTE_ON),
    ("polypressure", POLY_PRESSURE),
    ("controllerchange", CONTROLLER_CHANGE),
    ("programchange", PROGRAM_CHANGE),
    ("channelpressure", CHANNEL_PRESSURE),
    ("pitchbend", PITCH_BEND),
];

/// `status` as written in a rule file: a symbolic name or a number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StatusSpec {
    Code(i64),
    Name(String),
}

impl StatusSpec {
    /// Resolve to a status events can carry: a channel status with a zero
    /// low nibble (`0x80`-`0xE0`) or a system status (`0xF0`-`0xFF`).
    pub fn resolve(&self) -> Result<u8, RuleError> {
        let (code, text) = match self {
            StatusSpec::Code(code) => (u8::try_from(*code).ok(), code.to_string()),
            StatusSpec::Name(name) => (
                status_by_name(name).or_else(|| parse_byte(name)),
                name.clone(),
            ),
        };
        code.filter(|&c| is_event_status(c))
            .ok_or(RuleError::UnknownStatus(text))
    }
}

/// Whether `code` is a decoded MIDI status a selector can match: channel
/// statuses are stored without their channel nibble.
pub fn is_event_status(code: u8) -> bool {
    code >= SYSTEM_STATUS_MIN || (code >= NOTE_OFF && code & 0x0F == 0)
}

/// Case-insensitive lookup of a symbolic status name.
pub fn status_by_name(name: &str) -> Option<u8> {
    let wanted = name.trim().to_lowercase();
    STATUS_NAMES
        .iter()
        .find(|(n, _)| *n == wanted)
        .map(|&(_, code)| code)
}

pub fn status_name(code: u8) -> Option<&'static str> {
    STATUS_NAMES
        .iter()
        .find(|&&(_, c)| c == code)
        .map(|&(n, _)| n)
}

/// Decimal or `0x`-prefixed hex integer in 0-255.
pub(crate) fn parse_byte(text: &str) -> Option<u8> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}
