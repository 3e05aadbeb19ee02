//! Outbound message templates for translation rules.
//!
//! ```yaml
//! translation:
//!   - [0xF0, 0x42, 0x30, 0x00, 0x01, 0x15, 0x4E, 0x00, 0xF7]
//!   - [0xB0, 0x00, 0x00]
//!   - ["0xC0|channel", data1]
//! ```
//!
//! In byte items `channel` is the wire nibble (0-15), so `"0xC0|channel"`
//! answers on the channel the event arrived on.

use super::Field;
use crate::error::TemplateError;
use crate::event::Event;
use crate::status::parse_byte;
use serde::Deserialize;
use smallvec::SmallVec;

/// Bytes of one outbound message. Channel messages stay on the stack.
pub type OutboundMessage = SmallVec<[u8; 3]>;

/// One byte position of an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteItem {
    Literal(u8),
    Field(Field),
    /// `base | field`, typically a status byte combined with the channel.
    Or { base: u8, field: Field },
}

impl ByteItem {
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let bad = || TemplateError::BadByte(text.to_string());

        if let Some((base, field)) = text.split_once('|') {
            let base = parse_byte(base).ok_or_else(bad)?;
            let field = Field::from_name(field.trim()).ok_or_else(bad)?;
            return Ok(ByteItem::Or { base, field });
        }

        if let Some(field) = Field::from_name(text.trim()) {
            return Ok(ByteItem::Field(field));
        }

        parse_byte(text).map(ByteItem::Literal).ok_or_else(bad)
    }

    fn resolve(&self, event: &Event) -> Result<u8, TemplateError> {
        match *self {
            ByteItem::Literal(byte) => Ok(byte),
            ByteItem::Field(field) => wire_value(field, event),
            ByteItem::Or { base, field } => Ok(base | wire_value(field, event)?),
        }
    }
}

fn wire_value(field: Field, event: &Event) -> Result<u8, TemplateError> {
    let value = field
        .value(event)
        .ok_or(TemplateError::MissingField(field.name()))?;
    Ok(match field {
        Field::Channel => value.saturating_sub(1),
        _ => value,
    })
}

/// A byte item as written in a rule file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ByteSpec {
    Literal(i64),
    Expr(String),
}

impl ByteSpec {
    fn to_item(&self) -> Result<ByteItem, TemplateError> {
        match self {
            ByteSpec::Literal(v) => u8::try_from(*v)
                .map(ByteItem::Literal)
                .map_err(|_| TemplateError::BadByte(v.to_string())),
            ByteSpec::Expr(text) => ByteItem::parse(text),
        }
    }
}

/// Sequence of outbound messages sent for one matched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    messages: Vec<Vec<ByteItem>>,
}

impl OutputTemplate {
    pub fn new(messages: Vec<Vec<ByteItem>>) -> Result<Self, TemplateError> {
        if messages.is_empty() || messages.iter().any(Vec::is_empty) {
            return Err(TemplateError::Empty);
        }
        Ok(Self { messages })
    }

    pub fn from_specs(specs: &[Vec<ByteSpec>]) -> Result<Self, TemplateError> {
        let messages = specs
            .iter()
            .map(|message| message.iter().map(ByteSpec::to_item).collect())
            .collect::<Result<Vec<Vec<ByteItem>>, _>>()?;
        Self::new(messages)
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Resolve every message; fails as a whole if any referenced field is absent.
    pub fn render(&self, event: &Event) -> Result<Vec<OutboundMessage>, TemplateError> {
        self.messages
            .iter()
            .map(|message| message.iter().map(|item| item.resolve(event)).collect())
            .collect()
    }
}
