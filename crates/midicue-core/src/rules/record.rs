//! Conversion of YAML rule records into typed rules.
//!
//! A record is either a mapping:
//!
//! ```yaml
//! - name: My Lead Sheets
//!   description: Open PDF matching <data2>-sheet.pdf on CC 14, channel 16
//!   status: controllerchange
//!   channel: 16
//!   data: 14
//!   command: evince %(data2)03i-sheet.pdf
//! ```
//!
//! or a positional sequence `[name, description, status, channel, data, action]`.

use super::selector::{resolve_channel, DataSpec, Selector};
use super::table::Rule;
use crate::error::RuleError;
use crate::status::StatusSpec;
use crate::template::{ByteSpec, CommandTemplate, OutputTemplate};
use serde::Deserialize;
use serde_yaml::Value;

/// An action type that can be read from the action field of a record.
pub trait RuleAction: Sized {
    /// Key holding the action in mapping records.
    const FIELD: &'static str;
    /// Human-readable kind used in logs and errors.
    const KIND: &'static str;

    fn from_value(value: Value) -> Result<Self, RuleError>;
}

impl RuleAction for CommandTemplate {
    const FIELD: &'static str = "command";
    const KIND: &'static str = "command";

    fn from_value(value: Value) -> Result<Self, RuleError> {
        let text: String = serde_yaml::from_value(value)
            .map_err(|e| RuleError::Shape(format!("'command' must be a string: {}", e)))?;
        Ok(CommandTemplate::parse(&text)?)
    }
}

impl RuleAction for OutputTemplate {
    const FIELD: &'static str = "translation";
    const KIND: &'static str = "translation";

    fn from_value(value: Value) -> Result<Self, RuleError> {
        let specs: Vec<Vec<ByteSpec>> = serde_yaml::from_value(value).map_err(|e| {
            RuleError::Shape(format!("'translation' must be a list of byte lists: {}", e))
        })?;
        Ok(OutputTemplate::from_specs(&specs)?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordFields {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    status: StatusSpec,
    #[serde(default)]
    channel: Option<i64>,
    #[serde(default)]
    data: Option<DataSpec>,
    #[serde(default)]
    command: Option<Value>,
    #[serde(default)]
    translation: Option<Value>,
}

const POSITIONAL_LEN: usize = 6;

/// Fields common to both record forms, before resolution.
struct RawRecord {
    name: String,
    description: String,
    status: StatusSpec,
    channel: Option<i64>,
    data: Option<DataSpec>,
    action: Option<Value>,
}

/// Best-effort name of a record for error messages, available even when the
/// record itself does not parse.
pub(crate) fn record_name(value: &Value) -> String {
    let name = match value {
        Value::Mapping(map) => map.get("name"),
        Value::Sequence(items) => items.first(),
        _ => None,
    };
    name.and_then(Value::as_str).unwrap_or("<unnamed>").to_string()
}

impl<A: RuleAction> Rule<A> {
    pub fn from_record(value: Value) -> Result<Self, RuleError> {
        let raw = match value {
            Value::Mapping(_) => from_mapping::<A>(value)?,
            Value::Sequence(items) => from_positional(items)?,
            other => {
                return Err(RuleError::Shape(format!(
                    "expected a mapping or a sequence, got {}",
                    kind_of(&other)
                )))
            }
        };

        let action = raw.action.ok_or(RuleError::MissingAction(A::FIELD))?;
        let action = A::from_value(action)?;
        let channel = resolve_channel(raw.channel)?;
        let data = raw.data.as_ref().map(DataSpec::resolve).transpose()?;
        let status = raw.status.resolve()?;

        let mut selector = Selector::new(status);
        selector.channel = channel;
        if let Some(data) = data {
            selector = selector.data(data);
        }

        Ok(Rule {
            name: raw.name,
            description: raw.description,
            selector,
            action,
        })
    }
}

fn from_mapping<A: RuleAction>(value: Value) -> Result<RawRecord, RuleError> {
    let fields: RecordFields =
        serde_yaml::from_value(value).map_err(|e| RuleError::Shape(e.to_string()))?;

    let (action, foreign) = match A::FIELD {
        "command" => (fields.command, fields.translation.map(|_| "translation")),
        _ => (fields.translation, fields.command.map(|_| "command")),
    };
    if let Some(field) = foreign {
        return Err(RuleError::UnexpectedField(field));
    }

    Ok(RawRecord {
        name: fields.name,
        description: fields.description,
        status: fields.status,
        channel: fields.channel,
        data: fields.data,
        action,
    })
}

fn from_positional(items: Vec<Value>) -> Result<RawRecord, RuleError> {
    if items.len() != POSITIONAL_LEN {
        return Err(RuleError::Shape(format!(
            "positional records need {} items [name, description, status, channel, data, action], got {}",
            POSITIONAL_LEN,
            items.len()
        )));
    }

    let mut items = items.into_iter();
    let mut next = |what: &str| -> Result<Value, RuleError> {
        items
            .next()
            .ok_or_else(|| RuleError::Shape(format!("missing {}", what)))
    };
    let field = |what: &str, e: serde_yaml::Error| RuleError::Shape(format!("{}: {}", what, e));

    let name = next("name")?;
    let description = next("description")?;
    let status = next("status")?;
    let channel = next("channel")?;
    let data = next("data")?;
    let action = next("action")?;

    Ok(RawRecord {
        name: optional_string(name).map_err(|e| field("name", e))?,
        description: optional_string(description).map_err(|e| field("description", e))?,
        status: serde_yaml::from_value(status).map_err(|e| field("status", e))?,
        channel: serde_yaml::from_value(channel).map_err(|e| field("channel", e))?,
        data: serde_yaml::from_value(data).map_err(|e| field("data", e))?,
        action: match action {
            Value::Null => None,
            value => Some(value),
        },
    })
}

fn optional_string(value: Value) -> Result<String, serde_yaml::Error> {
    serde_yaml::from_value::<Option<String>>(value).map(Option::unwrap_or_default)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
