//! Loading rule tables from YAML files.

use super::record::{record_name, RuleAction};
use super::table::{Rule, RuleTable};
use crate::error::{Error, Result};
use crate::template::{CommandTemplate, OutputTemplate};
use serde_yaml::Value;
use std::path::Path;
use tracing::{debug, info, warn};

/// Parse a YAML document holding a sequence of rule records.
///
/// Records with an unresolvable status are dropped with a warning; any other
/// record error aborts the load.
pub fn parse_rules<A: RuleAction>(source: &str) -> Result<RuleTable<A>> {
    let document: Value = serde_yaml::from_str(source)?;
    let records = match document {
        Value::Null => Vec::new(),
        Value::Sequence(records) => records,
        _ => return Err(Error::NotASequence { kind: A::KIND }),
    };

    let mut rules = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let name = record_name(&record);
        match Rule::<A>::from_record(record) {
            Ok(rule) => {
                debug!(
                    "{} rule #{} '{}': {}",
                    A::KIND,
                    index,
                    rule.name,
                    rule.description.trim()
                );
                rules.push(rule);
            }
            Err(e) if e.is_recoverable() => {
                warn!("Ignoring {} rule #{} ({}): {}", A::KIND, index, name, e);
            }
            Err(source) => {
                return Err(Error::InvalidRule {
                    kind: A::KIND,
                    index,
                    name,
                    source,
                })
            }
        }
    }

    Ok(RuleTable::new(rules))
}

/// Read and parse a rules file. A missing file is reported as [`Error::RulesNotFound`].
pub fn load_rules<A: RuleAction>(path: impl AsRef<Path>) -> Result<RuleTable<A>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::RulesNotFound {
            kind: A::KIND,
            path: path.to_path_buf(),
        });
    }

    let source = std::fs::read_to_string(path)?;
    let table = parse_rules::<A>(&source)?;
    info!(
        "Loaded {} {} rules from {}",
        table.len(),
        A::KIND,
        path.display()
    );
    Ok(table)
}

pub fn load_command_rules(path: impl AsRef<Path>) -> Result<RuleTable<CommandTemplate>> {
    load_rules(path)
}

pub fn load_translation_rules(path: impl AsRef<Path>) -> Result<RuleTable<OutputTemplate>> {
    load_rules(path)
}
