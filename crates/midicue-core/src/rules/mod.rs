//! Declarative rules: selectors, tables, and YAML loading.

mod loader;
mod record;
mod selector;
mod table;

pub use loader::{load_command_rules, load_rules, load_translation_rules, parse_rules};
pub use record::RuleAction;
pub use selector::{DataSelector, DataSpec, Selector};
pub use table::{CommandRule, Rule, RuleTable, TranslationRule};
