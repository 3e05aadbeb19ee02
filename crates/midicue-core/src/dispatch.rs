//! Channel-based routing of decoded events to the two action paths.
//!
//! Channels 1-15 consult the translation rules, channel 16 the command rules.
//! System messages carry no channel and are never routed.

use crate::action::{CommandRunner, OutputEmitter, OutputPort};
use crate::event::{Event, EventClock};
use crate::matcher::{Matcher, DEFAULT_CACHE_CAPACITY};
use crate::rules::RuleTable;
use crate::status::status_name;
use crate::template::{CommandTemplate, OutputTemplate};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Channel whose events trigger command rules.
pub const COMMAND_CHANNEL: u8 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Command,
    Translation,
}

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Empty input or an event without a routable channel.
    Ignored,
    Unmatched(Route),
    CommandLaunched { rule: String, command_line: String },
    CommandFailed { rule: String },
    Translated { rule: String, messages: usize },
    TranslationFailed { rule: String },
}

impl Dispatch {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Dispatch::CommandFailed { .. } | Dispatch::TranslationFailed { .. }
        )
    }
}

pub fn route(event: &Event) -> Option<Route> {
    match event.channel {
        Some(COMMAND_CHANNEL) => Some(Route::Command),
        Some(1..=15) => Some(Route::Translation),
        _ => None,
    }
}

/// Owns the rule tables, their matchers, the event clock and both action
/// paths. One instance per input stream.
pub struct Dispatcher<R, P> {
    clock: EventClock,
    commands: RuleTable<CommandTemplate>,
    translations: RuleTable<OutputTemplate>,
    command_matcher: Matcher,
    translation_matcher: Matcher,
    runner: R,
    emitter: OutputEmitter<P>,
}

impl<R: CommandRunner, P: OutputPort> Dispatcher<R, P> {
    pub fn new(
        commands: RuleTable<CommandTemplate>,
        translations: RuleTable<OutputTemplate>,
        runner: R,
        emitter: OutputEmitter<P>,
    ) -> Self {
        Self {
            clock: EventClock::new(),
            commands,
            translations,
            command_matcher: Matcher::new(DEFAULT_CACHE_CAPACITY),
            translation_matcher: Matcher::new(DEFAULT_CACHE_CAPACITY),
            runner,
            emitter,
        }
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.command_matcher = Matcher::new(capacity);
        self.translation_matcher = Matcher::new(capacity);
        self
    }

    /// Decode one raw message received `delta` after the previous one and act on it.
    pub fn handle(&mut self, raw: &[u8], delta: Duration) -> Dispatch {
        match self.clock.decode(raw, delta) {
            Some(event) => self.dispatch(&event),
            None => {
                debug!("Ignoring empty MIDI message");
                Dispatch::Ignored
            }
        }
    }

    pub fn dispatch(&mut self, event: &Event) -> Dispatch {
        debug!("{}", event);

        match route(event) {
            Some(Route::Command) => self.run_command(event),
            Some(Route::Translation) => self.translate(event),
            None => Dispatch::Ignored,
        }
    }

    fn run_command(&mut self, event: &Event) -> Dispatch {
        let Some(rule) = self.command_matcher.lookup(&self.commands, event.key()) else {
            debug!(
                "No command rule for {} on channel {:?}",
                describe_status(event.status),
                event.channel
            );
            return Dispatch::Unmatched(Route::Command);
        };

        let command_line = match rule.action.render(event) {
            Ok(line) => line,
            Err(e) => {
                warn!("Command rule '{}': cannot format '{}': {}", rule.name, rule.action, e);
                return Dispatch::CommandFailed {
                    rule: rule.name.clone(),
                };
            }
        };

        match self.runner.execute(&command_line) {
            Ok(()) => Dispatch::CommandLaunched {
                rule: rule.name.clone(),
                command_line,
            },
            Err(e) => {
                error!("Error calling external command for rule '{}': {}", rule.name, e);
                Dispatch::CommandFailed {
                    rule: rule.name.clone(),
                }
            }
        }
    }

    fn translate(&mut self, event: &Event) -> Dispatch {
        let Some(rule) = self.translation_matcher.lookup(&self.translations, event.key()) else {
            debug!(
                "No translation rule for {} on channel {:?}",
                describe_status(event.status),
                event.channel
            );
            return Dispatch::Unmatched(Route::Translation);
        };

        match self.emitter.emit(&rule.action, event) {
            Ok(messages) => {
                info!("Translation '{}' sent {} message(s)", rule.name, messages);
                Dispatch::Translated {
                    rule: rule.name.clone(),
                    messages,
                }
            }
            Err(e) => {
                error!("Translation '{}' failed: {}", rule.name, e);
                Dispatch::TranslationFailed {
                    rule: rule.name.clone(),
                }
            }
        }
    }

    /// Install a new command table. Cached lookups of the old one are discarded.
    pub fn replace_commands(&mut self, commands: RuleTable<CommandTemplate>) {
        self.commands = commands;
        self.command_matcher.clear();
    }

    /// Install a new translation table. Cached lookups of the old one are discarded.
    pub fn replace_translations(&mut self, translations: RuleTable<OutputTemplate>) {
        self.translations = translations;
        self.translation_matcher.clear();
    }

    pub fn commands(&self) -> &RuleTable<CommandTemplate> {
        &self.commands
    }

    pub fn translations(&self) -> &RuleTable<OutputTemplate> {
        &self.translations
    }

    pub fn command_matcher(&self) -> &Matcher {
        &self.command_matcher
    }

    pub fn translation_matcher(&self) -> &Matcher {
        &self.translation_matcher
    }

    pub fn clock(&self) -> &EventClock {
        &self.clock
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn emitter(&self) -> &OutputEmitter<P> {
        &self.emitter
    }
}

fn describe_status(status: u8) -> String {
    match status_name(status) {
        Some(name) => format!("{} ({:02X})", name, status),
        None => format!("{:02X}", status),
    }
}

/// Running totals of dispatch outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    pub events: u64,
    pub ignored: u64,
    pub unmatched: u64,
    pub commands: u64,
    pub translations: u64,
    pub failures: u64,
}

impl DispatchStats {
    pub fn record(&mut self, outcome: &Dispatch) {
        self.events += 1;
        match outcome {
            Dispatch::Ignored => self.ignored += 1,
            Dispatch::Unmatched(_) => self.unmatched += 1,
            Dispatch::CommandLaunched { .. } => self.commands += 1,
            Dispatch::Translated { .. } => self.translations += 1,
            Dispatch::CommandFailed { .. } | Dispatch::TranslationFailed { .. } => {
                self.failures += 1
            }
        }
    }
}

impl fmt::Display for DispatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} events: {} commands, {} translations, {} unmatched, {} ignored, {} failed",
            self.events, self.commands, self.translations, self.unmatched, self.ignored, self.failures
        )
    }
}
