//! End-to-end dispatch tests with recording doubles for both action paths.

use midicue_core::{
    load_command_rules, load_translation_rules, parse_rules, CommandRunner, CommandTemplate,
    Dispatch, DispatchStats, Dispatcher, Error, ExecError, OutputEmitter, OutputPort,
    OutputTemplate, PortConnection, PortError, ProcessLauncher, Route, RuleTable,
};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Default)]
struct Recorder {
    commands: Arc<Mutex<Vec<String>>>,
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    acquisitions: Arc<Mutex<usize>>,
}

struct RecordingRunner(Recorder);

impl CommandRunner for RecordingRunner {
    fn execute(&mut self, command_line: &str) -> Result<(), ExecError> {
        self.0.commands.lock().push(command_line.to_string());
        Ok(())
    }
}

struct RecordingPort(Recorder);
struct RecordingConnection(Recorder);

impl OutputPort for RecordingPort {
    type Connection = RecordingConnection;

    fn acquire(&mut self) -> Result<RecordingConnection, PortError> {
        *self.0.acquisitions.lock() += 1;
        Ok(RecordingConnection(self.0.clone()))
    }
}

impl PortConnection for RecordingConnection {
    fn send(&mut self, message: &[u8]) -> Result<(), PortError> {
        self.0.sent.lock().push(message.to_vec());
        Ok(())
    }
}

const COMMANDS: &str = r#"
- name: sheet
  description: Show the sheet for the selected program
  status: programchange
  channel: 16
  command: "echo %(data1)03i"
- name: notify
  status: controllerchange
  channel: 16
  data: 14
  command: "notify %(data2)03i"
"#;

const TRANSLATIONS: &str = r#"
- name: unknown
  status: sysexish
  translation: [[0xF0, 0xF7]]
- name: korg-program
  status: programchange
  channel: 1
  translation:
    - [0xF0, 0x42, 0x30, 0x00, 0x01, 0x15, 0x4E, 0x00, 0xF7]
    - [0xB0, 0x00, 0x00]
    - [0xB0, 0x20, 0x03]
    - ["0xC0|channel", data1]
- [echo-note, "", noteon, null, null, [[0x90, data1, data2]]]
"#;

fn dispatcher(recorder: &Recorder) -> Dispatcher<RecordingRunner, RecordingPort> {
    let commands = parse_rules::<CommandTemplate>(COMMANDS).unwrap();
    let translations = parse_rules::<OutputTemplate>(TRANSLATIONS).unwrap();
    Dispatcher::new(
        commands,
        translations,
        RecordingRunner(recorder.clone()),
        OutputEmitter::new(RecordingPort(recorder.clone())).with_gap(Duration::ZERO),
    )
}

#[test]
fn program_change_on_command_channel_runs_formatted_command() {
    let recorder = Recorder::default();
    let mut dispatcher = dispatcher(&recorder);

    let outcome = dispatcher.handle(&[0xCF, 7], Duration::ZERO);
    assert_eq!(
        outcome,
        Dispatch::CommandLaunched {
            rule: "sheet".into(),
            command_line: "echo 007".into(),
        }
    );
    assert_eq!(*recorder.commands.lock(), vec!["echo 007"]);
}

#[test]
fn data_constraint_selects_controller() {
    let recorder = Recorder::default();
    let mut dispatcher = dispatcher(&recorder);

    dispatcher.handle(&[0xBF, 14, 3], Duration::ZERO);
    let miss = dispatcher.handle(&[0xBF, 15, 3], Duration::ZERO);

    assert_eq!(miss, Dispatch::Unmatched(Route::Command));
    assert_eq!(*recorder.commands.lock(), vec!["notify 003"]);
}

#[test]
fn unknown_status_record_is_dropped_and_others_match() {
    let recorder = Recorder::default();
    let mut dispatcher = dispatcher(&recorder);
    assert_eq!(dispatcher.translations().len(), 2);

    let outcome = dispatcher.handle(&[0xC0, 5], Duration::ZERO);
    assert_eq!(
        outcome,
        Dispatch::Translated {
            rule: "korg-program".into(),
            messages: 4,
        }
    );
    assert_eq!(
        *recorder.sent.lock(),
        vec![
            vec![0xF0, 0x42, 0x30, 0x00, 0x01, 0x15, 0x4E, 0x00, 0xF7],
            vec![0xB0, 0x00, 0x00],
            vec![0xB0, 0x20, 0x03],
            vec![0xC0, 5],
        ]
    );
    assert_eq!(*recorder.acquisitions.lock(), 1);
}

#[test]
fn launch_failure_does_not_stop_dispatch() {
    let recorder = Recorder::default();
    let commands = parse_rules::<CommandTemplate>(
        r#"
- name: missing
  status: noteon
  channel: 16
  command: "midicue-no-such-binary-91c3 %(data1)i"
"#,
    )
    .unwrap();
    let mut dispatcher = Dispatcher::new(
        commands,
        RuleTable::<OutputTemplate>::empty(),
        ProcessLauncher::new(),
        OutputEmitter::new(RecordingPort(recorder.clone())),
    );
    let mut stats = DispatchStats::default();

    let first = dispatcher.handle(&[0x9F, 60, 100], Duration::ZERO);
    stats.record(&first);
    assert_eq!(
        first,
        Dispatch::CommandFailed {
            rule: "missing".into()
        }
    );

    let second = dispatcher.handle(&[0x9F, 61, 100], Duration::from_millis(5));
    stats.record(&second);
    assert!(second.is_failure());
    assert_eq!(stats.events, 2);
    assert_eq!(stats.failures, 2);
}

#[test]
fn routing_is_exclusive_by_channel() {
    let recorder = Recorder::default();
    let commands = parse_rules::<CommandTemplate>(
        r#"
- name: any-channel
  status: noteon
  command: "echo %(data1)i"
"#,
    )
    .unwrap();
    let translations = parse_rules::<OutputTemplate>(
        r#"
- name: any-channel
  status: noteon
  translation: [[0x90, data1, data2]]
"#,
    )
    .unwrap();
    let mut dispatcher = Dispatcher::new(
        commands,
        translations,
        RecordingRunner(recorder.clone()),
        OutputEmitter::new(RecordingPort(recorder.clone())),
    );

    // channel 5
    assert!(matches!(
        dispatcher.handle(&[0x94, 60, 1], Duration::ZERO),
        Dispatch::Translated { .. }
    ));
    assert!(recorder.commands.lock().is_empty());

    // channel 16
    assert!(matches!(
        dispatcher.handle(&[0x9F, 60, 1], Duration::ZERO),
        Dispatch::CommandLaunched { .. }
    ));
    assert_eq!(recorder.sent.lock().len(), 1);
    assert_eq!(*recorder.acquisitions.lock(), 1);
}

#[test]
fn system_messages_are_ignored() {
    let recorder = Recorder::default();
    let mut dispatcher = dispatcher(&recorder);

    assert_eq!(dispatcher.handle(&[0xF8], Duration::ZERO), Dispatch::Ignored);
    assert_eq!(dispatcher.handle(&[], Duration::ZERO), Dispatch::Ignored);
    assert!(recorder.commands.lock().is_empty());
    assert!(recorder.sent.lock().is_empty());
}

#[test]
fn first_matching_rule_wins() {
    let recorder = Recorder::default();
    let commands = parse_rules::<CommandTemplate>(
        r#"
- name: exact
  status: controllerchange
  channel: 16
  data: [14, 3]
  command: "first"
- name: general
  status: controllerchange
  channel: 16
  command: "second"
"#,
    )
    .unwrap();
    let mut dispatcher = Dispatcher::new(
        commands,
        RuleTable::empty(),
        RecordingRunner(recorder.clone()),
        OutputEmitter::new(RecordingPort(recorder.clone())),
    );

    dispatcher.handle(&[0xBF, 14, 3], Duration::ZERO);
    dispatcher.handle(&[0xBF, 14, 4], Duration::ZERO);
    assert_eq!(*recorder.commands.lock(), vec!["first", "second"]);
}

#[test]
fn repeated_events_scan_once() {
    let recorder = Recorder::default();
    let mut dispatcher = dispatcher(&recorder);

    for _ in 0..3 {
        dispatcher.handle(&[0xCF, 7], Duration::ZERO);
    }
    assert_eq!(recorder.commands.lock().len(), 3);
    assert_eq!(dispatcher.command_matcher().scans(), 1);
}

#[test]
fn replacing_rules_discards_cached_lookups() {
    let recorder = Recorder::default();
    let mut dispatcher = dispatcher(&recorder);

    dispatcher.handle(&[0xCF, 7], Duration::ZERO);
    dispatcher.replace_commands(
        parse_rules(
            r#"
- name: replaced
  status: programchange
  channel: 16
  command: "replaced %(data1)i"
"#,
        )
        .unwrap(),
    );
    dispatcher.handle(&[0xCF, 7], Duration::ZERO);

    assert_eq!(*recorder.commands.lock(), vec!["echo 007", "replaced 7"]);
    assert_eq!(dispatcher.command_matcher().scans(), 2);
}

#[test]
fn clock_accumulates_deltas_per_dispatcher() {
    let recorder = Recorder::default();
    let mut a = dispatcher(&recorder);
    let mut b = dispatcher(&recorder);

    a.handle(&[0xF8], Duration::from_millis(10));
    a.handle(&[0xF8], Duration::from_millis(15));
    b.handle(&[0xF8], Duration::from_millis(3));

    assert_eq!(a.clock().now(), Duration::from_millis(25));
    assert_eq!(b.clock().now(), Duration::from_millis(3));
}

#[test]
fn loads_rule_files_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let commands_path = dir.path().join("commands.yaml");
    let translations_path = dir.path().join("translations.yaml");
    std::fs::File::create(&commands_path)
        .unwrap()
        .write_all(COMMANDS.as_bytes())
        .unwrap();
    std::fs::File::create(&translations_path)
        .unwrap()
        .write_all(TRANSLATIONS.as_bytes())
        .unwrap();

    assert_eq!(load_command_rules(&commands_path).unwrap().len(), 2);
    assert_eq!(load_translation_rules(&translations_path).unwrap().len(), 2);

    let missing = load_command_rules(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(missing, Error::RulesNotFound { kind: "command", .. }));
}
