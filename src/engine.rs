//! The run loop: load rules, start the worker, listen until interrupted.

use crate::config::Settings;
use crate::error::Result;
use crate::worker::DispatchWorker;
use crossbeam_channel::{bounded, Receiver};
use midicue_core::{
    load_command_rules, load_translation_rules, DispatchStats, Dispatcher, OutputEmitter,
    ProcessLauncher,
};
use midicue_io::{open_input, MidirOutputPort};
use tracing::info;

/// Run until Ctrl-C. Installs the process-wide signal handler, so call once.
pub fn run(settings: &Settings) -> Result<DispatchStats> {
    let (stop_tx, stop_rx) = bounded(1);
    ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    })?;

    run_until(settings, stop_rx)
}

/// Run until `stop` receives a value or all its senders are gone.
pub fn run_until(settings: &Settings, stop: Receiver<()>) -> Result<DispatchStats> {
    if let Some(backend) = settings.backend {
        backend.ensure_available()?;
    }

    let commands = load_command_rules(&settings.command_rules)?;
    let translations = load_translation_rules(&settings.translation_rules)?;

    let port = MidirOutputPort::new(settings.client_name.as_str(), settings.output.clone());
    let dispatcher = Dispatcher::new(
        commands,
        translations,
        ProcessLauncher::new(),
        OutputEmitter::new(port).with_gap(settings.message_gap),
    )
    .with_cache_capacity(settings.cache_capacity);
    let worker = DispatchWorker::spawn(dispatcher, settings.queue_capacity)?;

    let sender = worker.sender();
    let input = match open_input(&settings.input_config(), move |raw, delta| {
        sender.submit(raw, delta);
    }) {
        Ok(input) => input,
        Err(e) => {
            worker.shutdown()?;
            return Err(e.into());
        }
    };

    if stop.try_recv().is_err() {
        info!("Press Ctrl-C to exit");
        let _ = stop.recv();
    }

    info!("Exiting...");
    input.close();
    let stats = worker.shutdown()?;
    info!("{}", stats);
    Ok(stats)
}
