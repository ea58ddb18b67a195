//! Tiny Timer - a countdown timer driven from the terminal
//!
//! This is the main entry point for the tiny-timer application. Each stdin
//! line is a command (`start`, `stop`, `lap`, `set 05:00`, ...) and every
//! timer event is printed to stdout.

use std::io::{self, BufReader};

use anyhow::Context;
use tokio::{runtime::Handle, sync::mpsc};
use tracing::{debug, info, warn};

use tiny_timer::{
    config::Config,
    state::CountdownController,
    tasks::{
        event_printer_task, lap_report, run_control_loop, spawn_command_reader, tick_forwarder,
        Command, RepeatingTimer,
    },
    utils::{parse_seconds, shutdown_signal},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so stdout only carries timer output
    tracing_subscriber::fmt()
        .with_env_filter(format!("tiny_timer={}", config.log_level()))
        .with_writer(io::stderr)
        .init();

    info!("Starting tiny-timer v0.3.0");
    let target = parse_seconds(&config.duration).context("invalid --duration")?;

    // Timer fires join user commands on the same serial queue
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let timer = RepeatingTimer::new(
        config.tick_interval(),
        &Handle::current(),
        tick_forwarder(command_tx.clone()),
    )?;
    info!("Configuration: duration={}, tick interval={:?}", config.duration, timer.interval());

    let mut controller = CountdownController::new(timer);
    controller.set_target(target)?;

    let printer = tokio::spawn(event_printer_task(controller.subscribe(), config.json));
    let mut control = tokio::spawn(run_control_loop(controller, command_rx));

    // Not joined: a pending stdin read must not hold up shutdown
    spawn_command_reader(BufReader::new(io::stdin()), command_tx.clone())
        .context("failed to start command reader")?;
    info!("Commands: start, stop, toggle, lap, laps, clear, enter, leave, set <HH:MM:SS>, quit");

    let signalled = async {
        match shutdown_signal().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => {
                warn!("Signal handling unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    let laps = tokio::select! {
        joined = &mut control => joined.context("control loop panicked")?,
        _ = signalled => {
            if command_tx.send(Command::Shutdown).is_err() {
                debug!("Control loop already stopped");
            }
            control.await.context("control loop panicked")?
        }
    };
    printer.await.context("event printer panicked")?;

    if !laps.is_empty() {
        print!("{}", lap_report(&laps));
    }

    info!("Shutdown complete");
    Ok(())
}
