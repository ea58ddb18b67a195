//! Serial control queue for a countdown controller
//!
//! User actions and timer fires arrive as [`Command`] values on one channel
//! and are applied in order by a single task, so the controller never sees
//! two operations at once.

use std::str::FromStr;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    error::InvalidClock,
    state::{CountdownController, LapRecord},
    tasks::{event_printer::lap_report, TickSource},
    utils::clock::parse_seconds,
};

/// An operation queued for the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetTarget(i64),
    Start,
    Stop,
    Toggle,
    Tick,
    RecordLap,
    ClearLaps,
    /// Hand the laps to the lap view and take them back when it closes
    ReviewLaps,
    PointerEntered,
    PointerExited,
    Shutdown,
}

impl FromStr for Command {
    type Err = InvalidCommand;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let word = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts.next();

        let command = match (word.as_str(), arg) {
            ("set", Some(clock)) => Command::SetTarget(parse_seconds(clock)?),
            ("start", None) => Command::Start,
            ("stop", None) => Command::Stop,
            ("toggle", None) | ("", None) => Command::Toggle,
            ("lap", None) => Command::RecordLap,
            ("clear", None) => Command::ClearLaps,
            ("laps", None) => Command::ReviewLaps,
            ("enter", None) => Command::PointerEntered,
            ("leave", None) => Command::PointerExited,
            ("quit", None) | ("exit", None) => Command::Shutdown,
            _ => return Err(InvalidCommand::Unknown(line.trim().to_string())),
        };

        if parts.next().is_some() {
            return Err(InvalidCommand::Unknown(line.trim().to_string()));
        }
        Ok(command)
    }
}

/// Why a command line could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidCommand {
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error(transparent)]
    Clock(#[from] InvalidClock),
}

/// Timer callback that queues a tick for the control loop
pub fn tick_forwarder(commands: mpsc::UnboundedSender<Command>) -> impl FnMut() + Send + 'static {
    move || {
        if let Err(e) = commands.send(Command::Tick) {
            debug!("Failed to queue tick, control loop is gone: {}", e);
        }
    }
}

/// Apply queued commands until the queue closes or a shutdown arrives.
///
/// Returns the lap sequence held by the controller at exit. The controller,
/// and with it its timer, is dropped when this returns.
pub async fn run_control_loop<T: TickSource>(
    mut controller: CountdownController<T>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) -> Vec<LapRecord> {
    info!("Starting control loop");

    while let Some(command) = commands.recv().await {
        debug!("Control loop received {:?}", command);
        if command == Command::Shutdown {
            info!("Control loop shutting down");
            break;
        }
        apply(&mut controller, command);
    }

    controller.stop();
    controller.take_laps()
}

/// Apply one command. Rejections are logged, never propagated.
pub fn apply<T: TickSource>(controller: &mut CountdownController<T>, command: Command) {
    let result = match command {
        Command::SetTarget(seconds) => controller.set_target(seconds),
        Command::Start => controller.start().map(|_| ()),
        Command::Stop => {
            controller.stop();
            Ok(())
        }
        Command::Toggle => controller.toggle().map(|_| ()),
        Command::Tick => match controller.tick() {
            Ok(_) => Ok(()),
            Err(e) => {
                // A fire queued just before a stop lands here
                debug!("Ignoring late tick: {}", e);
                Ok(())
            }
        },
        Command::RecordLap => controller.record_lap().map(|_| ()),
        Command::ClearLaps => {
            controller.clear_laps();
            Ok(())
        }
        Command::ReviewLaps => {
            let laps = controller.take_laps();
            print!("{}", lap_report(&laps));
            controller.restore_laps(laps);
            Ok(())
        }
        Command::PointerEntered => {
            controller.pointer_entered();
            Ok(())
        }
        Command::PointerExited => {
            controller.pointer_exited();
            Ok(())
        }
        Command::Shutdown => Ok(()),
    };

    if let Err(e) = result {
        warn!("Rejected {:?}: {}", command, e);
    }
}
