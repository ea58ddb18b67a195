//! Command reader thread
//!
//! A blocking stdin read cannot be cancelled, so commands are read on a
//! plain OS thread that the runtime never waits for. The process can exit on
//! a signal while a read is still pending.

use std::{
    io::{self, BufRead},
    thread,
};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use super::Command;

/// Spawn a thread that forwards parsed command lines from `input`
pub fn spawn_command_reader<R>(
    input: R,
    commands: UnboundedSender<Command>,
) -> io::Result<thread::JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("command-reader".to_string())
        .spawn(move || read_commands(input, &commands))
}

/// Forward commands until `quit`, end of input, or a closed queue.
///
/// End of input is turned into a shutdown request.
pub fn read_commands<R: BufRead>(input: R, commands: &UnboundedSender<Command>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read command input: {}", e);
                break;
            }
        };

        match line.parse::<Command>() {
            Ok(command) => {
                if let Err(e) = commands.send(command) {
                    debug!("Control loop is gone, dropping {:?}", e.0);
                    return;
                }
                if command == Command::Shutdown {
                    return;
                }
            }
            Err(e) => warn!("{}", e),
        }
    }

    debug!("Command input closed");
    if commands.send(Command::Shutdown).is_err() {
        debug!("Control loop already stopped");
    }
}
