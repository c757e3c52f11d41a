use tracing::debug;

use crate::commands::executable::Executable;
use crate::commands::{Command, CommandError};
use crate::frame::Frame;
use crate::store::Store;

/// Per-client command state. It owns the transaction queue opened by `MULTI`, every other command
/// goes straight to the store.
#[derive(Debug, Default)]
pub struct Session {
    // `Some` while a transaction is open.
    queue: Option<Vec<Command>>,
    // Set when a command failed validation inside the open transaction.
    tainted: bool,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    pub fn is_queuing(&self) -> bool {
        self.queue.is_some()
    }

    /// Handles one request frame and returns the reply to send back.
    pub fn handle(&mut self, frame: Frame, store: &Store) -> Frame {
        let command = Command::try_from(frame);

        let Some(queue) = self.queue.as_mut() else {
            return match command {
                Ok(Command::Multi) => self.multi(),
                Ok(Command::Exec) => CommandError::ExecWithoutMulti.into(),
                Ok(command) => execute(command, store),
                Err(err) => err.into(),
            };
        };

        match command {
            Ok(Command::Multi) => self.multi(),
            Ok(Command::Exec) => self.exec(store),
            Ok(command) => {
                debug!(command = command.name(), "Queued command");
                queue.push(command);
                Frame::Simple("QUEUED".to_string())
            }
            Err(err) => {
                debug!("Transaction tainted: {}", err);
                queue.clear();
                self.tainted = true;
                err.into()
            }
        }
    }

    // Opening a transaction while one is open starts over.
    fn multi(&mut self) -> Frame {
        self.queue = Some(Vec::new());
        self.tainted = false;
        Frame::Simple("OK".to_string())
    }

    fn exec(&mut self, store: &Store) -> Frame {
        let queue = self.queue.take().unwrap_or_default();

        if std::mem::take(&mut self.tainted) {
            return CommandError::ExecAbort.into();
        }

        debug!(commands = queue.len(), "Executing transaction");
        let replies = queue
            .into_iter()
            .map(|command| execute(command, store))
            .collect();

        Frame::Array(replies)
    }
}

fn execute(command: Command, store: &Store) -> Frame {
    let mutates = command.mutates();

    match command.exec(store.clone()) {
        Ok(frame) => {
            if mutates {
                store.lock().record_change();
            }
            frame
        }
        Err(err) => err.into(),
    }
}
