//! Document-owning thread.
//!
//! The engine is moved into one thread and only ever touched there. Capture
//! events and client commands arrive over a single `mpsc` inbox, so a
//! captured insert can never interleave with a local edit. Between messages
//! the loop sleeps until the autosave deadline, if one is armed.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, info, warn};

use super::engine::{CaptureOutcome, DocumentEngine, DocumentSnapshot};
use crate::capture::CaptureEvent;
use crate::error::{ErrorSeverity, NotesError, ResultExt};
use crate::highlights::AddOutcome;
use crate::logging;

/// Requests from a client (the CLI, a GUI) to the document owner.
#[derive(Debug)]
pub enum DocumentCommand {
    Open(String),
    Edit {
        start: usize,
        end: usize,
        text: String,
    },
    InsertSeparator(Option<usize>),
    Undo,
    Redo,
    AddHighlight {
        start: usize,
        end: usize,
        color: String,
    },
    ClearHighlights {
        start: usize,
        end: usize,
    },
    Save,
    Snapshot(Sender<DocumentSnapshot>),
}

#[derive(Debug)]
pub enum DocumentMessage {
    Capture(CaptureEvent),
    Command(DocumentCommand),
    Shutdown,
}

impl From<CaptureEvent> for DocumentMessage {
    fn from(event: CaptureEvent) -> Self {
        DocumentMessage::Capture(event)
    }
}

impl From<DocumentCommand> for DocumentMessage {
    fn from(command: DocumentCommand) -> Self {
        DocumentMessage::Command(command)
    }
}

pub struct DocumentActor {
    engine: DocumentEngine,
    inbox: Receiver<DocumentMessage>,
}

impl DocumentActor {
    /// The actor plus the sender used to reach it.
    pub fn new(engine: DocumentEngine) -> (Self, Sender<DocumentMessage>) {
        let (tx, rx) = mpsc::channel();
        (Self { engine, inbox: rx }, tx)
    }

    /// Run on a dedicated thread. Joining yields the engine back.
    pub fn spawn(self) -> std::io::Result<JoinHandle<DocumentEngine>> {
        thread::Builder::new()
            .name("document-owner".into())
            .spawn(move || self.run())
    }

    /// Process messages until `Shutdown` or until every sender is gone,
    /// then flush pending changes and return the engine.
    pub fn run(mut self) -> DocumentEngine {
        info!("Document owner started");
        loop {
            let message = match self.engine.autosave_deadline() {
                Some(deadline) => {
                    let wait = deadline.saturating_duration_since(Instant::now());
                    match self.inbox.recv_timeout(wait) {
                        Ok(message) => Some(message),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match self.inbox.recv() {
                    Ok(message) => Some(message),
                    Err(_) => break,
                },
            };

            match message {
                Some(DocumentMessage::Shutdown) => break,
                Some(DocumentMessage::Capture(event)) => self.handle_capture(event),
                Some(DocumentMessage::Command(command)) => self.handle_command(command),
                None => {}
            }

            match self.engine.tick(Instant::now()) {
                Ok(true) => logging::status("Autosaved."),
                Ok(false) => {}
                Err(e) => report(&e),
            }
        }

        if let Err(e) = self.engine.flush() {
            report(&e);
        }
        info!("Document owner stopped");
        self.engine
    }

    fn handle_capture(&mut self, event: CaptureEvent) {
        match event {
            CaptureEvent::Status(message) => logging::status(&message),
            CaptureEvent::Captured(captured) => {
                match self.engine.accept_capture(&captured, Instant::now()) {
                    Ok(CaptureOutcome::Inserted { chars }) => {
                        debug!(chars, origin = captured.origin.as_str(), "Capture appended");
                    }
                    Ok(CaptureOutcome::Duplicate) => {}
                    Err(e) => report(&e),
                }
            }
        }
    }

    fn handle_command(&mut self, command: DocumentCommand) {
        let now = Instant::now();
        let result = match command {
            DocumentCommand::Open(name) => self.engine.open(&name).map(|handle| {
                logging::status(&format!("Opened: {}", handle.file_name()));
            }),
            DocumentCommand::Edit { start, end, text } => {
                self.engine.apply_edit(start, end, &text, now)
            }
            DocumentCommand::InsertSeparator(at) => self.engine.insert_separator(at, now),
            DocumentCommand::Undo => self.engine.undo(now).map(|_| ()),
            DocumentCommand::Redo => self.engine.redo(now).map(|_| ()),
            DocumentCommand::AddHighlight { start, end, color } => self
                .engine
                .add_highlight(start, end, &color)
                .map(|outcome| {
                    if outcome == AddOutcome::AlreadyPresent {
                        debug!(start, end, color = %color, "Highlight already present");
                    }
                }),
            DocumentCommand::ClearHighlights { start, end } => {
                self.engine.clear_highlights(start, end).map(|removed| {
                    debug!(removed, "Highlights cleared");
                })
            }
            DocumentCommand::Save => self.engine.save_now("manual"),
            DocumentCommand::Snapshot(reply) => {
                if reply.send(self.engine.snapshot()).is_err() {
                    debug!("Snapshot requester went away");
                }
                Ok(())
            }
        };

        if let Err(e) = result {
            report(&e);
        }
    }
}

/// Log a failed operation and put it on the status line. Nothing here is
/// fatal to the loop.
fn report(error: &NotesError) {
    match error.severity() {
        ErrorSeverity::Info => debug!(error = %error, "Recovered"),
        _ => warn!(error = %error, kind = ?error.kind(), "Document operation failed"),
    }
    logging::status_error(error.kind().as_str(), &error.user_message());
}

/// Ask a running actor for a snapshot and wait for it.
pub fn request_snapshot(inbox: &Sender<DocumentMessage>) -> Option<DocumentSnapshot> {
    let (tx, rx) = mpsc::channel();
    inbox
        .send(DocumentCommand::Snapshot(tx).into())
        .warn_on_err()?;
    rx.recv().warn_on_err()
}
