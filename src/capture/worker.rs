//! Capture worker
//!
//! Two independent activities feed captured text to the document owner:
//!
//! - a poll thread that re-reads the clipboard every `poll_interval`
//! - a hotkey thread that, per chord press, synthesizes a copy, waits
//!   `settle_delay`, then reads the clipboard
//!
//! Both compare against one shared baseline and update it before sending, so
//! the same clipboard content is never published twice by the two paths.
//! The worker never touches the document; it only sends messages.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::chord::{ChordSource, GlobalChordSource, KeyChord};
use super::source::{ClipboardSource, SystemClipboard};
use crate::config::{Config, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SETTLE_DELAY_MS};
use crate::error::Result;
use crate::logging;

/// Longest uninterrupted sleep, so a cleared running flag is seen promptly
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Pending chord presses beyond this are dropped
const TRIGGER_CAPACITY: usize = 10;

pub const STATUS_CAPTURE_ON: &str = "Capture ON";
pub const STATUS_CAPTURE_OFF: &str = "Capture OFF";
pub const STATUS_APPENDED: &str = "Copied → appended";
pub const STATUS_NOTHING_SELECTED: &str = "No selected text found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOrigin {
    Poll,
    Hotkey,
}

impl CaptureOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureOrigin::Poll => "poll",
            CaptureOrigin::Hotkey => "hotkey",
        }
    }
}

/// Trimmed, non-empty clipboard text on its way to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    pub text: String,
    pub timestamp: Instant,
    pub origin: CaptureOrigin,
}

impl CapturedEvent {
    pub fn new(text: impl Into<String>, origin: CaptureOrigin) -> Self {
        Self {
            text: text.into(),
            timestamp: Instant::now(),
            origin,
        }
    }
}

/// Everything the worker reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    Captured(CapturedEvent),
    Status(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Stopped,
    Running,
}

#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub poll_interval: Duration,
    pub settle_delay: Duration,
    pub chord: KeyChord,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            chord: KeyChord::default(),
        }
    }
}

impl CaptureSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            poll_interval: config.poll_interval(),
            settle_delay: config.settle_delay(),
            chord: KeyChord::from_config(&config.capture_hotkey())?,
        })
    }
}

/// Shared by both capture threads.
struct Publisher<M> {
    clipboard: Arc<dyn ClipboardSource>,
    baseline: Arc<Mutex<String>>,
    outbox: mpsc::Sender<M>,
}

impl<M: From<CaptureEvent>> Publisher<M> {
    /// Publish `raw` if, once trimmed, it is non-empty and differs from the
    /// baseline. Returns whether it was published.
    fn offer(&self, raw: &str, origin: CaptureOrigin) -> bool {
        let text = raw.trim();
        if text.is_empty() {
            return false;
        }
        {
            let mut baseline = self.baseline.lock();
            if *baseline == text {
                return false;
            }
            *baseline = text.to_string();
        }

        logging::log_capture_event(origin.as_str(), text, true);
        let event = CapturedEvent::new(text, origin);
        if self.outbox.send(CaptureEvent::Captured(event).into()).is_err() {
            debug!("Capture receiver gone, dropping event");
        }
        true
    }

    fn status(&self, message: impl Into<String>) {
        let _ = self.outbox.send(CaptureEvent::Status(message.into()).into());
    }

    /// One chord press: copy, settle, read.
    fn capture_selection(&self, settle_delay: Duration) {
        if let Err(e) = self.clipboard.simulate_copy() {
            warn!(error = %e, "Copy keypress failed");
            self.status(e.user_message());
            return;
        }
        thread::sleep(settle_delay);

        match self.clipboard.read_text() {
            Ok(text) => {
                if self.offer(&text, CaptureOrigin::Hotkey) {
                    self.status(STATUS_APPENDED);
                } else {
                    self.status(STATUS_NOTHING_SELECTED);
                }
            }
            Err(e) => {
                warn!(error = %e, "Clipboard read after copy failed");
                self.status(e.user_message());
            }
        }
    }
}

/// Background capture with a `Stopped -> Running -> Stopped` lifecycle.
///
/// Generic over the outgoing message so it can feed any inbox whose message
/// type wraps [`CaptureEvent`].
pub struct CaptureWorker<M> {
    clipboard: Arc<dyn ClipboardSource>,
    chord_source: Box<dyn ChordSource>,
    settings: CaptureSettings,
    outbox: mpsc::Sender<M>,
    baseline: Arc<Mutex<String>>,
    running: Arc<AtomicBool>,
    trigger: Option<async_channel::Sender<()>>,
    poll_thread: Option<JoinHandle<()>>,
    hotkey_thread: Option<JoinHandle<()>>,
}

impl<M: From<CaptureEvent> + Send + 'static> CaptureWorker<M> {
    pub fn new(
        clipboard: Arc<dyn ClipboardSource>,
        chord_source: Box<dyn ChordSource>,
        settings: CaptureSettings,
        outbox: mpsc::Sender<M>,
    ) -> Self {
        Self {
            clipboard,
            chord_source,
            settings,
            outbox,
            baseline: Arc::new(Mutex::new(String::new())),
            running: Arc::new(AtomicBool::new(false)),
            trigger: None,
            poll_thread: None,
            hotkey_thread: None,
        }
    }

    /// Worker on the OS clipboard and an OS-wide chord.
    pub fn system(settings: CaptureSettings, outbox: mpsc::Sender<M>) -> Self {
        Self::new(
            Arc::new(SystemClipboard::new()),
            Box::new(GlobalChordSource::new()),
            settings,
            outbox,
        )
    }

    pub fn state(&self) -> WorkerState {
        if self.running.load(Ordering::Relaxed) {
            WorkerState::Running
        } else {
            WorkerState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == WorkerState::Running
    }

    fn publisher(&self) -> Publisher<M> {
        Publisher {
            clipboard: self.clipboard.clone(),
            baseline: self.baseline.clone(),
            outbox: self.outbox.clone(),
        }
    }

    /// Begin polling and listening. No-op while already running.
    pub fn start(&mut self) {
        if self.is_running() {
            debug!("Capture worker already running");
            return;
        }

        let baseline = match self.clipboard.read_text() {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "Could not read clipboard baseline, using empty");
                String::new()
            }
        };
        *self.baseline.lock() = baseline;
        self.running.store(true, Ordering::Relaxed);

        let publisher = self.publisher();
        let running = self.running.clone();
        let interval = self.settings.poll_interval;
        self.poll_thread = spawn_named("capture-poll", move || {
            poll_loop(publisher, running, interval)
        });

        let (trigger_tx, trigger_rx) = async_channel::bounded::<()>(TRIGGER_CAPACITY);
        match self
            .chord_source
            .register(&self.settings.chord, trigger_tx.clone())
        {
            Ok(()) => {
                let publisher = self.publisher();
                let running = self.running.clone();
                let settle = self.settings.settle_delay;
                self.hotkey_thread = spawn_named("capture-hotkey", move || {
                    hotkey_loop(publisher, trigger_rx, running, settle)
                });
                self.trigger = Some(trigger_tx);
            }
            Err(e) => {
                // Polling still works without the chord
                warn!(error = %e, chord = %self.settings.chord.display(), "Capture hotkey unavailable");
                self.publisher().status(e.user_message());
            }
        }

        info!(
            poll_interval_ms = self.settings.poll_interval.as_millis() as u64,
            chord = %self.settings.chord.display(),
            "Capture worker started"
        );
        self.publisher().status(STATUS_CAPTURE_ON);
    }

    /// Stop both activities and wait for their threads. No-op while stopped.
    pub fn stop(&mut self) {
        if !self.halt() {
            return;
        }
        info!("Capture worker stopped");
        self.publisher().status(STATUS_CAPTURE_OFF);
    }
}

impl<M> CaptureWorker<M> {
    /// Clear the running flag, release the chord, join both threads.
    /// Returns false if the worker was not running.
    fn halt(&mut self) -> bool {
        if !self.running.swap(false, Ordering::Relaxed) {
            return false;
        }
        self.chord_source.unregister();
        if let Some(trigger) = self.trigger.take() {
            trigger.close();
        }
        for handle in [self.poll_thread.take(), self.hotkey_thread.take()]
            .into_iter()
            .flatten()
        {
            if handle.join().is_err() {
                warn!("Capture thread panicked");
            }
        }
        true
    }
}

impl<M> Drop for CaptureWorker<M> {
    fn drop(&mut self) {
        self.halt();
    }
}

fn spawn_named<F>(name: &str, body: F) -> Option<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    match thread::Builder::new().name(name.to_string()).spawn(body) {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, thread = name, "Failed to spawn capture thread");
            None
        }
    }
}

/// Sleep up to `total`, waking early once `running` is cleared.
/// Returns whether the worker is still running.
fn sleep_while_running(running: &AtomicBool, total: Duration) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if !running.load(Ordering::Relaxed) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}

fn poll_loop<M: From<CaptureEvent>>(
    publisher: Publisher<M>,
    running: Arc<AtomicBool>,
    interval: Duration,
) {
    debug!(interval_ms = interval.as_millis() as u64, "Clipboard poll loop started");
    // Report a failure once per streak rather than every interval
    let mut last_error: Option<String> = None;

    while sleep_while_running(&running, interval) {
        match publisher.clipboard.read_text() {
            Ok(text) => {
                last_error = None;
                publisher.offer(&text, CaptureOrigin::Poll);
            }
            Err(e) => {
                let message = e.user_message();
                if last_error.as_deref() != Some(message.as_str()) {
                    warn!(error = %e, "Clipboard poll failed");
                    publisher.status(message.clone());
                    last_error = Some(message);
                }
            }
        }
    }
    debug!("Clipboard poll loop exited");
}

fn hotkey_loop<M: From<CaptureEvent>>(
    publisher: Publisher<M>,
    triggers: async_channel::Receiver<()>,
    running: Arc<AtomicBool>,
    settle_delay: Duration,
) {
    while triggers.recv_blocking().is_ok() {
        if !running.load(Ordering::Relaxed) {
            break;
        }
        publisher.capture_selection(settle_delay);
    }
    debug!("Hotkey capture loop exited");
}
