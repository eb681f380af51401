//! Global key chord parsing and registration.

use global_hotkey::{
    hotkey::{Code, HotKey, Modifiers},
    Error as HotkeyError, GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::HotkeyConfig;
use crate::error::{NotesError, Result};

/// How often the listener thread checks its stop flag
const LISTENER_POLL_MS: u64 = 100;

/// A parsed modifier set plus key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    modifiers: Modifiers,
    code: Code,
    display: String,
}

impl KeyChord {
    /// Parse a chord from config. Unknown modifiers or keys are rejected.
    pub fn from_config(config: &HotkeyConfig) -> Result<Self> {
        let mut modifiers = Modifiers::empty();
        for modifier in &config.modifiers {
            modifiers |= parse_modifier(modifier)
                .ok_or_else(|| NotesError::Hotkey(format!("unknown modifier '{}'", modifier)))?;
        }
        let code = parse_code(&config.key).ok_or_else(|| {
            NotesError::Hotkey(format!(
                "unknown key '{}'. Valid keys: KeyA-KeyZ, Digit0-Digit9, F1-F12, Space, Enter, Semicolon",
                config.key
            ))
        })?;

        Ok(Self {
            modifiers,
            code,
            display: config.display(),
        })
    }

    pub fn hotkey(&self) -> HotKey {
        HotKey::new(Some(self.modifiers), self.code)
    }

    pub fn display(&self) -> &str {
        &self.display
    }
}

impl Default for KeyChord {
    /// Ctrl+Shift+S
    fn default() -> Self {
        Self {
            modifiers: Modifiers::CONTROL | Modifiers::SHIFT,
            code: Code::KeyS,
            display: HotkeyConfig::default_capture_hotkey().display(),
        }
    }
}

pub fn parse_modifier(name: &str) -> Option<Modifiers> {
    match name.to_ascii_lowercase().as_str() {
        "ctrl" | "control" => Some(Modifiers::CONTROL),
        "shift" => Some(Modifiers::SHIFT),
        "alt" | "option" => Some(Modifiers::ALT),
        "meta" | "cmd" | "super" => Some(Modifiers::META),
        _ => None,
    }
}

pub fn parse_code(name: &str) -> Option<Code> {
    let code = match name {
        "KeyA" => Code::KeyA,
        "KeyB" => Code::KeyB,
        "KeyC" => Code::KeyC,
        "KeyD" => Code::KeyD,
        "KeyE" => Code::KeyE,
        "KeyF" => Code::KeyF,
        "KeyG" => Code::KeyG,
        "KeyH" => Code::KeyH,
        "KeyI" => Code::KeyI,
        "KeyJ" => Code::KeyJ,
        "KeyK" => Code::KeyK,
        "KeyL" => Code::KeyL,
        "KeyM" => Code::KeyM,
        "KeyN" => Code::KeyN,
        "KeyO" => Code::KeyO,
        "KeyP" => Code::KeyP,
        "KeyQ" => Code::KeyQ,
        "KeyR" => Code::KeyR,
        "KeyS" => Code::KeyS,
        "KeyT" => Code::KeyT,
        "KeyU" => Code::KeyU,
        "KeyV" => Code::KeyV,
        "KeyW" => Code::KeyW,
        "KeyX" => Code::KeyX,
        "KeyY" => Code::KeyY,
        "KeyZ" => Code::KeyZ,
        "Digit0" => Code::Digit0,
        "Digit1" => Code::Digit1,
        "Digit2" => Code::Digit2,
        "Digit3" => Code::Digit3,
        "Digit4" => Code::Digit4,
        "Digit5" => Code::Digit5,
        "Digit6" => Code::Digit6,
        "Digit7" => Code::Digit7,
        "Digit8" => Code::Digit8,
        "Digit9" => Code::Digit9,
        "F1" => Code::F1,
        "F2" => Code::F2,
        "F3" => Code::F3,
        "F4" => Code::F4,
        "F5" => Code::F5,
        "F6" => Code::F6,
        "F7" => Code::F7,
        "F8" => Code::F8,
        "F9" => Code::F9,
        "F10" => Code::F10,
        "F11" => Code::F11,
        "F12" => Code::F12,
        "Space" => Code::Space,
        "Enter" => Code::Enter,
        "Semicolon" => Code::Semicolon,
        _ => return None,
    };
    Some(code)
}

/// Delivers presses of one key chord as `()` messages.
pub trait ChordSource: Send {
    /// Start listening. Each press sends `()` on `trigger`.
    fn register(&mut self, chord: &KeyChord, trigger: async_channel::Sender<()>) -> Result<()>;

    /// Stop listening. Safe to call when nothing is registered.
    fn unregister(&mut self);
}

/// OS-wide hotkey through `global-hotkey`.
///
/// The manager lives on its own listener thread for its whole lifetime; the
/// thread unregisters the chord and exits once the stop flag is raised.
#[derive(Default)]
pub struct GlobalChordSource {
    stop: Option<Arc<AtomicBool>>,
    listener: Option<JoinHandle<()>>,
}

impl GlobalChordSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChordSource for GlobalChordSource {
    fn register(&mut self, chord: &KeyChord, trigger: async_channel::Sender<()>) -> Result<()> {
        self.unregister();

        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let hotkey = chord.hotkey();
        let shortcut = chord.display().to_string();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();

        let listener = thread::Builder::new()
            .name("capture-hotkey-listener".into())
            .spawn(move || listen(hotkey, shortcut, trigger, stop_flag, ready_tx))
            .map_err(|e| NotesError::Hotkey(format!("failed to spawn listener: {}", e)))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.stop = Some(stop);
                self.listener = Some(listener);
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = listener.join();
                Err(e)
            }
            Err(_) => {
                let _ = listener.join();
                Err(NotesError::Hotkey("listener exited during registration".into()))
            }
        }
    }

    fn unregister(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop.store(true, Ordering::Relaxed);
        }
        if let Some(listener) = self.listener.take() {
            let _ = listener.join();
        }
    }
}

impl Drop for GlobalChordSource {
    fn drop(&mut self) {
        self.unregister();
    }
}

fn listen(
    hotkey: HotKey,
    shortcut: String,
    trigger: async_channel::Sender<()>,
    stop: Arc<AtomicBool>,
    ready: mpsc::Sender<Result<()>>,
) {
    let manager = match GlobalHotKeyManager::new() {
        Ok(manager) => manager,
        Err(e) => {
            let _ = ready.send(Err(NotesError::Hotkey(format!(
                "failed to create hotkey manager: {}",
                e
            ))));
            return;
        }
    };

    if let Err(e) = manager.register(hotkey) {
        let _ = ready.send(Err(NotesError::Hotkey(format_hotkey_error(&e, &shortcut))));
        return;
    }

    let hotkey_id = hotkey.id();
    info!(hotkey = %shortcut, id = hotkey_id, "Registered capture hotkey");
    let _ = ready.send(Ok(()));

    let receiver = GlobalHotKeyEvent::receiver();
    while !stop.load(Ordering::Relaxed) {
        let Ok(event) = receiver.recv_timeout(Duration::from_millis(LISTENER_POLL_MS)) else {
            continue;
        };
        // Only respond to key PRESS, not release
        if event.id != hotkey_id || event.state != HotKeyState::Pressed {
            continue;
        }
        debug!(hotkey = %shortcut, "Capture hotkey pressed");
        if trigger.try_send(()).is_err() {
            debug!("Hotkey trigger channel full or closed, dropping press");
        }
    }

    if let Err(e) = manager.unregister(hotkey) {
        warn!(error = %e, hotkey = %shortcut, "Failed to unregister capture hotkey");
    } else {
        info!(hotkey = %shortcut, "Unregistered capture hotkey");
    }
}

/// Format a hotkey registration error with helpful context
fn format_hotkey_error(e: &HotkeyError, shortcut: &str) -> String {
    match e {
        HotkeyError::AlreadyRegistered(hk) => format!(
            "'{}' is already registered by another application (ID: {})",
            shortcut,
            hk.id()
        ),
        HotkeyError::FailedToRegister(msg) => {
            format!("system rejected '{}': {}", shortcut, msg)
        }
        HotkeyError::OsError(os_err) => format!("OS error registering '{}': {}", shortcut, os_err),
        other => format!("failed to register '{}': {}", shortcut, other),
    }
}
