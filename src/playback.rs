//! Playback engine: commands, state and live settings.
//!
//! The engine owns at most one session at a time. Commands only flip state
//! shared with the session's [`PlaybackTask`]; all frame production happens
//! in that task, which the caller drives on its own executor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;

use crate::highlight::{self, MarkedText};
use crate::task::{PlaybackTask, Snapshot};
use crate::TextBuffer;

/// Default delay between per-character ticks.
pub const DEFAULT_CHAR_DELAY: Duration = Duration::from_millis(20);
/// Default delay between per-line ticks.
pub const DEFAULT_LINE_DELAY: Duration = Duration::from_millis(150);
/// How often a paused session re-checks its state.
pub const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Upper bound for the per-character delay, in milliseconds.
pub const MAX_CHAR_DELAY_MS: u64 = 100;
/// Upper bound for the per-line delay, in milliseconds.
pub const MAX_LINE_DELAY_MS: u64 = 600;
/// Upper bound for characters revealed per tick.
pub const MAX_CHARS_PER_TICK: usize = 15;

#[inline]
pub(crate) fn clamp_char_delay(delay: Duration) -> Duration {
    delay.min(Duration::from_millis(MAX_CHAR_DELAY_MS))
}

#[inline]
pub(crate) fn clamp_line_delay(delay: Duration) -> Duration {
    delay.min(Duration::from_millis(MAX_LINE_DELAY_MS))
}

#[inline]
pub(crate) fn clamp_chars_per_tick(count: usize) -> usize {
    count.clamp(1, MAX_CHARS_PER_TICK)
}

/// Unit revealed on each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PlaybackMode {
    /// Reveal one (or a batch of) character(s) per tick
    #[default]
    PerCharacter,
    /// Reveal one line per tick
    PerLine,
}

/// Current state of the playback session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// No session
    #[default]
    Idle,
    /// Frames are being produced
    Running,
    /// Session is held at its current position
    Paused,
    /// Session was cancelled before the end
    Stopped,
    /// The whole snapshot was revealed
    Completed,
}

impl PlaybackStatus {
    /// Check if a tick loop is still alive for this status.
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, PlaybackStatus::Running | PlaybackStatus::Paused)
    }
}

/// Error type for playback commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// Play was requested while the source text is empty or whitespace only
    #[error("nothing to play: paste or load some text first")]
    EmptyInput,
}

/// Settings read fresh by the tick loop on every tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaybackSettings {
    /// Delay after each per-character tick
    pub char_delay: Duration,
    /// Delay after each per-line tick
    pub line_delay: Duration,
    /// Characters revealed per tick in per-character mode
    pub chars_per_tick: usize,
    /// Search term highlighted in every frame
    pub highlight_term: String,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            char_delay: DEFAULT_CHAR_DELAY,
            line_delay: DEFAULT_LINE_DELAY,
            chars_per_tick: 1,
            highlight_term: String::new(),
        }
    }
}

impl PlaybackSettings {
    /// Delay to wait after a tick in the given mode.
    #[inline]
    pub fn delay_for(&self, mode: PlaybackMode) -> Duration {
        match mode {
            PlaybackMode::PerCharacter => self.char_delay,
            PlaybackMode::PerLine => self.line_delay,
        }
    }

    /// Number of units a tick advances in the given mode.
    #[inline]
    pub fn units_per_tick(&self, mode: PlaybackMode) -> usize {
        match mode {
            PlaybackMode::PerCharacter => self.chars_per_tick.max(1),
            PlaybackMode::PerLine => 1,
        }
    }
}

/// Everything a Play command carries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaybackOptions {
    /// Mode, fixed for the whole session
    pub mode: PlaybackMode,
    /// Initial live settings
    pub settings: PlaybackSettings,
}

impl PlaybackOptions {
    /// Per-character options with default settings.
    pub fn per_character() -> Self {
        Self::default()
    }

    /// Per-line options with default settings.
    pub fn per_line() -> Self {
        Self {
            mode: PlaybackMode::PerLine,
            ..Self::default()
        }
    }

    /// Set the per-character delay.
    pub fn with_char_delay(mut self, delay: Duration) -> Self {
        self.settings.char_delay = clamp_char_delay(delay);
        self
    }

    /// Set the per-line delay.
    pub fn with_line_delay(mut self, delay: Duration) -> Self {
        self.settings.line_delay = clamp_line_delay(delay);
        self
    }

    /// Set how many characters a per-character tick reveals.
    pub fn with_chars_per_tick(mut self, count: usize) -> Self {
        self.settings.chars_per_tick = clamp_chars_per_tick(count);
        self
    }

    /// Set the highlight term.
    pub fn with_highlight_term(mut self, term: impl Into<String>) -> Self {
        self.settings.highlight_term = term.into();
        self
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mutable part of a session, shared between commands and the tick loop.
#[derive(Debug)]
pub(crate) struct SessionState {
    pub(crate) status: PlaybackStatus,
    pub(crate) cursor: usize,
    pub(crate) animated_output: Option<String>,
}

/// One Play-to-finish run over a fixed snapshot.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) mode: PlaybackMode,
    pub(crate) total: usize,
    cancel: AtomicBool,
    pub(crate) state: Mutex<SessionState>,
}

impl Session {
    fn new(mode: PlaybackMode, total: usize) -> Self {
        Self {
            mode,
            total,
            cancel: AtomicBool::new(false),
            state: Mutex::new(SessionState {
                status: PlaybackStatus::Running,
                cursor: 0,
                animated_output: None,
            }),
        }
    }

    pub(crate) fn request_cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    #[inline]
    pub(crate) fn cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }
}

/// Result of a Play command.
#[derive(Debug)]
pub enum PlayOutcome {
    /// A new session was armed; drive the task to produce frames
    Started(PlaybackTask),
    /// A paused session continues
    Resumed,
    /// A session is already running; nothing changed
    AlreadyRunning,
}

impl PlayOutcome {
    /// Take the task of a newly started session.
    pub fn into_task(self) -> Option<PlaybackTask> {
        match self {
            PlayOutcome::Started(task) => Some(task),
            _ => None,
        }
    }
}

/// Typewriter playback engine.
///
/// One engine belongs to one document. Play captures a snapshot of the
/// buffer and hands back a [`PlaybackTask`] that produces the frames; every
/// other command takes effect on that task's next tick.
///
/// ## Example
///
/// ```rust
/// use rapstar_core::{PlaybackEngine, PlaybackOptions, PlaybackStatus, TextBuffer, VirtualTimer};
///
/// let buffer = TextBuffer::with_text("Hi\nYo");
/// let mut engine = PlaybackEngine::new();
///
/// let task = engine
///     .play(&buffer, PlaybackOptions::per_line())
///     .unwrap()
///     .into_task()
///     .unwrap();
/// assert_eq!(engine.status(), PlaybackStatus::Running);
///
/// let mut frames = Vec::new();
/// let timer = VirtualTimer::new();
/// pollster::block_on(task.run(&timer, |frame| frames.push(frame)));
///
/// assert_eq!(frames.len(), 2);
/// assert_eq!(frames[1].plain(), "Hi\nYo");
/// assert_eq!(engine.status(), PlaybackStatus::Completed);
/// ```
#[derive(Debug, Default)]
pub struct PlaybackEngine {
    settings: Arc<Mutex<PlaybackSettings>>,
    session: Option<Arc<Session>>,
}

impl PlaybackEngine {
    /// Create an idle engine with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an idle engine with the given settings.
    pub fn with_settings(settings: PlaybackSettings) -> Self {
        Self {
            settings: Arc::new(Mutex::new(settings)),
            session: None,
        }
    }

    /// Start playback of the buffer's current text.
    ///
    /// Ignored while a session is running, resumes a paused session, and
    /// refuses blank text with [`PlaybackError::EmptyInput`] without
    /// changing state.
    pub fn play(&mut self, buffer: &TextBuffer, options: PlaybackOptions) -> Result<PlayOutcome, PlaybackError> {
        if let Some(session) = &self.session {
            if !session.cancel_requested() {
                let mut state = lock(&session.state);
                match state.status {
                    PlaybackStatus::Running => {
                        tracing::debug!("play ignored: session already running");
                        return Ok(PlayOutcome::AlreadyRunning);
                    }
                    PlaybackStatus::Paused => {
                        state.status = PlaybackStatus::Running;
                        tracing::debug!(cursor = state.cursor, "playback resumed");
                        return Ok(PlayOutcome::Resumed);
                    }
                    _ => {}
                }
            }
        }

        if buffer.is_blank() {
            tracing::warn!("play refused: source text is blank");
            return Err(PlaybackError::EmptyInput);
        }

        if let Some(previous) = self.session.take() {
            previous.request_cancel();
        }

        let PlaybackOptions { mode, settings } = options;
        *lock(&self.settings) = settings;

        let snapshot = Snapshot::capture(buffer.text(), mode);
        let session = Arc::new(Session::new(mode, snapshot.len()));
        tracing::debug!(?mode, units = snapshot.len(), "playback started");
        self.session = Some(Arc::clone(&session));

        Ok(PlayOutcome::Started(PlaybackTask::new(
            session,
            Arc::clone(&self.settings),
            snapshot,
        )))
    }

    /// Request the running session to stop.
    ///
    /// The tick loop observes the request before its next frame.
    pub fn stop(&self) {
        if let Some(session) = &self.session {
            if lock(&session.state).status.is_active() {
                session.request_cancel();
                tracing::debug!("stop requested");
            }
        }
    }

    /// Hold a running session at its current position.
    pub fn pause(&self) {
        if let Some(session) = &self.session {
            let mut state = lock(&session.state);
            if state.status == PlaybackStatus::Running && !session.cancel_requested() {
                state.status = PlaybackStatus::Paused;
                tracing::debug!(cursor = state.cursor, "playback paused");
            }
        }
    }

    /// Continue a paused session.
    ///
    /// Returns `true` if a paused session was resumed.
    pub fn resume(&self) -> bool {
        if let Some(session) = &self.session {
            let mut state = lock(&session.state);
            if state.status == PlaybackStatus::Paused && !session.cancel_requested() {
                state.status = PlaybackStatus::Running;
                tracing::debug!(cursor = state.cursor, "playback resumed");
                return true;
            }
        }
        false
    }

    /// Toggle between running and paused.
    pub fn toggle_pause(&self) {
        match self.status() {
            PlaybackStatus::Running => self.pause(),
            PlaybackStatus::Paused => {
                self.resume();
            }
            _ => {}
        }
    }

    /// Cancel any session and return to idle at position zero.
    pub fn reset(&mut self) {
        if let Some(session) = self.session.take() {
            session.request_cancel();
            tracing::debug!("playback reset");
        }
    }

    /// Get the current playback status.
    pub fn status(&self) -> PlaybackStatus {
        self.session
            .as_ref()
            .map_or(PlaybackStatus::Idle, |session| lock(&session.state).status)
    }

    /// Check if a session is currently running.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.status() == PlaybackStatus::Running
    }

    /// Get the number of units revealed so far.
    pub fn cursor(&self) -> usize {
        self.session
            .as_ref()
            .map_or(0, |session| lock(&session.state).cursor)
    }

    /// Get the number of units in the current snapshot.
    pub fn total(&self) -> usize {
        self.session.as_ref().map_or(0, |session| session.total)
    }

    /// Get the current position as a fraction (0.0 - 1.0).
    pub fn progress(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.cursor() as f64 / total as f64
        }
    }

    /// Get the mode of the current session.
    pub fn mode(&self) -> Option<PlaybackMode> {
        self.session.as_ref().map(|session| session.mode)
    }

    /// Plain text of the last completed session.
    pub fn animated_output(&self) -> Option<String> {
        self.session
            .as_ref()
            .and_then(|session| lock(&session.state).animated_output.clone())
    }

    /// Get a copy of the live settings.
    pub fn settings(&self) -> PlaybackSettings {
        lock(&self.settings).clone()
    }

    /// Get the current highlight term.
    pub fn highlight_term(&self) -> String {
        lock(&self.settings).highlight_term.clone()
    }

    /// Change the highlight term; a running session uses it from its next frame.
    pub fn set_highlight_term(&self, term: impl Into<String>) {
        lock(&self.settings).highlight_term = term.into();
    }

    /// Change the per-character delay.
    pub fn set_char_delay(&self, delay: Duration) {
        lock(&self.settings).char_delay = clamp_char_delay(delay);
    }

    /// Change the per-line delay.
    pub fn set_line_delay(&self, delay: Duration) {
        lock(&self.settings).line_delay = clamp_line_delay(delay);
    }

    /// Change how many characters a per-character tick reveals.
    pub fn set_chars_per_tick(&self, count: usize) {
        lock(&self.settings).chars_per_tick = clamp_chars_per_tick(count);
    }

    /// Render the whole buffer with the current highlight term.
    pub fn preview(&self, buffer: &TextBuffer) -> MarkedText {
        highlight::render(buffer.text(), &self.highlight_term())
    }
}
