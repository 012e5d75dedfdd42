//! The cancellable tick loop of a playback session.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::frame::Frame;
use crate::highlight::IncrementalHighlighter;
use crate::playback::{lock, PlaybackMode, PlaybackSettings, PlaybackStatus, Session, PAUSE_POLL_INTERVAL};
use crate::timer::Timer;

/// Immutable copy of the source text taken when Play is issued.
///
/// `ends[i]` is the byte offset where the visible prefix of `i + 1` units
/// ends. Lines end before their separator, so joining the first `k` lines
/// keeps the original separators between them.
#[derive(Clone, Debug)]
pub(crate) struct Snapshot {
    text: Arc<str>,
    ends: Vec<usize>,
}

impl Snapshot {
    pub(crate) fn capture(text: &str, mode: PlaybackMode) -> Self {
        let ends = match mode {
            PlaybackMode::PerCharacter => text
                .char_indices()
                .map(|(i, ch)| i + ch.len_utf8())
                .collect(),
            PlaybackMode::PerLine => line_ends(text),
        };
        Self {
            text: Arc::from(text),
            ends,
        }
    }

    /// Number of units.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.ends.len()
    }

    /// Byte length of the prefix covering `units` units.
    pub(crate) fn prefix_end(&self, units: usize) -> usize {
        match units.min(self.ends.len()) {
            0 => 0,
            n => self.ends[n - 1],
        }
    }
}

// Same segmentation as `str::lines`.
fn line_ends(text: &str) -> Vec<usize> {
    let mut ends = Vec::new();
    let mut start = 0;
    for line in text.split_inclusive('\n') {
        let content = match line.strip_suffix('\n') {
            Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
            None => line,
        };
        ends.push(start + content.len());
        start += line.len();
    }
    ends
}

/// Result of advancing a task by one tick.
#[derive(Debug)]
pub enum Step {
    /// A frame to present, then wait `delay` before the next step
    Frame { frame: Frame, delay: Duration },
    /// The session is paused; check again after the delay
    Wait(Duration),
    /// The loop is over
    Finished(PlaybackStatus),
}

/// Frame producer for one playback session.
///
/// Obtained from [`PlaybackEngine::play`](crate::PlaybackEngine::play).
/// Either pull frames with [`step`](Self::step) from your own timer, or
/// drive the whole loop with [`run`](Self::run). Dropping an unfinished task
/// marks its session as stopped.
#[derive(Debug)]
pub struct PlaybackTask {
    session: Arc<Session>,
    settings: Arc<Mutex<PlaybackSettings>>,
    snapshot: Snapshot,
    highlighter: IncrementalHighlighter,
}

impl PlaybackTask {
    pub(crate) fn new(session: Arc<Session>, settings: Arc<Mutex<PlaybackSettings>>, snapshot: Snapshot) -> Self {
        Self {
            session,
            settings,
            snapshot,
            highlighter: IncrementalHighlighter::new(),
        }
    }

    /// The session's mode.
    #[inline]
    pub fn mode(&self) -> PlaybackMode {
        self.session.mode
    }

    /// Number of units in the snapshot.
    #[inline]
    pub fn total(&self) -> usize {
        self.snapshot.len()
    }

    /// The text captured when the session started.
    #[inline]
    pub fn source(&self) -> &str {
        &self.snapshot.text
    }

    /// Advance one tick.
    ///
    /// Cancellation and pause are checked before anything is revealed, so a
    /// Stop issued during the previous delay prevents any further frame.
    pub fn step(&mut self) -> Step {
        let settings = lock(&self.settings).clone();
        let mode = self.session.mode;
        let total = self.snapshot.len();

        let mut state = lock(&self.session.state);
        if self.session.cancel_requested() {
            if state.status.is_active() {
                state.status = PlaybackStatus::Stopped;
                tracing::debug!(cursor = state.cursor, total, "playback stopped");
            }
            return Step::Finished(state.status);
        }
        match state.status {
            PlaybackStatus::Running => {}
            PlaybackStatus::Paused => return Step::Wait(PAUSE_POLL_INTERVAL),
            status => return Step::Finished(status),
        }

        state.cursor = (state.cursor + settings.units_per_tick(mode)).min(total);
        let position = state.cursor;
        let visible = self.snapshot.prefix_end(position);
        if position == total {
            state.status = PlaybackStatus::Completed;
            state.animated_output = Some(self.snapshot.text[..visible].to_owned());
            tracing::debug!(total, "playback completed");
        }
        drop(state);

        let marked = self
            .highlighter
            .render(&self.snapshot.text[..visible], &settings.highlight_term);
        tracing::trace!(position, total, matches = marked.spans.len(), "tick");

        Step::Frame {
            frame: Frame::new(Arc::clone(&self.snapshot.text), visible, position, total, marked),
            delay: settings.delay_for(mode),
        }
    }

    /// Drive the loop to the end, handing each frame to `on_frame`.
    ///
    /// Waits between frames only through `timer`, so the caller's command
    /// path stays free while a delay is pending. No delay follows the final
    /// frame. Returns the status the session ended in.
    pub async fn run<T, F>(mut self, timer: &T, mut on_frame: F) -> PlaybackStatus
    where
        T: Timer,
        F: FnMut(Frame),
    {
        loop {
            match self.step() {
                Step::Frame { frame, delay } => {
                    let last = frame.is_final();
                    on_frame(frame);
                    if !last {
                        timer.sleep(delay).await;
                    }
                }
                Step::Wait(delay) => timer.sleep(delay).await,
                Step::Finished(status) => return status,
            }
        }
    }

    /// Run the loop on a dedicated thread with real delays.
    #[cfg(feature = "thread")]
    pub fn spawn<F>(self, on_frame: F) -> std::thread::JoinHandle<PlaybackStatus>
    where
        F: FnMut(Frame) + Send + 'static,
    {
        std::thread::spawn(move || pollster::block_on(self.run(&crate::timer::ThreadTimer, on_frame)))
    }

    /// Run the loop on the browser event loop.
    #[cfg(feature = "web")]
    pub fn spawn_local<F>(self, on_frame: F)
    where
        F: FnMut(Frame) + 'static,
    {
        wasm_bindgen_futures::spawn_local(async move {
            self.run(&crate::timer::WebTimer, on_frame).await;
        });
    }
}

impl Drop for PlaybackTask {
    fn drop(&mut self) {
        let mut state = lock(&self.session.state);
        if state.status.is_active() {
            state.status = PlaybackStatus::Stopped;
            tracing::debug!(cursor = state.cursor, "playback task dropped");
        }
    }
}
