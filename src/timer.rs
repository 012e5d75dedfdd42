//! Timers that pace playback.
//!
//! The tick loop never sleeps on its own; it awaits [`Timer::sleep`] between
//! frames. Shells pick the implementation that fits their event loop, and
//! tests inject a [`VirtualTimer`] so no wall-clock time passes.

use std::cell::RefCell;
use std::future::Future;
use std::time::Duration;

/// Source of delays for the playback loop.
///
/// No `Send` bounds: works in both native and WASM (single-threaded) contexts.
pub trait Timer {
    /// Suspend for `duration`.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Timer that resolves immediately and records every requested delay.
#[derive(Debug, Default)]
pub struct VirtualTimer {
    sleeps: RefCell<Vec<Duration>>,
}

impl VirtualTimer {
    /// Create a timer with no recorded sleeps.
    pub fn new() -> Self {
        Self::default()
    }

    /// All delays requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }

    /// Number of sleeps requested so far.
    pub fn sleep_count(&self) -> usize {
        self.sleeps.borrow().len()
    }

    /// Total virtual time that has passed.
    pub fn elapsed(&self) -> Duration {
        self.sleeps.borrow().iter().sum()
    }
}

impl Timer for VirtualTimer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        self.sleeps.borrow_mut().push(duration);
        std::future::ready(())
    }
}

/// Timer that blocks the current thread.
///
/// Only suitable when the playback task owns its thread, as with
/// [`PlaybackTask::spawn`](crate::PlaybackTask::spawn).
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadTimer;

impl Timer for ThreadTimer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        async move {
            if !duration.is_zero() {
                std::thread::sleep(duration);
            }
        }
    }
}

/// Timer backed by the browser's `setTimeout`.
#[cfg(feature = "web")]
#[derive(Clone, Copy, Debug, Default)]
pub struct WebTimer;

#[cfg(feature = "web")]
impl Timer for WebTimer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        async move {
            let promise = js_sys::Promise::new(&mut |resolve, _| {
                if let Some(window) = web_sys::window() {
                    let _ = window
                        .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis);
                } else {
                    let _ = resolve.call0(&wasm_bindgen::JsValue::NULL);
                }
            });
            let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_timer_records() {
        let timer = VirtualTimer::new();
        pollster::block_on(async {
            timer.sleep(Duration::from_millis(20)).await;
            timer.sleep(Duration::from_millis(150)).await;
        });
        assert_eq!(timer.sleep_count(), 2);
        assert_eq!(timer.elapsed(), Duration::from_millis(170));
    }

    #[test]
    fn test_thread_timer_zero() {
        pollster::block_on(ThreadTimer.sleep(Duration::ZERO));
    }
}
