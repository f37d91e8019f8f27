use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use eclipse_sequencer::device::{AudioPlayer, DeviceControl, DeviceFuture, Exposure};
use eclipse_sequencer::engine::Dispatcher;
use eclipse_sequencer::errors::DeviceError;
use eclipse_sequencer::sequence::Action;
use tokio::time::Instant;

/// An action handed to a [`RecordingDispatcher`], with the (tokio) instant it
/// arrived.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub action: Action,
    pub at: Instant,
}

/// A dispatcher that only records what it was given.
#[derive(Debug, Clone, Default)]
pub struct RecordingDispatcher {
    dispatched: Arc<Mutex<Vec<Dispatched>>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatched(&self) -> Vec<Dispatched> {
        self.dispatched.lock().unwrap().clone()
    }

    pub fn comments(&self) -> Vec<String> {
        self.dispatched()
            .into_iter()
            .map(|d| d.action.comment().to_string())
            .collect()
    }
}

impl Dispatcher for RecordingDispatcher {
    fn dispatch(&mut self, action: Action) {
        self.dispatched.lock().unwrap().push(Dispatched {
            action,
            at: Instant::now(),
        });
    }
}

/// One call observed by a [`FakeDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Apply(Exposure),
    Trigger,
}

/// In-memory capture device.
///
/// - Every call is recorded.
/// - Each trigger takes `capture_time` (tokio time).
/// - Triggers listed in `fail_on` (1-based) return an error.
/// - Overlapping calls are counted in `overlaps`; a correctly serialised
///   caller never produces any.
#[derive(Debug, Clone, Default)]
pub struct FakeDevice {
    calls: Arc<Mutex<Vec<DeviceCall>>>,
    staged: Option<Exposure>,
    capture_time: Duration,
    fail_on: Vec<usize>,
    triggers: Arc<AtomicUsize>,
    busy: Arc<AtomicBool>,
    overlaps: Arc<AtomicUsize>,
}

impl FakeDevice {
    pub fn new(capture_time: Duration) -> Self {
        Self {
            capture_time,
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, trigger: usize) -> Self {
        self.fail_on.push(trigger);
        self
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        if self.busy.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn leave(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

impl DeviceControl for FakeDevice {
    fn set_exposure(&mut self, exposure: Exposure) {
        self.staged = Some(exposure);
    }

    fn apply_settings(&mut self) -> DeviceFuture<'_, ()> {
        Box::pin(async move {
            self.enter();
            if let Some(exposure) = self.staged.take() {
                self.calls.lock().unwrap().push(DeviceCall::Apply(exposure));
            }
            tokio::task::yield_now().await;
            self.leave();
            Ok(())
        })
    }

    fn trigger_capture_and_wait(&mut self, timeout: Duration) -> DeviceFuture<'_, ()> {
        Box::pin(async move {
            self.enter();
            self.calls.lock().unwrap().push(DeviceCall::Trigger);
            let n = self.triggers.fetch_add(1, Ordering::SeqCst) + 1;

            let result = if self.capture_time > timeout {
                tokio::time::sleep(timeout).await;
                Err(DeviceError::Timeout(timeout))
            } else {
                tokio::time::sleep(self.capture_time).await;
                if self.fail_on.contains(&n) {
                    Err(DeviceError::CommandFailed(format!("trigger {n} failed")))
                } else {
                    Ok(())
                }
            };

            self.leave();
            result
        })
    }
}

/// In-memory audio player. Paths whose file name contains `fail` error out.
#[derive(Debug, Clone, Default)]
pub struct FakeAudio {
    played: Arc<Mutex<Vec<PathBuf>>>,
    duration: Duration,
}

impl FakeAudio {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    pub fn played(&self) -> Vec<PathBuf> {
        self.played.lock().unwrap().clone()
    }
}

impl AudioPlayer for FakeAudio {
    fn play(&self, path: PathBuf) -> DeviceFuture<'_, ()> {
        Box::pin(async move {
            tokio::time::sleep(self.duration).await;
            let failed = path.to_string_lossy().contains("fail");
            self.played.lock().unwrap().push(path.clone());
            if failed {
                Err(DeviceError::CommandFailed(format!("cannot play {path:?}")))
            } else {
                Ok(())
            }
        })
    }
}
