// src/engine/dispatch.rs

//! Hand-off from the control loop to device and audio handlers.
//!
//! The sequencer talks to a [`Dispatcher`] instead of spawning work itself.
//! Production code uses [`DeviceDispatcher`]; tests can record dispatched
//! actions without touching any device.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::device::AudioPlayer;
use crate::engine::device_worker::DeviceWorker;
use crate::sequence::{Action, PlayAction};

/// Fire-and-forget hand-off of a due action.
///
/// Implementations must return promptly: anything slow runs on its own task.
pub trait Dispatcher: Send {
    fn dispatch(&mut self, action: Action);
}

/// Production dispatcher.
///
/// - Captures go to the single [`DeviceWorker`], which runs them serially.
/// - Sounds are each spawned as an independent task.
///
/// A missing device or player means actions of that kind are logged and
/// dropped.
#[derive(Default)]
pub struct DeviceDispatcher {
    device: Option<DeviceWorker>,
    audio: Option<AudioRoute>,
    sounds: JoinSet<()>,
}

struct AudioRoute {
    player: Arc<dyn AudioPlayer>,
    sounds_dir: PathBuf,
}

impl DeviceDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, worker: DeviceWorker) -> Self {
        self.device = Some(worker);
        self
    }

    pub fn with_audio(mut self, player: Arc<dyn AudioPlayer>, sounds_dir: impl Into<PathBuf>) -> Self {
        self.audio = Some(AudioRoute {
            player,
            sounds_dir: sounds_dir.into(),
        });
        self
    }

    /// Number of sound tasks not yet reaped.
    pub fn sounds_in_flight(&self) -> usize {
        self.sounds.len()
    }

    /// Wait up to `grace` for queued captures and playing sounds to finish.
    ///
    /// Whatever is still running after that is abandoned.
    pub async fn drain(mut self, grace: Duration) {
        let device = self.device.take();
        let mut sounds = std::mem::take(&mut self.sounds);

        let finished = tokio::time::timeout(grace, async move {
            if let Some(worker) = device {
                worker.shutdown().await;
            }
            while let Some(res) = sounds.join_next().await {
                log_join_error(res);
            }
        })
        .await;

        match finished {
            Ok(()) => debug!("dispatcher drained"),
            Err(_) => warn!(grace_ms = grace.as_millis() as u64, "abandoning unfinished handlers"),
        }
    }

    fn play(&mut self, action: PlayAction) {
        let Some(route) = &self.audio else {
            warn!(file = %action.sound_file, "no audio player; dropping sound");
            return;
        };

        let player = Arc::clone(&route.player);
        let path = route.sounds_dir.join(&action.sound_file);

        self.sounds.spawn(async move {
            info!(path = ?path, comment = %action.comment, "playing sound");
            if let Err(err) = player.play(path.clone()).await {
                error!(path = ?path, error = %err, "sound failed");
            }
        });
    }

    fn reap_finished(&mut self) {
        while let Some(res) = self.sounds.try_join_next() {
            log_join_error(res);
        }
    }
}

fn log_join_error(res: Result<(), tokio::task::JoinError>) {
    if let Err(err) = res {
        error!(error = %err, "sound task failed");
    }
}

impl Dispatcher for DeviceDispatcher {
    fn dispatch(&mut self, action: Action) {
        self.reap_finished();

        match action {
            Action::Capture(capture) => match &self.device {
                Some(worker) => {
                    if !worker.submit(capture) {
                        error!("device worker stopped; capture dropped");
                    }
                }
                None => warn!(comment = %capture.comment, "no capture device; dropping capture"),
            },
            Action::Play(play) => self.play(play),
        }
    }
}
