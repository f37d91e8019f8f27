// src/device/mod.rs

//! Capture-device and audio capabilities consumed by the sequencer.
//!
//! The sequencer only talks to the [`DeviceControl`] and [`AudioPlayer`]
//! traits. Production implementations drive external programs:
//!
//! - [`gphoto::GphotoCamera`] runs the `gphoto2` command-line tool.
//! - [`audio::CommandAudioPlayer`] runs a command-line audio player.
//!
//! Tests substitute in-memory fakes.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

use crate::errors::DeviceError;

pub mod audio;
pub mod gphoto;

pub use audio::CommandAudioPlayer;
pub use gphoto::{parse_auto_detect, select_camera, DetectedCamera, GphotoCamera};

/// Boxed future returned by capability methods.
pub type DeviceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DeviceError>> + Send + 'a>>;

/// Exposure settings for a single capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exposure {
    pub shutter_seconds: f64,
    pub aperture: f64,
    pub iso: u32,
}

/// A physical capture device.
///
/// A device accepts one command at a time; callers must not drive the same
/// device from several tasks concurrently.
pub trait DeviceControl: Send {
    /// Stage exposure settings for the next [`apply_settings`](Self::apply_settings).
    fn set_exposure(&mut self, exposure: Exposure);

    /// Push staged settings to the device.
    fn apply_settings(&mut self) -> DeviceFuture<'_, ()>;

    /// Trigger a capture and wait until the device reports completion or
    /// `timeout` elapses.
    fn trigger_capture_and_wait(&mut self, timeout: Duration) -> DeviceFuture<'_, ()>;
}

/// Plays sound files to completion.
pub trait AudioPlayer: Send + Sync {
    fn play(&self, path: PathBuf) -> DeviceFuture<'_, ()>;
}
