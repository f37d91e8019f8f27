// src/engine/device_worker.rs

//! Single-worker queue owning the capture device.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::device::{DeviceControl, Exposure};
use crate::errors::DeviceError;
use crate::sequence::CaptureAction;

/// Handle to the background device worker.
///
/// Captures submitted here run strictly one after another, in submission
/// order, on the single device handle the worker owns.
#[derive(Debug)]
pub struct DeviceWorker {
    tx: mpsc::UnboundedSender<CaptureAction>,
    handle: JoinHandle<()>,
}

impl DeviceWorker {
    /// Queue a capture. Returns `false` if the worker has stopped.
    pub fn submit(&self, action: CaptureAction) -> bool {
        self.tx.send(action).is_ok()
    }

    /// Close the queue and wait for queued captures to finish.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(err) = self.handle.await {
            error!(error = %err, "device worker task failed");
        }
    }
}

/// Spawn the background device worker.
///
/// `wait` bounds each trigger-and-wait. A failed capture is logged and the
/// worker moves on to the next one.
pub fn spawn_device_worker(mut device: Box<dyn DeviceControl>, wait: Duration) -> DeviceWorker {
    let (tx, mut rx) = mpsc::unbounded_channel::<CaptureAction>();

    let handle = tokio::spawn(async move {
        info!("device worker started");

        while let Some(action) = rx.recv().await {
            match capture(device.as_mut(), &action, wait).await {
                Ok(()) => info!(
                    scheduled = %action.time,
                    comment = %action.comment,
                    "capture complete"
                ),
                Err(err) => error!(
                    scheduled = %action.time,
                    comment = %action.comment,
                    error = %err,
                    "capture failed"
                ),
            }
        }

        info!("device worker finished (queue closed)");
    });

    DeviceWorker { tx, handle }
}

async fn capture(
    device: &mut dyn DeviceControl,
    action: &CaptureAction,
    wait: Duration,
) -> Result<(), DeviceError> {
    debug!(
        shutter = action.shutter_seconds,
        aperture = action.aperture,
        iso = action.iso,
        "applying exposure"
    );
    device.set_exposure(Exposure {
        shutter_seconds: action.shutter_seconds,
        aperture: action.aperture,
        iso: action.iso,
    });
    device.apply_settings().await?;
    device.trigger_capture_and_wait(wait).await
}
