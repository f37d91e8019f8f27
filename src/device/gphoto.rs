// src/device/gphoto.rs

//! Camera control through the `gphoto2` command-line tool.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::DeviceSection;
use crate::device::{DeviceControl, DeviceFuture, Exposure};
use crate::errors::DeviceError;

/// A camera as listed by `gphoto2 --auto-detect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedCamera {
    pub model: String,
    pub port: String,
}

/// Camera driven by spawning `gphoto2` once per operation.
#[derive(Debug)]
pub struct GphotoCamera {
    program: String,
    camera: DetectedCamera,
    pending: Option<Exposure>,
}

impl GphotoCamera {
    /// Detect attached cameras and select one.
    ///
    /// Fails with [`DeviceError::InitFailed`] when no camera matches or the
    /// selection is ambiguous.
    pub async fn connect(settings: &DeviceSection) -> Result<Self, DeviceError> {
        let program = settings.program.clone();
        let output = Command::new(&program)
            .arg("--auto-detect")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DeviceError::InitFailed(format!("running {program}: {e}")))?;

        if !output.status.success() {
            return Err(DeviceError::InitFailed(format!(
                "{program} --auto-detect failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let detected = parse_auto_detect(&String::from_utf8_lossy(&output.stdout));
        debug!(?detected, "detected cameras");

        let camera = select_camera(&detected, settings.model.as_deref(), settings.port.as_deref())?;
        info!(model = %camera.model, port = %camera.port, "camera selected");

        Ok(Self {
            program,
            camera,
            pending: None,
        })
    }

    pub fn camera(&self) -> &DetectedCamera {
        &self.camera
    }

    async fn run(&self, args: Vec<String>) -> Result<(), DeviceError> {
        debug!(program = %self.program, ?args, "running camera command");
        let output = Command::new(&self.program)
            .arg("--camera")
            .arg(&self.camera.model)
            .arg("--port")
            .arg(&self.camera.port)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(DeviceError::CommandFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

impl DeviceControl for GphotoCamera {
    fn set_exposure(&mut self, exposure: Exposure) {
        info!(
            shutter = exposure.shutter_seconds,
            aperture = exposure.aperture,
            iso = exposure.iso,
            "staging exposure"
        );
        self.pending = Some(exposure);
    }

    fn apply_settings(&mut self) -> DeviceFuture<'_, ()> {
        Box::pin(async move {
            let Some(exposure) = self.pending.take() else {
                return Ok(());
            };
            let args = vec![
                "--set-config".to_string(),
                format!("aperture={}", exposure.aperture),
                "--set-config".to_string(),
                format!("iso={}", exposure.iso),
                "--set-config".to_string(),
                format!("shutterspeed={}", format_shutter(exposure.shutter_seconds)),
            ];
            self.run(args).await
        })
    }

    fn trigger_capture_and_wait(&mut self, timeout: Duration) -> DeviceFuture<'_, ()> {
        Box::pin(async move {
            let args = vec!["--trigger-capture".to_string(), "--wait-event=1f".to_string()];
            match tokio::time::timeout(timeout, self.run(args)).await {
                Ok(result) => result,
                Err(_) => Err(DeviceError::Timeout(timeout)),
            }
        })
    }
}

/// Parse the table printed by `gphoto2 --auto-detect`.
///
/// ```text
/// Model                          Port
/// ----------------------------------------------------------
/// Canon EOS 5D Mark III          usb:001,004
/// ```
pub fn parse_auto_detect(text: &str) -> Vec<DetectedCamera> {
    text.lines()
        .skip_while(|line| !line.trim_start().starts_with("---"))
        .skip(1)
        .filter_map(|line| {
            let line = line.trim();
            let (model, port) = line.rsplit_once(char::is_whitespace)?;
            let model = model.trim();
            if model.is_empty() {
                return None;
            }
            Some(DetectedCamera {
                model: model.to_string(),
                port: port.to_string(),
            })
        })
        .collect()
}

/// Pick one camera.
///
/// With neither filter, the first detected camera is used. Otherwise `model`
/// must be a substring of the camera model and `port` must match exactly, and
/// exactly one camera may qualify.
pub fn select_camera(
    detected: &[DetectedCamera],
    model: Option<&str>,
    port: Option<&str>,
) -> Result<DetectedCamera, DeviceError> {
    if model.is_none() && port.is_none() {
        info!("selecting first available camera");
        return detected
            .first()
            .cloned()
            .ok_or_else(|| DeviceError::InitFailed("no cameras detected".to_string()));
    }

    let matches: Vec<&DetectedCamera> = detected
        .iter()
        .filter(|c| model.is_none_or(|m| c.model.contains(m)))
        .filter(|c| port.is_none_or(|p| c.port == p))
        .collect();

    match matches.as_slice() {
        [] => Err(DeviceError::InitFailed("no connected cameras match".to_string())),
        [camera] => Ok((*camera).clone()),
        _ => Err(DeviceError::InitFailed(
            "camera model and/or port are not specific enough".to_string(),
        )),
    }
}

/// Render a shutter speed the way cameras list it: `1/250` below one second,
/// plain seconds otherwise.
pub fn format_shutter(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("1/{}", (1.0 / seconds).round() as u64)
    } else {
        format!("{seconds}")
    }
}
