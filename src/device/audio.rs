// src/device/audio.rs

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::config::AudioSection;
use crate::device::{AudioPlayer, DeviceFuture};
use crate::errors::DeviceError;

/// Plays a file by running an external player (`mpg123 -q <file>` by
/// default) and waiting for it to exit.
#[derive(Debug, Clone)]
pub struct CommandAudioPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandAudioPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(section: &AudioSection) -> Self {
        Self::new(section.player.clone(), section.args.clone())
    }
}

impl AudioPlayer for CommandAudioPlayer {
    fn play(&self, path: PathBuf) -> DeviceFuture<'_, ()> {
        Box::pin(async move {
            debug!(program = %self.program, path = ?path, "starting audio player");
            let output = Command::new(&self.program)
                .args(&self.args)
                .arg(&path)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output()
                .await?;

            if output.status.success() {
                Ok(())
            } else {
                Err(DeviceError::CommandFailed(format!(
                    "{} exited with {} playing {:?}: {}",
                    self.program,
                    output.status,
                    path,
                    String::from_utf8_lossy(&output.stderr).trim()
                )))
            }
        })
    }
}
