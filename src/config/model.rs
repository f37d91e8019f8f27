// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Configuration as read from TOML, before validation.
///
/// ```toml
/// [run]
/// sounds_dir = "sounds"
/// disable_audio = false
///
/// [device]
/// model = "Canon EOS"
/// capture_timeout_ms = 100
/// max_wait_events = 10
///
/// [audio]
/// player = "mpg123"
/// args = ["-q"]
/// ```
///
/// All sections are optional and have defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub run: RunSection,

    #[serde(default)]
    pub device: DeviceSection,

    #[serde(default)]
    pub audio: AudioSection,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub run: RunSection,
    pub device: DeviceSection,
    pub audio: AudioSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(run: RunSection, device: DeviceSection, audio: AudioSection) -> Self {
        Self { run, device, audio }
    }
}

/// `[run]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    /// Directory that `PLAY` file names are resolved against.
    #[serde(default = "default_sounds_dir")]
    pub sounds_dir: PathBuf,

    /// Drop capture actions before running.
    #[serde(default)]
    pub disable_capture: bool,

    /// Drop sound actions before running.
    #[serde(default)]
    pub disable_audio: bool,

    /// How long to wait for in-flight captures and sounds once the last
    /// action has been dispatched.
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,
}

fn default_sounds_dir() -> PathBuf {
    PathBuf::from("sounds")
}

fn default_drain_timeout_ms() -> u64 {
    10_000
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            sounds_dir: default_sounds_dir(),
            disable_capture: false,
            disable_audio: false,
            drain_timeout_ms: default_drain_timeout_ms(),
        }
    }
}

/// `[device]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceSection {
    /// Camera control program.
    #[serde(default = "default_device_program")]
    pub program: String,

    /// Substring of the camera model name to select.
    #[serde(default)]
    pub model: Option<String>,

    /// Exact port path, e.g. `usb:001,004`.
    #[serde(default)]
    pub port: Option<String>,

    /// Wait per device event, in milliseconds.
    #[serde(default = "default_capture_timeout_ms")]
    pub capture_timeout_ms: u64,

    /// Number of event waits before a capture is considered timed out.
    #[serde(default = "default_max_wait_events")]
    pub max_wait_events: u32,
}

fn default_device_program() -> String {
    "gphoto2".to_string()
}

fn default_capture_timeout_ms() -> u64 {
    100
}

fn default_max_wait_events() -> u32 {
    10
}

impl DeviceSection {
    /// Upper bound on one trigger-and-wait.
    pub fn capture_wait(&self) -> std::time::Duration {
        std::time::Duration::from_millis(
            self.capture_timeout_ms
                .saturating_mul(u64::from(self.max_wait_events)),
        )
    }
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            program: default_device_program(),
            model: None,
            port: None,
            capture_timeout_ms: default_capture_timeout_ms(),
            max_wait_events: default_max_wait_events(),
        }
    }
}

/// `[audio]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AudioSection {
    #[serde(default = "default_player")]
    pub player: String,

    #[serde(default = "default_player_args")]
    pub args: Vec<String>,
}

fn default_player() -> String {
    "mpg123".to_string()
}

fn default_player_args() -> Vec<String> {
    vec!["-q".to_string()]
}

impl Default for AudioSection {
    fn default() -> Self {
        Self {
            player: default_player(),
            args: default_player_args(),
        }
    }
}
