// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SequencerError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SequencerError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.run, raw.device, raw.audio))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_device(cfg)?;
    validate_audio(cfg)?;
    Ok(())
}

fn validate_device(cfg: &RawConfigFile) -> Result<()> {
    if cfg.device.program.trim().is_empty() {
        return Err(SequencerError::ConfigError(
            "[device].program must not be empty".to_string(),
        ));
    }

    if cfg.device.capture_timeout_ms == 0 {
        return Err(SequencerError::ConfigError(
            "[device].capture_timeout_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.device.max_wait_events == 0 {
        return Err(SequencerError::ConfigError(
            "[device].max_wait_events must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_audio(cfg: &RawConfigFile) -> Result<()> {
    if cfg.audio.player.trim().is_empty() {
        return Err(SequencerError::ConfigError(
            "[audio].player must not be empty".to_string(),
        ));
    }
    Ok(())
}
