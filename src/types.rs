// src/types.rs

use std::fmt;
use std::str::FromStr;

/// Direction in which an intervalometer loop walks away from its base time.
///
/// - `Forward`: each iteration fires `delay` seconds after the previous one.
/// - `Backward`: each iteration fires `delay` seconds before the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopDirection {
    Backward,
    Forward,
}

impl LoopDirection {
    /// Script encoding: `0` (or any negative value) walks backward, any
    /// positive value walks forward.
    pub fn from_code(code: i64) -> Self {
        if code > 0 {
            LoopDirection::Forward
        } else {
            LoopDirection::Backward
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            LoopDirection::Backward => -1.0,
            LoopDirection::Forward => 1.0,
        }
    }
}

/// Kind tag for a compiled action, as written in the sequence file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Capture,
    Play,
}

impl ActionKind {
    /// Column value used in the sequence file.
    pub fn tag(self) -> &'static str {
        match self {
            ActionKind::Capture => "PICT",
            ActionKind::Play => "PLAY",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "PICT" => Ok(ActionKind::Capture),
            "PLAY" => Ok(ActionKind::Play),
            other => Err(format!(
                "invalid action kind: {other} (expected \"PICT\" or \"PLAY\")"
            )),
        }
    }
}
