// tests/logging_level.rs

use eclipse_sequencer::cli::LogLevel;
use eclipse_sequencer::logging::effective_level;
use tracing::Level;

#[test]
fn cli_level_maps_onto_tracing_levels() {
    assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
    assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
    assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
}

#[test]
fn cli_flag_beats_environment_which_beats_default() {
    assert_eq!(effective_level(Some(LogLevel::Debug), Some("error")), Level::DEBUG);
    assert_eq!(effective_level(None, Some(" WARN ")), Level::WARN);
    assert_eq!(effective_level(None, Some("chatty")), Level::INFO);
    assert_eq!(effective_level(None, None), Level::INFO);
}
