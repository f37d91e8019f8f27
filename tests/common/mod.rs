#![allow(dead_code)]

pub use eclipse_sequencer_test_utils::builders;
pub use eclipse_sequencer_test_utils::fakes;
pub use eclipse_sequencer_test_utils::{init_tracing, with_timeout};
