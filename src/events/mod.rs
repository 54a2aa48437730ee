//! Domain events emitted by workspace commands

mod vsm_events;

pub use vsm_events::*;
