//! Shared plumbing for the multislice workspace: the diagnostic message
//! channel, tracing setup and a small fnv-backed map.

mod map;
mod message;
mod trace;

pub use map::*;
pub use message::*;
pub use trace::*;
