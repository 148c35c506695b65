//! Data-parallel kernels of the multislice pipeline.
//!
//! Every kernel is a pure function over an index space: each output sample
//! (reciprocal-space coefficient, real-space pixel or detector column) is
//! written by exactly one rayon task, which may read any amount of shared
//! input. Stages return only after all of their writes are complete, so
//! calling them in order gives the per-slice sequencing.

mod atom;
mod bwlimit;
mod detector;
mod error;
mod freq;
mod grating;
mod noise;
mod optics;
mod phonon;
mod potential;
mod probe;
mod transmission;

pub use atom::*;
pub use bwlimit::*;
pub use detector::*;
pub use error::*;
pub use freq::*;
pub use grating::*;
pub use noise::*;
pub use optics::*;
pub use phonon::*;
pub use potential::*;
pub use probe::*;
pub use transmission::*;
