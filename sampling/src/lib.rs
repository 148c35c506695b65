//! Fast non-cryptographic variates for thermal displacements and counting
//! noise: uniform (xorshift*), Gaussian (Box-Muller) and Poisson (Atkinson).

mod poisson;
pub mod seed;
pub mod source;

pub use poisson::SMALL_MEAN_LIMIT;
pub use seed::SeedSequence;
pub use source::{RngEngine, SeedStatus};
