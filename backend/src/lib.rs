//! Paired real/complex sample buffers and the shared 2-D transform plans that
//! move them between real space and reciprocal space.
//!
//! Layout is row-major with `iy` fastest: a real sample `(ix, iy)` sits at
//! `iy + ix*ny`, a half-spectrum sample at `iy + ix*nyc` with `nyc = ny/2 + 1`.

mod complex_buffer;
mod config;
mod error;
mod fft2d;
mod plan;
mod transform_buffer;


pub use complex_buffer::*;
pub use config::*;
pub use error::*;
pub use num_complex::Complex32;
pub use plan::*;
pub use transform_buffer::*;

/// Allocates `len` copies of `value`, reporting exhaustion instead of aborting.
pub(crate) fn try_alloc<T: Clone>(len: usize, value: T, nx: usize, ny: usize) -> Result<Vec<T>> {
    let mut v: Vec<T> = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| Error::Allocation { nx, ny, len })?;
    v.resize(len, value);
    Ok(v)
}

/// Number of samples `nx * ny`, or an allocation error on overflow.
pub(crate) fn checked_len(nx: usize, ny: usize) -> Result<usize> {
    nx.checked_mul(ny)
        .ok_or(Error::Allocation { nx, ny, len: usize::MAX })
}
