use backend::{Complex32, ComplexBuffer, TransformBuffer};
use itertools::izip;
use rayon::prelude::*;

use crate::{FrequencyGrid, Result, check_len};

/// Zeroes every sample with `kx2[ix] + ky2[iy] > k2max` and multiplies the
/// rest by `scale`. `data` is row-major with `ncols` samples per row; only
/// the first `ncols` entries of `ky2` are used.
pub fn bandwidth_limit(
    data: &mut [Complex32],
    ncols: usize,
    kx2: &[f32],
    ky2: &[f32],
    k2max: f32,
    scale: f32,
) -> Result<()> {
    check_len("data", kx2.len() * ncols, data.len())?;
    if ky2.len() < ncols {
        return Err(crate::KernelError::Length {
            what: "ky2",
            expected: ncols,
            found: ky2.len(),
        });
    }
    if ncols == 0 {
        return Ok(());
    }
    data.par_chunks_mut(ncols)
        .zip(kx2.par_iter())
        .for_each(|(row, &kx2)| {
            izip!(row.iter_mut(), ky2).for_each(|(v, &ky2)| {
                if kx2 + ky2 > k2max {
                    *v = Complex32::new(0.0, 0.0);
                } else {
                    *v *= scale;
                }
            })
        });
    Ok(())
}

/// Band limit of a half spectrum, folding in the `1/(nx*ny)` of the
/// preceding forward transform.
pub fn bandwidth_limit_half(buf: &mut TransformBuffer, kx: &FrequencyGrid, ky: &FrequencyGrid, k2max: f32) -> Result<()> {
    check_len("kx", buf.nx(), kx.len())?;
    check_len("ky", buf.ny(), ky.len())?;
    let scale: f32 = 1.0 / (buf.nx() * buf.ny()) as f32;
    let nyc: usize = buf.nyc();
    bandwidth_limit(buf.data_mut(), nyc, kx.k2(), ky.k2(), k2max, scale)
}

/// Band limit of a full complex spectrum, folding in the `1/(nx*ny)` of
/// the preceding forward transform.
pub fn bandwidth_limit_full(buf: &mut ComplexBuffer, kx: &FrequencyGrid, ky: &FrequencyGrid, k2max: f32) -> Result<()> {
    check_len("kx", buf.nx(), kx.len())?;
    check_len("ky", buf.ny(), ky.len())?;
    let scale: f32 = 1.0 / (buf.nx() * buf.ny()) as f32;
    let ny: usize = buf.ny();
    bandwidth_limit(buf.data_mut(), ny, kx.k2(), ky.k2(), k2max, scale)
}
