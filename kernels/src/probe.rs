use std::f64::consts::TAU;

use backend::Complex32;
use itertools::izip;
use rayon::prelude::*;

use crate::{FrequencyGrid, KernelError, Result, check_len};

/// Multiplies an `nxprobe x nyprobe` probe by the window of an `nx x ny`
/// transmission function starting at `(ixoff, iyoff)`, wrapping both axes
/// periodically. Offsets may be negative or exceed the supercell.
#[allow(clippy::too_many_arguments)]
pub fn pix_mul_offset(
    probe: &mut [Complex32],
    nxprobe: usize,
    nyprobe: usize,
    trans: &[Complex32],
    nx: usize,
    ny: usize,
    ixoff: isize,
    iyoff: isize,
) -> Result<()> {
    if nxprobe > nx || nyprobe > ny {
        return Err(KernelError::ProbeTooLarge {
            probe: (nxprobe, nyprobe),
            trans: (nx, ny),
        });
    }
    check_len("probe", nxprobe * nyprobe, probe.len())?;
    check_len("trans", nx * ny, trans.len())?;
    if probe.is_empty() {
        return Ok(());
    }

    let x0: usize = ixoff.rem_euclid(nx as isize) as usize;
    let y0: usize = iyoff.rem_euclid(ny as isize) as usize;
    probe
        .par_chunks_mut(nyprobe)
        .enumerate()
        .for_each(|(ix, row)| {
            let tx: usize = (ix + x0) % nx;
            let trow: &[Complex32] = &trans[tx * ny..(tx + 1) * ny];
            row.iter_mut()
                .enumerate()
                .for_each(|(iy, p)| *p *= trow[(iy + y0) % ny]);
        });
    Ok(())
}

/// `c = a * b` element-wise.
pub fn vec_mul(a: &[Complex32], b: &[Complex32], c: &mut [Complex32]) -> Result<()> {
    check_len("b", a.len(), b.len())?;
    check_len("c", a.len(), c.len())?;
    c.par_iter_mut()
        .zip(a.par_iter().zip(b.par_iter()))
        .for_each(|(c, (a, b))| *c = a * b);
    Ok(())
}

/// `out(kx, ky) = in(kx, ky) * exp(2*pi*i*(xs*kx + ys*ky))`, which
/// translates the real-space probe by `(-xs, -ys)` under the inverse
/// transform.
pub fn probe_shift(
    out: &mut [Complex32],
    input: &[Complex32],
    kx: &FrequencyGrid,
    ky: &FrequencyGrid,
    xs: f32,
    ys: f32,
) -> Result<()> {
    let ny: usize = ky.len();
    check_len("probe", kx.len() * ny, input.len())?;
    check_len("out", input.len(), out.len())?;
    if ny == 0 {
        return Ok(());
    }
    out.par_chunks_mut(ny)
        .zip(input.par_chunks(ny))
        .zip(kx.k().par_iter())
        .for_each(|((out, input), &kxv)| {
            izip!(out.iter_mut(), input, ky.k()).for_each(|(o, i, &kyv)| {
                let arg: f64 = TAU * (xs as f64 * kxv as f64 + ys as f64 * kyv as f64);
                *o = i * Complex32::from_polar(1.0, arg as f32);
            })
        });
    Ok(())
}

/// `out[i] = |in[i]|^2`
pub fn mag_sq(out: &mut [f32], input: &[Complex32]) -> Result<()> {
    check_len("out", input.len(), out.len())?;
    out.par_iter_mut()
        .zip(input.par_iter())
        .for_each(|(o, i)| *o = i.norm_sqr());
    Ok(())
}
