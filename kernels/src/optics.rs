use std::f64::consts::PI;

use backend::{Complex32, ComplexBuffer};
use itertools::izip;
use rayon::prelude::*;

use crate::{FrequencyGrid, Result, check_len};

/// Electron rest energy in keV.
pub const ELECTRON_REST_KEV: f64 = 510.99906;

/// Relativistic electron wavelength in Angstrom for a beam energy in keV.
pub fn wavelength(kev: f64) -> f64 {
    12.3986 / ((2.0 * ELECTRON_REST_KEV + kev) * kev).sqrt()
}

/// Interaction constant `lambda * (1 + kev/511)` scaling the projected
/// potential into a phase.
pub fn interaction_scale(kev: f64) -> f32 {
    (wavelength(kev) * (1.0 + kev / 511.0)) as f32
}

/// Fresnel propagator `exp(-i*pi*lambda*dz*k2)` over a thickness `dz`,
/// zeroed outside `k2max` and scaled by `1/(nx*ny)` so that a forward
/// transform, this product and an inverse transform preserve the wave norm.
pub fn propagator(out: &mut ComplexBuffer, kx: &FrequencyGrid, ky: &FrequencyGrid, wavelength: f64, dz: f64, k2max: f32) -> Result<()> {
    check_len("kx", out.nx(), kx.len())?;
    check_len("ky", out.ny(), ky.len())?;
    if out.is_empty() {
        return Ok(());
    }
    let ny: usize = out.ny();
    let scale: f32 = 1.0 / out.data().len() as f32;
    let t: f64 = -PI * wavelength * dz;
    out.data_mut()
        .par_chunks_mut(ny)
        .zip(kx.k2().par_iter())
        .for_each(|(row, &kx2)| {
            izip!(row.iter_mut(), ky.k2()).for_each(|(p, &ky2)| {
                let k2: f32 = kx2 + ky2;
                *p = if k2 > k2max {
                    Complex32::new(0.0, 0.0)
                } else {
                    Complex32::from_polar(scale, (t * k2 as f64) as f32)
                };
            })
        });
    Ok(())
}
