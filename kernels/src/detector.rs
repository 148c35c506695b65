use std::f32::consts::TAU;

use itertools::izip;
use rayon::prelude::*;

use crate::{FrequencyGrid, Result, check_len};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectorMode {
    /// Intensity inside `k2min <= k2 <= k2max`.
    #[default]
    Annular,
    /// Annular, further restricted to `phi_min <= phi <= phi_max` with `phi`
    /// in `[0, 2*pi)` measured from the +kx axis.
    Segmented,
    /// First moment along kx inside the annulus.
    CenterOfMassX,
    /// First moment along ky inside the annulus.
    CenterOfMassY,
}

/// Acceptance region of one detector in reciprocal space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorGeometry {
    pub k2min: f32,
    pub k2max: f32,
    pub phi_min: f32,
    pub phi_max: f32,
    pub mode: CollectorMode,
}

impl DetectorGeometry {
    pub fn annular(kmin: f32, kmax: f32) -> Self {
        Self {
            k2min: kmin * kmin,
            k2max: kmax * kmax,
            phi_min: 0.0,
            phi_max: TAU,
            mode: CollectorMode::Annular,
        }
    }

    pub fn segmented(kmin: f32, kmax: f32, phi_min: f32, phi_max: f32) -> Self {
        Self {
            phi_min,
            phi_max,
            mode: CollectorMode::Segmented,
            ..Self::annular(kmin, kmax)
        }
    }

    pub fn center_of_mass(kmax: f32, mode: CollectorMode) -> Self {
        Self {
            mode,
            ..Self::annular(0.0, kmax)
        }
    }

    /// Accepts every sample.
    pub fn full_range() -> Self {
        Self {
            k2max: f32::INFINITY,
            ..Self::annular(0.0, 0.0)
        }
    }

    /// Detector bounded by scattering angles in radians, converted with the
    /// electron wavelength into spatial frequencies `k = theta / wavelength`.
    pub fn from_angles(theta_min: f32, theta_max: f32, wavelength: f32, mode: CollectorMode) -> Self {
        Self {
            mode,
            ..Self::annular(theta_min / wavelength, theta_max / wavelength)
        }
    }

    /// Weight of one sample at `(kx, ky)`, zero outside the region.
    #[inline]
    fn weight(&self, kx: f32, ky: f32, k2: f32) -> f64 {
        if k2 < self.k2min || k2 > self.k2max {
            return 0.0;
        }
        match self.mode {
            CollectorMode::Annular => 1.0,
            CollectorMode::Segmented => {
                let mut phi: f32 = ky.atan2(kx);
                if phi < 0.0 {
                    phi += TAU;
                }
                if phi >= self.phi_min && phi <= self.phi_max { 1.0 } else { 0.0 }
            }
            CollectorMode::CenterOfMassX => kx as f64,
            CollectorMode::CenterOfMassY => ky as f64,
        }
    }
}

/// `sums[ix] = sum over iy of weight(ix, iy) * cbed[ix, iy]`, one task per
/// column.
pub fn integrate_columns(
    sums: &mut [f64],
    cbed: &[f32],
    kx: &FrequencyGrid,
    ky: &FrequencyGrid,
    det: &DetectorGeometry,
) -> Result<()> {
    let ny: usize = ky.len();
    check_len("sums", kx.len(), sums.len())?;
    check_len("cbed", kx.len() * ny, cbed.len())?;
    sums.par_iter_mut().enumerate().for_each(|(ix, sum)| {
        let kxv: f32 = kx.k()[ix];
        let kx2: f32 = kx.k2()[ix];
        *sum = izip!(&cbed[ix * ny..(ix + 1) * ny], ky.k(), ky.k2())
            .map(|(&v, &kyv, &ky2)| det.weight(kxv, kyv, kx2 + ky2) * v as f64)
            .sum();
    });
    Ok(())
}

/// Total detector signal of a diffraction pattern.
pub fn integrate(cbed: &[f32], kx: &FrequencyGrid, ky: &FrequencyGrid, det: &DetectorGeometry) -> Result<f64> {
    let mut sums: Vec<f64> = vec![0.0; kx.len()];
    integrate_columns(&mut sums, cbed, kx, ky, det)?;
    Ok(sums.iter().sum())
}
