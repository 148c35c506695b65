use std::f64::consts::TAU;

use backend::{Complex32, TransformBuffer};
use itertools::izip;
use rayon::prelude::*;

use crate::{AtomRecord, FrequencyGrid, Result, ScatteringTable, check_len, interaction_scale};

/// Geometry and scaling of one projected-potential evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PotentialParams {
    /// Supercell extent along x.
    pub ax: f32,
    /// Supercell extent along y.
    pub by: f32,
    /// Interaction constant multiplying every coefficient.
    pub scale: f32,
    /// Squared bandwidth limit used for the statistics.
    pub k2max: f32,
}

impl PotentialParams {
    pub fn new(ax: f32, by: f32, scale: f32, k2max: f32) -> Self {
        Self { ax, by, scale, k2max }
    }

    /// Uses the relativistic interaction constant for a beam energy in keV.
    pub fn for_energy(ax: f32, by: f32, kev: f64, k2max: f32) -> Self {
        Self::new(ax, by, interaction_scale(kev), k2max)
    }
}

/// Accumulated over the coefficients inside the bandwidth limit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PotentialStats {
    pub phase_sum: f64,
    pub coefficients: usize,
}

impl PotentialStats {
    pub fn mean_phase(&self) -> f64 {
        if self.coefficients == 0 {
            return 0.0;
        }
        self.phase_sum / self.coefficients as f64
    }

    fn merge(self, other: PotentialStats) -> PotentialStats {
        PotentialStats {
            phase_sum: self.phase_sum + other.phase_sum,
            coefficients: self.coefficients + other.coefficients,
        }
    }
}

/// Per-worker scattering factors of the species seen at the current
/// frequency. Only touched entries are reset between samples.
struct SpeciesCache {
    fe: Vec<f64>,
    touched: Vec<usize>,
}

impl SpeciesCache {
    fn new(slots: usize) -> Self {
        Self {
            fe: vec![f64::NAN; slots],
            touched: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.touched.drain(..).for_each(|z| self.fe[z] = f64::NAN);
    }

    #[inline]
    fn get(&mut self, table: &ScatteringTable, z: u32, k2: f64) -> f64 {
        let i: usize = z as usize;
        if self.fe[i].is_nan() {
            self.fe[i] = table.fe_known(z, k2);
            self.touched.push(i);
        }
        self.fe[i]
    }
}

/// Writes the reciprocal-space projected potential of `atoms` into the half
/// spectrum of `pot`:
///
/// `V(kx, ky) = scale * nx*ny / (ax*by) * sum occ * fe(z, k2) * exp(-2*pi*i*(kx*x + ky*y))`
///
/// The `nx*ny` factor cancels the `1/(nx*ny)` of [`TransformBuffer::inverse`],
/// so the real-space result is the phase shift independent of sampling. Each coefficient is owned by one task; atoms are read by all of them.
pub fn atomic_potential(
    pot: &mut TransformBuffer,
    atoms: &[AtomRecord],
    table: &ScatteringTable,
    kx: &FrequencyGrid,
    ky: &FrequencyGrid,
    params: &PotentialParams,
) -> Result<PotentialStats> {
    if pot.is_empty() {
        return Err(backend::Error::Unallocated("atomic_potential()").into());
    }
    check_len("kx", pot.nx(), kx.len())?;
    check_len("ky", pot.ny(), ky.len())?;
    table.validate(atoms)?;

    let nyc: usize = pot.nyc();
    let samples: f64 = (pot.nx() * pot.ny()) as f64;
    let norm: f64 = params.scale as f64 * samples / (params.ax as f64 * params.by as f64);
    let k2max: f64 = params.k2max as f64;
    tracing::debug!(nx = pot.nx(), ny = pot.ny(), atoms = atoms.len(), "atomic potential");

    let stats: PotentialStats = pot
        .data_mut()
        .par_chunks_mut(nyc)
        .zip(kx.k().par_iter().zip(kx.k2().par_iter()))
        .map_init(
            || SpeciesCache::new(table.slots()),
            |cache, (row, (&kxv, &kx2))| {
                let mut stats: PotentialStats = PotentialStats::default();
                izip!(row.iter_mut(), ky.k(), ky.k2()).for_each(|(v, &kyv, &ky2)| {
                    let k2: f64 = kx2 as f64 + ky2 as f64;
                    let (mut sr, mut si) = (0.0f64, 0.0f64);
                    atoms.iter().for_each(|a| {
                        let f: f64 = a.occ as f64 * cache.get(table, a.z, k2);
                        let arg: f64 = TAU * (kxv as f64 * a.x as f64 + kyv as f64 * a.y as f64);
                        let (s, c) = arg.sin_cos();
                        sr += f * c;
                        si -= f * s;
                    });
                    cache.reset();
                    *v = Complex32::new((sr * norm) as f32, (si * norm) as f32);
                    if k2 <= k2max {
                        stats.coefficients += 1;
                        stats.phase_sum += v.norm() as f64;
                    }
                });
                stats
            },
        )
        .reduce(PotentialStats::default, PotentialStats::merge);

    Ok(stats)
}
