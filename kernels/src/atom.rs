use crate::{KernelError, Result};

/// Number of fitted parameters per species: three Lorentzian `(a, b)` pairs
/// followed by three Gaussian `(c, d)` pairs.
pub const SCATTERING_PARAMS: usize = 12;

/// One atom of a slice. Coordinates are in the same length unit as the
/// supercell extents; `z` is the atomic number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomRecord {
    pub x: f32,
    pub y: f32,
    pub occ: f32,
    pub z: u32,
}

impl AtomRecord {
    pub fn new(x: f32, y: f32, occ: f32, z: u32) -> Self {
        Self { x, y, occ, z }
    }
}

/// Electron scattering factor parameterization indexed by atomic number.
///
/// `fe(k2) = sum a_i / (k2 + b_i) + sum c_i * exp(-d_i * k2)` with `k2` the
/// squared spatial frequency.
#[derive(Debug, Clone, Default)]
pub struct ScatteringTable {
    params: Vec<Option<[f64; SCATTERING_PARAMS]>>,
}

impl ScatteringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table whose entry `i` holds species `z = i + 1`.
    pub fn from_params(params: Vec<[f64; SCATTERING_PARAMS]>) -> Self {
        let mut table: ScatteringTable = Self::new();
        params
            .into_iter()
            .enumerate()
            .for_each(|(i, p)| table.insert(i as u32 + 1, p));
        table
    }

    pub fn insert(&mut self, z: u32, params: [f64; SCATTERING_PARAMS]) {
        let z: usize = z as usize;
        if self.params.len() <= z {
            self.params.resize(z + 1, None);
        }
        self.params[z] = Some(params);
    }

    pub fn contains(&self, z: u32) -> bool {
        matches!(self.params.get(z as usize), Some(Some(_)))
    }

    /// One past the largest atomic number that can be stored without growing.
    pub(crate) fn slots(&self) -> usize {
        self.params.len()
    }

    pub fn fe(&self, z: u32, k2: f64) -> Option<f64> {
        self.params
            .get(z as usize)
            .and_then(|p| p.as_ref())
            .map(|p| eval(p, k2))
    }

    /// Fails on the first atom whose species has no parameters.
    pub fn validate(&self, atoms: &[AtomRecord]) -> Result<()> {
        match atoms.iter().find(|a| !self.contains(a.z)) {
            Some(a) => Err(KernelError::UnknownSpecies(a.z)),
            None => Ok(()),
        }
    }

    /// Evaluates a species already checked by [`ScatteringTable::validate`].
    #[inline]
    pub(crate) fn fe_known(&self, z: u32, k2: f64) -> f64 {
        self.params[z as usize].as_ref().map_or(0.0, |p| eval(p, k2))
    }
}

#[inline]
fn eval(p: &[f64; SCATTERING_PARAMS], k2: f64) -> f64 {
    let lorentz: f64 = (0..3).map(|i| p[2 * i] / (k2 + p[2 * i + 1])).sum();
    let gauss: f64 = (3..6).map(|i| p[2 * i] * (-p[2 * i + 1] * k2).exp()).sum();
    lorentz + gauss
}
