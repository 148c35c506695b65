use sampling::RngEngine;
use utils::Map;

use crate::AtomRecord;

/// Reference temperature of tabulated vibration amplitudes, in Kelvin.
pub const ROOM_TEMPERATURE: f32 = 300.0;

/// Frozen-phonon model: each species vibrates with an rms displacement per
/// axis, scaled by `sqrt(T / 300)`.
#[derive(Debug, Clone)]
pub struct ThermalModel {
    amplitudes: Map<u32, f32>,
    temperature: f32,
}

impl Default for ThermalModel {
    fn default() -> Self {
        Self::new(ROOM_TEMPERATURE)
    }
}

impl ThermalModel {
    pub fn new(temperature: f32) -> Self {
        Self {
            amplitudes: Map::new(),
            temperature,
        }
    }

    pub fn with_amplitude(mut self, z: u32, rms: f32) -> Self {
        self.set_amplitude(z, rms);
        self
    }

    pub fn set_amplitude(&mut self, z: u32, rms: f32) {
        self.amplitudes.insert(z, rms);
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Effective rms displacement of species `z`; zero for species without
    /// an amplitude.
    pub fn amplitude(&self, z: u32) -> f32 {
        let rms: f32 = self.amplitudes.get(&z).copied().unwrap_or(0.0);
        rms * (self.temperature / ROOM_TEMPERATURE).max(0.0).sqrt()
    }

    /// Moves every atom by an independent Gaussian draw per axis, x first.
    pub fn displace_in_place(&self, atoms: &mut [AtomRecord], rng: &mut RngEngine) {
        atoms.iter_mut().for_each(|a| {
            let rms: f64 = self.amplitude(a.z) as f64;
            if rms > 0.0 {
                a.x += (rng.rangauss() * rms) as f32;
                a.y += (rng.rangauss() * rms) as f32;
            }
        });
    }

    pub fn displace(&self, atoms: &[AtomRecord], rng: &mut RngEngine) -> Vec<AtomRecord> {
        let mut moved: Vec<AtomRecord> = atoms.to_vec();
        self.displace_in_place(&mut moved, rng);
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amplitude_scales_with_temperature() {
        let room: ThermalModel = ThermalModel::default().with_amplitude(14, 0.08);
        let hot: ThermalModel = ThermalModel::new(1200.0).with_amplitude(14, 0.08);
        assert_eq!(room.amplitude(14), 0.08);
        assert!((hot.amplitude(14) - 0.16).abs() < 1e-6);
        assert_eq!(hot.amplitude(6), 0.0);
    }

    #[test]
    fn displacement_statistics() {
        let model: ThermalModel = ThermalModel::default().with_amplitude(6, 0.1);
        let atoms: Vec<AtomRecord> = vec![AtomRecord::new(1.0, 2.0, 1.0, 6); 20000];
        let mut rng: RngEngine = RngEngine::new(99);
        let moved: Vec<AtomRecord> = model.displace(&atoms, &mut rng);
        let n: f64 = moved.len() as f64;
        let mean_x: f64 = moved.iter().map(|a| a.x as f64).sum::<f64>() / n;
        let var_y: f64 = moved.iter().map(|a| (a.y as f64 - 2.0).powi(2)).sum::<f64>() / n;
        assert!((mean_x - 1.0).abs() < 0.005);
        assert!((var_y.sqrt() - 0.1).abs() < 0.005);
        assert!(moved.iter().all(|a| a.occ == 1.0 && a.z == 6));
    }

    #[test]
    fn static_species_consume_no_draws() {
        let model: ThermalModel = ThermalModel::default().with_amplitude(6, 0.1);
        let atoms: Vec<AtomRecord> = vec![AtomRecord::new(0.0, 0.0, 1.0, 79), AtomRecord::new(0.0, 0.0, 1.0, 6)];
        let mut a: RngEngine = RngEngine::new(5);
        let mut b: RngEngine = RngEngine::new(5);
        let moved: Vec<AtomRecord> = model.displace(&atoms, &mut a);
        assert_eq!(moved[0], atoms[0]);
        assert_eq!(moved[1].x, (b.rangauss() * 0.1f32 as f64) as f32);
        assert_eq!(moved[1].y, (b.rangauss() * 0.1f32 as f64) as f32);
    }
}
