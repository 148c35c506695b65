use std::sync::Arc;

use utils::Map;

/// Spatial frequencies of one axis in FFT order: `0, 1, .., n/2` then the
/// negative frequencies, in units of `1/extent`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyGrid {
    extent: f32,
    k: Vec<f32>,
    k2: Vec<f32>,
}

impl FrequencyGrid {
    pub fn new(n: usize, extent: f32) -> Self {
        debug_assert!(extent > 0.0, "axis extent must be positive, got {extent}");
        let imid: usize = n / 2;
        let k: Vec<f32> = (0..n)
            .map(|i| {
                if i > imid {
                    (i as f32 - n as f32) / extent
                } else {
                    i as f32 / extent
                }
            })
            .collect();
        let k2: Vec<f32> = k.iter().map(|k| k * k).collect();
        Self { extent, k, k2 }
    }

    pub fn len(&self) -> usize {
        self.k.len()
    }

    pub fn is_empty(&self) -> bool {
        self.k.is_empty()
    }

    pub fn extent(&self) -> f32 {
        self.extent
    }

    pub fn k(&self) -> &[f32] {
        &self.k
    }

    pub fn k2(&self) -> &[f32] {
        &self.k2
    }
}

/// Reuses grids across slices that share an axis geometry.
#[derive(Debug, Default)]
pub struct FrequencyCache {
    grids: Map<(usize, u32), Arc<FrequencyGrid>>,
}

impl FrequencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, n: usize, extent: f32) -> Arc<FrequencyGrid> {
        self.grids
            .get_or_insert_with((n, extent.to_bits()), || Arc::new(FrequencyGrid::new(n, extent)))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_axis_order() {
        let grid: FrequencyGrid = FrequencyGrid::new(8, 4.0);
        assert_eq!(grid.k(), &[0.0, 0.25, 0.5, 0.75, 1.0, -0.75, -0.5, -0.25]);
        assert_eq!(grid.k2()[4], 1.0);
        assert_eq!(grid.k2()[7], 0.0625);
    }

    #[test]
    fn odd_axis_order() {
        let grid: FrequencyGrid = FrequencyGrid::new(5, 5.0);
        assert_eq!(grid.k(), &[0.0, 0.2, 0.4, -0.4, -0.2]);
    }

    #[test]
    fn cache_shares_equal_geometry() {
        let mut cache: FrequencyCache = FrequencyCache::new();
        let a: Arc<FrequencyGrid> = cache.get(64, 10.0);
        let b: Arc<FrequencyGrid> = cache.get(64, 10.0);
        let c: Arc<FrequencyGrid> = cache.get(64, 12.0);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);
    }
}
