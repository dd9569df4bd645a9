use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

#[derive(Debug, PartialEq, Clone, Copy)]
/// Possible relations between two geometric entities A and B.
/// A is `GeoRelation` to B
pub enum GeoRelation {
    /// A ∩ B ≠ ∅ and neither A ⊆ B nor B ⊆ A
    Intersecting,
    /// A ⊆ B
    Enclosed,
    /// B ⊆ A
    Surrounding,
    /// A ∩ B = ∅
    Disjoint,
}

/// Rotations in which an item is allowed to be placed (angles in radians)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RotationRange {
    /// No rotation allowed
    None,
    /// Complete continuous rotation allowed
    Continuous,
    /// Discrete set of rotations allowed
    Discrete(Vec<f64>),
}

impl RotationRange {
    /// The discrete rotations a placement pass tries, in order.
    /// A continuous range is sampled at `n_samples` evenly spaced angles.
    pub fn candidates(&self, n_samples: usize) -> Vec<f64> {
        match self {
            RotationRange::None => vec![0.0],
            RotationRange::Discrete(angles) => angles.clone(),
            RotationRange::Continuous => (0..n_samples.max(1))
                .map(|i| TAU * i as f64 / n_samples.max(1) as f64)
                .collect(),
        }
    }

    /// Maps a gene in [0, 1] to one of the [`candidates`](Self::candidates)
    pub fn from_gene(&self, gene: f64, n_samples: usize) -> f64 {
        let candidates = self.candidates(n_samples);
        match candidates.len() {
            0 => 0.0,
            n => {
                let idx = ((gene.clamp(0.0, 1.0) * n as f64) as usize).min(n - 1);
                candidates[idx]
            }
        }
    }

    pub fn is_fixed(&self) -> bool {
        match self {
            RotationRange::None => true,
            RotationRange::Discrete(angles) => angles.len() <= 1,
            RotationRange::Continuous => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn continuous_samples_are_evenly_spaced() {
        let c = RotationRange::Continuous.candidates(4);
        assert_eq!(c.len(), 4);
        assert!((c[1] - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn gene_selects_discrete_rotation() {
        let r = RotationRange::Discrete(vec![0.0, 1.0, 2.0]);
        assert_eq!(r.from_gene(0.0, 8), 0.0);
        assert_eq!(r.from_gene(0.5, 8), 1.0);
        assert_eq!(r.from_gene(1.0, 8), 2.0);
        assert_eq!(RotationRange::None.from_gene(0.7, 8), 0.0);
        assert!((RotationRange::Continuous.from_gene(0.3, 4) - FRAC_PI_2).abs() < 1e-12);
    }
}
