//! Candidate gripper position sampling on a noisy hemisphere

use crate::core::{DEFAULT_HEIGHT_FLOOR, DEFAULT_POSITION_NOISE_STD, DEFAULT_SAMPLE_RADIUS};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Samples candidate gripper positions around a target object.
///
/// Positions are drawn uniformly on a sphere of the configured radius by
/// normalizing isotropic Gaussian vectors (naive angle sampling would cluster
/// points at the poles), restricted to z at or above the height floor, then
/// perturbed with independent per-axis Gaussian noise.
pub struct PoseSampler {
    radius: f64,
    height_floor: f64,
    noise_std: f64,
    rng: StdRng,
}

impl Default for PoseSampler {
    fn default() -> Self {
        Self {
            radius: DEFAULT_SAMPLE_RADIUS,
            height_floor: DEFAULT_HEIGHT_FLOOR,
            noise_std: DEFAULT_POSITION_NOISE_STD,
            rng: StdRng::from_entropy(),
        }
    }
}

impl PoseSampler {
    /// Create a sampler seeded from system entropy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sampler with a fixed seed for reproducible datasets
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::default()
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Set the minimum z (relative to the object) a sampled point may have
    pub fn with_height_floor(mut self, height_floor: f64) -> Self {
        self.height_floor = height_floor;
        self
    }

    pub fn with_noise_std(mut self, noise_std: f64) -> Self {
        self.noise_std = noise_std;
        self
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Draw up to `count` candidate positions around `object_position`.
    ///
    /// Height-floor rejection shrinks the result, so callers must not assume
    /// exactly `count` points come back.
    pub fn sample(&mut self, object_position: &Vector3<f64>, count: usize) -> Vec<Vector3<f64>> {
        let mut points = Vec::with_capacity(count);

        for _ in 0..count {
            let offset = self.unit_direction() * self.radius;
            if offset.z < self.height_floor {
                continue;
            }

            let noise = Vector3::new(
                self.noise_sample(),
                self.noise_sample(),
                self.noise_sample(),
            );
            points.push(object_position + offset + noise);
        }

        points
    }

    /// Draw one uniformly distributed unit vector.
    ///
    /// A Gaussian draw of (near-)zero magnitude leaves the direction
    /// undefined; such draws are redrawn.
    fn unit_direction(&mut self) -> Vector3<f64> {
        loop {
            let v = Vector3::new(
                self.rng.sample::<f64, _>(StandardNormal),
                self.rng.sample::<f64, _>(StandardNormal),
                self.rng.sample::<f64, _>(StandardNormal),
            );
            let norm = v.norm();
            if norm.is_finite() && norm > f64::EPSILON {
                return v / norm;
            }
        }
    }

    fn noise_sample(&mut self) -> f64 {
        if self.noise_std <= 0.0 {
            return 0.0;
        }
        self.rng.sample::<f64, _>(StandardNormal) * self.noise_std
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_lie_on_sphere_before_noise() {
        let mut sampler = PoseSampler::from_seed(7)
            .with_radius(0.5)
            .with_height_floor(-1.0)
            .with_noise_std(0.0);
        let origin = Vector3::zeros();

        let points = sampler.sample(&origin, 500);
        assert_eq!(points.len(), 500);
        for point in &points {
            assert!((point.norm() - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_height_floor_rejection() {
        let mut sampler = PoseSampler::from_seed(11).with_noise_std(0.0);
        let origin = Vector3::zeros();

        let points = sampler.sample(&origin, 1000);
        // Roughly half the sphere survives the floor at z = 0
        assert!(points.len() < 1000);
        assert!(!points.is_empty());
        for point in &points {
            assert!(point.z >= 0.0);
        }
    }

    #[test]
    fn test_points_centered_on_object() {
        let mut sampler = PoseSampler::from_seed(3)
            .with_height_floor(-1.0)
            .with_noise_std(0.0);
        let object = Vector3::new(0.5, 0.3, 0.0);

        for point in sampler.sample(&object, 200) {
            assert!(((point - object).norm() - sampler.radius()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_spherical_uniformity() {
        // Mean resultant vector of a uniform spherical sample concentrates
        // near zero at rate 1/sqrt(n); 0.05 is several sigma out for n = 4000.
        let mut sampler = PoseSampler::from_seed(42)
            .with_radius(1.0)
            .with_height_floor(-1.0)
            .with_noise_std(0.0);
        let origin = Vector3::zeros();

        let points = sampler.sample(&origin, 4000);
        assert_eq!(points.len(), 4000);

        let mean = points.iter().sum::<Vector3<f64>>() / points.len() as f64;
        assert!(mean.norm() < 0.05, "mean resultant {} too large", mean.norm());

        // Hemispheres should be roughly balanced on each axis
        for axis in 0..3 {
            let above = points.iter().filter(|p| p[axis] > 0.0).count();
            assert!(above > 1800 && above < 2200, "axis {} count {}", axis, above);
        }
    }

    #[test]
    fn test_noise_perturbs_points() {
        let mut sampler = PoseSampler::from_seed(5)
            .with_height_floor(-1.0)
            .with_noise_std(0.01);
        let origin = Vector3::zeros();

        let points = sampler.sample(&origin, 500);
        let off_sphere = points
            .iter()
            .filter(|p| (p.norm() - 0.5).abs() > 1e-9)
            .count();
        assert!(off_sphere > 450);

        // Noise is small relative to the radius
        for point in &points {
            assert!((point.norm() - 0.5).abs() < 0.1);
        }
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let origin = Vector3::zeros();
        let a = PoseSampler::from_seed(99).sample(&origin, 50);
        let b = PoseSampler::from_seed(99).sample(&origin, 50);
        assert_eq!(a, b);
    }
}
