use anyhow::{anyhow, Result};
use ndarray::{ArrayD, IxDyn};
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Source of the Gaussian perturbation added on every step.
pub trait NoiseSource: Send + Sync {
    /// Draws a tensor of the given shape with i.i.d. `N(0, std^2)` elements.
    fn sample(&mut self, shape: &[usize], std: f32) -> Result<ArrayD<f32>>;
}

pub struct GaussianNoise {
    rng: StdRng,
}

impl GaussianNoise {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            rng: StdRng::from_seed(seed),
        }
    }

    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl NoiseSource for GaussianNoise {
    fn sample(&mut self, shape: &[usize], std: f32) -> Result<ArrayD<f32>> {
        if !(std >= 0.0) {
            return Err(anyhow!(
                "Noise standard deviation must be non-negative, got {}",
                std
            ));
        }
        let normal = Normal::new(0.0f32, std)
            .map_err(|e| anyhow!("Invalid noise standard deviation {}: {}", std, e))?;
        Ok(ArrayD::from_shape_simple_fn(IxDyn(shape), || {
            normal.sample(&mut self.rng)
        }))
    }
}

/// Draws nothing. Turns the update into its deterministic drift part.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZeroNoise;

impl NoiseSource for ZeroNoise {
    fn sample(&mut self, shape: &[usize], _std: f32) -> Result<ArrayD<f32>> {
        Ok(ArrayD::zeros(IxDyn(shape)))
    }
}
