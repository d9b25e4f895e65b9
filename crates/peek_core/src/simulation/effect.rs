//! Sampling of the true effect multiplier.

use rand::Rng;
use rand_distr::{Cauchy, Distribution, Normal, StudentT};

use crate::config::{EffectPrior, NO_EFFECT};
use crate::error::{PeekError, Result};

/// An [`EffectPrior`] with its distribution already constructed.
#[derive(Debug, Clone)]
pub enum EffectSampler {
    Fixed(f64),
    Normal(Normal<f64>),
    StudentT { dist: StudentT<f64>, scale: f64 },
    Cauchy(Cauchy<f64>),
}

impl EffectSampler {
    pub fn new(prior: &EffectPrior) -> Result<Self> {
        prior.validate()?;
        let sampler = match *prior {
            EffectPrior::Fixed { multiplier } => EffectSampler::Fixed(multiplier),
            EffectPrior::Normal { std_dev } => EffectSampler::Normal(
                Normal::new(NO_EFFECT, std_dev).map_err(|e| PeekError::Distribution(e.to_string()))?,
            ),
            EffectPrior::StudentT {
                degrees_of_freedom,
                scale,
            } => EffectSampler::StudentT {
                dist: StudentT::new(degrees_of_freedom)
                    .map_err(|e| PeekError::Distribution(e.to_string()))?,
                scale,
            },
            EffectPrior::Cauchy { scale } => EffectSampler::Cauchy(
                Cauchy::new(NO_EFFECT, scale).map_err(|e| PeekError::Distribution(e.to_string()))?,
            ),
        };
        Ok(sampler)
    }

    /// Draw one multiplier (percent of baseline, never negative).
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let raw = match self {
            EffectSampler::Fixed(multiplier) => *multiplier,
            EffectSampler::Normal(dist) => dist.sample(rng),
            EffectSampler::StudentT { dist, scale } => NO_EFFECT + scale * dist.sample(rng),
            EffectSampler::Cauchy(dist) => dist.sample(rng),
        };
        raw.max(0.0)
    }
}
