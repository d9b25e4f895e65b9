//! Experiment configuration.
//!
//! Everything the calculator and simulator need, loadable from YAML or JSON.
//! Missing fields fall back to the defaults below; unknown fields are
//! rejected so a misspelt key cannot silently keep its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PeekError, Result};
use crate::sample_size::{SampleSizeRequest, Tail};

/// Percent-of-baseline multiplier meaning "no effect".
pub const NO_EFFECT: f64 = 100.0;

/// Parameters of a single planned A/B test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestConfig {
    /// Significance level
    pub alpha: f64,
    pub power: f64,
    /// Control conversion rate
    pub baseline_rate: f64,
    /// Relative lift the test is powered for (0.01 = +1%)
    pub expected_lift: f64,
    /// Treatment : control allocation
    pub allocation_ratio: f64,
    pub tail: Tail,
    pub test_days: u32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            power: 0.80,
            baseline_rate: 0.50,
            expected_lift: 0.01,
            allocation_ratio: 1.0,
            tail: Tail::OneSided,
            test_days: 14,
        }
    }
}

impl TestConfig {
    pub fn treatment_rate(&self) -> f64 {
        self.baseline_rate * (1.0 + self.expected_lift)
    }

    pub fn sample_size_request(&self) -> SampleSizeRequest {
        SampleSizeRequest {
            alpha: self.alpha,
            power: self.power,
            control_rate: self.baseline_rate,
            treatment_rate: self.treatment_rate(),
            allocation_ratio: self.allocation_ratio,
            tail: self.tail,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.test_days == 0 {
            return Err(PeekError::InvalidTestDays);
        }
        self.sample_size_request().validate()
    }
}

/// Distribution of the true effect multiplier, drawn once per experiment.
///
/// The random variants are centred on [`NO_EFFECT`]: draws are
/// `100 + scale * X`, floored at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectPrior {
    /// Every experiment has the same true effect.
    Fixed { multiplier: f64 },
    Normal { std_dev: f64 },
    StudentT { degrees_of_freedom: f64, scale: f64 },
    Cauchy { scale: f64 },
}

impl Default for EffectPrior {
    fn default() -> Self {
        EffectPrior::StudentT {
            degrees_of_freedom: 3.0,
            scale: 1.0,
        }
    }
}

impl EffectPrior {
    /// Prior under which the null hypothesis is always true.
    pub fn null() -> Self {
        EffectPrior::Fixed {
            multiplier: NO_EFFECT,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(PeekError::InvalidEffectPrior(format!(
                    "{} must be positive and finite, got {}",
                    name, v
                )))
            }
        };
        match *self {
            EffectPrior::Fixed { multiplier } => {
                if multiplier.is_finite() && multiplier >= 0.0 {
                    Ok(())
                } else {
                    Err(PeekError::InvalidEffectPrior(format!(
                        "fixed multiplier must be non-negative, got {}",
                        multiplier
                    )))
                }
            }
            EffectPrior::Normal { std_dev } => positive("std_dev", std_dev),
            EffectPrior::StudentT {
                degrees_of_freedom,
                scale,
            } => {
                positive("degrees_of_freedom", degrees_of_freedom)?;
                positive("scale", scale)
            }
            EffectPrior::Cauchy { scale } => positive("scale", scale),
        }
    }
}

/// How many experiments to simulate and how to draw them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub num_simulations: usize,
    pub seed: u64,
    pub effect_prior: EffectPrior,
    /// Run experiments on the rayon pool
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_simulations: 1_000,
            seed: 42,
            effect_prior: EffectPrior::default(),
            parallel: false,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_simulations == 0 {
            return Err(PeekError::InvalidSimulationCount);
        }
        self.effect_prior.validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    pub test: TestConfig,
    pub simulation: SimulationConfig,
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<()> {
        self.test.validate()?;
        self.simulation.validate()
    }

    /// Load from `.yaml`/`.yml`, anything else is parsed as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let config: ExperimentConfig = if is_yaml {
            serde_yaml::from_str(&text)?
        } else {
            serde_json::from_str(&text)?
        };
        config.validate()?;
        Ok(config)
    }
}
