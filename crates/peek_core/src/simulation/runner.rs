//! Simulator - repeated synthetic A/B experiments.
//!
//! Each experiment:
//! - draws one true effect multiplier
//! - accumulates daily binomial successes for both arms
//! - records the pooled z-score and upper-tail p-value for every day
//!
//! Experiment `i` always uses `ChaCha8Rng(seed)` on stream `i`, so results
//! are identical whether experiments run sequentially or on the rayon pool.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Binomial, Distribution};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::effect::EffectSampler;
use super::trajectory::{ArmSnapshot, DailySnapshot, ExperimentTrajectory};
use crate::config::{ExperimentConfig, NO_EFFECT};
use crate::error::{PeekError, Result};
use crate::sample_size::{calculate_sample_size, DailyAllocation, SampleSize};

/// Validated configuration plus everything derived from it.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: ExperimentConfig,
    sample_size: SampleSize,
    allocation: DailyAllocation,
    effect: EffectSampler,
}

impl Simulator {
    pub fn new(config: &ExperimentConfig) -> Result<Self> {
        config.validate()?;
        let sample_size = calculate_sample_size(&config.test.sample_size_request())?;
        let allocation = sample_size.daily_allocation(config.test.test_days)?;
        allocation.cumulative_trials(config.test.test_days)?;
        let effect = EffectSampler::new(&config.simulation.effect_prior)?;

        debug!(
            control = sample_size.control,
            treatment = sample_size.treatment,
            daily_control = allocation.control,
            daily_treatment = allocation.treatment,
            days = config.test.test_days,
            "Simulator configured"
        );

        Ok(Self {
            config: config.clone(),
            sample_size,
            allocation,
            effect,
        })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn sample_size(&self) -> SampleSize {
        self.sample_size
    }

    pub fn allocation(&self) -> DailyAllocation {
        self.allocation
    }

    /// Independent random stream for experiment `index`.
    pub fn rng_for(&self, index: usize) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.simulation.seed);
        rng.set_stream(index as u64);
        rng
    }

    /// Simulate one experiment's full trajectory.
    pub fn run_experiment(&self, index: usize) -> Result<ExperimentTrajectory> {
        let mut rng = self.rng_for(index);
        let test = &self.config.test;

        let true_effect = self.effect.sample(&mut rng);
        let treatment_p = test.baseline_rate * true_effect / NO_EFFECT;
        if treatment_p > 1.0 {
            warn!(index, true_effect, "Treatment probability above 1, clamping");
        }

        let control_draw = binomial(self.allocation.control, test.baseline_rate)?;
        let treatment_draw = binomial(self.allocation.treatment, treatment_p.clamp(0.0, 1.0))?;

        let mut control_successes = 0u64;
        let mut treatment_successes = 0u64;
        let mut days = Vec::with_capacity(test.test_days as usize);

        for day in 1..=test.test_days {
            control_successes += control_draw.sample(&mut rng);
            treatment_successes += treatment_draw.sample(&mut rng);

            let (control_trials, treatment_trials) = self.allocation.cumulative_trials(day)?;
            days.push(DailySnapshot::from_counts(
                day,
                ArmSnapshot::new(control_trials, control_successes),
                ArmSnapshot::new(treatment_trials, treatment_successes),
            ));
        }

        Ok(ExperimentTrajectory {
            index,
            true_effect,
            days,
        })
    }

    /// Run every configured experiment in index order.
    pub fn run(&self) -> Result<Vec<ExperimentTrajectory>> {
        let trajectories = (0..self.config.simulation.num_simulations)
            .map(|i| self.run_experiment(i))
            .collect::<Result<Vec<_>>>()?;
        info!(experiments = trajectories.len(), "Simulation complete");
        Ok(trajectories)
    }

    /// Same as [`Simulator::run`] but spread over the rayon pool.
    pub fn run_parallel(&self) -> Result<Vec<ExperimentTrajectory>> {
        let trajectories = (0..self.config.simulation.num_simulations)
            .into_par_iter()
            .map(|i| self.run_experiment(i))
            .collect::<Result<Vec<_>>>()?;
        info!(
            experiments = trajectories.len(),
            threads = rayon::current_num_threads(),
            "Parallel simulation complete"
        );
        Ok(trajectories)
    }

    /// Run sequentially or in parallel according to the config.
    pub fn simulate(&self) -> Result<Vec<ExperimentTrajectory>> {
        if self.config.simulation.parallel {
            self.run_parallel()
        } else {
            self.run()
        }
    }
}

fn binomial(trials: u64, p: f64) -> Result<Binomial> {
    Binomial::new(trials, p).map_err(|e| PeekError::Distribution(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectPrior;

    fn small_config() -> ExperimentConfig {
        let mut config = ExperimentConfig::default();
        config.test.expected_lift = 0.10;
        config.test.test_days = 10;
        config.simulation.num_simulations = 50;
        config
    }

    #[test]
    fn test_same_seed_reproduces_trajectories() {
        let sim = Simulator::new(&small_config()).unwrap();
        let first = sim.run().unwrap();
        let second = Simulator::new(&small_config()).unwrap().run().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seed_changes_trajectories() {
        let mut other = small_config();
        other.simulation.seed = 43;
        let a = Simulator::new(&small_config()).unwrap().run().unwrap();
        let b = Simulator::new(&other).unwrap().run().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sim = Simulator::new(&small_config()).unwrap();
        assert_eq!(sim.run().unwrap(), sim.run_parallel().unwrap());
    }

    #[test]
    fn test_single_experiment_independent_of_batch() {
        let sim = Simulator::new(&small_config()).unwrap();
        let batch = sim.run().unwrap();
        assert_eq!(sim.run_experiment(17).unwrap(), batch[17]);
    }

    #[test]
    fn test_trajectories_satisfy_count_invariants() {
        let sim = Simulator::new(&small_config()).unwrap();
        let allocation = sim.allocation();
        for trajectory in sim.run().unwrap() {
            assert_eq!(trajectory.days.len(), 10);
            assert!(trajectory.is_consistent(&allocation), "experiment {}", trajectory.index);
        }
    }

    #[test]
    fn test_full_treatment_rate_is_clamped() {
        let mut config = small_config();
        config.test.baseline_rate = 0.9;
        config.simulation.effect_prior = EffectPrior::Fixed { multiplier: 150.0 };
        let sim = Simulator::new(&config).unwrap();
        let trajectory = sim.run_experiment(0).unwrap();
        let last = trajectory.final_day().unwrap();
        assert_eq!(last.treatment.successes, last.treatment.trials);
        assert!(last.z_score.is_finite());
    }

    #[test]
    fn test_undetectably_small_lift_is_rejected() {
        let mut config = small_config();
        config.test.expected_lift = 2e-12;
        let err = Simulator::new(&config).unwrap_err();
        assert!(matches!(err, PeekError::SampleSizeTooLarge { .. }), "{:?}", err);
    }

    #[test]
    fn test_final_day_reaches_planned_sample() {
        let sim = Simulator::new(&small_config()).unwrap();
        let trajectory = sim.run_experiment(0).unwrap();
        let last = trajectory.final_day().unwrap();
        assert!(last.control.trials >= sim.sample_size().control);
        assert!(last.treatment.trials >= sim.sample_size().treatment);
    }
}
