//! # peek_core - A/B-Test Peeking Simulator
//!
//! Numeric core for showing how checking p-values every day inflates false
//! positives while producing more (apparent) wins.
//!
//! ## Features
//! - Two-proportion sample-size calculator (normal approximation)
//! - Deterministic experiment simulation (same seed = same trajectories)
//! - Fixed-horizon and peeking stopping policies
//! - Per-partition accuracy and business-impact reports
//!
//! Rendering lives in `peek_cli`; nothing here prints.

pub mod config;
pub mod error;
pub mod normal;
pub mod policy;
pub mod report;
pub mod sample_size;
pub mod simulation;

pub use config::{EffectPrior, ExperimentConfig, SimulationConfig, TestConfig, NO_EFFECT};
pub use error::{PeekError, Result};
pub use policy::{Decision, FixedHorizon, Peeking, StopReason, StoppingPolicy, Verdict};
pub use report::{
    evaluate, BusinessImpact, EffectPartition, ExperimentOutcome, PartitionSummary, PolicyReport,
    SimulationReport,
};
pub use sample_size::{calculate_sample_size, DailyAllocation, SampleSize, SampleSizeRequest, Tail};
pub use simulation::{ArmSnapshot, DailySnapshot, ExperimentTrajectory, Simulator};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulate the configured experiments and score both policies.
pub fn run_report(config: &ExperimentConfig) -> Result<(SimulationReport, Vec<ExperimentTrajectory>)> {
    let simulator = Simulator::new(config)?;
    let trajectories = simulator.simulate()?;
    let report = SimulationReport::build(&simulator, &trajectories);
    Ok((report, trajectories))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_report_is_deterministic() {
        let mut config = ExperimentConfig::default();
        config.test.test_days = 7;
        config.simulation.num_simulations = 100;

        let (first, first_traj) = run_report(&config).unwrap();
        let (second, second_traj) = run_report(&config).unwrap();
        assert_eq!(first_traj, second_traj);
        assert_eq!(first, second);
    }

    #[test]
    fn test_run_report_propagates_validation_errors() {
        let mut config = ExperimentConfig::default();
        config.simulation.num_simulations = 0;
        assert!(matches!(
            run_report(&config),
            Err(PeekError::InvalidSimulationCount)
        ));
    }
}
