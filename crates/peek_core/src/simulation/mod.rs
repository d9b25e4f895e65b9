//! Sequential experiment simulation
//!
//! - `effect`: true-effect priors
//! - `trajectory`: typed per-day records and the pooled z-test
//! - `runner`: the `Simulator` that produces trajectories

pub mod effect;
pub mod runner;
pub mod trajectory;

pub use effect::EffectSampler;
pub use runner::Simulator;
pub use trajectory::{
    pooled_z_score, ArmSnapshot, DailySnapshot, ExperimentTrajectory, MIN_POOLED_VARIANCE,
};
