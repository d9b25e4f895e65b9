//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use peek_core::{EffectPrior, ExperimentConfig, Tail, TestConfig};

#[derive(Parser, Debug)]
#[command(name = "peek-sim")]
#[command(about = "Simulate what peeking at A/B test p-values costs", long_about = None)]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the required sample size per arm
    SampleSize {
        #[command(flatten)]
        test: TestArgs,

        /// Also show the per-day allocation over this many days
        #[arg(long)]
        days: Option<u32>,
    },

    /// Simulate experiments and compare fixed-horizon with peeking
    Simulate {
        /// YAML or JSON config file; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        test: TestArgs,

        #[command(flatten)]
        simulation: SimulationArgs,

        /// Write the full report as JSON
        #[arg(long)]
        report_json: Option<PathBuf>,

        /// Write every trajectory as JSON
        #[arg(long)]
        trajectories_json: Option<PathBuf>,
    },
}

/// Calculator parameters shared by both subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct TestArgs {
    /// Significance level
    #[arg(long)]
    pub alpha: Option<f64>,

    #[arg(long)]
    pub power: Option<f64>,

    /// Control conversion rate
    #[arg(long)]
    pub baseline: Option<f64>,

    /// Relative lift to detect (0.01 = +1%)
    #[arg(long)]
    pub lift: Option<f64>,

    /// Treatment : control allocation ratio
    #[arg(long)]
    pub ratio: Option<f64>,

    /// One- or two-sided test; overrides the config either way
    #[arg(long, value_enum)]
    pub tail: Option<TailArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TailArg {
    OneSided,
    TwoSided,
}

impl From<TailArg> for Tail {
    fn from(arg: TailArg) -> Self {
        match arg {
            TailArg::OneSided => Tail::OneSided,
            TailArg::TwoSided => Tail::TwoSided,
        }
    }
}

impl TestArgs {
    pub fn apply(&self, test: &mut TestConfig) {
        if let Some(alpha) = self.alpha {
            test.alpha = alpha;
        }
        if let Some(power) = self.power {
            test.power = power;
        }
        if let Some(baseline) = self.baseline {
            test.baseline_rate = baseline;
        }
        if let Some(lift) = self.lift {
            test.expected_lift = lift;
        }
        if let Some(ratio) = self.ratio {
            test.allocation_ratio = ratio;
        }
        if let Some(tail) = self.tail {
            test.tail = tail.into();
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct SimulationArgs {
    /// Days each experiment runs
    #[arg(long)]
    pub days: Option<u32>,

    /// Number of simulated experiments
    #[arg(long)]
    pub simulations: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Spread experiments over all cores
    #[arg(long, default_value = "false")]
    pub parallel: bool,

    /// Student-t degrees of freedom for the true-effect prior
    #[arg(long)]
    pub prior_df: Option<f64>,

    /// Student-t scale (percentage points) for the true-effect prior
    #[arg(long)]
    pub prior_scale: Option<f64>,

    /// Every experiment has no true effect
    #[arg(long, default_value = "false", conflicts_with_all = ["prior_df", "prior_scale"])]
    pub null: bool,
}

impl SimulationArgs {
    pub fn apply(&self, config: &mut ExperimentConfig) {
        if let Some(days) = self.days {
            config.test.test_days = days;
        }
        let sim = &mut config.simulation;
        if let Some(n) = self.simulations {
            sim.num_simulations = n;
        }
        if let Some(seed) = self.seed {
            sim.seed = seed;
        }
        if self.parallel {
            sim.parallel = true;
        }
        if self.null {
            sim.effect_prior = EffectPrior::null();
        } else if self.prior_df.is_some() || self.prior_scale.is_some() {
            let (default_df, default_scale) = match sim.effect_prior {
                EffectPrior::StudentT {
                    degrees_of_freedom,
                    scale,
                } => (degrees_of_freedom, scale),
                _ => (3.0, 1.0),
            };
            sim.effect_prior = EffectPrior::StudentT {
                degrees_of_freedom: self.prior_df.unwrap_or(default_df),
                scale: self.prior_scale.unwrap_or(default_scale),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample_size() {
        let cli = Cli::try_parse_from([
            "peek-sim",
            "sample-size",
            "--alpha",
            "0.01",
            "--tail",
            "two-sided",
            "--days",
            "7",
        ])
        .unwrap();
        match cli.command {
            Commands::SampleSize { test, days } => {
                assert_eq!(test.alpha, Some(0.01));
                assert_eq!(test.tail, Some(TailArg::TwoSided));
                assert_eq!(days, Some(7));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_simulate_flags_override_config() {
        let cli = Cli::try_parse_from([
            "peek-sim",
            "simulate",
            "--lift",
            "0.05",
            "--simulations",
            "250",
            "--seed",
            "9",
            "--prior-scale",
            "2.5",
        ])
        .unwrap();
        let Commands::Simulate {
            test, simulation, ..
        } = cli.command
        else {
            panic!("expected simulate");
        };

        let mut config = ExperimentConfig::default();
        test.apply(&mut config.test);
        simulation.apply(&mut config);

        assert_eq!(config.test.expected_lift, 0.05);
        assert_eq!(config.test.alpha, 0.05);
        assert_eq!(config.simulation.num_simulations, 250);
        assert_eq!(config.simulation.seed, 9);
        assert_eq!(
            config.simulation.effect_prior,
            EffectPrior::StudentT {
                degrees_of_freedom: 3.0,
                scale: 2.5
            }
        );
    }

    #[test]
    fn test_tail_flag_overrides_config_both_ways() {
        let cli =
            Cli::try_parse_from(["peek-sim", "simulate", "--tail", "one-sided"]).unwrap();
        let Commands::Simulate { test, .. } = cli.command else {
            panic!("expected simulate");
        };
        let mut config = TestConfig {
            tail: Tail::TwoSided,
            ..TestConfig::default()
        };
        test.apply(&mut config);
        assert_eq!(config.tail, Tail::OneSided);

        let mut untouched = config.clone();
        TestArgs::default().apply(&mut untouched);
        assert_eq!(untouched, config);

        assert!(Cli::try_parse_from(["peek-sim", "sample-size", "--tail", "both"]).is_err());
    }

    #[test]
    fn test_null_conflicts_with_prior_flags() {
        let result = Cli::try_parse_from(["peek-sim", "simulate", "--null", "--prior-df", "5"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from(["peek-sim", "simulate", "--null"]).unwrap();
        let Commands::Simulate { simulation, .. } = cli.command else {
            panic!("expected simulate");
        };
        let mut config = ExperimentConfig::default();
        simulation.apply(&mut config);
        assert_eq!(config.simulation.effect_prior, EffectPrior::null());
    }
}
