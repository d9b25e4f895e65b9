//! Scoring stopping policies against ground truth.
//!
//! Experiments are partitioned by true effect relative to 100 (no effect).
//! For each partition and policy we report how often the verdict was right
//! and how long the experiments ran, plus the "business wins" each policy
//! would have shipped.

use serde::{Deserialize, Serialize};

use crate::config::{ExperimentConfig, NO_EFFECT};
use crate::policy::{Decision, FixedHorizon, Peeking, StoppingPolicy, Verdict};
use crate::sample_size::{DailyAllocation, SampleSize};
use crate::simulation::{ExperimentTrajectory, Simulator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectPartition {
    /// True effect below 100
    Negative,
    /// Exactly 100
    Null,
    Positive,
}

impl EffectPartition {
    pub const ALL: [EffectPartition; 3] = [
        EffectPartition::Negative,
        EffectPartition::Null,
        EffectPartition::Positive,
    ];

    pub fn of(true_effect: f64) -> Self {
        if true_effect < NO_EFFECT {
            EffectPartition::Negative
        } else if true_effect > NO_EFFECT {
            EffectPartition::Positive
        } else {
            EffectPartition::Null
        }
    }

    /// Only a real improvement should be shipped.
    pub fn correct_verdict(self) -> Verdict {
        match self {
            EffectPartition::Positive => Verdict::Reject,
            EffectPartition::Negative | EffectPartition::Null => Verdict::Retain,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EffectPartition::Negative => "effect < 100",
            EffectPartition::Null => "effect = 100",
            EffectPartition::Positive => "effect > 100",
        }
    }
}

/// One experiment judged by one policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperimentOutcome {
    pub index: usize,
    pub true_effect: f64,
    pub decision: Decision,
    /// Observed treatment/control ratio (percent) on the stop day
    pub observed_effect: Option<f64>,
}

impl ExperimentOutcome {
    pub fn partition(&self) -> EffectPartition {
        EffectPartition::of(self.true_effect)
    }

    pub fn is_correct(&self) -> bool {
        self.decision.verdict == self.partition().correct_verdict()
    }
}

pub fn evaluate(
    trajectories: &[ExperimentTrajectory],
    policy: &dyn StoppingPolicy,
) -> Vec<ExperimentOutcome> {
    trajectories
        .iter()
        .map(|trajectory| {
            let decision = policy.decide(&trajectory.days);
            let observed_effect = trajectory
                .days
                .iter()
                .find(|d| d.day == decision.stop_day)
                .and_then(|d| d.observed_effect());
            ExperimentOutcome {
                index: trajectory.index,
                true_effect: trajectory.true_effect,
                decision,
                observed_effect,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionSummary {
    pub partition: EffectPartition,
    pub experiments: usize,
    pub correct: usize,
    /// correct / experiments
    pub accuracy: f64,
    /// Share of experiments with a Reject verdict (false-positive rate for `Null`)
    pub rejection_rate: f64,
    pub mean_stop_day: f64,
}

/// What a team acting on every Reject verdict would have shipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessImpact {
    pub wins: usize,
    pub true_wins: usize,
    pub false_wins: usize,
    /// Mean of (true effect − 100) across wins
    pub mean_true_lift: Option<f64>,
    /// Mean of (observed effect − 100) across wins, as reported at stop time
    pub mean_observed_lift: Option<f64>,
    /// Sum of (true effect − 100) across wins
    pub cumulative_true_lift: f64,
}

impl BusinessImpact {
    fn from_outcomes(outcomes: &[ExperimentOutcome]) -> Self {
        let wins: Vec<&ExperimentOutcome> = outcomes
            .iter()
            .filter(|o| o.decision.verdict == Verdict::Reject)
            .collect();
        let true_wins = wins.iter().filter(|o| o.true_effect > NO_EFFECT).count();

        let true_lifts: Vec<f64> = wins.iter().map(|o| o.true_effect - NO_EFFECT).collect();
        let observed_lifts: Vec<f64> = wins
            .iter()
            .filter_map(|o| o.observed_effect)
            .map(|e| e - NO_EFFECT)
            .collect();

        Self {
            wins: wins.len(),
            true_wins,
            false_wins: wins.len() - true_wins,
            mean_true_lift: mean(&true_lifts),
            mean_observed_lift: mean(&observed_lifts),
            cumulative_true_lift: true_lifts.iter().sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyReport {
    pub policy: String,
    pub experiments: usize,
    /// Non-empty partitions only, in `EffectPartition::ALL` order
    pub partitions: Vec<PartitionSummary>,
    pub overall_accuracy: f64,
    pub mean_stop_day: f64,
    pub business: BusinessImpact,
    /// `stop_day_histogram[d - 1]` = experiments stopped on day `d`
    pub stop_day_histogram: Vec<usize>,
}

impl PolicyReport {
    pub fn from_outcomes(policy: &str, outcomes: &[ExperimentOutcome], days: u32) -> Self {
        let partitions = EffectPartition::ALL
            .iter()
            .filter_map(|&partition| {
                let members: Vec<&ExperimentOutcome> =
                    outcomes.iter().filter(|o| o.partition() == partition).collect();
                summarize(partition, &members)
            })
            .collect();

        let mut stop_day_histogram = vec![0usize; days as usize];
        for outcome in outcomes {
            let day = outcome.decision.stop_day as usize;
            if (1..=stop_day_histogram.len()).contains(&day) {
                stop_day_histogram[day - 1] += 1;
            }
        }

        let stop_days: Vec<f64> = outcomes.iter().map(|o| o.decision.stop_day as f64).collect();
        let correct = outcomes.iter().filter(|o| o.is_correct()).count();

        Self {
            policy: policy.to_string(),
            experiments: outcomes.len(),
            partitions,
            overall_accuracy: ratio(correct, outcomes.len()),
            mean_stop_day: mean(&stop_days).unwrap_or(0.0),
            business: BusinessImpact::from_outcomes(outcomes),
            stop_day_histogram,
        }
    }

    pub fn partition(&self, partition: EffectPartition) -> Option<&PartitionSummary> {
        self.partitions.iter().find(|s| s.partition == partition)
    }

    /// Rejection rate among experiments whose true effect is exactly 100.
    pub fn false_positive_rate(&self) -> Option<f64> {
        self.partition(EffectPartition::Null).map(|s| s.rejection_rate)
    }
}

fn summarize(partition: EffectPartition, members: &[&ExperimentOutcome]) -> Option<PartitionSummary> {
    if members.is_empty() {
        return None;
    }
    let correct = members.iter().filter(|o| o.is_correct()).count();
    let rejections = members
        .iter()
        .filter(|o| o.decision.verdict == Verdict::Reject)
        .count();
    let stop_days: Vec<f64> = members.iter().map(|o| o.decision.stop_day as f64).collect();

    Some(PartitionSummary {
        partition,
        experiments: members.len(),
        correct,
        accuracy: ratio(correct, members.len()),
        rejection_rate: ratio(rejections, members.len()),
        mean_stop_day: mean(&stop_days).unwrap_or(0.0),
    })
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Both policies evaluated over the same trajectories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub config: ExperimentConfig,
    pub sample_size: SampleSize,
    pub daily_allocation: DailyAllocation,
    pub policies: Vec<PolicyReport>,
}

impl SimulationReport {
    pub fn build(simulator: &Simulator, trajectories: &[ExperimentTrajectory]) -> Self {
        let config = simulator.config().clone();
        let alpha = config.test.alpha;
        let days = config.test.test_days;
        let fixed = FixedHorizon { alpha };
        let peeking = Peeking { alpha };
        let candidates: [&dyn StoppingPolicy; 2] = [&fixed, &peeking];

        let policies = candidates
            .iter()
            .map(|policy| {
                let outcomes = evaluate(trajectories, *policy);
                PolicyReport::from_outcomes(policy.name(), &outcomes, days)
            })
            .collect();

        Self {
            config,
            sample_size: simulator.sample_size(),
            daily_allocation: simulator.allocation(),
            policies,
        }
    }

    pub fn policy(&self, name: &str) -> Option<&PolicyReport> {
        self.policies.iter().find(|p| p.policy == name)
    }
}
