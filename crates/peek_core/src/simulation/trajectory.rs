//! Per-experiment trajectory records.

use serde::{Deserialize, Serialize};

use crate::config::NO_EFFECT;
use crate::normal;
use crate::sample_size::DailyAllocation;

/// Floor for the pooled variance so a zero or full conversion rate never
/// divides by zero.
pub const MIN_POOLED_VARIANCE: f64 = 1e-12;

/// Cumulative counts for one arm on one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmSnapshot {
    pub trials: u64,
    pub successes: u64,
    pub rate: f64,
}

impl ArmSnapshot {
    pub fn new(trials: u64, successes: u64) -> Self {
        let rate = if trials == 0 {
            0.0
        } else {
            successes as f64 / trials as f64
        };
        Self {
            trials,
            successes,
            rate,
        }
    }
}

/// Observed statistics after `day` days of data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailySnapshot {
    /// 1-based
    pub day: u32,
    pub control: ArmSnapshot,
    pub treatment: ArmSnapshot,
    pub z_score: f64,
    /// One-sided upper tail, 1 − Φ(z)
    pub p_value: f64,
}

impl DailySnapshot {
    pub fn from_counts(day: u32, control: ArmSnapshot, treatment: ArmSnapshot) -> Self {
        let z_score = pooled_z_score(&control, &treatment);
        Self {
            day,
            control,
            treatment,
            z_score,
            p_value: normal::upper_tail(z_score),
        }
    }

    /// Observed treatment rate as percent of control, `None` while the
    /// control arm has no conversions.
    pub fn observed_effect(&self) -> Option<f64> {
        (self.control.rate > 0.0).then(|| self.treatment.rate / self.control.rate * NO_EFFECT)
    }
}

/// z statistic of `treatment.rate - control.rate` over the pooled
/// standard error. Always finite.
pub fn pooled_z_score(control: &ArmSnapshot, treatment: &ArmSnapshot) -> f64 {
    if control.trials == 0 || treatment.trials == 0 {
        return 0.0;
    }
    let n_c = control.trials as f64;
    let n_t = treatment.trials as f64;
    let pooled = (control.successes + treatment.successes) as f64 / (n_c + n_t);
    let variance = (pooled * (1.0 - pooled) * (1.0 / n_c + 1.0 / n_t)).max(MIN_POOLED_VARIANCE);
    (treatment.rate - control.rate) / variance.sqrt()
}

/// One simulated experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentTrajectory {
    pub index: usize,
    /// Ground truth, percent of baseline. Never shown to a stopping policy.
    pub true_effect: f64,
    pub days: Vec<DailySnapshot>,
}

impl ExperimentTrajectory {
    pub fn final_day(&self) -> Option<&DailySnapshot> {
        self.days.last()
    }

    /// Check the cumulative-count invariants against the daily allocation.
    pub fn is_consistent(&self, allocation: &DailyAllocation) -> bool {
        let mut previous: Option<&DailySnapshot> = None;
        for (i, snap) in self.days.iter().enumerate() {
            let day = i as u64 + 1;
            if u64::from(snap.day) != day
                || allocation.cumulative_trials(snap.day).ok()
                    != Some((snap.control.trials, snap.treatment.trials))
                || snap.control.successes > snap.control.trials
                || snap.treatment.successes > snap.treatment.trials
            {
                return false;
            }
            if let Some(prev) = previous {
                if snap.control.successes < prev.control.successes
                    || snap.treatment.successes < prev.treatment.successes
                {
                    return false;
                }
            }
            previous = Some(snap);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_z_score_sign_follows_difference() {
        let control = ArmSnapshot::new(1000, 100);
        let better = ArmSnapshot::new(1000, 130);
        let worse = ArmSnapshot::new(1000, 80);
        assert!(pooled_z_score(&control, &better) > 0.0);
        assert!(pooled_z_score(&control, &worse) < 0.0);
        assert_eq!(pooled_z_score(&control, &control), 0.0);
    }

    #[test]
    fn test_z_score_matches_hand_computation() {
        let control = ArmSnapshot::new(1000, 100);
        let treatment = ArmSnapshot::new(1000, 130);
        // pooled 0.115, se = sqrt(0.115 * 0.885 * 0.002)
        let expected = 0.03 / (0.115f64 * 0.885 * 0.002).sqrt();
        assert!((pooled_z_score(&control, &treatment) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_rates_stay_finite() {
        let none = ArmSnapshot::new(500, 0);
        let all = ArmSnapshot::new(500, 500);
        for (c, t) in [(none, none), (all, all), (none, all), (all, none)] {
            let snap = DailySnapshot::from_counts(1, c, t);
            assert!(snap.z_score.is_finite());
            assert!(snap.p_value.is_finite());
            assert!((0.0..=1.0).contains(&snap.p_value));
        }
        let tied = DailySnapshot::from_counts(1, none, none);
        assert_eq!(tied.z_score, 0.0);
        assert!((tied.p_value - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_observed_effect() {
        let snap = DailySnapshot::from_counts(1, ArmSnapshot::new(100, 50), ArmSnapshot::new(100, 55));
        assert!((snap.observed_effect().unwrap() - 110.0).abs() < 1e-9);
        let empty = DailySnapshot::from_counts(1, ArmSnapshot::new(100, 0), ArmSnapshot::new(100, 5));
        assert!(empty.observed_effect().is_none());
    }

    #[test]
    fn test_consistency_detects_decreasing_successes() {
        let allocation = DailyAllocation {
            control: 10,
            treatment: 10,
        };
        let good = ExperimentTrajectory {
            index: 0,
            true_effect: 100.0,
            days: vec![
                DailySnapshot::from_counts(1, ArmSnapshot::new(10, 3), ArmSnapshot::new(10, 4)),
                DailySnapshot::from_counts(2, ArmSnapshot::new(20, 5), ArmSnapshot::new(20, 9)),
            ],
        };
        assert!(good.is_consistent(&allocation));

        let mut bad = good.clone();
        bad.days[1].control = ArmSnapshot::new(20, 2);
        assert!(!bad.is_consistent(&allocation));
    }

    proptest! {
        #[test]
        fn prop_snapshot_statistics_are_finite(
            n_c in 1u64..100_000,
            n_t in 1u64..100_000,
            frac_c in 0.0f64..=1.0,
            frac_t in 0.0f64..=1.0,
        ) {
            let control = ArmSnapshot::new(n_c, (n_c as f64 * frac_c) as u64);
            let treatment = ArmSnapshot::new(n_t, (n_t as f64 * frac_t) as u64);
            let snap = DailySnapshot::from_counts(1, control, treatment);
            prop_assert!(snap.z_score.is_finite());
            prop_assert!(snap.p_value >= 0.0 && snap.p_value <= 1.0);
        }
    }
}
