//! Stopping policies.
//!
//! A policy only ever sees the observed daily snapshots, never the true
//! effect of the experiment.

use serde::{Deserialize, Serialize};

use crate::simulation::DailySnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Null rejected: treatment declared a win
    Reject,
    Retain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// p < alpha before the planned end
    Significance,
    /// p > 1 - alpha before the planned end
    Futility,
    /// Ran to the last day (inconclusive if retained)
    Horizon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub stop_day: u32,
    pub reason: StopReason,
    pub verdict: Verdict,
}

impl Decision {
    fn no_data() -> Self {
        Self {
            stop_day: 0,
            reason: StopReason::Horizon,
            verdict: Verdict::Retain,
        }
    }

    fn at_horizon(last: &DailySnapshot, alpha: f64) -> Self {
        Self {
            stop_day: last.day,
            reason: StopReason::Horizon,
            verdict: if last.p_value < alpha {
                Verdict::Reject
            } else {
                Verdict::Retain
            },
        }
    }
}

pub trait StoppingPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Decide from the snapshots in day order.
    fn decide(&self, days: &[DailySnapshot]) -> Decision;
}

/// Look once, at the end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedHorizon {
    pub alpha: f64,
}

impl StoppingPolicy for FixedHorizon {
    fn name(&self) -> &'static str {
        "fixed_horizon"
    }

    fn decide(&self, days: &[DailySnapshot]) -> Decision {
        match days.last() {
            Some(last) => Decision::at_horizon(last, self.alpha),
            None => Decision::no_data(),
        }
    }
}

/// Look every day; stop on the first significant or futile p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peeking {
    pub alpha: f64,
}

impl StoppingPolicy for Peeking {
    fn name(&self) -> &'static str {
        "peeking"
    }

    fn decide(&self, days: &[DailySnapshot]) -> Decision {
        let first_win = days.iter().find(|d| d.p_value < self.alpha).map(|d| d.day);
        let first_futile = days
            .iter()
            .find(|d| d.p_value > 1.0 - self.alpha)
            .map(|d| d.day);

        // Significance takes the tie when both fire on the same day.
        match (first_win, first_futile) {
            (Some(win), Some(futile)) if futile < win => Decision {
                stop_day: futile,
                reason: StopReason::Futility,
                verdict: Verdict::Retain,
            },
            (Some(win), _) => Decision {
                stop_day: win,
                reason: StopReason::Significance,
                verdict: Verdict::Reject,
            },
            (None, Some(futile)) => Decision {
                stop_day: futile,
                reason: StopReason::Futility,
                verdict: Verdict::Retain,
            },
            (None, None) => match days.last() {
                Some(last) => Decision::at_horizon(last, self.alpha),
                None => Decision::no_data(),
            },
        }
    }
}
