//! Two-proportion sample-size calculator.
//!
//! Normal approximation to the binomial with a blended (allocation-weighted)
//! proportion for the variance. The allocation ratio is treatment : control.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_unit_interval, PeekError, Result};
use crate::normal;

/// Which tail(s) of the test statistic count as significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tail {
    #[default]
    OneSided,
    TwoSided,
}

impl Tail {
    /// Alpha spent on a single tail.
    pub fn tail_alpha(self, alpha: f64) -> f64 {
        match self {
            Tail::OneSided => alpha,
            Tail::TwoSided => alpha / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeRequest {
    pub alpha: f64,
    pub power: f64,
    pub control_rate: f64,
    pub treatment_rate: f64,
    pub allocation_ratio: f64,
    pub tail: Tail,
}

/// Largest total sample the calculator will return. Every integer up to
/// 2^53 is exact in an `f64`, and per-day cumulative counts stay far from
/// `u64` overflow.
pub const MAX_TOTAL_SAMPLE: u64 = 1 << 53;

/// Required observations per arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleSize {
    pub control: u64,
    pub treatment: u64,
}

/// Per-day trials per arm when a sample is spread over the test days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAllocation {
    pub control: u64,
    pub treatment: u64,
}

impl SampleSize {
    pub fn total(&self) -> u64 {
        self.control.saturating_add(self.treatment)
    }

    /// Split each arm evenly across `days`, rounding up so the final day
    /// reaches at least the planned sample.
    pub fn daily_allocation(&self, days: u32) -> Result<DailyAllocation> {
        if days == 0 {
            return Err(PeekError::InvalidTestDays);
        }
        let days = u64::from(days);
        Ok(DailyAllocation {
            control: self.control.div_ceil(days),
            treatment: self.treatment.div_ceil(days),
        })
    }
}

impl DailyAllocation {
    /// Cumulative `(control, treatment)` trials after `day` days.
    pub fn cumulative_trials(&self, day: u32) -> Result<(u64, u64)> {
        let day = u64::from(day);
        let checked = |daily: u64| {
            daily
                .checked_mul(day)
                .ok_or(PeekError::SampleSizeTooLarge {
                    required: daily as f64 * day as f64,
                    max: u64::MAX,
                })
        };
        Ok((checked(self.control)?, checked(self.treatment)?))
    }
}

impl SampleSizeRequest {
    pub fn validate(&self) -> Result<()> {
        ensure_unit_interval("alpha", self.alpha)?;
        ensure_unit_interval("power", self.power)?;
        ensure_unit_interval("control_rate", self.control_rate)?;
        ensure_unit_interval("treatment_rate", self.treatment_rate)?;
        if !(self.allocation_ratio.is_finite() && self.allocation_ratio > 0.0) {
            return Err(PeekError::InvalidAllocationRatio(self.allocation_ratio));
        }
        if self.control_rate == self.treatment_rate {
            return Err(PeekError::NoDetectableEffect {
                rate: self.control_rate,
            });
        }
        Ok(())
    }
}

/// Compute the per-arm sample size needed to detect
/// `treatment_rate - control_rate` at the requested alpha and power.
pub fn calculate_sample_size(request: &SampleSizeRequest) -> Result<SampleSize> {
    request.validate()?;

    let z_alpha = normal::quantile(request.tail.tail_alpha(request.alpha));
    let z_power = normal::quantile(request.power);

    let control_fraction = 1.0 / (1.0 + request.allocation_ratio);
    let treatment_fraction = request.allocation_ratio / (1.0 + request.allocation_ratio);

    let blended = control_fraction * request.control_rate
        + treatment_fraction * request.treatment_rate;
    let variance =
        blended * (1.0 - blended) * (1.0 / control_fraction + 1.0 / treatment_fraction);

    let delta = request.treatment_rate - request.control_rate;
    let total = variance * ((z_power - z_alpha) / -delta).powi(2);
    if !total.is_finite() {
        return Err(PeekError::NonFinite {
            what: "total sample size",
        });
    }
    if total > MAX_TOTAL_SAMPLE as f64 {
        return Err(PeekError::SampleSizeTooLarge {
            required: total,
            max: MAX_TOTAL_SAMPLE,
        });
    }

    Ok(SampleSize {
        control: (total * control_fraction).ceil() as u64,
        treatment: (total * treatment_fraction).ceil() as u64,
    })
}
