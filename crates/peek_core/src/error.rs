use thiserror::Error;

#[derive(Error, Debug)]
pub enum PeekError {
    #[error("{name} must lie strictly between 0 and 1, got {value}")]
    OutOfUnitInterval { name: &'static str, value: f64 },

    #[error("Allocation ratio must be a positive finite number, got {0}")]
    InvalidAllocationRatio(f64),

    #[error("Control and treatment rates are both {rate}: there is no difference to detect")]
    NoDetectableEffect { rate: f64 },

    #[error("Computed {what} is not finite")]
    NonFinite { what: &'static str },

    #[error("Required sample of {required:.3e} observations exceeds the supported maximum of {max}")]
    SampleSizeTooLarge { required: f64, max: u64 },

    #[error("Test must run for at least one day")]
    InvalidTestDays,

    #[error("Number of simulations must be at least 1")]
    InvalidSimulationCount,

    #[error("Invalid effect prior: {0}")]
    InvalidEffectPrior(String),

    #[error("Distribution error: {0}")]
    Distribution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PeekError {
    /// True for errors caused by the supplied parameters rather than I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PeekError::OutOfUnitInterval { .. }
                | PeekError::InvalidAllocationRatio(_)
                | PeekError::NoDetectableEffect { .. }
                | PeekError::SampleSizeTooLarge { .. }
                | PeekError::InvalidTestDays
                | PeekError::InvalidSimulationCount
                | PeekError::InvalidEffectPrior(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PeekError>;

/// Fail unless `value` lies in the open interval (0, 1).
pub(crate) fn ensure_unit_interval(name: &'static str, value: f64) -> Result<f64> {
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(PeekError::OutOfUnitInterval { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_interval_rejects_bounds_and_nan() {
        assert!(ensure_unit_interval("alpha", 0.05).is_ok());
        assert!(ensure_unit_interval("alpha", 0.0).is_err());
        assert!(ensure_unit_interval("alpha", 1.0).is_err());
        assert!(ensure_unit_interval("alpha", f64::NAN).is_err());
    }

    #[test]
    fn test_error_messages_name_the_parameter() {
        let err = ensure_unit_interval("power", 1.5).unwrap_err();
        assert_eq!(err.to_string(), "power must lie strictly between 0 and 1, got 1.5");
        assert!(err.is_validation());
    }
}
