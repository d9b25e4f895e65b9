//! Standard normal helpers.
//!
//! Thin wrappers over the `statrs` error functions so callers never have
//! to construct (and unwrap) a `Normal` distribution for N(0, 1).

use statrs::function::erf::{erfc, erfc_inv};
use std::f64::consts::SQRT_2;

/// Φ(x), the standard normal CDF.
pub fn cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// 1 − Φ(x), evaluated without cancellation for large `x`.
pub fn upper_tail(x: f64) -> f64 {
    0.5 * erfc(x / SQRT_2)
}

/// Φ⁻¹(p) for p in (0, 1).
pub fn quantile(p: f64) -> f64 {
    -SQRT_2 * erfc_inv(2.0 * p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdf_reference_points() {
        assert!((cdf(0.0) - 0.5).abs() < 1e-12);
        assert!((cdf(1.959_963_985) - 0.975).abs() < 1e-6);
        assert!((cdf(-1.644_853_627) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_upper_tail_complements_cdf() {
        for x in [-3.0, -1.0, 0.0, 0.5, 2.0, 4.0] {
            assert!((upper_tail(x) + cdf(x) - 1.0).abs() < 1e-12);
        }
        assert!(upper_tail(40.0) >= 0.0);
    }

    #[test]
    fn test_quantile_inverts_cdf() {
        for p in [0.001, 0.025, 0.05, 0.2, 0.5, 0.8, 0.975] {
            assert!((cdf(quantile(p)) - p).abs() < 1e-9, "p = {}", p);
        }
        assert!((quantile(0.05) + 1.644_853_627).abs() < 1e-6);
    }
}
