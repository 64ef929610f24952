//! stationarity::mackinnon — response surfaces for Dickey–Fuller statistics.
//!
//! Approximate p-values follow MacKinnon (1994) and finite-sample critical
//! values follow MacKinnon (2010), both for a single series with a
//! constant and no trend. They are shared by ADF and Phillips–Perron,
//! whose statistics have the same limiting distribution.
use std::collections::BTreeMap;

use statrs::function::erf::erfc;

/// Statistic above which the p-value is 1.
const TAU_MAX: f64 = 2.74;
/// Statistic below which the p-value is 0.
const TAU_MIN: f64 = -18.83;
/// Switch point between the small-p and large-p polynomials.
const TAU_STAR: f64 = -1.61;

const SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

/// `(label, [β∞, β1, β2, β3])` for `cv(T) = β∞ + β1/T + β2/T² + β3/T³`.
const CRITICAL_SURFACE: [(&str, [f64; 4]); 3] = [
    ("1%", [-3.43035, -6.5393, -16.786, -79.433]),
    ("5%", [-2.86154, -2.8903, -4.234, -40.040]),
    ("10%", [-2.56677, -1.5384, -2.809, 0.0]),
];

/// Approximate p-value of a constant-only Dickey–Fuller t-statistic.
pub fn mackinnon_p_value(stat: f64) -> f64 {
    if stat.is_nan() {
        return f64::NAN;
    }
    if stat > TAU_MAX {
        return 1.0;
    }
    if stat < TAU_MIN {
        return 0.0;
    }
    let z = if stat <= TAU_STAR { polyval(&SMALL_P, stat) } else { polyval(&LARGE_P, stat) };
    standard_normal_cdf(z)
}

/// Critical values at 1%, 5% and 10% for a regression with `nobs` rows.
pub fn mackinnon_critical_values(nobs: usize) -> BTreeMap<String, f64> {
    let t = nobs.max(1) as f64;
    CRITICAL_SURFACE
        .iter()
        .map(|(label, b)| (label.to_string(), b[0] + b[1] / t + b[2] / t.powi(2) + b[3] / t.powi(3)))
        .collect()
}

//
// ---------- Private helpers (compact docs) ----------
//

/// Polynomial with ascending coefficients evaluated by Horner's rule.
#[inline]
fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

#[inline]
fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Asymptotic critical values and their finite-sample drift.
    // - p-value monotonicity, clamping, and consistency with the 5% value.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Critical values approach the asymptotic constants as T grows.
    //
    // Given
    // -----
    // - T = 1_000_000 and T = 100.
    //
    // Expect
    // ------
    // - 5% ≈ −2.8615 for large T; finite-sample values are more negative.
    fn critical_values_converge_to_asymptotic_constants() {
        let large = mackinnon_critical_values(1_000_000);
        assert_relative_eq!(large["5%"], -2.86154, epsilon = 1e-4);
        let small = mackinnon_critical_values(100);
        assert!(small["1%"] < small["5%"] && small["5%"] < small["10%"]);
        assert!(small["5%"] < large["5%"]);
    }

    #[test]
    // Purpose
    // -------
    // The p-value is monotone, clamped, and ≈ 5% at the 5% critical value.
    //
    // Given
    // -----
    // - Statistics −30, −2.86, −1, 0, 5.
    //
    // Expect
    // ------
    // - 0 at −30, ≈ 0.05 at −2.86, increasing, 1 at 5.
    fn p_value_is_monotone_and_clamped() {
        assert_eq!(mackinnon_p_value(-30.0), 0.0);
        assert_eq!(mackinnon_p_value(5.0), 1.0);
        let p5 = mackinnon_p_value(-2.86);
        assert!((p5 - 0.05).abs() < 0.01, "p = {p5}");
        let p_mid = mackinnon_p_value(-1.0);
        let p_zero = mackinnon_p_value(0.0);
        assert!(p5 < p_mid && p_mid < p_zero && p_zero < 1.0);
    }
}
