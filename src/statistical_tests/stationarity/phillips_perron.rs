//! stationarity::phillips_perron — Phillips–Perron `Z_t` unit-root test.
//!
//! Fits `y_t = α + ρ y_{t−1} + u_t` without augmentation and corrects the
//! t-statistic of `ρ̂ − 1` for serial correlation in `u_t` nonparametrically:
//!
//! `Z_t = √(γ̂₀/λ̂²)·t_ρ − ½ (λ̂² − γ̂₀)/λ̂ · (T·se(ρ̂)/s)`
//!
//! where `γ̂₀` is the residual variance, `λ̂²` the kernel long-run variance
//! of the residuals and `s` the regression standard error. `Z_t` shares
//! the Dickey–Fuller limiting distribution, so MacKinnon surfaces apply.
use std::collections::BTreeMap;

use ndarray::Array2;

use crate::{
    errors::AnalysisResult,
    inference::{
        kernel::{long_run_variance, LongRunVarianceOptions},
        ols::ols_fit,
    },
    statistical_tests::{
        stationarity::mackinnon::{mackinnon_critical_values, mackinnon_p_value},
        validation::validate_variance,
    },
};

const CONTEXT: &str = "phillips_perron";

#[derive(Debug, Clone, PartialEq)]
pub struct PpOutcome {
    pub statistic: f64,
    pub p_value: f64,
    pub critical_values: BTreeMap<String, f64>,
    pub lags: usize,
}

/// Run the Phillips–Perron test with a constant.
///
/// Errors
/// ------
/// - `InsufficientData` for fewer than 4 observations.
/// - `DegenerateSeries` for a constant series, a rank-deficient regression
///   or a non-positive residual long-run variance (e.g. an exact fit).
pub fn phillips_perron_test(data: &[f64], lrv: &LongRunVarianceOptions) -> AnalysisResult<PpOutcome> {
    validate_variance(data, 4, CONTEXT)?;
    let response = &data[1..];
    let design = Array2::from_shape_fn((response.len(), 2), |(r, c)| if c == 0 { 1.0 } else { data[r] });
    let fit = ols_fit(&design, response, 0.0)?;

    let t = fit.nobs as f64;
    let gamma0 = fit.residuals.iter().map(|e| e * e).sum::<f64>() / t;
    let (lambda2, lags) = long_run_variance(&fit.residuals, lrv)?;
    let lambda = lambda2.sqrt();
    let s = fit.sigma2.sqrt();
    let se_rho = fit.std_errors[1];
    let t_rho = fit.t_stat(1, 1.0);

    let statistic = (gamma0 / lambda2).sqrt() * t_rho - 0.5 * (lambda2 - gamma0) / lambda * (t * se_rho / s);
    Ok(PpOutcome {
        statistic,
        p_value: mackinnon_p_value(statistic),
        critical_values: mackinnon_critical_values(fit.nobs),
        lags,
    })
}
