//! utils — small numeric helpers shared across the engine.
//!
//! Moments come from `statrs::statistics::Statistics`; this module adds the
//! pieces statrs does not offer in the form the engine needs: numpy-style
//! (R-7) quantiles on pre-sorted data, a closed-form simple regression, and
//! demeaning.
use statrs::statistics::Statistics;

/// Arithmetic mean, `NaN` for empty input.
#[inline]
pub fn mean(data: &[f64]) -> f64 {
    data.iter().mean()
}

/// Population variance `Σ(x − x̄)²/n`.
#[inline]
pub fn population_variance(data: &[f64]) -> f64 {
    data.iter().population_variance()
}

/// Copy of `data` with its mean removed.
pub fn demean(data: &[f64]) -> Vec<f64> {
    let m = mean(data);
    data.iter().map(|x| x - m).collect()
}

/// Linear-interpolation quantile (R-7, numpy's default) of sorted data.
///
/// Returns `NaN` for empty input. `q` is clamped to `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
        }
    }
}

/// Finite values of `data`, sorted ascending.
pub fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut v: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    v.sort_by(f64::total_cmp);
    v
}

/// SimpleRegression — least-squares line `y = intercept + slope·x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleRegression {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, clamped to `[0, 1]`.
    pub r_squared: f64,
}

/// Closed-form simple linear regression.
///
/// Returns `None` when fewer than two points are given or `x` has no
/// spread. If `y` has no spread the fit is exact and `r_squared = 1`.
pub fn simple_regression(x: &[f64], y: &[f64]) -> Option<SimpleRegression> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let x_bar = mean(x);
    let y_bar = mean(y);
    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - x_bar;
        let dy = yi - y_bar;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx <= 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    let intercept = y_bar - slope * x_bar;
    let r_squared = if syy <= 0.0 { 1.0 } else { (sxy * sxy / (sxx * syy)).clamp(0.0, 1.0) };
    Some(SimpleRegression { slope, intercept, r_squared })
}
