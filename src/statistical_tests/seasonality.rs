//! statistical_tests::seasonality — periodogram-based seasonality detection.
//!
//! Purpose
//! -------
//! Locate periodic components of a series from its FFT periodogram, rank
//! them, and optionally decompose the series at the dominant period.
//!
//! Key behaviors
//! -------------
//! - Periodogram of the demeaned series: `P_k = |X_k|² / n` for
//!   `k = 1..=⌊n/2⌋`, frequency `k/n`, period `n/k`.
//! - The noise floor is an AR(1) red-noise background. With `φ` the lag-1
//!   autocorrelation clamped to `[0, 1)` and
//!   `H_k = 1 − 2φ cos ω_k + φ²`, `floor_k = max(median(P·H)/H_k, ε·ΣP)`.
//!   White noise gives `φ ≈ 0` and a flat median floor; random walks and
//!   trends give `φ → 1`, which lifts the floor at low frequencies.
//! - Peaks are local maxima (an endpoint counts when it exceeds its only
//!   neighbour) whose period lies in `[min_period, max_period]` and whose
//!   power exceeds `floor_k`.
//! - The top `max_peaks` peaks by power are reported; a peak's strength is
//!   `1 − floor_k/P ∈ [0, 1)`.
//! - `seasonal_periods` keeps the rounded periods of ranked peaks whose
//!   prominence `P/floor_k` reaches `min_prominence`, deduplicated in rank
//!   order; `dominant_period` is the first of them.
//! - With `decompose` on and `n ≥ 2·dominant_period`, a classical additive
//!   decomposition is attached.
//!
//! Invariants & assumptions
//! ------------------------
//! - `seasonal_periods` and `seasonal_strengths` are aligned.
//! - `fourier_peaks` is sorted by decreasing magnitude; ties keep the
//!   lower frequency first, so output is deterministic.
use std::f64::consts::PI;

use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};

use crate::{
    errors::AnalysisResult,
    statistical_tests::{
        decomposition::{decompose, SeasonalDecomposition},
        validation::validate_variance,
    },
    utils::{demean, quantile_sorted, sorted_copy},
};

const CONTEXT: &str = "seasonality";

/// SeasonalityOptions — peak search and decomposition policy.
///
/// Fields
/// ------
/// - `min_period`: shortest admissible period (2).
/// - `max_period`: longest admissible period; `None` means `n/4`.
/// - `max_peaks`: number of peaks reported (5).
/// - `min_prominence`: `P/floor_k` needed to count as seasonal (20).
/// - `decompose`: attach a decomposition at the dominant period (true).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalityOptions {
    pub min_period: f64,
    pub max_period: Option<f64>,
    pub max_peaks: usize,
    pub min_prominence: f64,
    pub decompose: bool,
}

impl SeasonalityOptions {
    pub fn new(
        min_period: f64, max_period: Option<f64>, max_peaks: usize, min_prominence: f64, decompose: bool,
    ) -> Self {
        SeasonalityOptions { min_period, max_period, max_peaks, min_prominence, decompose }
    }
}

impl Default for SeasonalityOptions {
    fn default() -> Self {
        SeasonalityOptions::new(2.0, None, 5, 20.0, true)
    }
}

/// One ranked periodogram peak.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FourierPeak {
    pub frequency: f64,
    pub period: f64,
    pub magnitude: f64,
    pub strength: f64,
}

/// SeasonalityResult — detected periods, ranked peaks and decomposition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalityResult {
    pub seasonal_periods: Vec<usize>,
    pub seasonal_strengths: Vec<f64>,
    pub dominant_period: Option<usize>,
    pub fourier_peaks: Vec<FourierPeak>,
    pub seasonal_decomposition: Option<SeasonalDecomposition>,
}

/// Detect seasonality from the periodogram.
///
/// Parameters
/// ----------
/// - `data`: `&[f64]`
/// - `options`: `&SeasonalityOptions`
///
/// Errors
/// ------
/// - `InsufficientData` for fewer than 4 points.
/// - `DegenerateSeries` for a constant or non-finite series.
///
/// Examples
/// --------
/// ```
/// use ts_diagnostics::statistical_tests::seasonality::{detect_seasonality, SeasonalityOptions};
///
/// let y: Vec<f64> = (0..120)
///     .map(|t| (2.0 * std::f64::consts::PI * t as f64 / 12.0).sin())
///     .collect();
/// let res = detect_seasonality(&y, &SeasonalityOptions::default()).unwrap();
/// assert_eq!(res.dominant_period, Some(12));
/// ```
pub fn detect_seasonality(data: &[f64], options: &SeasonalityOptions) -> AnalysisResult<SeasonalityResult> {
    validate_variance(data, 4, CONTEXT)?;
    let n = data.len();
    let power = periodogram(data);

    let floor = noise_floor(data, &power);
    let max_period = options.max_period.unwrap_or(n as f64 / 4.0);

    let mut ranked: Vec<(usize, f64)> = local_maxima(&power)
        .into_iter()
        .filter(|&i| {
            let period = n as f64 / (i + 1) as f64;
            period >= options.min_period && period <= max_period && power[i] > floor[i]
        })
        .map(|i| (i, power[i]))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(options.max_peaks);

    let fourier_peaks: Vec<FourierPeak> = ranked
        .iter()
        .map(|&(i, p)| FourierPeak {
            frequency: (i + 1) as f64 / n as f64,
            period: n as f64 / (i + 1) as f64,
            magnitude: p,
            strength: 1.0 - floor[i] / p,
        })
        .collect();

    let mut seasonal_periods = Vec::new();
    let mut seasonal_strengths = Vec::new();
    // strength = 1 − floor/P, so P/floor ≥ m  ⇔  strength ≥ 1 − 1/m.
    let min_strength = 1.0 - 1.0 / options.min_prominence;
    for peak in fourier_peaks.iter().filter(|pk| pk.strength >= min_strength) {
        let period = peak.period.round() as usize;
        if !seasonal_periods.contains(&period) {
            seasonal_periods.push(period);
            seasonal_strengths.push(peak.strength);
        }
    }
    let dominant_period = seasonal_periods.first().copied();

    let seasonal_decomposition = match dominant_period {
        Some(p) if options.decompose && p >= 2 && n >= 2 * p => Some(decompose(data, p)?),
        _ => None,
    };

    Ok(SeasonalityResult {
        seasonal_periods,
        seasonal_strengths,
        dominant_period,
        fourier_peaks,
        seasonal_decomposition,
    })
}

/// Periodogram `P_k = |X_k|²/n` of the demeaned series for `k = 1..=⌊n/2⌋`.
///
/// Element `i` corresponds to frequency index `k = i + 1`.
pub fn periodogram(data: &[f64]) -> Vec<f64> {
    let n = data.len();
    let mut buffer: Vec<Complex<f64>> = demean(data).into_iter().map(|x| Complex::new(x, 0.0)).collect();
    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(n).process(&mut buffer);
    buffer[1..=n / 2].iter().map(|c| c.norm_sqr() / n as f64).collect()
}

//
// ---------- Private helpers (compact docs) ----------
//

/// Per-bin AR(1) red-noise floor aligned with `periodogram` output.
fn noise_floor(data: &[f64], power: &[f64]) -> Vec<f64> {
    let n = data.len();
    let phi = lag_one_autocorrelation(data).clamp(0.0, 1.0 - f64::EPSILON);
    let response: Vec<f64> = (1..=power.len())
        .map(|k| {
            let omega = 2.0 * PI * k as f64 / n as f64;
            (1.0 - 2.0 * phi * omega.cos() + phi * phi).max(f64::EPSILON)
        })
        .collect();
    let whitened: Vec<f64> = power.iter().zip(&response).map(|(p, h)| p * h).collect();
    let level = quantile_sorted(&sorted_copy(&whitened), 0.5);
    let eps_floor = f64::EPSILON * power.iter().sum::<f64>();
    response.iter().map(|h| (level / h).max(eps_floor)).collect()
}

#[inline]
fn lag_one_autocorrelation(data: &[f64]) -> f64 {
    let x = demean(data);
    let c0: f64 = x.iter().map(|v| v * v).sum();
    let c1: f64 = x.windows(2).map(|w| w[0] * w[1]).sum();
    c1 / c0
}

/// Indices of strict local maxima; endpoints compare to their one neighbour.
fn local_maxima(p: &[f64]) -> Vec<usize> {
    let m = p.len();
    (0..m)
        .filter(|&i| {
            let left = i == 0 || p[i] > p[i - 1];
            let right = i + 1 == m || p[i] > p[i + 1];
            left && right && m > 1
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AnalysisError;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Dominant period and peak frequency for pure and noisy sinusoids.
    // - Nyquist detection on the alternating series.
    // - Absence of seasonal periods on white noise and random walks.
    // - The default period cap of n/4.
    // - Attached decomposition and the degenerate/insufficient guards.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A pure period-12 sine is detected with a matching peak.
    //
    // Given
    // -----
    // - sin(2πt/12), n = 240.
    //
    // Expect
    // ------
    // - dominant 12, first peak at frequency 1/12, decomposition attached
    //   with strength ≈ 1.
    fn detect_seasonality_pure_sine() {
        let y: Vec<f64> = (0..240).map(|t| (2.0 * PI * t as f64 / 12.0).sin()).collect();
        let res = detect_seasonality(&y, &SeasonalityOptions::default()).unwrap();
        assert_eq!(res.dominant_period, Some(12));
        assert_relative_eq!(res.fourier_peaks[0].frequency, 1.0 / 12.0, epsilon = 1e-12);
        assert_eq!(res.seasonal_periods.len(), res.seasonal_strengths.len());
        let d = res.seasonal_decomposition.unwrap();
        assert_eq!(d.period, 12);
        assert!(d.strength > 0.99, "strength {}", d.strength);
    }

    #[test]
    // Purpose
    // -------
    // A noisy sinusoid with a non-bin-aligned length is still found.
    //
    // Given
    // -----
    // - 3·sin(2πt/7) + U(−0.5, 0.5), n = 500.
    //
    // Expect
    // ------
    // - dominant period within 1 of 7.
    fn detect_seasonality_noisy_sine_within_one() {
        let mut rng = StdRng::seed_from_u64(31);
        let y: Vec<f64> =
            (0..500).map(|t| 3.0 * (2.0 * PI * t as f64 / 7.0).sin() + rng.gen::<f64>() - 0.5).collect();
        let res = detect_seasonality(&y, &SeasonalityOptions::default()).unwrap();
        let p = res.dominant_period.unwrap();
        assert!((6..=8).contains(&p), "period {p}");
    }

    #[test]
    // Purpose
    // -------
    // The Nyquist endpoint is a valid peak.
    //
    // Given
    // -----
    // - 100 values alternating 10/20.
    //
    // Expect
    // ------
    // - dominant period 2 and a single peak at frequency 0.5.
    fn detect_seasonality_alternating_series_has_period_two() {
        let y: Vec<f64> = (0..100).map(|t| if t % 2 == 0 { 10.0 } else { 20.0 }).collect();
        let res = detect_seasonality(&y, &SeasonalityOptions::default()).unwrap();
        assert_eq!(res.dominant_period, Some(2));
        assert_eq!(res.fourier_peaks.len(), 1);
        assert_relative_eq!(res.fourier_peaks[0].frequency, 0.5, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // White noise has no prominent periods.
    //
    // Given
    // -----
    // - 1024 iid uniforms.
    //
    // Expect
    // ------
    // - No seasonal periods, no decomposition; peaks capped at 5.
    fn detect_seasonality_white_noise_has_no_periods() {
        let mut rng = StdRng::seed_from_u64(77);
        let y: Vec<f64> = (0..1024).map(|_| rng.gen::<f64>()).collect();
        let res = detect_seasonality(&y, &SeasonalityOptions::default()).unwrap();
        assert!(res.seasonal_periods.is_empty(), "periods {:?}", res.seasonal_periods);
        assert!(res.dominant_period.is_none() && res.seasonal_decomposition.is_none());
        assert!(res.fourier_peaks.len() <= 5);
    }

    #[test]
    // Purpose
    // -------
    // Red spectra do not produce seasonal periods.
    //
    // Given
    // -----
    // - 20 seeded random walks of length 500 with U(−0.5, 0.5) steps.
    //
    // Expect
    // ------
    // - No dominant period and no decomposition for any walk.
    fn detect_seasonality_random_walks_have_no_periods() {
        let mut rng = StdRng::seed_from_u64(0);
        for run in 0..20 {
            let mut level = 0.0;
            let walk: Vec<f64> = (0..500)
                .map(|_| {
                    level += rng.gen::<f64>() - 0.5;
                    level
                })
                .collect();
            let res = detect_seasonality(&walk, &SeasonalityOptions::default()).unwrap();
            assert!(res.dominant_period.is_none(), "walk {run}: periods {:?}", res.seasonal_periods);
            assert!(res.seasonal_decomposition.is_none());
        }
    }

    #[test]
    // Purpose
    // -------
    // Without an explicit `max_period`, periods above n/4 are not admissible.
    //
    // Given
    // -----
    // - sin(2πt/40), n = 120 (period 40 > 120/4), then the same series with
    //   `max_period = 60`.
    //
    // Expect
    // ------
    // - No peaks by default; period 40 once the cap is raised.
    fn detect_seasonality_default_period_cap_is_quarter_length() {
        let y: Vec<f64> = (0..120).map(|t| (2.0 * PI * t as f64 / 40.0).sin()).collect();
        let res = detect_seasonality(&y, &SeasonalityOptions::default()).unwrap();
        assert!(res.fourier_peaks.is_empty() && res.dominant_period.is_none());

        let wide = SeasonalityOptions { max_period: Some(60.0), ..SeasonalityOptions::default() };
        assert_eq!(detect_seasonality(&y, &wide).unwrap().dominant_period, Some(40));
    }

    #[test]
    // Purpose
    // -------
    // Guards fire before any FFT work.
    //
    // Given
    // -----
    // - A constant series and a 3-point series.
    //
    // Expect
    // ------
    // - `DegenerateSeries` and `InsufficientData`.
    fn detect_seasonality_guards() {
        let opts = SeasonalityOptions::default();
        assert!(matches!(detect_seasonality(&[4.0; 32], &opts), Err(AnalysisError::DegenerateSeries { .. })));
        assert_eq!(
            detect_seasonality(&[1.0, 2.0, 3.0], &opts),
            Err(AnalysisError::insufficient(CONTEXT, 4, 3))
        );
    }
}
