//! statistical_tests::stationarity — ADF, KPSS and Phillips–Perron battery.
//!
//! Purpose
//! -------
//! Run complementary unit-root / stationarity tests on one series and
//! report each verdict independently. ADF and PP test the unit-root null;
//! KPSS tests the stationarity null, so agreement between them is
//! informative and disagreement is reported as-is rather than reconciled.
//!
//! Key behaviors
//! -------------
//! - [`run_stationarity_tests`] always runs ADF; a failing ADF fails the
//!   whole battery.
//! - KPSS and PP are optional (both on by default). If either fails, its
//!   fields are `None` and a warning explains why; the ADF result stands.
//! - Verdicts compare the statistic to the critical value at the
//!   configured [`SignificanceLevel`] (5% by default): ADF/PP reject the
//!   unit root when `stat < cv`, KPSS accepts stationarity when
//!   `stat < cv`.
//!
//! Downstream usage
//! ----------------
//! The orchestrator calls [`run_stationarity_tests`] with the sampled
//! target values and moves the battery warnings into the report.
pub mod adf;
pub mod kpss;
pub mod mackinnon;
pub mod phillips_perron;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use self::adf::{adf_test, AdfOutcome};
pub use self::kpss::{kpss_test, KpssOutcome};
pub use self::mackinnon::{mackinnon_critical_values, mackinnon_p_value};
pub use self::phillips_perron::{phillips_perron_test, PpOutcome};
use crate::{errors::AnalysisResult, inference::kernel::LongRunVarianceOptions};

/// Significance level used for the stationarity verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignificanceLevel {
    OnePercent,
    FivePercent,
    TenPercent,
}

impl SignificanceLevel {
    /// Key into the critical-value maps.
    pub fn label(&self) -> &'static str {
        match self {
            SignificanceLevel::OnePercent => "1%",
            SignificanceLevel::FivePercent => "5%",
            SignificanceLevel::TenPercent => "10%",
        }
    }
}

impl Default for SignificanceLevel {
    fn default() -> Self {
        SignificanceLevel::FivePercent
    }
}

/// StationarityOptions — which tests run and how.
///
/// Fields
/// ------
/// - `significance`: level for the verdicts (5%).
/// - `adf_max_lag`: override for the ADF lag search; `None` uses the
///   Schwert rule.
/// - `long_run_variance`: kernel and bandwidth for KPSS and PP (Bartlett,
///   Schwert bandwidth).
/// - `run_kpss`, `run_pp`: enable the mirror tests (both `true`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationarityOptions {
    pub significance: SignificanceLevel,
    pub adf_max_lag: Option<usize>,
    pub long_run_variance: LongRunVarianceOptions,
    pub run_kpss: bool,
    pub run_pp: bool,
}

impl StationarityOptions {
    pub fn new(
        significance: SignificanceLevel, adf_max_lag: Option<usize>,
        long_run_variance: LongRunVarianceOptions, run_kpss: bool, run_pp: bool,
    ) -> Self {
        StationarityOptions { significance, adf_max_lag, long_run_variance, run_kpss, run_pp }
    }
}

impl Default for StationarityOptions {
    fn default() -> Self {
        StationarityOptions::new(
            SignificanceLevel::default(),
            None,
            LongRunVarianceOptions::default(),
            true,
            true,
        )
    }
}

/// StationarityResult — independent ADF / KPSS / PP verdicts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationarityResult {
    pub adf_statistic: f64,
    pub adf_p_value: f64,
    pub adf_critical_values: BTreeMap<String, f64>,
    pub adf_is_stationary: bool,
    pub adf_used_lag: usize,
    pub adf_n_obs: usize,

    pub kpss_statistic: Option<f64>,
    pub kpss_p_value: Option<f64>,
    pub kpss_critical_values: Option<BTreeMap<String, f64>>,
    pub kpss_is_stationary: Option<bool>,
    pub kpss_lags: Option<usize>,

    pub pp_statistic: Option<f64>,
    pub pp_p_value: Option<f64>,
    pub pp_critical_values: Option<BTreeMap<String, f64>>,
    pub pp_is_stationary: Option<bool>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Run the stationarity battery on `data`.
///
/// Parameters
/// ----------
/// - `data`: `&[f64]`
/// - `options`: `&StationarityOptions`
///
/// Returns
/// -------
/// `AnalysisResult<StationarityResult>`
///
/// Errors
/// ------
/// - Whatever [`adf_test`] returns. KPSS and PP failures are downgraded to
///   warnings.
pub fn run_stationarity_tests(
    data: &[f64], options: &StationarityOptions,
) -> AnalysisResult<StationarityResult> {
    let level = options.significance.label();
    let adf = adf_test(data, options.adf_max_lag)?;
    let adf_is_stationary = below_critical(adf.statistic, &adf.critical_values, level);

    let mut result = StationarityResult {
        adf_statistic: adf.statistic,
        adf_p_value: adf.p_value,
        adf_is_stationary,
        adf_critical_values: adf.critical_values,
        adf_used_lag: adf.used_lag,
        adf_n_obs: adf.nobs,
        kpss_statistic: None,
        kpss_p_value: None,
        kpss_critical_values: None,
        kpss_is_stationary: None,
        kpss_lags: None,
        pp_statistic: None,
        pp_p_value: None,
        pp_critical_values: None,
        pp_is_stationary: None,
        warnings: Vec::new(),
    };

    if options.run_kpss {
        match kpss_test(data, &options.long_run_variance) {
            Ok(kpss) => {
                result.kpss_is_stationary = Some(below_critical(kpss.statistic, &kpss.critical_values, level));
                result.kpss_statistic = Some(kpss.statistic);
                result.kpss_p_value = Some(kpss.p_value);
                result.kpss_critical_values = Some(kpss.critical_values);
                result.kpss_lags = Some(kpss.lags);
            }
            Err(e) => result.warnings.push(format!("KPSS test skipped: {e}")),
        }
    }

    if options.run_pp {
        match phillips_perron_test(data, &options.long_run_variance) {
            Ok(pp) => {
                result.pp_is_stationary = Some(below_critical(pp.statistic, &pp.critical_values, level));
                result.pp_statistic = Some(pp.statistic);
                result.pp_p_value = Some(pp.p_value);
                result.pp_critical_values = Some(pp.critical_values);
            }
            Err(e) => result.warnings.push(format!("Phillips-Perron test skipped: {e}")),
        }
    }

    Ok(result)
}

#[inline]
fn below_critical(stat: f64, critical_values: &BTreeMap<String, f64>, level: &str) -> bool {
    critical_values.get(level).is_some_and(|cv| stat < *cv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AnalysisError;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The full battery on a stationary AR(1).
    // - Mirror tests switched off.
    // - ADF failure propagating as a section error.
    // - Serialization of absent mirror fields as null.
    // -------------------------------------------------------------------------

    fn ar1(n: usize, phi: f64, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut y = vec![0.0; n];
        for t in 1..n {
            y[t] = phi * y[t - 1] + (rng.gen::<f64>() - 0.5);
        }
        y
    }

    #[test]
    // Purpose
    // -------
    // A stationary AR(1) populates every field and ADF/PP reject.
    //
    // Given
    // -----
    // - 500 samples with φ = 0.5 and default options.
    //
    // Expect
    // ------
    // - ADF and PP stationary; KPSS fields present; three-entry MacKinnon
    //   maps; no warnings.
    fn run_stationarity_tests_full_battery_on_ar1() {
        let res = run_stationarity_tests(&ar1(500, 0.5, 2), &StationarityOptions::default()).unwrap();
        assert!(res.adf_is_stationary);
        assert_eq!(res.pp_is_stationary, Some(true));
        assert!(res.kpss_statistic.is_some() && res.kpss_lags == Some(17));
        assert_eq!(res.adf_critical_values.len(), 3);
        assert!(res.warnings.is_empty());
    }

    #[test]
    // Purpose
    // -------
    // Disabled mirror tests leave their fields empty and serialize as null.
    //
    // Given
    // -----
    // - run_kpss = false, run_pp = false.
    //
    // Expect
    // ------
    // - All KPSS/PP fields `None`; JSON has `"kpss_statistic":null`.
    fn run_stationarity_tests_respects_disabled_mirrors() {
        let opts = StationarityOptions { run_kpss: false, run_pp: false, ..StationarityOptions::default() };
        let res = run_stationarity_tests(&ar1(200, 0.3, 9), &opts).unwrap();
        assert!(res.kpss_statistic.is_none() && res.pp_statistic.is_none());
        let json = serde_json::to_string(&res).unwrap();
        assert!(json.contains("\"kpss_statistic\":null"));
    }

    #[test]
    // Purpose
    // -------
    // ADF failure fails the battery.
    //
    // Given
    // -----
    // - A constant series.
    //
    // Expect
    // ------
    // - `DegenerateSeries` from the ADF context.
    fn run_stationarity_tests_propagates_adf_failure() {
        assert!(matches!(
            run_stationarity_tests(&[5.0; 40], &StationarityOptions::default()),
            Err(AnalysisError::DegenerateSeries { context: "adf", .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Significance labels index both critical-value tables.
    //
    // Given
    // -----
    // - Each level.
    //
    // Expect
    // ------
    // - "1%", "5%", "10%".
    fn significance_level_labels() {
        assert_eq!(SignificanceLevel::OnePercent.label(), "1%");
        assert_eq!(SignificanceLevel::default().label(), "5%");
        assert_eq!(SignificanceLevel::TenPercent.label(), "10%");
    }
}
