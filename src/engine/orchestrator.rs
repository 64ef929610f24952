//! engine::orchestrator — runs one analysis request end to end.
//!
//! Purpose
//! -------
//! Sequence the sampler, the profiler and the six statistical sections,
//! apply the failure policy, and assemble a [`CompleteAnalysisReport`].
//!
//! Key behaviors
//! -------------
//! - Stage order: Sampling → Profiling → Autocorrelation →
//!   PartialAutocorrelation → MutualInformation → Hurst → Stationarity →
//!   Seasonality. The [`CancelToken`] is checked before each stage and once
//!   more before the report is assembled; a cancelled or expired token
//!   aborts with `ComputationTimeout` and no report.
//! - An unset `max_lags` resolves to `min(50, n/2)` over the analyzed
//!   series.
//! - Request-level failures (request/config validation, sampling,
//!   profiling) abort the run. Section failures are recorded as
//!   [`SectionOutcome::Failed`] and the remaining sections still run.
//! - Section warnings are copied into the report-level `warnings`,
//!   prefixed with the stage name.
//!
//! Conventions
//! -----------
//! - Each run opens an `analysis` tracing span; stage boundaries are
//!   `debug!` events and section failures are `warn!` events.
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, info_span, warn};

use crate::{
    data::{load_series, AnalysisRequest, Dataset},
    engine::{
        cancel::{CancelToken, Stage},
        config::AnalysisConfig,
        report::{CompleteAnalysisReport, SectionOutcome, SeriesSummary},
    },
    errors::AnalysisResult,
    profiling::{describe_dataset, profile_dataset},
    statistical_tests::{
        autocorrelation, detect_seasonality, hurst_exponent, mutual_information, partial_autocorrelation,
        run_stationarity_tests,
    },
};

/// Run the full analysis pipeline for `request` over `dataset`.
///
/// Parameters
/// ----------
/// - `dataset`: `&Dataset`
/// - `request`: `&AnalysisRequest`
/// - `config`: `&AnalysisConfig`
/// - `token`: `&CancelToken`
///   Cancellation flag and deadline, checked between stages.
///
/// Returns
/// -------
/// `AnalysisResult<CompleteAnalysisReport>`
///
/// Errors
/// ------
/// - `InvalidColumn`, `InvalidConfig`, `Sampling`, or `InsufficientData`
///   from the request-level stages.
/// - `ComputationTimeout` when the token fires before a stage or before
///   the report is assembled.
///
/// Examples
/// --------
/// ```
/// use ts_diagnostics::data::{AnalysisRequest, Column, Dataset};
/// use ts_diagnostics::engine::{run_analysis, AnalysisConfig, CancelToken};
///
/// let values: Vec<f64> = (0..60).map(|t| if t % 2 == 0 { 10.0 } else { 20.0 }).collect();
/// let dataset = Dataset::new("demo", vec![Column::numeric("value", values)]).unwrap();
/// let request = AnalysisRequest::new("value").with_max_lags(5);
/// let report =
///     run_analysis(&dataset, &request, &AnalysisConfig::default(), &CancelToken::unbounded()).unwrap();
/// assert!(report.autocorrelation.is_computed());
/// ```
pub fn run_analysis(
    dataset: &Dataset, request: &AnalysisRequest, config: &AnalysisConfig, token: &CancelToken,
) -> AnalysisResult<CompleteAnalysisReport> {
    let started = Instant::now();
    let span = info_span!("analysis", dataset = dataset.id(), target = %request.target_column);
    let _guard = span.enter();

    request.validate()?;
    config.validate()?;
    let mut warnings = Vec::new();

    token.checkpoint(Stage::Sampling)?;
    let series = load_series(dataset, request, &config.sampling, config.min_observations)?;
    debug!(rows = series.len(), dropped = series.dropped_rows, sampled = series.sampled, "series loaded");
    if series.dropped_rows > 0 {
        warnings.push(format!(
            "sampling: {} of {} rows dropped (missing or non-numeric target)",
            series.dropped_rows, series.total_rows
        ));
    }
    if series.sampled {
        warnings.push(format!("sampling: analyzed {} of {} valid rows", series.len(), series.valid_rows));
    }

    token.checkpoint(Stage::Profiling)?;
    let (data_quality, profiles) = profile_dataset(dataset, &config.profiling)?;
    let statistics = describe_dataset(dataset, &profiles, &config.profiling);
    debug!(score = data_quality.overall_quality_score, "dataset profiled");

    let y = series.values.as_slice();
    let max_lags = request.resolved_max_lags(y.len());
    debug!(max_lags, explicit = request.max_lags.is_some(), "lag count resolved");

    token.checkpoint(Stage::Autocorrelation)?;
    let autocorrelation = section(
        Stage::Autocorrelation,
        autocorrelation(y, max_lags, &config.correlogram),
        |r| r.warnings.as_slice(),
        &mut warnings,
    );

    token.checkpoint(Stage::PartialAutocorrelation)?;
    let partial_autocorrelation = section(
        Stage::PartialAutocorrelation,
        partial_autocorrelation(y, max_lags, &config.correlogram),
        |r| r.warnings.as_slice(),
        &mut warnings,
    );

    token.checkpoint(Stage::MutualInformation)?;
    let mutual_information = section(
        Stage::MutualInformation,
        mutual_information(y, max_lags, &config.mutual_information),
        |r| r.warnings.as_slice(),
        &mut warnings,
    );

    token.checkpoint(Stage::Hurst)?;
    let hurst_exponent = section(Stage::Hurst, hurst_exponent(y, &config.hurst), |_| &[], &mut warnings);

    token.checkpoint(Stage::Stationarity)?;
    let stationarity_tests = section(
        Stage::Stationarity,
        run_stationarity_tests(y, &config.stationarity),
        |r| r.warnings.as_slice(),
        &mut warnings,
    );

    token.checkpoint(Stage::Seasonality)?;
    let seasonality_analysis =
        section(Stage::Seasonality, detect_seasonality(y, &config.seasonality), |_| &[], &mut warnings);

    token.checkpoint(Stage::Report)?;

    let report = CompleteAnalysisReport {
        dataset_id: dataset.id().to_string(),
        target_column: request.target_column.clone(),
        date_column: request.date_column.clone(),
        series: SeriesSummary {
            total_rows: series.total_rows,
            valid_rows: series.valid_rows,
            dropped_rows: series.dropped_rows,
            analyzed_rows: series.len(),
            sampled: series.sampled,
        },
        data_quality,
        statistics,
        autocorrelation,
        partial_autocorrelation,
        mutual_information,
        hurst_exponent,
        stationarity_tests,
        seasonality_analysis,
        warnings,
        analysis_timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        computation_time_seconds: started.elapsed().as_secs_f64(),
    };
    info!(
        failed_sections = report.failed_sections(),
        seconds = report.computation_time_seconds,
        "analysis complete"
    );
    Ok(report)
}

//
// ---------- Private helpers (compact docs) ----------
//

/// Wrap a section result, logging failures and lifting warnings.
fn section<T>(
    stage: Stage, result: AnalysisResult<T>, section_warnings: impl Fn(&T) -> &[String],
    warnings: &mut Vec<String>,
) -> SectionOutcome<T> {
    match &result {
        Ok(value) => {
            let name = stage_name(stage);
            warnings.extend(section_warnings(value).iter().map(|w| format!("{name}: {w}")));
            debug!(stage = ?stage, "section computed");
        }
        Err(e) => warn!(stage = ?stage, error = %e, "section failed"),
    }
    result.into()
}

#[inline]
fn stage_name(stage: Stage) -> &'static str {
    match stage {
        Stage::Sampling => "sampling",
        Stage::Profiling => "profiling",
        Stage::Autocorrelation => "autocorrelation",
        Stage::PartialAutocorrelation => "partial_autocorrelation",
        Stage::MutualInformation => "mutual_information",
        Stage::Hurst => "hurst",
        Stage::Stationarity => "stationarity",
        Stage::Seasonality => "seasonality",
        Stage::Report => "report",
    }
}
