//! Runs one comparison request: fetch, filter, rebase and measure every target.

use super::error::PipelineError;
use super::nav::NavSeries;
use super::resolver::FetchTarget;
use super::series::{self, Lookback, Metrics};
use crate::providers::caching::HistoryFetcher;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of the pipeline for a single target.
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub target: FetchTarget,
    /// Filtered series rebased to 100; `None` when nothing can be plotted.
    pub series: Option<NavSeries>,
    pub metrics: Option<Metrics>,
    /// Why `series` or `metrics` is missing.
    pub issue: Option<PipelineError>,
}

/// Results of a comparison, in target order.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub lookback: Lookback,
    pub targets: Vec<TargetReport>,
}

impl ComparisonReport {
    /// Whether at least one target produced a series to plot.
    pub fn has_data(&self) -> bool {
        self.targets.iter().any(|t| t.series.is_some())
    }

    pub fn metrics(&self) -> impl Iterator<Item = &Metrics> {
        self.targets.iter().filter_map(|t| t.metrics.as_ref())
    }

    pub fn issues(&self) -> impl Iterator<Item = (&FetchTarget, &PipelineError)> {
        self.targets
            .iter()
            .filter_map(|t| t.issue.as_ref().map(|issue| (&t.target, issue)))
    }
}

/// Filters, rebases and measures one fetched series.
pub fn process(target: FetchTarget, raw: &NavSeries, lookback: Lookback) -> TargetReport {
    let failed = |target: FetchTarget, issue: PipelineError| TargetReport {
        target,
        series: None,
        metrics: None,
        issue: Some(issue),
    };

    if raw.is_empty() {
        let code = target.code.clone();
        return failed(target, PipelineError::FetchFailed(code));
    }

    let filtered = series::filter(raw, lookback);
    if filtered.is_empty() {
        return failed(target, PipelineError::NoDataInRange);
    }

    let normalized = match series::normalize(&filtered) {
        Ok(normalized) => normalized,
        Err(e) => return failed(target, e),
    };

    let (metrics, issue) = match series::metrics(&filtered, &target.label) {
        Ok(metrics) => (Some(metrics), None),
        Err(e) => (None, Some(e)),
    };

    TargetReport {
        target,
        series: Some(normalized),
        metrics,
        issue,
    }
}

/// Fetches every target with at most `concurrency` requests in flight and
/// processes the results. Report order always matches `targets`.
///
/// `on_progress` is called once per completed fetch.
pub async fn compare(
    fetcher: &HistoryFetcher,
    targets: Vec<FetchTarget>,
    lookback: Lookback,
    concurrency: usize,
    on_progress: &dyn Fn(),
) -> ComparisonReport {
    info!(
        "Comparing {} fund(s) over {} lookback",
        targets.len(),
        lookback
    );

    let reports: Vec<TargetReport> = stream::iter(targets)
        .map(move |target| async move {
            let raw = fetcher.fetch(&target.code).await;
            on_progress();
            debug!("Fetched {} point(s) for {}", raw.len(), target.label);
            process(target, &raw, lookback)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    for report in &reports {
        if let Some(issue) = &report.issue {
            warn!("{} ({}): {}", report.target.label, report.target.code, issue);
        }
    }

    ComparisonReport {
        lookback,
        targets: reports,
    }
}
