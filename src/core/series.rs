//! Lookback filtering, rebasing and return metrics over NAV series

use super::error::PipelineError;
use super::nav::{NavPoint, NavSeries};
use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, prelude::*};
use rust_finprim::rate::cagr;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

/// Value every normalized series starts at.
pub const BASE_VALUE: f64 = 100.0;

const DAYS_PER_YEAR: f64 = 365.25;

/// Shortest span for which CAGR is reported. Annualizing anything shorter
/// gives misleading numbers.
pub const MIN_CAGR_YEARS: f64 = 0.9;

/// Trailing window applied to a series before analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Lookback {
    ThreeMonths,
    SixMonths,
    #[default]
    OneYear,
    TwoYears,
    ThreeYears,
    FiveYears,
    Max,
}

impl Lookback {
    pub const ALL: [Lookback; 7] = [
        Lookback::ThreeMonths,
        Lookback::SixMonths,
        Lookback::OneYear,
        Lookback::TwoYears,
        Lookback::ThreeYears,
        Lookback::FiveYears,
        Lookback::Max,
    ];

    /// Window length in calendar months; `None` keeps the full history.
    pub fn months(&self) -> Option<u32> {
        match self {
            Lookback::ThreeMonths => Some(3),
            Lookback::SixMonths => Some(6),
            Lookback::OneYear => Some(12),
            Lookback::TwoYears => Some(24),
            Lookback::ThreeYears => Some(36),
            Lookback::FiveYears => Some(60),
            Lookback::Max => None,
        }
    }

    /// Earliest date kept when the latest point is dated `latest`.
    pub fn cutoff(&self, latest: NaiveDate) -> Option<NaiveDate> {
        self.months().map(|months| {
            latest
                .checked_sub_months(Months::new(months))
                .unwrap_or(NaiveDate::MIN)
        })
    }
}

impl Display for Lookback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Lookback::ThreeMonths => "3M",
                Lookback::SixMonths => "6M",
                Lookback::OneYear => "1Y",
                Lookback::TwoYears => "2Y",
                Lookback::ThreeYears => "3Y",
                Lookback::FiveYears => "5Y",
                Lookback::Max => "Max",
            }
        )
    }
}

impl FromStr for Lookback {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "3M" => Ok(Lookback::ThreeMonths),
            "6M" => Ok(Lookback::SixMonths),
            "1Y" => Ok(Lookback::OneYear),
            "2Y" => Ok(Lookback::TwoYears),
            "3Y" => Ok(Lookback::ThreeYears),
            "5Y" => Ok(Lookback::FiveYears),
            "MAX" | "ALL" => Ok(Lookback::Max),
            _ => Err(PipelineError::InvalidLookback(s.to_string())),
        }
    }
}

impl TryFrom<String> for Lookback {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Lookback> for String {
    fn from(lookback: Lookback) -> Self {
        lookback.to_string()
    }
}

/// Summary statistics of a filtered series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub label: String,
    pub total_return_pct: f64,
    /// `None` when the series spans less than [`MIN_CAGR_YEARS`].
    pub cagr_pct: Option<f64>,
    pub years: f64,
    pub start_nav: f64,
    pub end_nav: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Keeps the points dated on or after `latest - lookback`.
///
/// An empty result means the window holds no data.
pub fn filter(series: &NavSeries, lookback: Lookback) -> NavSeries {
    let Some(cutoff) = series.last().and_then(|latest| lookback.cutoff(latest.date)) else {
        return series.clone();
    };

    NavSeries::from_sorted(
        series
            .points()
            .iter()
            .filter(|p| p.date >= cutoff)
            .copied()
            .collect(),
    )
}

/// Rebases the series so that its first value is [`BASE_VALUE`].
pub fn normalize(series: &NavSeries) -> Result<NavSeries, PipelineError> {
    let Some(first) = series.first() else {
        return Ok(NavSeries::default());
    };
    if first.nav == 0.0 {
        return Err(PipelineError::DivisionByZero);
    }

    let base = first.nav;
    Ok(NavSeries::from_sorted(
        series
            .points()
            .iter()
            .map(|p| NavPoint::new(p.date, p.nav / base * BASE_VALUE))
            .collect(),
    ))
}

/// Total return, duration and CAGR between the first and last points.
pub fn metrics(series: &NavSeries, label: &str) -> Result<Metrics, PipelineError> {
    let (first, last) = match series.points() {
        [first, .., last] => (first, last),
        points => return Err(PipelineError::InsufficientData(points.len())),
    };
    if first.nav == 0.0 {
        return Err(PipelineError::DivisionByZero);
    }

    let total_return_pct = (last.nav - first.nav) / first.nav * 100.0;
    let years = (last.date - first.date).num_days() as f64 / DAYS_PER_YEAR;
    let cagr_pct = if years >= MIN_CAGR_YEARS {
        annualized_return_pct(first.nav, last.nav, years)
    } else {
        None
    };
    debug!("metrics for {label}: {total_return_pct:.2}% over {years:.2}yrs, cagr {cagr_pct:?}");

    Ok(Metrics {
        label: label.to_string(),
        total_return_pct,
        cagr_pct,
        years,
        start_nav: first.nav,
        end_nav: last.nav,
        start_date: first.date,
        end_date: last.date,
    })
}

fn annualized_return_pct(begin: f64, end: f64, years: f64) -> Option<f64> {
    let begin_bal = Decimal::from_f64(begin)?;
    let end_bal = Decimal::from_f64(end)?;
    let n_years = Decimal::from_f64(years)?;
    if begin_bal.is_zero() || n_years.is_zero() {
        return None;
    }

    let rate = cagr(begin_bal, end_bal, n_years);
    (rate * Decimal::from(100)).to_f64()
}
