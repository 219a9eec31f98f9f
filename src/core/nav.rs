//! NAV history types and the provider abstraction

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavPoint {
    pub date: NaiveDate,
    pub nav: f64,
}

impl NavPoint {
    pub fn new(date: NaiveDate, nav: f64) -> Self {
        Self { date, nav }
    }
}

/// A NAV history ordered by date, with at most one point per date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavSeries {
    points: Vec<NavPoint>,
}

impl NavSeries {
    /// Builds a series from unordered points. For duplicate dates the last
    /// point wins.
    pub fn from_points(points: impl IntoIterator<Item = NavPoint>) -> Self {
        let by_date: BTreeMap<NaiveDate, f64> =
            points.into_iter().map(|p| (p.date, p.nav)).collect();
        Self {
            points: by_date
                .into_iter()
                .map(|(date, nav)| NavPoint { date, nav })
                .collect(),
        }
    }

    /// Wraps points already known to be sorted and unique by date.
    pub(crate) fn from_sorted(points: Vec<NavPoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        Self { points }
    }

    pub fn points(&self) -> &[NavPoint] {
        &self.points
    }

    pub fn first(&self) -> Option<&NavPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&NavPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Source of raw NAV histories, keyed by the remote source code of a fund.
#[async_trait]
pub trait NavHistoryProvider: Send + Sync {
    async fn fetch_history(&self, code: &str) -> Result<NavSeries>;
}
