use crate::core::config::MfapiProviderConfig;
use crate::core::nav::{NavHistoryProvider, NavPoint, NavSeries};
use crate::providers::util::with_retry;
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const DATE_FORMAT: &str = "%d-%m-%Y";

/// NAV histories from an mfapi.in compatible endpoint: `GET {base_url}/{code}`.
pub struct MfapiProvider {
    base_url: String,
    client: reqwest::Client,
    retries: usize,
    retry_delay_ms: u64,
}

impl MfapiProvider {
    pub fn new(base_url: &str, timeout: Duration, retries: usize, retry_delay_ms: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mfcompare/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(MfapiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retries,
            retry_delay_ms,
        })
    }

    pub fn from_config(config: &MfapiProviderConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            config.timeout(),
            config.retries,
            config.retry_delay_ms,
        )
    }
}

#[derive(Debug, Deserialize)]
struct MfapiResponse {
    #[serde(default)]
    data: Vec<MfapiNavRecord>,
}

#[derive(Debug, Deserialize)]
struct MfapiNavRecord {
    date: String,
    nav: RawNav,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNav {
    Number(f64),
    Text(String),
}

impl MfapiNavRecord {
    fn parse(&self) -> Result<NavPoint> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT)
            .with_context(|| format!("Invalid NAV date: '{}'", self.date))?;
        let nav = match &self.nav {
            RawNav::Number(n) => *n,
            RawNav::Text(s) => s
                .trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid NAV value '{s}' on {}", self.date))?,
        };
        if !nav.is_finite() || nav < 0.0 {
            bail!("Invalid NAV value {nav} on {}", self.date);
        }
        Ok(NavPoint::new(date, nav))
    }
}

#[async_trait]
impl NavHistoryProvider for MfapiProvider {
    async fn fetch_history(&self, code: &str) -> Result<NavSeries> {
        let url = format!("{}/{}", self.base_url, code);
        debug!("Requesting NAV history from {}", url);

        let response = with_retry(
            || async { self.client.get(&url).send().await?.error_for_status() },
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .with_context(|| format!("Failed to fetch NAV history for code: {code}"))?;

        let response_text = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text for code: {code}"))?;

        if response_text.trim().is_empty() {
            return Err(anyhow!("Received empty response for code: {}", code));
        }

        let mfapi_response: MfapiResponse =
            serde_json::from_str(&response_text).with_context(|| {
                format!("Failed to parse NAV response for code: {code}. Response: '{response_text}'")
            })?;

        if mfapi_response.data.is_empty() {
            return Err(anyhow!("No NAV records returned for code: {}", code));
        }

        let points = mfapi_response
            .data
            .iter()
            .map(MfapiNavRecord::parse)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Malformed NAV record for code: {code}"))?;

        let series = NavSeries::from_points(points);
        debug!(
            "Fetched {} NAV points for code {} ({:?} to {:?})",
            series.len(),
            code,
            series.first().map(|p| p.date),
            series.last().map(|p| p.date)
        );
        Ok(series)
    }
}
