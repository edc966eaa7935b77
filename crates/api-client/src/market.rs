use std::time::Duration;

use core_types::PricePoint;
use serde::Deserialize;

use crate::error::{Error, Result};

/// How a caller pins the series range. An explicit date pair wins over a
/// relative period; the entry layer only builds `Dates` when at least one
/// bound is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesRange {
    /// A relative period label understood by the data service, e.g. "2y".
    Period(String),
    Dates {
        start: Option<String>,
        end: Option<String>,
    },
}

/// The `{"data": [...]}` payload shape of the daily endpoint. A missing
/// `data` key decodes to an empty row set rather than an error.
#[derive(Debug, Deserialize)]
struct DailyPayload {
    #[serde(default)]
    data: Vec<PricePoint>,
}

/// Client for the market data service's daily close series.
#[derive(Debug, Clone)]
pub struct MarketDataClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl MarketDataClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Fetches the daily `(date, close)` rows for a symbol.
    ///
    /// This corresponds to the `GET /daily` endpoint. Transport errors,
    /// non-2xx statuses and undecodable bodies all surface as hard errors.
    /// A well-formed payload with no rows decodes to an empty Vec, which the
    /// caller treats as "no data".
    pub async fn daily(
        &self,
        symbol: &str,
        range: &SeriesRange,
        provider: Option<&str>,
    ) -> Result<Vec<PricePoint>> {
        let url = format!("{}/daily", self.base_url);

        let mut query: Vec<(&str, String)> = vec![("symbol", symbol.to_owned())];
        match range {
            SeriesRange::Dates { start, end } => {
                if let Some(start) = start {
                    query.push(("start", start.clone()));
                }
                if let Some(end) = end {
                    query.push(("end", end.clone()));
                }
            }
            SeriesRange::Period(period) => query.push(("period", period.clone())),
        }
        if let Some(provider) = provider {
            query.push(("provider", provider.to_owned()));
        }

        let response = self
            .http_client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await.map_err(Error::RequestFailed)?;
        let payload: DailyPayload =
            serde_json::from_str(&text).map_err(Error::DeserializationFailed)?;

        Ok(payload.data)
    }
}
