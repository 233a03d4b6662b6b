use crate::domain::errors::{FetchError, FetchResult, MalformedBarError};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{Bar, OHLCV, Price, Symbol, Timeframe, Timestamp, Volume};
use crate::log_warn;
use serde::Deserialize;
use serde::de::IgnoredAny;

pub const DEFAULT_REST_BASE_URL: &str = "https://api.binance.com/api/v3";

/// Upper bound accepted by the klines endpoint
pub const MAX_KLINES_PER_REQUEST: usize = 1000;

/// One row of the klines REST response
#[derive(Debug, Deserialize)]
struct KlineRow(
    u64,        // Open time
    String,     // Open
    String,     // High
    String,     // Low
    String,     // Close
    String,     // Volume
    IgnoredAny, // Close time
    IgnoredAny, // Quote asset volume
    IgnoredAny, // Number of trades
    IgnoredAny, // Taker buy base asset volume
    IgnoredAny, // Taker buy quote asset volume
    IgnoredAny, // Ignore
);

impl KlineRow {
    fn to_bar(&self) -> Result<Bar, MalformedBarError> {
        let field = |raw: &str, name: &'static str| {
            raw.parse::<f64>().map_err(|_| MalformedBarError::MissingField(name))
        };
        let ohlcv = OHLCV::new(
            Price::new(field(&self.1, "open")?),
            Price::new(field(&self.2, "high")?),
            Price::new(field(&self.3, "low")?),
            Price::new(field(&self.4, "close")?),
            Volume::new(field(&self.5, "volume")?),
        );
        Ok(Bar::new(Timestamp::new(self.0), ohlcv))
    }
}

/// Parse a klines response body. Rows with unparsable numbers are dropped, and
/// a non-empty body without a single usable row is rejected.
pub fn parse_klines(body: &str) -> FetchResult<Vec<Bar>> {
    let rows: Vec<KlineRow> =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let mut bars = Vec::with_capacity(rows.len());
    for row in &rows {
        match row.to_bar() {
            Ok(bar) => bars.push(bar),
            Err(e) => {
                log_warn!(
                    LogComponent::Infrastructure("KlineRest"),
                    "Dropping kline at {}: {}",
                    row.0,
                    e
                );
            }
        }
    }
    if bars.is_empty() && !rows.is_empty() {
        return Err(FetchError::Validation(format!("none of {} klines were usable", rows.len())));
    }
    Ok(bars)
}

/// Historical source backed by the klines REST endpoint
#[derive(Debug, Clone)]
pub struct KlineRestSource {
    base_url: String,
}

impl Default for KlineRestSource {
    fn default() -> Self {
        Self::new()
    }
}

impl KlineRestSource {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_REST_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string() }
    }

    /// URL for the newest `limit` klines.
    pub fn klines_url(&self, symbol: &Symbol, timeframe: Timeframe, limit: usize) -> String {
        format!(
            "{}/klines?symbol={}&interval={}&limit={}",
            self.base_url,
            symbol.value().to_uppercase(),
            timeframe.as_kline_str(),
            limit.clamp(1, MAX_KLINES_PER_REQUEST)
        )
    }
}

#[cfg(target_arch = "wasm32")]
impl crate::domain::market_data::HistoricalDataSource for KlineRestSource {
    async fn fetch(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        total_points: usize,
    ) -> FetchResult<Vec<Bar>> {
        use crate::log_info;
        use gloo_net::http::Request;

        let url = self.klines_url(symbol, timeframe, total_points);
        log_info!(LogComponent::Infrastructure("KlineRest"), "Fetching klines: {}", url);

        let response =
            Request::get(&url).send().await.map_err(|e| FetchError::Network(e.to_string()))?;
        if !response.ok() {
            return Err(FetchError::Http { status: response.status() });
        }
        let body = response.text().await.map_err(|e| FetchError::Parse(e.to_string()))?;
        let bars = parse_klines(&body)?;

        log_info!(
            LogComponent::Infrastructure("KlineRest"),
            "Loaded {} klines for {}",
            bars.len(),
            symbol
        );
        Ok(bars)
    }
}
