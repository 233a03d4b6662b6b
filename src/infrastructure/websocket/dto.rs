use crate::domain::errors::{FeedError, FeedResult, MalformedBarError};
use crate::domain::market_data::{
    Bar, LiveTick, OHLCV, Price, Symbol, Timeframe, Timestamp, Volume,
};
use serde::Deserialize;
use std::str::FromStr;

/// Kline stream event
#[derive(Debug, Deserialize)]
pub struct KlineStreamEvent {
    #[serde(rename = "e")]
    pub event_type: String,
    #[serde(rename = "E")]
    pub event_time: u64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "k")]
    pub kline: KlinePayload,
}

#[derive(Debug, Deserialize)]
pub struct KlinePayload {
    #[serde(rename = "t")]
    pub start_time: u64,
    #[serde(rename = "i")]
    pub interval: String,
    #[serde(rename = "o")]
    pub open_price: String,
    #[serde(rename = "h")]
    pub high_price: String,
    #[serde(rename = "l")]
    pub low_price: String,
    #[serde(rename = "c")]
    pub close_price: String,
    #[serde(rename = "v")]
    pub base_asset_volume: String,
    #[serde(rename = "x")]
    pub is_kline_closed: bool,
}

impl KlineStreamEvent {
    /// Convert into a domain tick
    pub fn to_live_tick(&self) -> Result<LiveTick, MalformedBarError> {
        let timeframe = Timeframe::from_str(&self.kline.interval)
            .map_err(|_| MalformedBarError::MissingField("interval"))?;
        let field = |raw: &str, name: &'static str| {
            raw.parse::<f64>().map_err(|_| MalformedBarError::MissingField(name))
        };

        let ohlcv = OHLCV::new(
            Price::from(field(&self.kline.open_price, "open")?),
            Price::from(field(&self.kline.high_price, "high")?),
            Price::from(field(&self.kline.low_price, "low")?),
            Price::from(field(&self.kline.close_price, "close")?),
            Volume::from(field(&self.kline.base_asset_volume, "volume")?),
        );

        Ok(LiveTick {
            symbol: Symbol::from(self.symbol.as_str()),
            timeframe,
            bar: Bar::new(Timestamp::from(self.kline.start_time), ohlcv),
        })
    }
}

/// Parse one text frame of a kline stream.
pub fn parse_stream_message(text: &str) -> FeedResult<LiveTick> {
    let event: KlineStreamEvent =
        serde_json::from_str(text).map_err(|e| FeedError::Parse(e.to_string()))?;
    event.to_live_tick().map_err(|e| FeedError::Parse(e.to_string()))
}
