//! Error taxonomy of the viewport engine.
//!
//! Everything here is recovered inside the engine. Only [`FetchError`] ever
//! reaches the user, through the status `error` field.

use derive_more::{Display, From};

/// Historical data source failure.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum FetchError {
    #[display(fmt = "Network error: {}", _0)]
    Network(String),
    #[display(fmt = "HTTP error: {}", status)]
    Http { status: u16 },
    #[display(fmt = "Parse error: {}", _0)]
    Parse(String),
    #[display(fmt = "Validation error: {}", _0)]
    Validation(String),
}

impl std::error::Error for FetchError {}

/// Reason a single bar was dropped.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum MalformedBarError {
    #[display(fmt = "bar contains a non-finite value")]
    NonFinite,
    #[display(fmt = "OHLC logic violation: {}", _0)]
    OhlcViolation(String),
    #[display(fmt = "volume cannot be negative")]
    NegativeVolume,
    #[display(fmt = "timestamp {} is older than last bar {}", actual, previous)]
    NonMonotonic { previous: u64, actual: u64 },
    #[display(fmt = "duplicate timestamp {}", _0)]
    Duplicate(u64),
    #[display(fmt = "missing field: {}", _0)]
    MissingField(&'static str),
}

impl std::error::Error for MalformedBarError {}

/// Push channel failure.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum FeedError {
    #[display(fmt = "Feed disconnected: {}", _0)]
    Disconnected(String),
    #[display(fmt = "Subscribe failed: {}", _0)]
    Subscribe(String),
    #[display(fmt = "Feed message parse error: {}", _0)]
    Parse(String),
}

impl std::error::Error for FeedError {}

/// Invalid viewport configuration.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum ConfigError {
    #[display(fmt = "Invalid parameter: {}", _0)]
    InvalidParameter(String),
    #[display(fmt = "Config parse error: {}", _0)]
    Parse(String),
}

impl std::error::Error for ConfigError {}

/// Root error type of the engine.
#[derive(Debug, Clone, PartialEq, Display, From)]
pub enum EngineError {
    #[display(fmt = "{}", _0)]
    Fetch(FetchError),
    #[display(fmt = "{}", _0)]
    Feed(FeedError),
    #[display(fmt = "{}", _0)]
    Config(ConfigError),
}

impl std::error::Error for EngineError {}

pub type FetchResult<T> = Result<T, FetchError>;
pub type FeedResult<T> = Result<T, FeedError>;
