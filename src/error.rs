use thiserror::Error;

// ------------------------------------------------------------
// Upstream source errors
// ------------------------------------------------------------
//
// Raised by `MarketSource` / `FxSource` implementations.
// Collector components decide whether a given error is fatal
// (catalog) or absorbed into an absent value (everything else).
//
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SourceError::Timeout
        } else if e.is_decode() {
            SourceError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            SourceError::Status(status.as_u16())
        } else {
            SourceError::Transport(e.to_string())
        }
    }
}

// ------------------------------------------------------------
// Cycle-level errors
// ------------------------------------------------------------
//
// Only catalog failure escalates past `collect()`.
//
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("symbol catalog unavailable: {0}")]
    CatalogUnavailable(String),
}

// ------------------------------------------------------------
// Per-symbol misses
// ------------------------------------------------------------
//
// "No data" outcome of a single price or change fetch.
// Never crosses the fetch boundary as an error; it is logged
// and collapsed into an absent value.
//
#[derive(Debug, Error)]
pub enum FetchMiss {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("field `{0}` missing from payload")]
    MissingField(&'static str),
    #[error("field `{0}` is not a valid decimal")]
    InvalidNumber(&'static str),
    #[error("24h open price is zero")]
    ZeroOpen,
    #[error("price is not positive")]
    NonPositive,
    #[error("converted price overflows")]
    Overflow,
    #[error("concurrency limiter closed")]
    LimiterClosed,
}

// ------------------------------------------------------------
// Persistence errors
// ------------------------------------------------------------
#[derive(Debug, Error)]
pub enum SinkError {
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}
