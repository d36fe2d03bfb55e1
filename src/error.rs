use crate::types::Timeframe;
use thiserror::Error;

/// Engine error types.
///
/// Only ingestion and configuration can fail. Indicator math, rules and
/// scoring are total over validated input.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid bar for {asset}: {reason}")]
    InvalidBar { asset: String, reason: String },

    #[error("Out-of-order bar for {asset} {timeframe}: {got} is not after {last}")]
    OutOfOrderBar {
        asset: String,
        timeframe: Timeframe,
        last: i64,
        got: i64,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
