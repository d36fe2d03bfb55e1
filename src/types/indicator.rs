use crate::types::{Signal, Timeframe};
use serde::{Deserialize, Serialize};

/// Bollinger band values. Each band is absent until the lookback is filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerValues {
    pub upper: Option<f64>,
    pub middle: Option<f64>,
    pub lower: Option<f64>,
}

/// MACD line, signal line and histogram (`macd - signal`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdValues {
    pub macd: Option<f64>,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

/// Stochastic %K and %D, both in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StochasticValues {
    pub k: Option<f64>,
    pub d: Option<f64>,
}

/// Indicator values for one (asset, timeframe) series at its latest bar.
///
/// `None` means the series does not yet hold enough history for that
/// indicator. It is never reported as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub sma: Option<f64>,
    pub bollinger_bands: BollingerValues,
    pub macd: MacdValues,
    pub stochastic: StochasticValues,
}

impl IndicatorSnapshot {
    /// True when no indicator has a value yet.
    pub fn is_empty(&self) -> bool {
        self.rsi.is_none()
            && self.sma.is_none()
            && self.bollinger_bands.middle.is_none()
            && self.macd.macd.is_none()
            && self.stochastic.k.is_none()
    }
}

/// Result of evaluating one series: its indicator values and derived signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub asset: String,
    pub timeframe: Timeframe,
    /// Timestamp of the latest bar in the series.
    pub timestamp: i64,
    pub metrics: IndicatorSnapshot,
    pub signals: Vec<Signal>,
}
