use crate::types::Signal;
use serde::{Deserialize, Serialize};

/// A value sampled over the standard rolling windows of a pair listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowedValue {
    pub m5: f64,
    pub h1: f64,
    pub h6: f64,
    pub h24: f64,
}

/// Buy and sell transaction counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxnCounts {
    pub buys: u64,
    pub sells: u64,
}

/// 24h market snapshot of one trading pair, as delivered by a market data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub symbol: String,
    pub price_usd: f64,
    /// Percent price change per window.
    pub price_change: WindowedValue,
    /// Quote volume per window.
    pub volume: WindowedValue,
    pub liquidity_usd: f64,
    pub txns_h24: TxnCounts,
    pub market_cap: f64,
}

/// Direction of a series of readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn label(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

/// Order-flow sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "bullish",
            Sentiment::Bearish => "bearish",
            Sentiment::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSummary {
    pub current: f64,
    pub change_24h: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeSummary {
    pub h24: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquiditySummary {
    pub usd: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentSummary {
    pub buy_vs_sell: f64,
    pub trend: Sentiment,
}

/// Derived view of a market snapshot with its PRICE/VOLUME/SENTIMENT signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    pub symbol: String,
    pub timestamp: i64,
    pub price: PriceSummary,
    pub volume: VolumeSummary,
    pub liquidity: LiquiditySummary,
    pub sentiment: SentimentSummary,
    pub market_cap: f64,
    pub signals: Vec<Signal>,
}

impl MarketAnalysis {
    /// Multi-line human-readable summary.
    pub fn summary(&self) -> String {
        let mut parts = vec![
            format!("{} Analysis:", self.symbol),
            format!(
                "Price: ${:.2} ({}{:.2}% 24h)",
                self.price.current,
                if self.price.change_24h > 0.0 { "+" } else { "" },
                self.price.change_24h
            ),
            format!(
                "Volume 24h: ${:.0} ({})",
                self.volume.h24,
                self.volume.trend.label()
            ),
            format!(
                "Liquidity: ${:.0} ({})",
                self.liquidity.usd,
                self.liquidity.trend.label()
            ),
            format!("Market Cap: ${:.0}", self.market_cap),
            format!(
                "Sentiment: {} (Buy/Sell Ratio: {:.2})",
                self.sentiment.trend.label().to_uppercase(),
                self.sentiment.buy_vs_sell
            ),
        ];

        if !self.signals.is_empty() {
            parts.push("\nSignals:".to_string());
            parts.extend(self.signals.iter().map(|s| s.to_string()));
        }

        parts.join("\n")
    }
}
