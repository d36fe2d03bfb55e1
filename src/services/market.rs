//! Market snapshot analysis.
//!
//! Turns a 24h pair snapshot from a market data provider into a
//! [`MarketAnalysis`] with PRICE/VOLUME/SENTIMENT signals. No I/O happens
//! here; fetching and caching snapshots is the provider's job.

use crate::config::RuleThresholds;
use crate::services::signals::rules;
use crate::types::{
    LiquiditySummary, MarketAnalysis, MarketSnapshot, PriceSummary, Sentiment, SentimentSummary,
    Trend, VolumeSummary,
};

/// Percent move that counts as a trend.
const TREND_THRESHOLD_PCT: f64 = 5.0;

/// Pick the pair with the deepest USD liquidity.
pub fn select_pair(pairs: &[MarketSnapshot]) -> Option<&MarketSnapshot> {
    pairs
        .iter()
        .filter(|p| p.liquidity_usd.is_finite())
        .max_by(|a, b| a.liquidity_usd.total_cmp(&b.liquidity_usd))
}

/// Trend from the first reading relative to the last one.
pub fn trend(values: &[f64]) -> Trend {
    let (Some(first), Some(last)) = (values.first(), values.last()) else {
        return Trend::Stable;
    };
    if values.len() < 2 || *last == 0.0 {
        return Trend::Stable;
    }

    let change = (first - last) / last * 100.0;
    if change > TREND_THRESHOLD_PCT {
        Trend::Increasing
    } else if change < -TREND_THRESHOLD_PCT {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Order-flow sentiment from the buy/sell ratio and the 24h price change.
pub fn sentiment(buy_sell_ratio: f64, change_24h: f64) -> Sentiment {
    if buy_sell_ratio > 1.2 && change_24h > 0.0 {
        Sentiment::Bullish
    } else if buy_sell_ratio < 0.8 && change_24h < 0.0 {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    }
}

/// Analyze a pair snapshot taken at `timestamp` (unix ms).
pub fn analyze(market: &MarketSnapshot, thresholds: &RuleThresholds, timestamp: i64) -> MarketAnalysis {
    let ratio = rules::buy_sell_ratio(market.txns_h24.buys, market.txns_h24.sells);
    let volume = &market.volume;

    MarketAnalysis {
        symbol: market.symbol.clone(),
        timestamp,
        price: PriceSummary {
            current: market.price_usd,
            change_24h: market.price_change.h24,
        },
        volume: VolumeSummary {
            h24: volume.h24,
            trend: trend(&[volume.m5, volume.h1, volume.h6, volume.h24]),
        },
        liquidity: LiquiditySummary {
            usd: market.liquidity_usd,
            // A single reading has no direction.
            trend: trend(&[market.liquidity_usd]),
        },
        sentiment: SentimentSummary {
            buy_vs_sell: ratio,
            trend: sentiment(ratio, market.price_change.h24),
        },
        market_cap: market.market_cap,
        signals: rules::market_signals(market, thresholds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SignalKind, TxnCounts, WindowedValue};

    fn snapshot(liquidity: f64) -> MarketSnapshot {
        MarketSnapshot {
            symbol: "WIF".to_string(),
            price_usd: 2.5,
            price_change: WindowedValue {
                m5: 0.1,
                h1: 1.0,
                h6: 4.0,
                h24: 12.5,
            },
            volume: WindowedValue {
                m5: 5_000.0,
                h1: 100_000.0,
                h6: 200_000.0,
                h24: 2_400_000.0,
            },
            liquidity_usd: liquidity,
            txns_h24: TxnCounts {
                buys: 1500,
                sells: 1000,
            },
            market_cap: 2_500_000_000.0,
        }
    }

    #[test]
    fn test_select_pair_highest_liquidity() {
        let pairs = vec![snapshot(10.0), snapshot(500.0), snapshot(50.0)];
        assert_eq!(select_pair(&pairs).unwrap().liquidity_usd, 500.0);
        assert!(select_pair(&[]).is_none());
    }

    #[test]
    fn test_trend() {
        assert_eq!(trend(&[110.0, 100.0]), Trend::Increasing);
        assert_eq!(trend(&[90.0, 100.0]), Trend::Decreasing);
        assert_eq!(trend(&[103.0, 100.0]), Trend::Stable);
        assert_eq!(trend(&[100.0]), Trend::Stable);
        assert_eq!(trend(&[]), Trend::Stable);
        assert_eq!(trend(&[5.0, 0.0]), Trend::Stable);
    }

    #[test]
    fn test_sentiment() {
        assert_eq!(sentiment(1.5, 3.0), Sentiment::Bullish);
        assert_eq!(sentiment(1.5, -3.0), Sentiment::Neutral);
        assert_eq!(sentiment(0.5, -3.0), Sentiment::Bearish);
        assert_eq!(sentiment(1.0, 0.0), Sentiment::Neutral);
    }

    #[test]
    fn test_analyze() {
        let analysis = analyze(&snapshot(900_000.0), &RuleThresholds::default(), 42);
        assert_eq!(analysis.symbol, "WIF");
        assert_eq!(analysis.timestamp, 42);
        assert_eq!(analysis.sentiment.buy_vs_sell, 1.5);
        assert_eq!(analysis.sentiment.trend, Sentiment::Bullish);
        // m5 is far below h24.
        assert_eq!(analysis.volume.trend, Trend::Decreasing);
        assert_eq!(analysis.liquidity.trend, Trend::Stable);

        // Volume exactly matches the hourly run-rate, so only PRICE and SENTIMENT fire.
        let kinds: Vec<SignalKind> = analysis.signals.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SignalKind::Price, SignalKind::Sentiment]);
    }

    #[test]
    fn test_summary() {
        let summary = analyze(&snapshot(900_000.0), &RuleThresholds::default(), 0).summary();
        assert!(summary.starts_with("WIF Analysis:"));
        assert!(summary.contains("Price: $2.50 (+12.50% 24h)"));
        assert!(summary.contains("Sentiment: BULLISH (Buy/Sell Ratio: 1.50)"));
        assert!(summary.contains("*** PRICE: BUY - Large price movement of 12.50% in 24h"));
    }
}
