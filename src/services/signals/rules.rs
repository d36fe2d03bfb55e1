//! Fixed-threshold rules mapping indicator values and market stats to signals.
//!
//! Every rule is independent. Conflicting signals (say an RSI SELL next to a
//! stochastic BUY) are all returned; resolving them is up to the consumer.

use crate::config::RuleThresholds;
use crate::types::{
    IndicatorSnapshot, MarketSnapshot, Signal, SignalAction, SignalKind, SignalStrength,
};

/// Signals derived from an indicator snapshot. Absent indicators contribute nothing.
pub fn indicator_signals(snapshot: &IndicatorSnapshot, rules: &RuleThresholds) -> Vec<Signal> {
    let mut signals = Vec::new();

    if let Some(rsi) = snapshot.rsi {
        if rsi > rules.rsi_overbought {
            signals.push(Signal::new(
                SignalKind::Rsi,
                SignalAction::Sell,
                SignalStrength::Strong,
                format!("RSI overbought at {:.2}", rsi),
            ));
        } else if rsi < rules.rsi_oversold {
            signals.push(Signal::new(
                SignalKind::Rsi,
                SignalAction::Buy,
                SignalStrength::Strong,
                format!("RSI oversold at {:.2}", rsi),
            ));
        }
    }

    // Compares the histogram, not the MACD line, against the signal line.
    if let (Some(histogram), Some(signal)) = (snapshot.macd.histogram, snapshot.macd.signal) {
        if histogram > 0.0 && histogram > signal {
            signals.push(Signal::new(
                SignalKind::Macd,
                SignalAction::Buy,
                SignalStrength::Medium,
                format!(
                    "MACD histogram {:.4} positive and above signal line {:.4}",
                    histogram, signal
                ),
            ));
        } else if histogram < 0.0 && histogram < signal {
            signals.push(Signal::new(
                SignalKind::Macd,
                SignalAction::Sell,
                SignalStrength::Medium,
                format!(
                    "MACD histogram {:.4} negative and below signal line {:.4}",
                    histogram, signal
                ),
            ));
        }
    }

    if let (Some(k), Some(d)) = (snapshot.stochastic.k, snapshot.stochastic.d) {
        if k > rules.stochastic_overbought && d > rules.stochastic_overbought {
            signals.push(Signal::new(
                SignalKind::Stochastic,
                SignalAction::Sell,
                SignalStrength::Medium,
                format!("Stochastic overbought (%K {:.2}, %D {:.2})", k, d),
            ));
        } else if k < rules.stochastic_oversold && d < rules.stochastic_oversold {
            signals.push(Signal::new(
                SignalKind::Stochastic,
                SignalAction::Buy,
                SignalStrength::Medium,
                format!("Stochastic oversold (%K {:.2}, %D {:.2})", k, d),
            ));
        }
    }

    signals
}

/// PRICE signal from the 24h percent change.
pub fn price_signal(change_24h: f64, rules: &RuleThresholds) -> Option<Signal> {
    if !change_24h.is_finite() || change_24h.abs() <= rules.price_change_pct {
        return None;
    }
    Some(Signal::new(
        SignalKind::Price,
        if change_24h > 0.0 {
            SignalAction::Buy
        } else {
            SignalAction::Sell
        },
        SignalStrength::Strong,
        format!("Large price movement of {:.2}% in 24h", change_24h),
    ))
}

/// Percent difference between 24h volume and the last hour's volume run
/// over 24 hours. None when the hourly volume gives no baseline.
pub fn volume_change_pct(volume_h24: f64, volume_h1: f64) -> Option<f64> {
    let annualized = volume_h1 * 24.0;
    if !annualized.is_finite() || annualized <= 0.0 || !volume_h24.is_finite() {
        return None;
    }
    Some((volume_h24 - annualized) / annualized * 100.0)
}

/// VOLUME signal from the 24h-versus-hourly volume change.
pub fn volume_signal(volume_h24: f64, volume_h1: f64, rules: &RuleThresholds) -> Option<Signal> {
    let change = volume_change_pct(volume_h24, volume_h1)?;
    if change.abs() <= rules.volume_change_pct {
        return None;
    }
    Some(Signal::new(
        SignalKind::Volume,
        if change > 0.0 {
            SignalAction::Buy
        } else {
            SignalAction::Sell
        },
        SignalStrength::Medium,
        format!("Significant volume change of {:.2}%", change),
    ))
}

/// SENTIMENT signal from the buy/sell transaction ratio.
pub fn sentiment_signal(buy_sell_ratio: f64, rules: &RuleThresholds) -> Option<Signal> {
    if buy_sell_ratio.is_nan() || (buy_sell_ratio - 1.0).abs() <= rules.sentiment_ratio_deviation {
        return None;
    }
    let buying = buy_sell_ratio > 1.0;
    Some(Signal::new(
        SignalKind::Sentiment,
        if buying {
            SignalAction::Buy
        } else {
            SignalAction::Sell
        },
        SignalStrength::Medium,
        format!(
            "Strong {} pressure with {:.2} buy/sell ratio",
            if buying { "buying" } else { "selling" },
            buy_sell_ratio
        ),
    ))
}

/// Buy/sell transaction ratio. With no sells: infinite if anything was
/// bought, otherwise balanced.
pub fn buy_sell_ratio(buys: u64, sells: u64) -> f64 {
    if sells == 0 {
        return if buys > 0 { f64::INFINITY } else { 1.0 };
    }
    buys as f64 / sells as f64
}

/// PRICE, VOLUME and SENTIMENT signals for a market snapshot.
pub fn market_signals(market: &MarketSnapshot, rules: &RuleThresholds) -> Vec<Signal> {
    let ratio = buy_sell_ratio(market.txns_h24.buys, market.txns_h24.sells);
    [
        price_signal(market.price_change.h24, rules),
        volume_signal(market.volume.h24, market.volume.h1, rules),
        sentiment_signal(ratio, rules),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// All signals for one evaluation: indicator rules, then market rules.
pub fn evaluate(
    snapshot: &IndicatorSnapshot,
    market: Option<&MarketSnapshot>,
    rules: &RuleThresholds,
) -> Vec<Signal> {
    let mut signals = indicator_signals(snapshot, rules);
    if let Some(market) = market {
        signals.extend(market_signals(market, rules));
    }
    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MacdValues, StochasticValues, TxnCounts, WindowedValue};

    fn rules() -> RuleThresholds {
        RuleThresholds::default()
    }

    fn kinds(signals: &[Signal]) -> Vec<(SignalKind, SignalAction, SignalStrength)> {
        signals
            .iter()
            .map(|s| (s.kind, s.action, s.strength))
            .collect()
    }

    #[test]
    fn test_empty_snapshot_no_signals() {
        assert!(indicator_signals(&IndicatorSnapshot::default(), &rules()).is_empty());
    }

    #[test]
    fn test_rsi_thresholds() {
        let mut snap = IndicatorSnapshot::default();
        snap.rsi = Some(75.0);
        assert_eq!(
            kinds(&indicator_signals(&snap, &rules())),
            vec![(SignalKind::Rsi, SignalAction::Sell, SignalStrength::Strong)]
        );

        snap.rsi = Some(25.0);
        assert_eq!(
            kinds(&indicator_signals(&snap, &rules())),
            vec![(SignalKind::Rsi, SignalAction::Buy, SignalStrength::Strong)]
        );

        // Boundaries are exclusive.
        snap.rsi = Some(70.0);
        assert!(indicator_signals(&snap, &rules()).is_empty());
        snap.rsi = Some(30.0);
        assert!(indicator_signals(&snap, &rules()).is_empty());
    }

    #[test]
    fn test_macd_rule_compares_histogram_to_signal() {
        let mut snap = IndicatorSnapshot::default();
        snap.macd = MacdValues {
            macd: Some(0.8),
            signal: Some(0.3),
            histogram: Some(0.5),
        };
        assert_eq!(
            kinds(&indicator_signals(&snap, &rules())),
            vec![(SignalKind::Macd, SignalAction::Buy, SignalStrength::Medium)]
        );

        // Positive histogram that does not exceed the signal line.
        snap.macd = MacdValues {
            macd: Some(1.5),
            signal: Some(1.0),
            histogram: Some(0.5),
        };
        assert!(indicator_signals(&snap, &rules()).is_empty());

        snap.macd = MacdValues {
            macd: Some(-0.8),
            signal: Some(-0.3),
            histogram: Some(-0.5),
        };
        assert_eq!(
            kinds(&indicator_signals(&snap, &rules())),
            vec![(SignalKind::Macd, SignalAction::Sell, SignalStrength::Medium)]
        );
    }

    #[test]
    fn test_macd_without_signal_line_is_silent() {
        let mut snap = IndicatorSnapshot::default();
        snap.macd.macd = Some(3.0);
        assert!(indicator_signals(&snap, &rules()).is_empty());
    }

    #[test]
    fn test_stochastic_requires_both_lines() {
        let mut snap = IndicatorSnapshot::default();
        snap.stochastic = StochasticValues {
            k: Some(90.0),
            d: Some(85.0),
        };
        assert_eq!(
            kinds(&indicator_signals(&snap, &rules())),
            vec![(SignalKind::Stochastic, SignalAction::Sell, SignalStrength::Medium)]
        );

        snap.stochastic = StochasticValues {
            k: Some(90.0),
            d: Some(75.0),
        };
        assert!(indicator_signals(&snap, &rules()).is_empty());

        snap.stochastic = StochasticValues {
            k: Some(10.0),
            d: None,
        };
        assert!(indicator_signals(&snap, &rules()).is_empty());

        snap.stochastic = StochasticValues {
            k: Some(10.0),
            d: Some(15.0),
        };
        assert_eq!(
            kinds(&indicator_signals(&snap, &rules())),
            vec![(SignalKind::Stochastic, SignalAction::Buy, SignalStrength::Medium)]
        );
    }

    #[test]
    fn test_conflicting_signals_coexist() {
        let snap = IndicatorSnapshot {
            rsi: Some(80.0),
            stochastic: StochasticValues {
                k: Some(10.0),
                d: Some(12.0),
            },
            ..Default::default()
        };
        let signals = indicator_signals(&snap, &rules());
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].action, SignalAction::Sell);
        assert_eq!(signals[1].action, SignalAction::Buy);
    }

    #[test]
    fn test_custom_thresholds() {
        let custom = RuleThresholds {
            rsi_overbought: 60.0,
            ..Default::default()
        };
        let snap = IndicatorSnapshot {
            rsi: Some(65.0),
            ..Default::default()
        };
        assert_eq!(indicator_signals(&snap, &custom).len(), 1);
        assert!(indicator_signals(&snap, &rules()).is_empty());
    }

    #[test]
    fn test_price_signal() {
        let signal = price_signal(12.5, &rules()).unwrap();
        assert_eq!(signal.action, SignalAction::Buy);
        assert_eq!(signal.strength.value(), 3);
        assert_eq!(signal.reason, "Large price movement of 12.50% in 24h");

        assert_eq!(price_signal(-15.0, &rules()).unwrap().action, SignalAction::Sell);
        assert!(price_signal(10.0, &rules()).is_none());
        assert!(price_signal(f64::NAN, &rules()).is_none());
    }

    #[test]
    fn test_volume_signal() {
        // 24h volume 3x the hourly run-rate: +200%
        let signal = volume_signal(72_000.0, 1_000.0, &rules()).unwrap();
        assert_eq!(signal.action, SignalAction::Buy);
        assert_eq!(signal.strength.value(), 2);

        // Last hour far busier than the day average: -75%
        let signal = volume_signal(6_000.0, 1_000.0, &rules()).unwrap();
        assert_eq!(signal.action, SignalAction::Sell);

        assert!(volume_signal(30_000.0, 1_000.0, &rules()).is_none());
        assert!(volume_signal(30_000.0, 0.0, &rules()).is_none());
    }

    #[test]
    fn test_buy_sell_ratio() {
        assert_eq!(buy_sell_ratio(10, 5), 2.0);
        assert_eq!(buy_sell_ratio(3, 0), f64::INFINITY);
        assert_eq!(buy_sell_ratio(0, 0), 1.0);
    }

    #[test]
    fn test_sentiment_signal() {
        let signal = sentiment_signal(1.5, &rules()).unwrap();
        assert_eq!(signal.action, SignalAction::Buy);
        assert_eq!(signal.reason, "Strong buying pressure with 1.50 buy/sell ratio");

        assert_eq!(sentiment_signal(0.5, &rules()).unwrap().action, SignalAction::Sell);
        assert!(sentiment_signal(1.2, &rules()).is_none());
        assert_eq!(
            sentiment_signal(f64::INFINITY, &rules()).unwrap().action,
            SignalAction::Buy
        );
    }

    #[test]
    fn test_market_signals_all_rows() {
        let market = MarketSnapshot {
            symbol: "PEPE".to_string(),
            price_usd: 0.00001,
            price_change: WindowedValue {
                h24: -20.0,
                ..Default::default()
            },
            volume: WindowedValue {
                h1: 100.0,
                h24: 10_000.0,
                ..Default::default()
            },
            liquidity_usd: 80_000.0,
            txns_h24: TxnCounts {
                buys: 40,
                sells: 100,
            },
            market_cap: 1_000_000.0,
        };
        let signals = market_signals(&market, &rules());
        assert_eq!(
            kinds(&signals),
            vec![
                (SignalKind::Price, SignalAction::Sell, SignalStrength::Strong),
                (SignalKind::Volume, SignalAction::Buy, SignalStrength::Medium),
                (SignalKind::Sentiment, SignalAction::Sell, SignalStrength::Medium),
            ]
        );

        let combined = evaluate(
            &IndicatorSnapshot {
                rsi: Some(20.0),
                ..Default::default()
            },
            Some(&market),
            &rules(),
        );
        assert_eq!(combined.len(), 4);
        assert_eq!(combined[0].kind, SignalKind::Rsi);
    }
}
