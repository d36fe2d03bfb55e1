//! Relative Strength Index (RSI) indicator.

use crate::services::signals::{Indicator, PriceSeries};

/// RSI (Relative Strength Index) indicator.
///
/// Measures momentum by comparing the magnitude of recent gains to recent losses,
/// using Wilder's smoothing. Values range from 0-100:
/// - Below 30: Oversold (potential buy signal)
/// - Above 70: Overbought (potential sell signal)
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// RSI over the whole close history.
    pub fn calculate_rsi(closes: &[f64], period: usize) -> Option<f64> {
        if period == 0 || closes.len() < period + 1 {
            return None;
        }

        let mut state = RsiState::new(period);
        for close in closes {
            state.update(*close);
        }
        state.value()
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, series: &PriceSeries<'_>) -> Option<f64> {
        Self::calculate_rsi(series.closes, self.period)
    }
}

/// Incremental Wilder RSI.
///
/// The first average gain/loss is the simple mean of the first `period`
/// changes; later ones are smoothed with factor `1 / period`. Both are kept
/// as running means so closes near `f64::MAX` never overflow the averages.
#[derive(Debug, Clone)]
pub struct RsiState {
    period: usize,
    prev_close: Option<f64>,
    changes: usize,
    avg_gain: f64,
    avg_loss: f64,
}

impl RsiState {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            prev_close: None,
            changes: 0,
            avg_gain: 0.0,
            avg_loss: 0.0,
        }
    }

    pub fn update(&mut self, close: f64) -> Option<f64> {
        let Some(prev) = self.prev_close.replace(close) else {
            return None;
        };

        let change = close - prev;
        let (gain, loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };

        self.changes += 1;
        let n = self.changes.min(self.period).max(1) as f64;
        self.avg_gain += (gain - self.avg_gain) / n;
        self.avg_loss += (loss - self.avg_loss) / n;

        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        if self.period == 0 || self.changes < self.period {
            return None;
        }
        if self.avg_loss == 0.0 {
            return Some(100.0);
        }

        let rs = self.avg_gain / self.avg_loss;
        let rsi = 100.0 - (100.0 / (1.0 + rs));
        // Only reachable with non-finite closes.
        if rsi.is_nan() {
            return Some(50.0);
        }
        Some(rsi.clamp(0.0, 100.0))
    }
}
