//! MACD (Moving Average Convergence Divergence) indicator.

use crate::services::signals::indicators::{Ema, EmaState};
use crate::services::signals::{Indicator, PriceSeries};
use crate::types::MacdValues;

/// MACD indicator.
///
/// Shows the relationship between two EMAs:
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = EMA(9) of MACD Line
/// - Histogram = MACD Line - Signal Line
///
/// The MACD line is defined from `slow` bars; the signal line and histogram
/// are reported from `slow + signal` bars.
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }
}

impl Indicator for Macd {
    type Output = MacdValues;

    fn min_periods(&self) -> usize {
        self.slow_period + self.signal_period
    }

    fn calculate(&self, series: &PriceSeries<'_>) -> Option<MacdValues> {
        let closes = series.closes;
        if self.fast_period == 0 || self.fast_period >= self.slow_period {
            return None;
        }

        let fast_ema = Ema::series(closes, self.fast_period);
        let slow_ema = Ema::series(closes, self.slow_period);
        if slow_ema.is_empty() {
            return None;
        }

        // Align the EMAs (fast starts earlier)
        let offset = self.slow_period - self.fast_period;
        let macd_line: Vec<f64> = fast_ema
            .iter()
            .skip(offset)
            .zip(slow_ema.iter())
            .map(|(f, s)| f - s)
            .collect();

        let macd = macd_line.last().copied();
        let signal = if closes.len() >= self.min_periods() {
            Ema::series(&macd_line, self.signal_period).last().copied()
        } else {
            None
        };

        Some(MacdState::values(macd, signal))
    }
}

/// Incremental MACD accumulator.
#[derive(Debug, Clone)]
pub struct MacdState {
    fast: EmaState,
    slow: EmaState,
    signal: EmaState,
    min_signal_bars: usize,
    bars: usize,
    macd: Option<f64>,
}

impl MacdState {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast: EmaState::new(fast_period),
            slow: EmaState::new(slow_period),
            signal: EmaState::new(signal_period),
            min_signal_bars: slow_period + signal_period,
            bars: 0,
            macd: None,
        }
    }

    pub fn update(&mut self, close: f64) -> MacdValues {
        self.bars += 1;
        let fast = self.fast.update(close);
        let slow = self.slow.update(close);
        if let (Some(f), Some(s)) = (fast, slow) {
            let macd = f - s;
            self.macd = Some(macd);
            self.signal.update(macd);
        }
        self.current()
    }

    pub fn current(&self) -> MacdValues {
        let signal = if self.bars >= self.min_signal_bars {
            self.signal.value()
        } else {
            None
        };
        Self::values(self.macd, signal)
    }

    /// Build the output triple; the histogram exists only with both lines.
    fn values(macd: Option<f64>, signal: Option<f64>) -> MacdValues {
        let (signal, histogram) = match (macd, signal) {
            (Some(m), Some(s)) => (Some(s), Some(m - s)),
            _ => (None, None),
        };
        MacdValues {
            macd,
            signal,
            histogram,
        }
    }
}
