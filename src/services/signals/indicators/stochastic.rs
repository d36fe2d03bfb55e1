//! Stochastic Oscillator indicator.

use crate::services::signals::{Indicator, PriceSeries};
use crate::types::StochasticValues;

/// Stochastic Oscillator.
///
/// Compares closing price to price range over a period:
/// %K = (Current Close - Lowest Low) / (Highest High - Lowest Low) * 100
/// %D = SMA(d_period) of %K
///
/// A flat range yields %K = 50.
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

impl Stochastic {
    pub fn new(k_period: usize, d_period: usize) -> Self {
        Self { k_period, d_period }
    }

    /// %K for the bar at index `i`, over the `k_period` bars ending there.
    fn percent_k(&self, series: &PriceSeries<'_>, i: usize) -> f64 {
        let start = i + 1 - self.k_period;
        let lowest_low = series.lows[start..=i]
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        let highest_high = series.highs[start..=i]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        let range = highest_high - lowest_low;
        if range > 0.0 {
            (((series.closes[i] - lowest_low) / range) * 100.0).clamp(0.0, 100.0)
        } else {
            50.0
        }
    }
}

impl Indicator for Stochastic {
    type Output = StochasticValues;

    fn min_periods(&self) -> usize {
        self.k_period
    }

    fn calculate(&self, series: &PriceSeries<'_>) -> Option<StochasticValues> {
        let len = series.len();
        if self.k_period == 0
            || len < self.k_period
            || series.highs.len() != len
            || series.lows.len() != len
        {
            return None;
        }

        let last = len - 1;
        let k = self.percent_k(series, last);

        // %D needs d_period consecutive %K values.
        let d = if self.d_period > 0 && len >= self.k_period + self.d_period - 1 {
            let sum: f64 = (0..self.d_period)
                .map(|back| self.percent_k(series, last - back))
                .sum();
            Some(sum / self.d_period as f64)
        } else {
            None
        };

        Some(StochasticValues { k: Some(k), d })
    }
}
