//! Exponential Moving Average (EMA) indicator.

use crate::services::signals::{Indicator, PriceSeries};

/// EMA (Exponential Moving Average) indicator.
///
/// Seeded with the SMA of the first `period` values, then
/// `ema = (value - ema) * k + ema` with `k = 2 / (period + 1)`.
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// EMA series of `values`. The first element corresponds to
    /// `values[period - 1]`; empty when there are fewer than `period` values.
    pub fn series(values: &[f64], period: usize) -> Vec<f64> {
        if period == 0 || values.len() < period {
            return Vec::new();
        }

        let mut state = EmaState::new(period);
        values.iter().filter_map(|v| state.update(*v)).collect()
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, series: &PriceSeries<'_>) -> Option<f64> {
        Self::series(series.closes, self.period).last().copied()
    }
}

/// Incremental EMA accumulator.
#[derive(Debug, Clone)]
pub struct EmaState {
    period: usize,
    multiplier: f64,
    seed_mean: f64,
    seen: usize,
    value: Option<f64>,
}

impl EmaState {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            multiplier: 2.0 / (period as f64 + 1.0),
            seed_mean: 0.0,
            seen: 0,
            value: None,
        }
    }

    /// Feed the next value and return the EMA once seeded.
    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.seen += 1;
        self.value = match self.value {
            Some(prev) => Some((value - prev) * self.multiplier + prev),
            None => {
                self.seed_mean += (value - self.seed_mean) / self.seen as f64;
                if self.seen == self.period {
                    Some(self.seed_mean)
                } else {
                    None
                }
            }
        };
        self.value
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }
}
