//! Simple Moving Average (SMA) indicator.

use crate::services::signals::{Indicator, PriceSeries};

/// SMA (Simple Moving Average) indicator.
///
/// Arithmetic mean of the last `period` closes.
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Mean of the trailing `period` values.
    ///
    /// Accumulated as a running mean, which stays finite for any finite input.
    pub fn mean(values: &[f64], period: usize) -> Option<f64> {
        if period == 0 || values.len() < period {
            return None;
        }
        let mean = values[values.len() - period..]
            .iter()
            .enumerate()
            .fold(0.0, |mean, (i, v)| mean + (v - mean) / (i + 1) as f64);
        Some(mean)
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, series: &PriceSeries<'_>) -> Option<f64> {
        Self::mean(series.closes, self.period)
    }
}
