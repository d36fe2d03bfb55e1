//! Bollinger Bands indicator.

use crate::services::signals::indicators::Sma;
use crate::services::signals::{Indicator, PriceSeries};
use crate::types::BollingerValues;

/// Bollinger Bands indicator.
///
/// Consists of:
/// - Middle band: SMA(20)
/// - Upper band: SMA + 2 * StdDev
/// - Lower band: SMA - 2 * StdDev
///
/// StdDev is the population standard deviation of the trailing window.
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Self {
        Self {
            period,
            std_dev_multiplier,
        }
    }

    /// Calculate population standard deviation.
    ///
    /// Deviations are scaled by the largest one before squaring so the
    /// variance cannot overflow.
    fn std_dev(values: &[f64], mean: f64) -> f64 {
        let scale = values
            .iter()
            .map(|v| (v - mean).abs())
            .fold(0.0, f64::max);
        if scale == 0.0 || !scale.is_finite() {
            return scale;
        }
        let variance = values
            .iter()
            .map(|v| ((v - mean) / scale).powi(2))
            .sum::<f64>()
            / values.len() as f64;
        scale * variance.sqrt()
    }
}

impl Indicator for BollingerBands {
    type Output = BollingerValues;

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, series: &PriceSeries<'_>) -> Option<BollingerValues> {
        let closes = series.closes;
        if self.period == 0 || closes.len() < self.period {
            return None;
        }

        let window = &closes[closes.len() - self.period..];
        let middle = Sma::mean(window, self.period)?;
        let width = self.std_dev_multiplier.max(0.0) * Self::std_dev(window, middle);

        Some(BollingerValues {
            upper: Some(middle + width),
            middle: Some(middle),
            lower: Some(middle - width),
        })
    }
}
