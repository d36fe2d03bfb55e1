//! Signal engine.
//!
//! Rolling bar windows per (asset, timeframe), indicator calculation over
//! those windows, and the fixed rule layer that turns indicator values into
//! directional signals.

pub mod calculator;
pub mod engine;
pub mod indicators;
pub mod rules;
pub mod window;

pub use calculator::{snapshot_from_bars, IndicatorCalculator};
pub use engine::SignalEngine;
pub use window::{PriceField, RollingWindow, SeriesKey, WindowError};

/// Column view over a run of bars, oldest first.
#[derive(Debug, Clone, Copy)]
pub struct PriceSeries<'a> {
    pub highs: &'a [f64],
    pub lows: &'a [f64],
    pub closes: &'a [f64],
}

impl<'a> PriceSeries<'a> {
    pub fn new(highs: &'a [f64], lows: &'a [f64], closes: &'a [f64]) -> Self {
        Self {
            highs,
            lows,
            closes,
        }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// Trait for implementing technical indicators.
pub trait Indicator: Send + Sync {
    type Output;

    /// Minimum number of bars required for a value.
    fn min_periods(&self) -> usize;

    /// Calculate the indicator at the last bar of `series`.
    /// Returns None if there is not enough history.
    fn calculate(&self, series: &PriceSeries<'_>) -> Option<Self::Output>;
}
