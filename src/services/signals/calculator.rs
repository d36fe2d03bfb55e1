//! Per-series indicator calculation.

use crate::config::IndicatorConfig;
use crate::error::{EngineError, Result};
use crate::services::signals::indicators::{
    BollingerBands, Macd, MacdState, Rsi, RsiState, Sma, Stochastic,
};
use crate::services::signals::window::{PriceField, RollingWindow, SeriesKey};
use crate::services::signals::{Indicator, PriceSeries};
use crate::types::{Bar, IndicatorSnapshot};

fn reject(bar: &Bar, reason: String) -> EngineError {
    EngineError::InvalidBar {
        asset: bar.asset.clone(),
        reason,
    }
}

/// Indicator state for one (asset, timeframe) series.
///
/// SMA, Bollinger and Stochastic are read from the trailing window. RSI and
/// MACD are recursive, so they carry accumulators across the full history
/// instead of being replayed from the retained bars.
#[derive(Debug, Clone)]
pub struct IndicatorCalculator {
    config: IndicatorConfig,
    window: RollingWindow,
    rsi: RsiState,
    macd: MacdState,
}

impl IndicatorCalculator {
    pub fn new(key: SeriesKey, config: &IndicatorConfig) -> Self {
        Self {
            window: RollingWindow::new(key, config.retained_bars()),
            rsi: RsiState::new(config.rsi_period),
            macd: MacdState::new(config.macd_fast, config.macd_slow, config.macd_signal),
            config: config.clone(),
        }
    }

    pub fn key(&self) -> &SeriesKey {
        self.window.key()
    }

    /// Validate and append a bar, then advance the accumulators.
    ///
    /// A rejected bar leaves the state untouched.
    pub fn push(&mut self, bar: Bar) -> Result<()> {
        bar.check().map_err(|reason| reject(&bar, reason))?;

        let close = bar.close;
        self.window.append(bar)?;
        self.rsi.update(close);
        self.macd.update(close);
        Ok(())
    }

    /// Indicator values at the latest bar. Does not mutate anything.
    pub fn snapshot(&self) -> IndicatorSnapshot {
        let highs = self.window.values(PriceField::High);
        let lows = self.window.values(PriceField::Low);
        let closes = self.window.values(PriceField::Close);
        let series = PriceSeries::new(&highs, &lows, &closes);

        let mut snapshot = windowed_snapshot(&series, &self.config);
        snapshot.rsi = self.rsi.value();
        snapshot.macd = self.macd.current();
        snapshot
    }

    pub fn last_bar(&self) -> Option<&Bar> {
        self.window.last()
    }

    /// Bars seen over the lifetime of the series.
    pub fn bars_seen(&self) -> usize {
        self.window.total()
    }

    pub fn window(&self) -> &RollingWindow {
        &self.window
    }
}

/// SMA, Bollinger and Stochastic over `series`.
fn windowed_snapshot(series: &PriceSeries<'_>, config: &IndicatorConfig) -> IndicatorSnapshot {
    IndicatorSnapshot {
        rsi: None,
        sma: Sma::new(config.sma_period).calculate(series),
        bollinger_bands: BollingerBands::new(config.bollinger_period, config.bollinger_std_dev)
            .calculate(series)
            .unwrap_or_default(),
        macd: Default::default(),
        stochastic: Stochastic::new(config.stochastic_period, config.stochastic_signal_period)
            .calculate(series)
            .unwrap_or_default(),
    }
}

/// Compute a snapshot from a complete, ordered bar history in one pass.
///
/// Produces the same values as feeding the bars one by one through an
/// [`IndicatorCalculator`].
pub fn snapshot_from_bars(bars: &[Bar], config: &IndicatorConfig) -> Result<IndicatorSnapshot> {
    for (i, bar) in bars.iter().enumerate() {
        bar.check().map_err(|reason| reject(bar, reason))?;
        if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
            return Err(EngineError::OutOfOrderBar {
                asset: bar.asset.clone(),
                timeframe: bar.timeframe,
                last: bars[i - 1].timestamp,
                got: bar.timestamp,
            });
        }
    }

    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let series = PriceSeries::new(&highs, &lows, &closes);

    let mut snapshot = windowed_snapshot(&series, config);
    snapshot.rsi = Rsi::new(config.rsi_period).calculate(&series);
    snapshot.macd = Macd::new(config.macd_fast, config.macd_slow, config.macd_signal)
        .calculate(&series)
        .unwrap_or_default();
    Ok(snapshot)
}
