//! Signal engine for computing indicators and signals per series.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::services::signals::calculator::IndicatorCalculator;
use crate::services::signals::rules;
use crate::services::signals::window::SeriesKey;
use crate::types::{Analysis, Bar, IndicatorSnapshot, MarketSnapshot, Timeframe};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Keyed indicator state for every tracked (asset, timeframe) series.
///
/// Each series is updated under its map entry lock, so two bars for the same
/// series never interleave while different series proceed in parallel.
pub struct SignalEngine {
    config: Arc<EngineConfig>,
    series: DashMap<SeriesKey, IndicatorCalculator>,
}

impl SignalEngine {
    /// Create a new signal engine.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            series: DashMap::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Append a bar to its series.
    pub fn ingest(&self, bar: Bar) -> Result<()> {
        self.update(bar, |_| ())
    }

    /// Append a bar and evaluate its series.
    pub fn analyze(&self, bar: Bar) -> Result<Analysis> {
        self.analyze_with_market(bar, None)
    }

    /// Append a bar and evaluate its series, adding market-snapshot signals
    /// when a snapshot is available for this cycle.
    pub fn analyze_with_market(
        &self,
        bar: Bar,
        market: Option<&MarketSnapshot>,
    ) -> Result<Analysis> {
        self.update(bar, |calc| self.analysis_of(calc, market))
    }

    /// Current indicator values for a series, if it is tracked.
    pub fn snapshot(&self, asset: &str, timeframe: Timeframe) -> Option<IndicatorSnapshot> {
        self.series
            .get(&SeriesKey::new(asset, timeframe))
            .map(|calc| calc.snapshot())
    }

    /// Re-evaluate a series without a new bar. Repeated calls return the same result.
    pub fn evaluate(
        &self,
        asset: &str,
        timeframe: Timeframe,
        market: Option<&MarketSnapshot>,
    ) -> Option<Analysis> {
        let calc = self.series.get(&SeriesKey::new(asset, timeframe))?;
        calc.last_bar()?;
        Some(self.analysis_of(&calc, market))
    }

    /// Number of tracked series.
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Stop tracking a series. Returns whether it existed.
    pub fn forget(&self, asset: &str, timeframe: Timeframe) -> bool {
        self.series
            .remove(&SeriesKey::new(asset, timeframe))
            .is_some()
    }

    fn update<T>(&self, bar: Bar, then: impl FnOnce(&IndicatorCalculator) -> T) -> Result<T> {
        let key = SeriesKey::of(&bar);

        if let Err(reason) = bar.check() {
            warn!("Rejected bar for {}: {}", key, reason);
            return Err(EngineError::InvalidBar {
                asset: bar.asset,
                reason,
            });
        }

        let mut calc = self.series.entry(key.clone()).or_insert_with(|| {
            debug!("Tracking new series {}", key);
            IndicatorCalculator::new(key.clone(), &self.config.indicators)
        });

        if let Err(e) = calc.push(bar) {
            warn!("Rejected bar for {}: {}", key, e);
            return Err(e);
        }

        Ok(then(&calc))
    }

    fn analysis_of(&self, calc: &IndicatorCalculator, market: Option<&MarketSnapshot>) -> Analysis {
        let timestamp = calc.last_bar().map(|b| b.timestamp).unwrap_or_default();
        let metrics = calc.snapshot();
        let signals = rules::evaluate(&metrics, market, &self.config.rules);

        debug!(
            "Evaluated {} at {}: {} signals",
            calc.key(),
            timestamp,
            signals.len()
        );

        Analysis {
            asset: calc.key().asset.clone(),
            timeframe: calc.key().timeframe,
            timestamp,
            metrics,
            signals,
        }
    }
}
