//! Rolling bar window for a single (asset, timeframe) series.

use crate::error::{EngineError, Result};
use crate::types::{Bar, Timeframe};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

/// Identifies one bar series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub asset: String,
    pub timeframe: Timeframe,
}

impl SeriesKey {
    /// Asset symbols are case-insensitive.
    pub fn new(asset: &str, timeframe: Timeframe) -> Self {
        Self {
            asset: asset.trim().to_uppercase(),
            timeframe,
        }
    }

    pub fn of(bar: &Bar) -> Self {
        Self::new(&bar.asset, bar.timeframe)
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.asset, self.timeframe)
    }
}

/// Bar column to read from a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl PriceField {
    fn read(&self, bar: &Bar) -> f64 {
        match self {
            PriceField::Open => bar.open,
            PriceField::High => bar.high,
            PriceField::Low => bar.low,
            PriceField::Close => bar.close,
            PriceField::Volume => bar.volume,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("Insufficient history: need {needed} bars, have {available}")]
    Insufficient { needed: usize, available: usize },
}

/// Fixed-capacity, time-ordered bar buffer. Oldest bars are evicted first.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    key: SeriesKey,
    bars: VecDeque<Bar>,
    capacity: usize,
    /// Bars ever appended, including evicted ones.
    total: usize,
}

impl RollingWindow {
    pub fn new(key: SeriesKey, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            key,
            bars: VecDeque::with_capacity(capacity),
            capacity,
            total: 0,
        }
    }

    pub fn key(&self) -> &SeriesKey {
        &self.key
    }

    /// Append a bar. Its timestamp must be strictly after the previous bar.
    pub fn append(&mut self, bar: Bar) -> Result<()> {
        if SeriesKey::of(&bar) != self.key {
            return Err(EngineError::InvalidBar {
                asset: bar.asset.clone(),
                reason: format!("bar does not belong to series {}", self.key),
            });
        }

        if let Some(last) = self.bars.back() {
            if bar.timestamp <= last.timestamp {
                return Err(EngineError::OutOfOrderBar {
                    asset: self.key.asset.clone(),
                    timeframe: self.key.timeframe,
                    last: last.timestamp,
                    got: bar.timestamp,
                });
            }
        }

        self.bars.push_back(bar);
        self.total += 1;

        // Trim old bars
        while self.bars.len() > self.capacity {
            self.bars.pop_front();
        }

        Ok(())
    }

    /// The most recent `period` values of `field`, oldest first.
    pub fn window(&self, period: usize, field: PriceField) -> std::result::Result<Vec<f64>, WindowError> {
        if period == 0 || self.bars.len() < period {
            return Err(WindowError::Insufficient {
                needed: period.max(1),
                available: self.bars.len(),
            });
        }

        Ok(self
            .bars
            .iter()
            .skip(self.bars.len() - period)
            .map(|b| field.read(b))
            .collect())
    }

    /// Every retained value of `field`, oldest first.
    pub fn values(&self, field: PriceField) -> Vec<f64> {
        self.bars.iter().map(|b| field.read(b)).collect()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.back()
    }

    /// Bars currently retained.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bars appended over the lifetime of the series.
    pub fn total(&self) -> usize {
        self.total
    }
}
