use serde::{Deserialize, Serialize};
use std::fmt;

/// What produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    Rsi,
    Macd,
    Stochastic,
    Price,
    Volume,
    Sentiment,
}

impl SignalKind {
    /// Get display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            SignalKind::Rsi => "RSI",
            SignalKind::Macd => "MACD",
            SignalKind::Stochastic => "STOCHASTIC",
            SignalKind::Price => "PRICE",
            SignalKind::Volume => "VOLUME",
            SignalKind::Sentiment => "SENTIMENT",
        }
    }

    /// Whether the signal comes from indicator math over bars, as opposed
    /// to a 24h market snapshot.
    pub fn is_indicator(&self) -> bool {
        matches!(
            self,
            SignalKind::Rsi | SignalKind::Macd | SignalKind::Stochastic
        )
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Suggested action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl SignalAction {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            SignalAction::Buy => "BUY",
            SignalAction::Sell => "SELL",
            SignalAction::Hold => "HOLD",
        }
    }
}

/// Signal strength on a 1-3 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalStrength {
    Weak,
    Medium,
    Strong,
}

impl SignalStrength {
    /// Numeric form: 1 = weak, 2 = medium, 3 = strong.
    pub fn value(&self) -> u8 {
        match self {
            SignalStrength::Weak => 1,
            SignalStrength::Medium => 2,
            SignalStrength::Strong => 3,
        }
    }

    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(SignalStrength::Weak),
            2 => Some(SignalStrength::Medium),
            3 => Some(SignalStrength::Strong),
            _ => None,
        }
    }
}

/// A directional trading signal. Built once per evaluation and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub action: SignalAction,
    pub strength: SignalStrength,
    pub reason: String,
}

impl Signal {
    pub fn new(
        kind: SignalKind,
        action: SignalAction,
        strength: SignalStrength,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            action,
            strength,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} - {}",
            "*".repeat(self.strength.value() as usize),
            self.kind,
            self.action.label(),
            self.reason
        )
    }
}
