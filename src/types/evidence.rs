use crate::types::{Signal, SignalKind};
use serde::{Deserialize, Serialize};

/// Where a piece of evidence came from.
///
/// Closed set: the scorer matches on it exhaustively, so a new origin has to
/// be given a fusion weight before it compiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EvidenceOrigin {
    Social,
    Technical,
}

impl EvidenceOrigin {
    pub fn tag(&self) -> &'static str {
        match self {
            EvidenceOrigin::Social => "SOCIAL",
            EvidenceOrigin::Technical => "TECHNICAL",
        }
    }
}

/// Engagement counters for a social post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    pub engagement: u64,
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
}

/// Origin-specific body of an evidence record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EvidencePayload {
    Post {
        url: String,
        text: String,
        metrics: EngagementMetrics,
    },
    Indicator {
        kind: SignalKind,
        reason: String,
    },
    Empty,
}

/// One unit of external corroboration for an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSource {
    pub origin: EvidenceOrigin,
    /// Unix milliseconds.
    pub timestamp: i64,
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub payload: EvidencePayload,
}

impl EvidenceSource {
    pub fn new(origin: EvidenceOrigin, timestamp: i64, confidence: f64) -> Self {
        Self {
            origin,
            timestamp,
            confidence,
            payload: EvidencePayload::Empty,
        }
    }

    pub fn with_payload(mut self, payload: EvidencePayload) -> Self {
        self.payload = payload;
        self
    }

    /// TECHNICAL evidence for an indicator signal, or None for signals read
    /// off a market snapshot. Confidence is the strength over its maximum.
    pub fn from_signal(signal: &Signal, timestamp: i64) -> Option<Self> {
        if !signal.kind.is_indicator() {
            return None;
        }
        let confidence = f64::from(signal.strength.value()) / 3.0;
        Some(
            Self::new(EvidenceOrigin::Technical, timestamp, confidence).with_payload(
                EvidencePayload::Indicator {
                    kind: signal.kind,
                    reason: signal.reason.clone(),
                },
            ),
        )
    }

    /// Whether both records describe the same observation, ignoring
    /// confidence and counters that change between polls.
    pub fn is_same_record(&self, other: &EvidenceSource) -> bool {
        if self.origin != other.origin || self.timestamp != other.timestamp {
            return false;
        }
        match (&self.payload, &other.payload) {
            (EvidencePayload::Post { url: a, .. }, EvidencePayload::Post { url: b, .. }) => a == b,
            (
                EvidencePayload::Indicator { kind: a, .. },
                EvidencePayload::Indicator { kind: b, .. },
            ) => a == b,
            (a, b) => a == b,
        }
    }
}

/// Keep the sources observed in `[now_ms - window_ms, now_ms]`.
pub fn within_window(sources: &[EvidenceSource], now_ms: i64, window_ms: i64) -> Vec<EvidenceSource> {
    let start = now_ms.saturating_sub(window_ms);
    sources
        .iter()
        .filter(|s| s.timestamp >= start && s.timestamp <= now_ms)
        .cloned()
        .collect()
}
