//! Opportunity detection and lifecycle tracking.

use crate::services::opportunity::scorer::{MarketMetrics, OpportunityScorer};
use crate::types::{
    EvidenceOrigin, EvidenceSource, Opportunity, OpportunityAnalysis, OpportunityScore,
    OpportunityStatus, Signal,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const RISKS: [&str; 3] = [
    "High volatility potential",
    "Limited trading history",
    "Unverified social signals",
];

/// Everything known about one asset for a detection cycle.
///
/// Sources are expected to be window-filtered and deduplicated already.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetEvidence {
    pub asset: String,
    pub sources: Vec<EvidenceSource>,
    pub signals: Vec<Signal>,
    pub market: Option<MarketMetrics>,
}

impl AssetEvidence {
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            ..Default::default()
        }
    }

    pub fn with_sources(mut self, sources: Vec<EvidenceSource>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_signals(mut self, signals: Vec<Signal>) -> Self {
        self.signals = signals;
        self
    }

    pub fn with_market(mut self, market: MarketMetrics) -> Self {
        self.market = Some(market);
        self
    }
}

/// Live opportunities, one per asset.
///
/// Each asset is updated under its own map entry, so detections for
/// different assets can run concurrently.
pub struct OpportunityTracker {
    scorer: OpportunityScorer,
    opportunities: DashMap<String, Opportunity>,
}

impl OpportunityTracker {
    pub fn new(scorer: OpportunityScorer) -> Self {
        Self {
            scorer,
            opportunities: DashMap::new(),
        }
    }

    pub fn scorer(&self) -> &OpportunityScorer {
        &self.scorer
    }

    /// Score every candidate and emit those at or above the detection threshold.
    ///
    /// A candidate already tracked and last seen within the evaluation window
    /// is updated in place and reported as TRACKING. Otherwise a NEW
    /// opportunity replaces it. Candidates below the threshold leave any
    /// existing opportunity untouched.
    pub fn detect_opportunities(&self, candidates: &[AssetEvidence], now: i64) -> Vec<Opportunity> {
        let threshold = self.scorer.config().detection_threshold;

        candidates
            .iter()
            .filter_map(|candidate| {
                let score = self.scorer.score(
                    &candidate.asset,
                    &candidate.sources,
                    &candidate.signals,
                    candidate.market.as_ref(),
                );
                if score.overall < threshold {
                    debug!(
                        "{} below threshold: {:.1} < {:.1}",
                        candidate.asset, score.overall, threshold
                    );
                    return None;
                }
                Some(self.record(candidate, score, now))
            })
            .collect()
    }

    fn record(&self, candidate: &AssetEvidence, score: OpportunityScore, now: i64) -> Opportunity {
        let asset = candidate.asset.trim().to_uppercase();
        let window = self.scorer.config().evaluation_window_ms;

        match self.opportunities.entry(asset.clone()) {
            Entry::Occupied(mut occupied) => {
                let existing = occupied.get_mut();
                if now.saturating_sub(existing.last_updated) <= window {
                    existing.status = OpportunityStatus::Tracking;
                    existing.score = score;
                    existing.sources = candidate.sources.clone();
                    existing.signals = candidate.signals.clone();
                    existing.last_updated = existing.last_updated.max(now);
                    info!(
                        "Re-observed opportunity {} (overall {:.1})",
                        existing.id, score.overall
                    );
                } else {
                    *existing = new_opportunity(&asset, candidate, score, now);
                    info!("New opportunity {} (overall {:.1})", existing.id, score.overall);
                }
                existing.clone()
            }
            Entry::Vacant(vacant) => {
                let opportunity = new_opportunity(&asset, candidate, score, now);
                info!("New opportunity {} (overall {:.1})", opportunity.id, score.overall);
                vacant.insert(opportunity.clone());
                opportunity
            }
        }
    }

    /// Expire opportunities whose last support is older than `retention_ms`.
    ///
    /// Expired opportunities are removed and returned with status EXPIRED.
    pub fn expire_stale(&self, now: i64, retention_ms: i64) -> Vec<Opportunity> {
        let stale: Vec<String> = self
            .opportunities
            .iter()
            .filter(|o| now.saturating_sub(o.last_updated) > retention_ms)
            .map(|o| o.key().clone())
            .collect();

        stale
            .into_iter()
            .filter_map(|asset| {
                self.opportunities
                    .remove_if(&asset, |_, o| now.saturating_sub(o.last_updated) > retention_ms)
            })
            .map(|(_, mut opportunity)| {
                opportunity.status = OpportunityStatus::Expired;
                info!("Expired opportunity {}", opportunity.id);
                opportunity
            })
            .collect()
    }

    /// Expire the opportunity for `asset` alone, judged against that asset's
    /// own clock.
    pub fn expire_asset(&self, asset: &str, now: i64, retention_ms: i64) -> Option<Opportunity> {
        let key = asset.trim().to_uppercase();
        let (_, mut opportunity) = self
            .opportunities
            .remove_if(&key, |_, o| now.saturating_sub(o.last_updated) > retention_ms)?;
        opportunity.status = OpportunityStatus::Expired;
        info!("Expired opportunity {}", opportunity.id);
        Some(opportunity)
    }

    /// Currently tracked opportunities, highest overall score first.
    pub fn active(&self) -> Vec<Opportunity> {
        let mut active: Vec<Opportunity> =
            self.opportunities.iter().map(|o| o.value().clone()).collect();
        active.sort_by(|a, b| b.score.overall.total_cmp(&a.score.overall));
        active
    }

    pub fn get(&self, asset: &str) -> Option<Opportunity> {
        self.opportunities
            .get(&asset.trim().to_uppercase())
            .map(|o| o.clone())
    }

    pub fn len(&self) -> usize {
        self.opportunities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opportunities.is_empty()
    }
}

/// `{origin}_{timestamp}_{asset}`. The asset part keeps ids unique across
/// assets detected at the same instant.
fn opportunity_id(asset: &str, sources: &[EvidenceSource], now: i64) -> String {
    let origin = sources
        .first()
        .map(|s| s.origin)
        .unwrap_or(EvidenceOrigin::Technical);
    format!("{}_{}_{}", origin.tag(), now, asset)
}

fn new_opportunity(
    asset: &str,
    candidate: &AssetEvidence,
    score: OpportunityScore,
    now: i64,
) -> Opportunity {
    Opportunity {
        id: opportunity_id(asset, &candidate.sources, now),
        asset: asset.to_string(),
        created_at: now,
        sources: candidate.sources.clone(),
        score,
        signals: candidate.signals.clone(),
        analysis: OpportunityAnalysis {
            summary: format!(
                "Found potential opportunity in {} with strong social signals and market indicators",
                asset
            ),
            risks: RISKS.iter().map(|r| r.to_string()).collect(),
        },
        status: OpportunityStatus::New,
        last_updated: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::types::{SignalAction, SignalKind, SignalStrength};

    fn tracker() -> OpportunityTracker {
        OpportunityTracker::new(OpportunityScorer::new(ScoringConfig::default()))
    }

    fn hot(asset: &str, ts: i64) -> AssetEvidence {
        AssetEvidence::new(asset)
            .with_sources(vec![EvidenceSource::new(EvidenceOrigin::Social, ts, 0.9)])
            .with_signals(vec![Signal::new(
                SignalKind::Volume,
                SignalAction::Buy,
                SignalStrength::Medium,
                "Significant volume change of 180.00%",
            )])
            .with_market(MarketMetrics {
                volume_24h: 500_000.0,
                liquidity_usd: 90_000.0,
                price_change_24h: 8.0,
            })
    }

    #[test]
    fn test_detects_above_threshold() {
        let tracker = tracker();
        let found = tracker.detect_opportunities(&[hot("pepe", 1_000)], 2_000);
        assert_eq!(found.len(), 1);

        let opp = &found[0];
        assert_eq!(opp.asset, "PEPE");
        assert_eq!(opp.id, "SOCIAL_2000_PEPE");
        assert_eq!(opp.status, OpportunityStatus::New);
        assert_eq!(opp.score.technical, 100.0);
        assert!((opp.score.social - 90.0).abs() < 1e-9);
        assert_eq!(opp.analysis.risks.len(), 3);
        assert!(opp.analysis.summary.contains("PEPE"));
    }

    #[test]
    fn test_below_threshold_is_ignored() {
        let tracker = tracker();
        let quiet = AssetEvidence::new("DOGE");
        assert!(tracker.detect_opportunities(&[quiet], 1).is_empty());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_redetection_within_window_tracks() {
        let tracker = tracker();
        let first = tracker.detect_opportunities(&[hot("PEPE", 0)], 1_000);
        let second = tracker.detect_opportunities(&[hot("PEPE", 0)], 61_000);

        assert_eq!(second[0].id, first[0].id);
        assert_eq!(second[0].status, OpportunityStatus::Tracking);
        assert_eq!(second[0].created_at, 1_000);
        assert_eq!(second[0].last_updated, 61_000);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_redetection_after_window_is_new() {
        let tracker = tracker();
        tracker.detect_opportunities(&[hot("PEPE", 0)], 1_000);
        let later = tracker.detect_opportunities(&[hot("PEPE", 0)], 1_000 + 300_001);
        assert_eq!(later[0].status, OpportunityStatus::New);
        assert_eq!(later[0].id, "SOCIAL_301001_PEPE");
    }

    #[test]
    fn test_same_instant_distinct_ids() {
        let tracker = tracker();
        let found = tracker.detect_opportunities(&[hot("PEPE", 0), hot("WIF", 0)], 5_000);
        assert_eq!(found.len(), 2);
        assert_ne!(found[0].id, found[1].id);
    }

    #[test]
    fn test_expire_stale() {
        let tracker = tracker();
        tracker.detect_opportunities(&[hot("PEPE", 0)], 1_000);
        tracker.detect_opportunities(&[hot("WIF", 0)], 50_000);

        let expired = tracker.expire_stale(60_000, 30_000);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].asset, "PEPE");
        assert_eq!(expired[0].status, OpportunityStatus::Expired);

        let active = tracker.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].asset, "WIF");
        assert!(tracker.get("pepe").is_none());
    }

    #[test]
    fn test_expire_asset_leaves_others() {
        let tracker = tracker();
        tracker.detect_opportunities(&[hot("PEPE", 0)], 1_000);
        tracker.detect_opportunities(&[hot("WIF", 0)], 1_000);

        // WIF's clock has moved on; PEPE's has not.
        let expired = tracker.expire_asset("wif", 60_000, 30_000).unwrap();
        assert_eq!(expired.asset, "WIF");
        assert_eq!(expired.status, OpportunityStatus::Expired);
        assert!(tracker.get("PEPE").is_some());
        assert!(tracker.expire_asset("PEPE", 20_000, 30_000).is_none());
    }
}
