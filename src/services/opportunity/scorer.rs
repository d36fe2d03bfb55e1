//! Evidence fusion into a bounded opportunity score.

use crate::config::ScoringConfig;
use crate::types::{EvidenceSource, MarketAnalysis, MarketSnapshot, OpportunityScore, Signal};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The market figures the technical score looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMetrics {
    pub volume_24h: f64,
    pub liquidity_usd: f64,
    pub price_change_24h: f64,
}

impl From<&MarketSnapshot> for MarketMetrics {
    fn from(market: &MarketSnapshot) -> Self {
        Self {
            volume_24h: market.volume.h24,
            liquidity_usd: market.liquidity_usd,
            price_change_24h: market.price_change.h24,
        }
    }
}

impl From<&MarketAnalysis> for MarketMetrics {
    fn from(analysis: &MarketAnalysis) -> Self {
        Self {
            volume_24h: analysis.volume.h24,
            liquidity_usd: analysis.liquidity.usd,
            price_change_24h: analysis.price.change_24h,
        }
    }
}

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Stateless scorer. Safe to share across threads and call for many assets at once.
#[derive(Debug, Clone, Default)]
pub struct OpportunityScorer {
    config: ScoringConfig,
}

impl OpportunityScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score an asset from its evidence, current signals and optional market figures.
    ///
    /// Missing evidence or market data contribute zero. Never fails.
    pub fn score(
        &self,
        asset: &str,
        sources: &[EvidenceSource],
        signals: &[Signal],
        market: Option<&MarketMetrics>,
    ) -> OpportunityScore {
        let social = self.social_score(sources);
        let technical = self.technical_score(signals, market);
        let overall = clamp_score((social + technical) / 2.0);

        debug!(
            "Scored {}: {} sources, {} signals, social {:.1}, technical {:.1}, overall {:.1}",
            asset,
            sources.len(),
            signals.len(),
            social,
            technical,
            overall
        );

        OpportunityScore {
            social,
            technical,
            overall,
        }
    }

    /// Weighted mean of `confidence × 100` using the per-origin fusion weights.
    /// An empty (or zero-weight) evidence set scores 0.
    pub fn social_score(&self, sources: &[EvidenceSource]) -> f64 {
        let weights = &self.config.fusion_weights;
        let (total, weight_sum) = sources
            .iter()
            .filter(|s| s.confidence.is_finite())
            .fold((0.0, 0.0), |(total, weight_sum), source| {
                let weight = weights.weight_for(source.origin);
                let confidence = source.confidence.clamp(0.0, 1.0);
                (total + weight * confidence * 100.0, weight_sum + weight)
            });

        if weight_sum <= 0.0 {
            return 0.0;
        }
        clamp_score(total / weight_sum)
    }

    /// Flat points per signal plus one term per market condition that holds.
    pub fn technical_score(&self, signals: &[Signal], market: Option<&MarketMetrics>) -> f64 {
        let config = &self.config;
        let mut score = signals.len() as f64 * config.points_per_signal;

        if let Some(market) = market {
            if market.volume_24h > config.volume_floor {
                score += config.volume_points;
            }
            if market.liquidity_usd > config.liquidity_floor {
                score += config.liquidity_points;
            }
            if market.price_change_24h > 0.0 {
                score += config.price_change_points;
            }
        }

        clamp_score(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FusionWeights;
    use crate::types::{EvidenceOrigin, SignalAction, SignalKind, SignalStrength};

    fn signal() -> Signal {
        Signal::new(
            SignalKind::Rsi,
            SignalAction::Buy,
            SignalStrength::Strong,
            "RSI oversold at 22.00",
        )
    }

    fn social(confidence: f64) -> EvidenceSource {
        EvidenceSource::new(EvidenceOrigin::Social, 0, confidence)
    }

    fn strong_market() -> MarketMetrics {
        MarketMetrics {
            volume_24h: 250_000.0,
            liquidity_usd: 75_000.0,
            price_change_24h: 4.2,
        }
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        let score = OpportunityScorer::default().score("BTC", &[], &[], None);
        assert_eq!(score, OpportunityScore::default());
    }

    #[test]
    fn test_social_mean() {
        let scorer = OpportunityScorer::default();
        assert!((scorer.social_score(&[social(0.4), social(0.8)]) - 60.0).abs() < 1e-9);
        // Out-of-range confidence is clamped.
        assert_eq!(scorer.social_score(&[social(3.0)]), 100.0);
    }

    #[test]
    fn test_technical_sources_carry_no_social_weight() {
        let scorer = OpportunityScorer::default();
        let sources = vec![
            social(0.5),
            EvidenceSource::new(EvidenceOrigin::Technical, 0, 1.0),
        ];
        assert_eq!(scorer.social_score(&sources), 50.0);
        assert_eq!(
            scorer.social_score(&[EvidenceSource::new(EvidenceOrigin::Technical, 0, 1.0)]),
            0.0
        );
    }

    #[test]
    fn test_custom_fusion_weights() {
        let scorer = OpportunityScorer::new(ScoringConfig {
            fusion_weights: FusionWeights {
                social: 1.0,
                technical: 1.0,
            },
            ..Default::default()
        });
        let sources = vec![
            social(0.2),
            EvidenceSource::new(EvidenceOrigin::Technical, 0, 0.6),
        ];
        assert!((scorer.social_score(&sources) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_technical_terms() {
        let scorer = OpportunityScorer::default();
        assert_eq!(scorer.technical_score(&[signal()], None), 25.0);
        assert_eq!(scorer.technical_score(&[], Some(&strong_market())), 75.0);

        let weak = MarketMetrics {
            volume_24h: 100_000.0,
            liquidity_usd: 50_000.0,
            price_change_24h: 0.0,
        };
        // Floors are exclusive.
        assert_eq!(scorer.technical_score(&[], Some(&weak)), 0.0);
    }

    #[test]
    fn test_technical_is_capped() {
        let scorer = OpportunityScorer::default();
        let signals = vec![signal(), signal(), signal()];
        let score = scorer.score("WIF", &[], &signals, Some(&strong_market()));
        assert_eq!(score.technical, 100.0);
        assert_eq!(score.social, 0.0);
        assert_eq!(score.overall, 50.0);
    }
}
