//! Tests for market analysis, social evidence and opportunity scoring

use signalforge::config::{EngineConfig, ScoringConfig, SocialConfig};
use signalforge::services::market;
use signalforge::services::opportunity::{
    AssetEvidence, MarketMetrics, OpportunityScorer, OpportunityTracker,
};
use signalforge::services::pipeline::{Input, Output, Pipeline};
use signalforge::services::social::{collect_evidence, Influencer, SocialPost};
use signalforge::types::*;
use std::sync::Arc;

fn signal(kind: SignalKind) -> Signal {
    Signal::new(kind, SignalAction::Buy, SignalStrength::Medium, "test")
}

fn snapshot() -> MarketSnapshot {
    MarketSnapshot {
        symbol: "BONK".to_string(),
        price_usd: 0.00002,
        price_change: WindowedValue {
            m5: 0.5,
            h1: 2.0,
            h6: 6.0,
            h24: 14.0,
        },
        volume: WindowedValue {
            m5: 20_000.0,
            h1: 50_000.0,
            h6: 400_000.0,
            h24: 3_000_000.0,
        },
        liquidity_usd: 750_000.0,
        txns_h24: TxnCounts {
            buys: 900,
            sells: 300,
        },
        market_cap: 1_200_000_000.0,
    }
}

// ============================================================================
// Opportunity scoring
// ============================================================================

#[test]
fn test_technical_only_scenario_stays_below_threshold() {
    let tracker = OpportunityTracker::new(OpportunityScorer::new(ScoringConfig::default()));
    let candidate = AssetEvidence::new("BONK")
        .with_signals(vec![
            signal(SignalKind::Price),
            signal(SignalKind::Volume),
            signal(SignalKind::Sentiment),
        ])
        .with_market(MarketMetrics {
            volume_24h: 150_000.0,
            liquidity_usd: 60_000.0,
            price_change_24h: 3.0,
        });

    let score = tracker.scorer().score(
        &candidate.asset,
        &candidate.sources,
        &candidate.signals,
        candidate.market.as_ref(),
    );
    assert_eq!(score.technical, 100.0);
    assert_eq!(score.social, 0.0);
    assert_eq!(score.overall, 50.0);
    assert!(tracker.detect_opportunities(&[candidate], 1_000).is_empty());
}

#[test]
fn test_empty_evidence_scores_zero() {
    let score = OpportunityScorer::default().score("BONK", &[], &[], None);
    assert_eq!(score.social, 0.0);
    assert_eq!(score.technical, 0.0);
    assert_eq!(score.overall, 0.0);
}

#[test]
fn test_scores_stay_bounded() {
    let scorer = OpportunityScorer::default();
    let sources: Vec<EvidenceSource> = (0..50)
        .map(|i| EvidenceSource::new(EvidenceOrigin::Social, i, 1.0))
        .collect();
    let signals: Vec<Signal> = (0..20).map(|_| signal(SignalKind::Macd)).collect();
    let score = scorer.score(
        "BONK",
        &sources,
        &signals,
        Some(&MarketMetrics::from(&snapshot())),
    );
    assert_eq!(score.social, 100.0);
    assert_eq!(score.technical, 100.0);
    assert_eq!(score.overall, 100.0);
}

#[test]
fn test_custom_detection_threshold() {
    let tracker = OpportunityTracker::new(OpportunityScorer::new(ScoringConfig {
        detection_threshold: 40.0,
        ..Default::default()
    }));
    let candidate = AssetEvidence::new("BONK").with_signals(vec![
        signal(SignalKind::Rsi),
        signal(SignalKind::Macd),
        signal(SignalKind::Stochastic),
        signal(SignalKind::Price),
    ]);
    let found = tracker.detect_opportunities(&[candidate], 7);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "TECHNICAL_7_BONK");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_detection_for_different_assets() {
    let tracker = Arc::new(OpportunityTracker::new(OpportunityScorer::default()));
    let assets: Vec<String> = (0..16).map(|i| format!("TOKEN{}", i)).collect();

    let mut handles = Vec::new();
    for asset in assets.clone() {
        let tracker = tracker.clone();
        handles.push(tokio::spawn(async move {
            let candidate = AssetEvidence::new(asset)
                .with_sources(vec![EvidenceSource::new(EvidenceOrigin::Social, 0, 1.0)])
                .with_signals(vec![signal(SignalKind::Volume), signal(SignalKind::Price)]);
            tracker.detect_opportunities(&[candidate], 42)
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        let found = handle.await.unwrap();
        assert_eq!(found.len(), 1);
        ids.push(found[0].id.clone());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), assets.len());
    assert_eq!(tracker.active().len(), assets.len());
}

// ============================================================================
// Market analysis
// ============================================================================

#[test]
fn test_market_analysis() {
    let analysis = market::analyze(&snapshot(), &EngineConfig::default().rules, 1_000);
    assert_eq!(analysis.sentiment.trend, Sentiment::Bullish);
    assert_eq!(analysis.sentiment.buy_vs_sell, 3.0);

    let kinds: Vec<SignalKind> = analysis.signals.iter().map(|s| s.kind).collect();
    // 3M over a 1.2M hourly run-rate is +150%.
    assert_eq!(
        kinds,
        vec![SignalKind::Price, SignalKind::Volume, SignalKind::Sentiment]
    );

    let metrics = MarketMetrics::from(&analysis);
    assert_eq!(metrics, MarketMetrics::from(&snapshot()));
}

#[test]
fn test_market_without_trades() {
    let mut quiet = snapshot();
    quiet.txns_h24 = TxnCounts::default();
    quiet.volume.h1 = 0.0;
    quiet.price_change.h24 = 0.0;
    let analysis = market::analyze(&quiet, &EngineConfig::default().rules, 0);
    assert_eq!(analysis.sentiment.buy_vs_sell, 1.0);
    assert!(analysis.signals.is_empty());
}

// ============================================================================
// Social evidence
// ============================================================================

#[test]
fn test_social_evidence_feeds_scorer() {
    let config = SocialConfig::default();
    let influencer = Influencer {
        weight: 1.0,
        ..Influencer::new("whale", &config)
    };
    let posts = vec![
        SocialPost {
            url: "https://x.com/whale/status/1".to_string(),
            text: "web3 rotation is on".to_string(),
            likes: 800,
            retweets: 150,
            replies: 50,
            timestamp: 1_700_000_000,
            ..Default::default()
        },
        SocialPost {
            url: "https://x.com/whale/status/2".to_string(),
            text: "nft floor check".to_string(),
            likes: 400,
            retweets: 100,
            timestamp: 1_700_000_060,
            ..Default::default()
        },
    ];

    let evidence = collect_evidence(&influencer, &posts, &config);
    assert_eq!(evidence.len(), 2);

    // (1.0 + 0.5) / 2
    let social = OpportunityScorer::default().social_score(&evidence);
    assert!((social - 75.0).abs() < 1e-9);
}

// ============================================================================
// Pipeline
// ============================================================================

#[test]
fn test_pipeline_reads_json_lines() {
    let pipeline = Pipeline::new(EngineConfig::default(), Vec::new(), 900_000).unwrap();

    let posts: Input = serde_json::from_str(
        r#"{"type":"posts","asset":"bonk","influencer":"whale","posts":[
            {"url":"https://x.com/whale/status/9","text":"crypto season","likes":5000,"timestamp":1700000000}
        ]}"#,
    )
    .unwrap();
    assert!(pipeline.handle(posts).unwrap().is_empty());

    let bar = Input::Bar {
        bar: Bar {
            asset: "BONK".to_string(),
            timeframe: Timeframe::FifteenMinutes,
            timestamp: 1_700_000_100_000,
            open: 0.00002,
            high: 0.000021,
            low: 0.000019,
            close: 0.00002,
            volume: 1e9,
        },
        market: Some(snapshot()),
    };
    let outputs = pipeline.handle(bar).unwrap();

    let json: Vec<serde_json::Value> = outputs
        .iter()
        .map(|o| serde_json::to_value(o).unwrap())
        .collect();
    assert_eq!(json[0]["type"], "analysis");
    assert_eq!(json[1]["type"], "opportunity");
    assert_eq!(json[1]["status"], "NEW");
    assert!(matches!(outputs[1], Output::Opportunity(_)));
}
