//! Glue between the signal engine, social evidence and the opportunity tracker.
//!
//! The binary feeds it decoded input records and prints whatever it returns.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::services::opportunity::{AssetEvidence, MarketMetrics, OpportunityScorer, OpportunityTracker};
use crate::services::signals::SignalEngine;
use crate::services::social::{collect_evidence, Influencer, SocialPost};
use crate::types::{within_window, Analysis, Bar, EvidenceSource, MarketSnapshot, Opportunity};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

/// One input record.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Input {
    /// A closed bar, optionally with the pair's market snapshot for this cycle.
    Bar {
        bar: Bar,
        #[serde(default)]
        market: Option<MarketSnapshot>,
    },
    /// A batch of posts from one influencer about one asset.
    Posts {
        asset: String,
        influencer: String,
        posts: Vec<SocialPost>,
    },
}

/// One output record.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Output {
    Analysis(Analysis),
    Opportunity(Opportunity),
    Expired(Opportunity),
}

pub struct Pipeline {
    config: EngineConfig,
    engine: SignalEngine,
    tracker: OpportunityTracker,
    influencers: DashMap<String, Influencer>,
    evidence: DashMap<String, Vec<EvidenceSource>>,
    /// Newest bar timestamp per asset.
    last_bar: DashMap<String, i64>,
    /// Newest bar timestamp of any series, `i64::MIN` before the first bar.
    clock: AtomicI64,
    retention_ms: i64,
}

impl Pipeline {
    /// `retention_ms` is how long an opportunity survives without new support.
    pub fn new(config: EngineConfig, influencers: Vec<Influencer>, retention_ms: i64) -> Result<Self> {
        let engine = SignalEngine::new(config.clone())?;
        let tracker = OpportunityTracker::new(OpportunityScorer::new(config.scoring.clone()));
        let influencers = influencers
            .into_iter()
            .map(|i| (i.handle.to_lowercase(), i))
            .collect();

        Ok(Self {
            config,
            engine,
            tracker,
            influencers,
            evidence: DashMap::new(),
            last_bar: DashMap::new(),
            clock: AtomicI64::new(i64::MIN),
            retention_ms,
        })
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    pub fn tracker(&self) -> &OpportunityTracker {
        &self.tracker
    }

    pub fn handle(&self, input: Input) -> Result<Vec<Output>> {
        match input {
            Input::Bar { bar, market } => self.on_bar(bar, market),
            Input::Posts {
                asset,
                influencer,
                posts,
            } => {
                self.on_posts(&asset, &influencer, &posts);
                Ok(Vec::new())
            }
        }
    }

    /// Buffer evidence from a batch of posts and return how many were new.
    ///
    /// A re-polled post replaces its buffered record, so updated engagement
    /// is counted once. Evidence already behind the asset's horizon is
    /// dropped.
    pub fn on_posts(&self, asset: &str, handle: &str, posts: &[SocialPost]) -> usize {
        let influencer = self
            .influencers
            .get(&handle.to_lowercase())
            .map(|i| i.clone())
            .unwrap_or_else(|| Influencer::new(handle, &self.config.social));

        let asset = asset.trim().to_uppercase();
        let horizon = self.horizon(&asset);
        let fresh = collect_evidence(&influencer, posts, &self.config.social);

        let mut buffered = self.evidence.entry(asset).or_default();
        if let Some(start) = horizon {
            buffered.retain(|s| s.timestamp >= start);
        }

        let mut added = 0;
        for source in fresh {
            if horizon.is_some_and(|start| source.timestamp < start) {
                continue;
            }
            match buffered.iter_mut().find(|s| s.is_same_record(&source)) {
                Some(existing) => *existing = source,
                None => {
                    buffered.push(source);
                    added += 1;
                }
            }
        }
        added
    }

    fn on_bar(&self, bar: Bar, market: Option<MarketSnapshot>) -> Result<Vec<Output>> {
        let now = bar.timestamp;
        let analysis = self.engine.analyze_with_market(bar, market.as_ref())?;
        let asset = analysis.asset.clone();

        self.last_bar
            .entry(asset.clone())
            .and_modify(|ts| *ts = (*ts).max(now))
            .or_insert(now);
        self.clock.fetch_max(now, Ordering::AcqRel);
        self.sweep_evidence();

        // Social evidence stays first so it names the opportunity.
        let mut sources = self.windowed_evidence(&asset, now);
        sources.extend(
            analysis
                .signals
                .iter()
                .filter_map(|signal| EvidenceSource::from_signal(signal, now)),
        );

        let mut candidate = AssetEvidence::new(asset.clone())
            .with_sources(sources)
            .with_signals(analysis.signals.clone());
        if let Some(market) = &market {
            candidate = candidate.with_market(MarketMetrics::from(market));
        }

        let mut outputs = vec![Output::Analysis(analysis)];
        outputs.extend(
            self.tracker
                .detect_opportunities(&[candidate], now)
                .into_iter()
                .map(Output::Opportunity),
        );
        outputs.extend(
            self.tracker
                .expire_asset(&asset, now, self.retention_ms)
                .map(Output::Expired),
        );
        Ok(outputs)
    }

    /// Oldest evidence timestamp still useful for `asset`. Measured from the
    /// asset's own newest bar, or from the newest bar of any series when the
    /// asset has none. None before the first bar.
    fn horizon(&self, asset: &str) -> Option<i64> {
        let clock = match self.last_bar.get(asset) {
            Some(ts) => *ts,
            None => self.clock.load(Ordering::Acquire),
        };
        if clock == i64::MIN {
            return None;
        }
        Some(clock.saturating_sub(self.config.scoring.evaluation_window_ms))
    }

    /// Drop buffered evidence behind each asset's horizon, and assets left
    /// with none.
    fn sweep_evidence(&self) {
        self.evidence.retain(|asset, sources| {
            if let Some(start) = self.horizon(asset) {
                sources.retain(|s| s.timestamp >= start);
            }
            !sources.is_empty()
        });
    }

    /// Evidence for `asset` inside the evaluation window ending at `now`.
    fn windowed_evidence(&self, asset: &str, now: i64) -> Vec<EvidenceSource> {
        let Some(buffered) = self.evidence.get(asset) else {
            return Vec::new();
        };
        let sources = within_window(&buffered, now, self.config.scoring.evaluation_window_ms);
        debug!("{} evidence sources in window for {}", sources.len(), asset);
        sources
    }

    /// Assets with buffered evidence.
    pub fn buffered_assets(&self) -> usize {
        self.evidence.len()
    }
}
