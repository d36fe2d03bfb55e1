//! Converts influencer posts into evidence for the opportunity scorer.
//!
//! Polling the feed is the caller's concern. This module only decides which
//! posts count and how much each one is worth.

use crate::config::SocialConfig;
use crate::error::Result;
use crate::types::{EngagementMetrics, EvidenceOrigin, EvidencePayload, EvidenceSource};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A tracked account and the filters applied to its posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Influencer {
    pub handle: String,
    /// Multiplier on post confidence, in [0, 1].
    pub weight: f64,
    pub min_engagement: u64,
    pub topics: Vec<String>,
}

/// Influencer entry as written in configuration. Everything but the handle is optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InfluencerEntry {
    handle: Option<String>,
    weight: Option<f64>,
    min_engagement: Option<u64>,
    topics: Option<Vec<String>>,
}

impl Influencer {
    /// Influencer with the configured defaults.
    pub fn new(handle: impl Into<String>, config: &SocialConfig) -> Self {
        Self {
            handle: handle.into(),
            weight: config.default_weight,
            min_engagement: config.default_min_engagement,
            topics: config.default_topics.clone(),
        }
    }

    /// Parse a JSON array of influencer entries (the `INFLUENCERS_CONFIG` format).
    ///
    /// Entries without a handle are skipped.
    pub fn from_config_json(json: &str, config: &SocialConfig) -> Result<Vec<Influencer>> {
        let entries: Vec<InfluencerEntry> = serde_json::from_str(json)?;
        let total = entries.len();

        let influencers: Vec<Influencer> = entries
            .into_iter()
            .filter_map(|entry| {
                let handle = match entry.handle.map(|h| h.trim().to_string()) {
                    Some(h) if !h.is_empty() => h,
                    _ => {
                        warn!("Skipping influencer entry without a handle");
                        return None;
                    }
                };
                let defaults = Influencer::new(handle, config);
                Some(Influencer {
                    weight: entry.weight.unwrap_or(defaults.weight),
                    min_engagement: entry.min_engagement.unwrap_or(defaults.min_engagement),
                    topics: entry.topics.unwrap_or(defaults.topics.clone()),
                    ..defaults
                })
            })
            .collect();

        info!("Loaded {} of {} influencers", influencers.len(), total);
        Ok(influencers)
    }

    /// Whether a post mentions one of this influencer's topics.
    pub fn is_relevant(&self, post: &SocialPost) -> bool {
        let text = post.text.to_lowercase();
        let hashtags: Vec<String> = post
            .hashtags
            .iter()
            .map(|t| t.trim_start_matches('#').to_lowercase())
            .collect();

        self.topics.iter().any(|topic| {
            let topic = topic.to_lowercase();
            text.contains(&topic)
                || hashtags.contains(&topic)
                || (topic == "token" && (text.contains("coin") || text.contains("alt")))
                || (topic == "launch" && text.contains("drop"))
        })
    }

    pub fn has_min_engagement(&self, post: &SocialPost) -> bool {
        post.engagement() >= self.min_engagement
    }
}

/// A post fetched from an influencer's feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialPost {
    pub url: String,
    pub text: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub retweets: u64,
    #[serde(default)]
    pub replies: u64,
    /// Unix seconds.
    pub timestamp: i64,
}

impl SocialPost {
    pub fn engagement(&self) -> u64 {
        self.likes
            .saturating_add(self.retweets)
            .saturating_add(self.replies)
    }
}

/// Convert one post into a SOCIAL evidence record.
///
/// Confidence grows linearly with engagement up to the saturation point and
/// is scaled by the influencer's weight.
pub fn to_evidence(post: &SocialPost, influencer: &Influencer, config: &SocialConfig) -> EvidenceSource {
    let engagement = post.engagement();
    let reach = if config.engagement_saturation > 0.0 {
        (engagement as f64 / config.engagement_saturation).min(1.0)
    } else {
        1.0
    };
    let confidence = (reach * influencer.weight).clamp(0.0, 1.0);

    EvidenceSource::new(
        EvidenceOrigin::Social,
        post.timestamp.saturating_mul(1000),
        confidence,
    )
    .with_payload(EvidencePayload::Post {
        url: post.url.clone(),
        text: post.text.clone(),
        metrics: EngagementMetrics {
            engagement,
            likes: post.likes,
            retweets: post.retweets,
            replies: post.replies,
        },
    })
}

/// Evidence from the relevant, sufficiently engaged posts of one influencer.
pub fn collect_evidence(
    influencer: &Influencer,
    posts: &[SocialPost],
    config: &SocialConfig,
) -> Vec<EvidenceSource> {
    let evidence: Vec<EvidenceSource> = posts
        .iter()
        .filter(|post| influencer.is_relevant(post) && influencer.has_min_engagement(post))
        .map(|post| to_evidence(post, influencer, config))
        .collect();

    debug!(
        "Collected {} of {} posts from {}",
        evidence.len(),
        posts.len(),
        influencer.handle
    );
    evidence
}
