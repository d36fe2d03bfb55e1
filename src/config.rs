use crate::error::{EngineError, Result};
use crate::types::EvidenceOrigin;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Indicator lookback periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// RSI lookback (default: 14).
    pub rsi_period: usize,
    /// SMA lookback (default: 20).
    pub sma_period: usize,
    /// MACD fast EMA (default: 12).
    pub macd_fast: usize,
    /// MACD slow EMA (default: 26).
    pub macd_slow: usize,
    /// MACD signal-line EMA (default: 9).
    pub macd_signal: usize,
    /// Bollinger lookback (default: 20).
    pub bollinger_period: usize,
    /// Bollinger band width in standard deviations (default: 2.0).
    pub bollinger_std_dev: f64,
    /// Stochastic %K lookback (default: 14).
    pub stochastic_period: usize,
    /// Stochastic %D smoothing (default: 3).
    pub stochastic_signal_period: usize,
    /// Bars retained per series. `None` keeps the minimum every windowed
    /// indicator needs.
    pub history_cap: Option<usize>,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            sma_period: 20,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            stochastic_period: 14,
            stochastic_signal_period: 3,
            history_cap: None,
        }
    }
}

impl IndicatorConfig {
    /// Longest trailing window any windowed indicator reads.
    pub fn max_lookback(&self) -> usize {
        [
            self.rsi_period + 1,
            self.sma_period,
            self.bollinger_period,
            self.stochastic_period + self.stochastic_signal_period - 1,
            self.macd_slow + self.macd_signal,
        ]
        .into_iter()
        .max()
        .unwrap_or(1)
    }

    /// Bars kept per series.
    pub fn retained_bars(&self) -> usize {
        let minimum = self.max_lookback() + 1;
        self.history_cap.map_or(minimum, |cap| cap.max(minimum))
    }
}

/// Fixed rule thresholds for turning indicator values into signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    /// RSI above this is overbought (default: 70).
    pub rsi_overbought: f64,
    /// RSI below this is oversold (default: 30).
    pub rsi_oversold: f64,
    /// %K and %D above this are overbought (default: 80).
    pub stochastic_overbought: f64,
    /// %K and %D below this are oversold (default: 20).
    pub stochastic_oversold: f64,
    /// Absolute 24h price change, percent (default: 10).
    pub price_change_pct: f64,
    /// Absolute 24h volume change against the hourly run-rate, percent (default: 50).
    pub volume_change_pct: f64,
    /// Allowed distance of the buy/sell ratio from 1 (default: 0.3).
    pub sentiment_ratio_deviation: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            stochastic_overbought: 80.0,
            stochastic_oversold: 20.0,
            price_change_pct: 10.0,
            volume_change_pct: 50.0,
            sentiment_ratio_deviation: 0.3,
        }
    }
}

/// Per-origin weights used when fusing evidence into the social score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    pub social: f64,
    pub technical: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            social: 1.0,
            technical: 0.0,
        }
    }
}

impl FusionWeights {
    pub fn weight_for(&self, origin: EvidenceOrigin) -> f64 {
        match origin {
            EvidenceOrigin::Social => self.social,
            EvidenceOrigin::Technical => self.technical,
        }
    }
}

/// Opportunity scoring heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Technical points per signal (default: 25).
    pub points_per_signal: f64,
    /// 24h volume floor (default: 100000).
    pub volume_floor: f64,
    /// Points when 24h volume clears the floor (default: 25).
    pub volume_points: f64,
    /// USD liquidity floor (default: 50000).
    pub liquidity_floor: f64,
    /// Points when liquidity clears the floor (default: 25).
    pub liquidity_points: f64,
    /// Points for a positive 24h price change (default: 25).
    pub price_change_points: f64,
    /// Minimum overall score for an opportunity (default: 60).
    pub detection_threshold: f64,
    /// Re-detections within this many ms update the existing opportunity (default: 5 minutes).
    pub evaluation_window_ms: i64,
    pub fusion_weights: FusionWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points_per_signal: 25.0,
            volume_floor: 100_000.0,
            volume_points: 25.0,
            liquidity_floor: 50_000.0,
            liquidity_points: 25.0,
            price_change_points: 25.0,
            detection_threshold: 60.0,
            evaluation_window_ms: 300_000,
            fusion_weights: FusionWeights::default(),
        }
    }
}

/// Defaults applied to influencers that do not set their own values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    /// Influencer weight (default: 0.7).
    pub default_weight: f64,
    /// Minimum likes + retweets + replies (default: 50).
    pub default_min_engagement: u64,
    /// Topics a post must mention (default: defi, crypto, web3, nft).
    pub default_topics: Vec<String>,
    /// Engagement at which confidence saturates (default: 1000).
    pub engagement_saturation: f64,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            default_weight: 0.7,
            default_min_engagement: 50,
            default_topics: ["defi", "crypto", "web3", "nft"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            engagement_saturation: 1000.0,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub indicators: IndicatorConfig,
    pub rules: RuleThresholds,
    pub scoring: ScoringConfig,
    pub social: SocialConfig,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let d = Self::default();

        let default_topics = env::var("SOCIAL_TOPICS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|topics| !topics.is_empty())
            .unwrap_or(d.social.default_topics);

        Self {
            indicators: IndicatorConfig {
                rsi_period: env_or("SIGNAL_RSI_PERIOD", d.indicators.rsi_period),
                sma_period: env_or("SIGNAL_SMA_PERIOD", d.indicators.sma_period),
                macd_fast: env_or("SIGNAL_MACD_FAST", d.indicators.macd_fast),
                macd_slow: env_or("SIGNAL_MACD_SLOW", d.indicators.macd_slow),
                macd_signal: env_or("SIGNAL_MACD_SIGNAL", d.indicators.macd_signal),
                bollinger_period: env_or("SIGNAL_BOLLINGER_PERIOD", d.indicators.bollinger_period),
                bollinger_std_dev: env_or("SIGNAL_BOLLINGER_STD_DEV", d.indicators.bollinger_std_dev),
                stochastic_period: env_or("SIGNAL_STOCH_PERIOD", d.indicators.stochastic_period),
                stochastic_signal_period: env_or(
                    "SIGNAL_STOCH_SIGNAL_PERIOD",
                    d.indicators.stochastic_signal_period,
                ),
                history_cap: env::var("SIGNAL_HISTORY_CAP")
                    .ok()
                    .and_then(|v| v.parse().ok()),
            },
            rules: RuleThresholds {
                rsi_overbought: env_or("RULE_RSI_OVERBOUGHT", d.rules.rsi_overbought),
                rsi_oversold: env_or("RULE_RSI_OVERSOLD", d.rules.rsi_oversold),
                stochastic_overbought: env_or("RULE_STOCH_OVERBOUGHT", d.rules.stochastic_overbought),
                stochastic_oversold: env_or("RULE_STOCH_OVERSOLD", d.rules.stochastic_oversold),
                price_change_pct: env_or("RULE_PRICE_CHANGE_PCT", d.rules.price_change_pct),
                volume_change_pct: env_or("RULE_VOLUME_CHANGE_PCT", d.rules.volume_change_pct),
                sentiment_ratio_deviation: env_or(
                    "RULE_SENTIMENT_RATIO_DEVIATION",
                    d.rules.sentiment_ratio_deviation,
                ),
            },
            scoring: ScoringConfig {
                points_per_signal: env_or("SCORE_POINTS_PER_SIGNAL", d.scoring.points_per_signal),
                volume_floor: env_or("SCORE_VOLUME_FLOOR", d.scoring.volume_floor),
                volume_points: env_or("SCORE_VOLUME_POINTS", d.scoring.volume_points),
                liquidity_floor: env_or("SCORE_LIQUIDITY_FLOOR", d.scoring.liquidity_floor),
                liquidity_points: env_or("SCORE_LIQUIDITY_POINTS", d.scoring.liquidity_points),
                price_change_points: env_or("SCORE_PRICE_CHANGE_POINTS", d.scoring.price_change_points),
                detection_threshold: env_or("SIGNAL_DETECTION_THRESHOLD", d.scoring.detection_threshold),
                evaluation_window_ms: env_or("SCORE_EVALUATION_WINDOW_MS", d.scoring.evaluation_window_ms),
                fusion_weights: FusionWeights {
                    social: env_or("FUSION_WEIGHT_SOCIAL", d.scoring.fusion_weights.social),
                    technical: env_or("FUSION_WEIGHT_TECHNICAL", d.scoring.fusion_weights.technical),
                },
            },
            social: SocialConfig {
                default_weight: env_or("SOCIAL_DEFAULT_WEIGHT", d.social.default_weight),
                default_min_engagement: env_or(
                    "SOCIAL_MIN_ENGAGEMENT",
                    d.social.default_min_engagement,
                ),
                default_topics,
                engagement_saturation: env_or(
                    "SOCIAL_ENGAGEMENT_SATURATION",
                    d.social.engagement_saturation,
                ),
            },
        }
    }

    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot evaluate.
    pub fn validate(&self) -> Result<()> {
        let ind = &self.indicators;
        let periods = [
            ("rsi_period", ind.rsi_period),
            ("sma_period", ind.sma_period),
            ("macd_fast", ind.macd_fast),
            ("macd_slow", ind.macd_slow),
            ("macd_signal", ind.macd_signal),
            ("bollinger_period", ind.bollinger_period),
            ("stochastic_period", ind.stochastic_period),
            ("stochastic_signal_period", ind.stochastic_signal_period),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(EngineError::Config(format!("{} must be at least 1", name)));
            }
        }
        if ind.macd_fast >= ind.macd_slow {
            return Err(EngineError::Config(format!(
                "macd_fast ({}) must be shorter than macd_slow ({})",
                ind.macd_fast, ind.macd_slow
            )));
        }
        if !ind.bollinger_std_dev.is_finite() || ind.bollinger_std_dev < 0.0 {
            return Err(EngineError::Config(
                "bollinger_std_dev must be a non-negative number".to_string(),
            ));
        }

        let rules = &self.rules;
        if rules.rsi_oversold > rules.rsi_overbought {
            return Err(EngineError::Config(
                "rsi_oversold must not exceed rsi_overbought".to_string(),
            ));
        }
        if rules.stochastic_oversold > rules.stochastic_overbought {
            return Err(EngineError::Config(
                "stochastic_oversold must not exceed stochastic_overbought".to_string(),
            ));
        }

        let scoring = &self.scoring;
        if !(0.0..=100.0).contains(&scoring.detection_threshold) {
            return Err(EngineError::Config(format!(
                "detection_threshold ({}) must be within [0, 100]",
                scoring.detection_threshold
            )));
        }
        if scoring.volume_floor < 0.0 || scoring.liquidity_floor < 0.0 {
            return Err(EngineError::Config("floors must not be negative".to_string()));
        }
        if scoring.evaluation_window_ms < 0 {
            return Err(EngineError::Config(
                "evaluation_window_ms must not be negative".to_string(),
            ));
        }
        if scoring.fusion_weights.social < 0.0 || scoring.fusion_weights.technical < 0.0 {
            return Err(EngineError::Config(
                "fusion weights must not be negative".to_string(),
            ));
        }
        if self.social.engagement_saturation <= 0.0 {
            return Err(EngineError::Config(
                "engagement_saturation must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
