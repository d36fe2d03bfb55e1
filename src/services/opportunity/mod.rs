//! Opportunity scoring and tracking.

pub mod scorer;
pub mod tracker;

pub use scorer::{MarketMetrics, OpportunityScorer};
pub use tracker::{AssetEvidence, OpportunityTracker};
