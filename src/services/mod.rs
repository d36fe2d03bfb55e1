pub mod market;
pub mod opportunity;
pub mod pipeline;
pub mod signals;
pub mod social;

pub use opportunity::{AssetEvidence, MarketMetrics, OpportunityScorer, OpportunityTracker};
pub use pipeline::Pipeline;
pub use signals::SignalEngine;
pub use social::{Influencer, SocialPost};
