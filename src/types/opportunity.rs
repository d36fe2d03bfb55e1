use crate::types::{EvidenceSource, Signal};
use serde::{Deserialize, Serialize};

/// Composite score, every component in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OpportunityScore {
    pub social: f64,
    pub technical: f64,
    pub overall: f64,
}

/// Lifecycle state of a detected opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpportunityStatus {
    New,
    Tracking,
    Expired,
}

/// Narrative attached to an opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityAnalysis {
    pub summary: String,
    pub risks: Vec<String>,
}

/// A scored candidate setup for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub asset: String,
    /// Unix milliseconds when first detected.
    pub created_at: i64,
    pub sources: Vec<EvidenceSource>,
    pub score: OpportunityScore,
    pub signals: Vec<Signal>,
    pub analysis: OpportunityAnalysis,
    pub status: OpportunityStatus,
    /// Unix milliseconds of the last detection that supported it.
    pub last_updated: i64,
}
