//! Signalforge - technical indicators, trading signals and opportunity scoring

pub mod config;
pub mod error;
pub mod services;
pub mod types;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use services::{OpportunityScorer, OpportunityTracker, Pipeline, SignalEngine};
