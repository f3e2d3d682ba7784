//! Insights aggregation store.
//!
//! This module provides the concurrent store that fetches and merges the
//! ten insight reports for a site.

pub mod actions;
pub mod activity;
pub mod insights;
pub mod state;

pub use actions::{InsightAction, InsightQuery};
pub use insights::{InsightsStore, QueryHandle};
pub use state::{InsightsState, ReportSlot};
