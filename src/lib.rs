//! Site Insights - concurrent aggregation of site statistics reports.
//!
//! The [`store::InsightsStore`] fans out one fetch per [`models::ReportKind`]
//! through an [`gateway::InsightsGateway`], merges each result as it lands,
//! and never runs two fetch cycles for the same site at once.

pub mod error;
pub mod gateway;
pub mod models;
pub mod store;

pub use error::{GatewayError, ReportFetchFailed};
pub use gateway::{InsightsGateway, RestGateway, RestGatewayConfig};
pub use models::{PostingStreakEvent, ReportKind, Subject};
pub use store::{InsightAction, InsightQuery, InsightsState, InsightsStore, QueryHandle};
