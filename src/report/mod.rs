//! Insights report generation.
//!
//! Turns a converged store snapshot into Markdown or JSON output.

pub mod generator;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use site_insights::{InsightsState, PostingStreakEvent, ReportKind};

pub use generator::{generate_json_report, generate_markdown_report};

/// Metadata about one fetch cycle.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub site_id: u64,
    pub timezone: String,
    pub generated_at: DateTime<Utc>,
    /// Month the posting activity is shown for.
    pub activity_date: NaiveDate,
    /// Reports that have no payload after the cycle.
    pub missing_reports: Vec<ReportKind>,
    pub duration_seconds: f64,
}

/// Everything rendered for a site.
#[derive(Debug, Clone, Serialize)]
pub struct InsightsReport {
    pub metadata: ReportMetadata,
    pub insights: InsightsState,
    pub monthly_activity: Vec<PostingStreakEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yearly_activity: Option<Vec<Vec<PostingStreakEvent>>>,
}

impl InsightsReport {
    /// Builds the report, recording which reports never arrived.
    pub fn new(
        mut metadata: ReportMetadata,
        insights: InsightsState,
        monthly_activity: Vec<PostingStreakEvent>,
        yearly_activity: Option<Vec<Vec<PostingStreakEvent>>>,
    ) -> Self {
        metadata.missing_reports = ReportKind::ALL
            .into_iter()
            .filter(|kind| !insights.has_payload(*kind))
            .collect();

        Self {
            metadata,
            insights,
            monthly_activity,
            yearly_activity,
        }
    }
}
