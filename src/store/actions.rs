//! Events accepted by the insights store.

use crate::error::ReportFetchFailed;
use crate::models::{
    AllTimeInsight, AnnualAndMostPopularTimeInsight, CommentsInsight, DotComFollowersInsight,
    EmailFollowersInsight, LastPostInsight, PostingStreakInsight, PublicizeInsight, ReportKind,
    TagsAndCategoriesInsight, TodayInsight,
};

/// Everything that can be dispatched to [`InsightsStore`](super::InsightsStore).
#[derive(Debug, Clone)]
pub enum InsightAction {
    ReceivedLastPost(Result<LastPostInsight, ReportFetchFailed>),
    ReceivedAllTime(Result<AllTimeInsight, ReportFetchFailed>),
    ReceivedAnnualAndMostPopularTime(Result<AnnualAndMostPopularTimeInsight, ReportFetchFailed>),
    ReceivedDotComFollowers(Result<DotComFollowersInsight, ReportFetchFailed>),
    ReceivedEmailFollowers(Result<EmailFollowersInsight, ReportFetchFailed>),
    ReceivedPublicize(Result<PublicizeInsight, ReportFetchFailed>),
    ReceivedComments(Result<CommentsInsight, ReportFetchFailed>),
    ReceivedToday(Result<TodayInsight, ReportFetchFailed>),
    ReceivedPostingStreak(Result<PostingStreakInsight, ReportFetchFailed>),
    ReceivedTagsAndCategories(Result<TagsAndCategoriesInsight, ReportFetchFailed>),
    /// Explicit refresh; dropped while a cycle is outstanding.
    RefreshInsights,
    /// The set of active queries became non-empty.
    QueryActivated,
}

impl InsightAction {
    /// The report a received-report action completes, if any.
    pub fn report_kind(&self) -> Option<ReportKind> {
        match self {
            InsightAction::ReceivedLastPost(_) => Some(ReportKind::LastPost),
            InsightAction::ReceivedAllTime(_) => Some(ReportKind::AllTime),
            InsightAction::ReceivedAnnualAndMostPopularTime(_) => {
                Some(ReportKind::AnnualAndMostPopularTime)
            }
            InsightAction::ReceivedDotComFollowers(_) => Some(ReportKind::DotComFollowers),
            InsightAction::ReceivedEmailFollowers(_) => Some(ReportKind::EmailFollowers),
            InsightAction::ReceivedPublicize(_) => Some(ReportKind::Publicize),
            InsightAction::ReceivedComments(_) => Some(ReportKind::CommentsTop),
            InsightAction::ReceivedToday(_) => Some(ReportKind::TodaySnapshot),
            InsightAction::ReceivedPostingStreak(_) => Some(ReportKind::PostingStreak),
            InsightAction::ReceivedTagsAndCategories(_) => Some(ReportKind::TagsAndCategories),
            InsightAction::RefreshInsights | InsightAction::QueryActivated => None,
        }
    }

    /// A failed completion for `kind`.
    pub fn failed(kind: ReportKind, reason: impl Into<String>) -> Self {
        let err = ReportFetchFailed::new(kind, reason);
        match kind {
            ReportKind::LastPost => InsightAction::ReceivedLastPost(Err(err)),
            ReportKind::AllTime => InsightAction::ReceivedAllTime(Err(err)),
            ReportKind::AnnualAndMostPopularTime => {
                InsightAction::ReceivedAnnualAndMostPopularTime(Err(err))
            }
            ReportKind::DotComFollowers => InsightAction::ReceivedDotComFollowers(Err(err)),
            ReportKind::EmailFollowers => InsightAction::ReceivedEmailFollowers(Err(err)),
            ReportKind::Publicize => InsightAction::ReceivedPublicize(Err(err)),
            ReportKind::CommentsTop => InsightAction::ReceivedComments(Err(err)),
            ReportKind::TodaySnapshot => InsightAction::ReceivedToday(Err(err)),
            ReportKind::PostingStreak => InsightAction::ReceivedPostingStreak(Err(err)),
            ReportKind::TagsAndCategories => InsightAction::ReceivedTagsAndCategories(Err(err)),
        }
    }
}

/// Queries a consumer can register interest in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsightQuery {
    Insights,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_round_trips_kind() {
        for kind in ReportKind::ALL {
            assert_eq!(InsightAction::failed(kind, "x").report_kind(), Some(kind));
        }
    }

    #[test]
    fn test_control_actions_have_no_kind() {
        assert_eq!(InsightAction::RefreshInsights.report_kind(), None);
        assert_eq!(InsightAction::QueryActivated.report_kind(), None);
    }
}
