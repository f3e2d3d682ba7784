//! Aggregated insight state.
//!
//! One [`ReportSlot`] per report kind. Slots are only mutated through the
//! store's transactions.

use crate::models::{
    AllTimeInsight, AnnualAndMostPopularTimeInsight, CommentsInsight, DotComFollowersInsight,
    EmailFollowersInsight, LastPostInsight, PostingStreakInsight, PublicizeInsight, ReportKind,
    TagsAndCategoriesInsight, TodayInsight,
};
use serde::Serialize;

/// Latest payload for one report plus its in-flight flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSlot<T> {
    /// Most recent successfully received value.
    pub payload: Option<T>,
    /// A fetch for this report has been issued and not yet applied.
    pub pending: bool,
}

impl<T> Default for ReportSlot<T> {
    fn default() -> Self {
        Self {
            payload: None,
            pending: false,
        }
    }
}

impl<T> ReportSlot<T> {
    fn begin(&mut self) {
        self.pending = true;
    }

    /// Apply one completion. A failure keeps the previous payload.
    pub(crate) fn complete<E>(&mut self, outcome: Result<T, E>) -> Result<(), E> {
        self.pending = false;
        let payload = outcome?;
        self.payload = Some(payload);
        Ok(())
    }
}

/// All ten report slots for a site.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InsightsState {
    pub last_post: ReportSlot<LastPostInsight>,
    pub all_time: ReportSlot<AllTimeInsight>,
    pub annual_and_most_popular_time: ReportSlot<AnnualAndMostPopularTimeInsight>,
    pub dot_com_followers: ReportSlot<DotComFollowersInsight>,
    pub email_followers: ReportSlot<EmailFollowersInsight>,
    pub publicize: ReportSlot<PublicizeInsight>,
    pub comments: ReportSlot<CommentsInsight>,
    pub today: ReportSlot<TodayInsight>,
    pub posting_streak: ReportSlot<PostingStreakInsight>,
    pub tags_and_categories: ReportSlot<TagsAndCategoriesInsight>,
}

impl InsightsState {
    /// Whether a fetch for `kind` is outstanding.
    pub fn is_pending(&self, kind: ReportKind) -> bool {
        match kind {
            ReportKind::LastPost => self.last_post.pending,
            ReportKind::AllTime => self.all_time.pending,
            ReportKind::AnnualAndMostPopularTime => self.annual_and_most_popular_time.pending,
            ReportKind::DotComFollowers => self.dot_com_followers.pending,
            ReportKind::EmailFollowers => self.email_followers.pending,
            ReportKind::Publicize => self.publicize.pending,
            ReportKind::CommentsTop => self.comments.pending,
            ReportKind::TodaySnapshot => self.today.pending,
            ReportKind::PostingStreak => self.posting_streak.pending,
            ReportKind::TagsAndCategories => self.tags_and_categories.pending,
        }
    }

    /// Whether a payload has ever been received for `kind`.
    pub fn has_payload(&self, kind: ReportKind) -> bool {
        match kind {
            ReportKind::LastPost => self.last_post.payload.is_some(),
            ReportKind::AllTime => self.all_time.payload.is_some(),
            ReportKind::AnnualAndMostPopularTime => {
                self.annual_and_most_popular_time.payload.is_some()
            }
            ReportKind::DotComFollowers => self.dot_com_followers.payload.is_some(),
            ReportKind::EmailFollowers => self.email_followers.payload.is_some(),
            ReportKind::Publicize => self.publicize.payload.is_some(),
            ReportKind::CommentsTop => self.comments.payload.is_some(),
            ReportKind::TodaySnapshot => self.today.payload.is_some(),
            ReportKind::PostingStreak => self.posting_streak.payload.is_some(),
            ReportKind::TagsAndCategories => self.tags_and_categories.payload.is_some(),
        }
    }

    /// Logical OR over every slot's pending flag.
    pub fn is_fetching(&self) -> bool {
        ReportKind::ALL.iter().any(|kind| self.is_pending(*kind))
    }

    /// Number of reports still in flight.
    pub fn pending_count(&self) -> usize {
        ReportKind::ALL
            .iter()
            .filter(|kind| self.is_pending(**kind))
            .count()
    }

    pub(crate) fn set_all_fetching(&mut self) {
        self.last_post.begin();
        self.all_time.begin();
        self.annual_and_most_popular_time.begin();
        self.dot_com_followers.begin();
        self.email_followers.begin();
        self.publicize.begin();
        self.comments.begin();
        self.today.begin();
        self.posting_streak.begin();
        self.tags_and_categories.begin();
    }
}
