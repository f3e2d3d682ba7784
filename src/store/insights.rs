//! The insights aggregation store.
//!
//! Fans out one fetch per report kind, applies each completion as it
//! arrives, and refuses to start a new cycle while any report is still in
//! flight. All mutations hold the state's write lock for the duration of a
//! single event, then bump the revision seen by subscribers.

use super::actions::{InsightAction, InsightQuery};
use super::activity;
use super::state::{InsightsState, ReportSlot};
use crate::error::{GatewayError, ReportFetchFailed};
use crate::gateway::InsightsGateway;
use crate::models::{
    AllTimeInsight, AnnualAndMostPopularTimeInsight, CommentsInsight, DotComFollowersInsight,
    EmailFollowersInsight, LastPostInsight, PostingStreakEvent, PostingStreakInsight,
    PublicizeInsight, ReportKind, Subject, TagsAndCategoriesInsight, TodayInsight,
};
use chrono::NaiveDate;
use futures::future::{BoxFuture, FutureExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

struct Inner {
    subject: Subject,
    gateway: Arc<dyn InsightsGateway>,
    state: RwLock<InsightsState>,
    active_queries: AtomicUsize,
    /// Bumped after every committed transaction.
    revision: watch::Sender<u64>,
    runtime: Handle,
}

/// Aggregated insights for a single site.
///
/// Cloning is cheap; all clones share the same state.
#[derive(Clone)]
pub struct InsightsStore {
    inner: Arc<Inner>,
}

impl InsightsStore {
    /// Create a store for `subject`, spawning fetches on the current Tokio
    /// runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn new(subject: Subject, gateway: Arc<dyn InsightsGateway>) -> Self {
        Self::with_runtime(subject, gateway, Handle::current())
    }

    /// Create a store that spawns its fetches on `runtime`.
    pub fn with_runtime(
        subject: Subject,
        gateway: Arc<dyn InsightsGateway>,
        runtime: Handle,
    ) -> Self {
        let (revision, _) = watch::channel(0);

        Self {
            inner: Arc::new(Inner {
                subject,
                gateway,
                state: RwLock::new(InsightsState::default()),
                active_queries: AtomicUsize::new(0),
                revision,
                runtime,
            }),
        }
    }

    /// The site this store aggregates.
    pub fn subject(&self) -> &Subject {
        &self.inner.subject
    }

    /// Single entry point for every store event.
    pub fn dispatch(&self, action: InsightAction) {
        match action {
            InsightAction::ReceivedLastPost(outcome) => {
                self.received(ReportKind::LastPost, outcome, |s| &mut s.last_post)
            }
            InsightAction::ReceivedAllTime(outcome) => {
                self.received(ReportKind::AllTime, outcome, |s| &mut s.all_time)
            }
            InsightAction::ReceivedAnnualAndMostPopularTime(outcome) => self.received(
                ReportKind::AnnualAndMostPopularTime,
                outcome,
                |s| &mut s.annual_and_most_popular_time,
            ),
            InsightAction::ReceivedDotComFollowers(outcome) => {
                self.received(ReportKind::DotComFollowers, outcome, |s| {
                    &mut s.dot_com_followers
                })
            }
            InsightAction::ReceivedEmailFollowers(outcome) => {
                self.received(ReportKind::EmailFollowers, outcome, |s| {
                    &mut s.email_followers
                })
            }
            InsightAction::ReceivedPublicize(outcome) => {
                self.received(ReportKind::Publicize, outcome, |s| &mut s.publicize)
            }
            InsightAction::ReceivedComments(outcome) => {
                self.received(ReportKind::CommentsTop, outcome, |s| &mut s.comments)
            }
            InsightAction::ReceivedToday(outcome) => {
                self.received(ReportKind::TodaySnapshot, outcome, |s| &mut s.today)
            }
            InsightAction::ReceivedPostingStreak(outcome) => {
                self.received(ReportKind::PostingStreak, outcome, |s| {
                    &mut s.posting_streak
                })
            }
            InsightAction::ReceivedTagsAndCategories(outcome) => {
                self.received(ReportKind::TagsAndCategories, outcome, |s| {
                    &mut s.tags_and_categories
                })
            }
            InsightAction::RefreshInsights => self.refresh_insights(),
            InsightAction::QueryActivated => self.on_query_activated(),
        }
    }

    /// Called when the set of active queries becomes non-empty. Starts a
    /// fetch cycle unless one is already outstanding.
    pub fn on_query_activated(&self) {
        self.try_fetch_insights();
    }

    /// Register interest in `query`. Only the first live registration
    /// starts a fetch cycle; the returned handle unregisters on drop.
    pub fn query(&self, query: InsightQuery) -> QueryHandle {
        let previous = self.inner.active_queries.fetch_add(1, Ordering::SeqCst);
        debug!("Query {:?} registered ({} active)", query, previous + 1);

        if previous == 0 {
            self.on_query_activated();
        }

        QueryHandle {
            store: self.clone(),
            query,
        }
    }

    /// Number of live query handles.
    pub fn active_query_count(&self) -> usize {
        self.inner.active_queries.load(Ordering::SeqCst)
    }

    /// Receiver that is notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Resolves once no report is in flight.
    pub async fn wait_until_idle(&self) {
        let mut changes = self.subscribe();
        while self.is_fetching() {
            if changes.changed().await.is_err() {
                return;
            }
        }
    }

    // === Accessors ===

    pub fn get_last_post(&self) -> Option<LastPostInsight> {
        self.read(|s| s.last_post.payload.clone())
    }

    pub fn get_all_time(&self) -> Option<AllTimeInsight> {
        self.read(|s| s.all_time.payload.clone())
    }

    pub fn get_annual_and_most_popular_time(&self) -> Option<AnnualAndMostPopularTimeInsight> {
        self.read(|s| s.annual_and_most_popular_time.payload.clone())
    }

    pub fn get_dot_com_followers(&self) -> Option<DotComFollowersInsight> {
        self.read(|s| s.dot_com_followers.payload.clone())
    }

    pub fn get_email_followers(&self) -> Option<EmailFollowersInsight> {
        self.read(|s| s.email_followers.payload.clone())
    }

    pub fn get_publicize(&self) -> Option<PublicizeInsight> {
        self.read(|s| s.publicize.payload.clone())
    }

    pub fn get_top_comments(&self) -> Option<CommentsInsight> {
        self.read(|s| s.comments.payload.clone())
    }

    pub fn get_today(&self) -> Option<TodayInsight> {
        self.read(|s| s.today.payload.clone())
    }

    pub fn get_posting_activity(&self) -> Option<PostingStreakInsight> {
        self.read(|s| s.posting_streak.payload.clone())
    }

    pub fn get_top_tags_and_categories(&self) -> Option<TagsAndCategoriesInsight> {
        self.read(|s| s.tags_and_categories.payload.clone())
    }

    /// Daily post counts for every day of `date`'s month.
    pub fn get_monthly_posting_activity(&self, date: NaiveDate) -> Vec<PostingStreakEvent> {
        self.read(|s| activity::monthly_posting_activity(s.posting_streak.payload.as_ref(), date))
    }

    /// Monthly activity for the twelve months ending at `date`, oldest first.
    pub fn get_yearly_posting_activity(&self, date: NaiveDate) -> Vec<Vec<PostingStreakEvent>> {
        self.read(|s| activity::yearly_posting_activity(s.posting_streak.payload.as_ref(), date))
    }

    /// Whether any report is still in flight.
    pub fn is_fetching(&self) -> bool {
        self.read(InsightsState::is_fetching)
    }

    pub fn is_pending(&self, kind: ReportKind) -> bool {
        self.read(|s| s.is_pending(kind))
    }

    /// Consistent copy of every slot.
    pub fn snapshot(&self) -> InsightsState {
        self.read(InsightsState::clone)
    }

    // === Internals ===

    fn read<R>(&self, f: impl FnOnce(&InsightsState) -> R) -> R {
        let state = self
            .inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Apply one mutation under the write lock, then notify subscribers.
    fn transaction<R>(&self, mutate: impl FnOnce(&mut InsightsState) -> R) -> R {
        let result = {
            let mut state = self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            mutate(&mut state)
        };
        self.inner.revision.send_modify(|revision| *revision += 1);
        result
    }

    /// Like [`transaction`](Self::transaction), but subscribers are only
    /// notified when `mutate` reports a change.
    fn transaction_if_changed(&self, mutate: impl FnOnce(&mut InsightsState) -> bool) -> bool {
        let changed = {
            let mut state = self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            mutate(&mut state)
        };
        if changed {
            self.inner.revision.send_modify(|revision| *revision += 1);
        }
        changed
    }

    fn refresh_insights(&self) {
        if !self.try_fetch_insights() {
            info!(
                "Insights refresh for site {} triggered while one was in progress",
                self.inner.subject.site_id
            );
        }
    }

    /// Start a fetch cycle unless one is outstanding. Returns whether a
    /// cycle was started.
    fn try_fetch_insights(&self) -> bool {
        // Guard and mark-all-pending share one transaction so two triggers
        // can never both pass the guard.
        let started = self.transaction_if_changed(|state| {
            if state.is_fetching() {
                false
            } else {
                state.set_all_fetching();
                true
            }
        });

        if started {
            self.fetch_insights();
        }
        started
    }

    fn fetch_insights(&self) {
        let subject = &self.inner.subject;
        debug!(
            "Fetching {} insight reports for site {}",
            ReportKind::ALL.len(),
            subject.site_id
        );

        let gateway = Arc::clone(&self.inner.gateway);
        let subject = subject.clone();

        self.spawn_fetch(
            ReportKind::LastPost,
            fetch_with(&gateway, &subject, |g, s| g.last_post(s)),
            InsightAction::ReceivedLastPost,
        );
        self.spawn_fetch(
            ReportKind::AllTime,
            fetch_with(&gateway, &subject, |g, s| g.all_time(s)),
            InsightAction::ReceivedAllTime,
        );
        self.spawn_fetch(
            ReportKind::DotComFollowers,
            fetch_with(&gateway, &subject, |g, s| g.dot_com_followers(s)),
            InsightAction::ReceivedDotComFollowers,
        );
        self.spawn_fetch(
            ReportKind::EmailFollowers,
            fetch_with(&gateway, &subject, |g, s| g.email_followers(s)),
            InsightAction::ReceivedEmailFollowers,
        );
        self.spawn_fetch(
            ReportKind::Publicize,
            fetch_with(&gateway, &subject, |g, s| g.publicize(s)),
            InsightAction::ReceivedPublicize,
        );
        self.spawn_fetch(
            ReportKind::AnnualAndMostPopularTime,
            fetch_with(&gateway, &subject, |g, s| g.annual_and_most_popular_time(s)),
            InsightAction::ReceivedAnnualAndMostPopularTime,
        );
        self.spawn_fetch(
            ReportKind::TodaySnapshot,
            fetch_with(&gateway, &subject, |g, s| g.today(s)),
            InsightAction::ReceivedToday,
        );
        self.spawn_fetch(
            ReportKind::CommentsTop,
            fetch_with(&gateway, &subject, |g, s| g.comments(s)),
            InsightAction::ReceivedComments,
        );
        self.spawn_fetch(
            ReportKind::TagsAndCategories,
            fetch_with(&gateway, &subject, |g, s| g.tags_and_categories(s)),
            InsightAction::ReceivedTagsAndCategories,
        );
        self.spawn_fetch(
            ReportKind::PostingStreak,
            fetch_with(&gateway, &subject, |g, s| g.posting_streak(s)),
            InsightAction::ReceivedPostingStreak,
        );
    }

    /// Run one fetch in the background and dispatch its completion.
    fn spawn_fetch<T: Send + 'static>(
        &self,
        kind: ReportKind,
        fetch: BoxFuture<'static, Result<T, GatewayError>>,
        into_action: fn(Result<T, ReportFetchFailed>) -> InsightAction,
    ) {
        let store = self.clone();
        self.inner.runtime.spawn(async move {
            let outcome = fetch.await.map_err(|e| e.into_report_failure(kind));
            store.dispatch(into_action(outcome));
        });
    }

    fn received<T>(
        &self,
        kind: ReportKind,
        outcome: Result<T, ReportFetchFailed>,
        slot: impl FnOnce(&mut InsightsState) -> &mut ReportSlot<T>,
    ) {
        let site_id = self.inner.subject.site_id;

        match self.transaction(|state| slot(state).complete(outcome)) {
            Ok(()) => debug!("Received {} insight for site {}", kind, site_id),
            Err(err) => warn!(
                "{} for site {}: {}",
                kind.error_context(),
                site_id,
                err.reason
            ),
        }
    }
}

/// Build an owned future for one gateway call.
fn fetch_with<T, F>(
    gateway: &Arc<dyn InsightsGateway>,
    subject: &Subject,
    call: F,
) -> BoxFuture<'static, Result<T, GatewayError>>
where
    T: Send + 'static,
    F: for<'a> FnOnce(
            &'a dyn InsightsGateway,
            &'a Subject,
        ) -> BoxFuture<'a, Result<T, GatewayError>>
        + Send
        + 'static,
{
    let gateway = Arc::clone(gateway);
    let subject = subject.clone();
    async move { call(gateway.as_ref(), &subject).await }.boxed()
}

/// Keeps a query active for as long as it is alive.
pub struct QueryHandle {
    store: InsightsStore,
    query: InsightQuery,
}

impl QueryHandle {
    pub fn query(&self) -> InsightQuery {
        self.query
    }
}

impl Drop for QueryHandle {
    fn drop(&mut self) {
        let previous = self
            .store
            .inner
            .active_queries
            .fetch_sub(1, Ordering::SeqCst);
        debug!(
            "Query {:?} released ({} active)",
            self.query,
            previous.saturating_sub(1)
        );
    }
}
