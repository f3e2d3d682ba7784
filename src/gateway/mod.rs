//! Report fetch gateway.
//!
//! The store depends on the network only through [`InsightsGateway`]: one
//! asynchronous call per report kind, each resolving exactly once to a
//! payload or a [`GatewayError`].

pub mod rest;

use crate::error::GatewayError;
use crate::models::{
    AllTimeInsight, AnnualAndMostPopularTimeInsight, CommentsInsight, DotComFollowersInsight,
    EmailFollowersInsight, LastPostInsight, PostingStreakInsight, PublicizeInsight, Subject,
    TagsAndCategoriesInsight, TodayInsight,
};
use async_trait::async_trait;

pub use rest::{RestGateway, RestGatewayConfig};

/// Capability to fetch each insight report for a subject.
///
/// Implementations are shared between the concurrently running fetches of
/// a cycle, so every method takes `&self`.
#[async_trait]
pub trait InsightsGateway: Send + Sync + 'static {
    async fn last_post(&self, subject: &Subject) -> Result<LastPostInsight, GatewayError>;

    async fn all_time(&self, subject: &Subject) -> Result<AllTimeInsight, GatewayError>;

    async fn annual_and_most_popular_time(
        &self,
        subject: &Subject,
    ) -> Result<AnnualAndMostPopularTimeInsight, GatewayError>;

    async fn dot_com_followers(
        &self,
        subject: &Subject,
    ) -> Result<DotComFollowersInsight, GatewayError>;

    async fn email_followers(
        &self,
        subject: &Subject,
    ) -> Result<EmailFollowersInsight, GatewayError>;

    async fn publicize(&self, subject: &Subject) -> Result<PublicizeInsight, GatewayError>;

    async fn comments(&self, subject: &Subject) -> Result<CommentsInsight, GatewayError>;

    async fn today(&self, subject: &Subject) -> Result<TodayInsight, GatewayError>;

    async fn posting_streak(
        &self,
        subject: &Subject,
    ) -> Result<PostingStreakInsight, GatewayError>;

    async fn tags_and_categories(
        &self,
        subject: &Subject,
    ) -> Result<TagsAndCategoriesInsight, GatewayError>;
}
