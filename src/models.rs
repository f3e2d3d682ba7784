//! Data models for site insights.
//!
//! This module contains the report kinds, the subject a fetch cycle runs
//! for, and the payload types each insight report resolves to.

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the ten insight reports fetched together for a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Most recently published post
    LastPost,
    /// All-time totals
    AllTime,
    /// This year's posting totals and the most popular day/hour
    AnnualAndMostPopularTime,
    /// WordPress.com followers
    DotComFollowers,
    /// Email followers
    EmailFollowers,
    /// Followers on connected social services
    Publicize,
    /// Top commenters and most commented posts
    CommentsTop,
    /// Today's numbers
    TodaySnapshot,
    /// Daily posting counts and streak lengths
    PostingStreak,
    /// Most viewed tags and categories
    TagsAndCategories,
}

impl ReportKind {
    /// Every report kind, in display order.
    pub const ALL: [ReportKind; 10] = [
        ReportKind::LastPost,
        ReportKind::AllTime,
        ReportKind::AnnualAndMostPopularTime,
        ReportKind::DotComFollowers,
        ReportKind::EmailFollowers,
        ReportKind::Publicize,
        ReportKind::CommentsTop,
        ReportKind::TodaySnapshot,
        ReportKind::PostingStreak,
        ReportKind::TagsAndCategories,
    ];

    /// Context used when a fetch for this kind fails.
    pub fn error_context(&self) -> &'static str {
        match self {
            ReportKind::LastPost => "Error fetching last post insight",
            ReportKind::AllTime => "Error fetching all time insight",
            ReportKind::AnnualAndMostPopularTime => "Error fetching most popular time",
            ReportKind::DotComFollowers => "Error fetching WP.com followers",
            ReportKind::EmailFollowers => "Error fetching email followers",
            ReportKind::Publicize => "Error fetching publicize insight",
            ReportKind::CommentsTop => "Error fetching comments insight",
            ReportKind::TodaySnapshot => "Error fetching today's insight",
            ReportKind::PostingStreak => "Error fetching posting streak insight",
            ReportKind::TagsAndCategories => "Error fetching tags and categories insight",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::LastPost => write!(f, "Last Post"),
            ReportKind::AllTime => write!(f, "All Time"),
            ReportKind::AnnualAndMostPopularTime => write!(f, "Annual & Most Popular Time"),
            ReportKind::DotComFollowers => write!(f, "WordPress.com Followers"),
            ReportKind::EmailFollowers => write!(f, "Email Followers"),
            ReportKind::Publicize => write!(f, "Publicize"),
            ReportKind::CommentsTop => write!(f, "Comments"),
            ReportKind::TodaySnapshot => write!(f, "Today"),
            ReportKind::PostingStreak => write!(f, "Posting Streak"),
            ReportKind::TagsAndCategories => write!(f, "Tags & Categories"),
        }
    }
}

/// The site all reports of a fetch cycle are requested for.
#[derive(Clone, PartialEq, Eq)]
pub struct Subject {
    /// Numeric site identifier.
    pub site_id: u64,
    /// OAuth2 bearer token.
    pub access_token: String,
    /// The site's own timezone, used to bucket posting days.
    pub timezone: Tz,
}

impl Subject {
    /// Creates a new subject.
    pub fn new(site_id: u64, access_token: impl Into<String>, timezone: Tz) -> Self {
        Self {
            site_id,
            access_token: access_token.into(),
            timezone,
        }
    }
}

// The token stays out of logs.
impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("site_id", &self.site_id)
            .field("access_token", &"<redacted>")
            .field("timezone", &self.timezone)
            .finish()
    }
}

/// The newest published post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastPostInsight {
    pub title: String,
    pub url: String,
    pub published_date: NaiveDate,
    pub likes_count: u64,
    pub comments_count: u64,
}

/// All-time totals for the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllTimeInsight {
    pub posts_count: u64,
    pub views_count: u64,
    pub visitors_count: u64,
    /// Highest single-day view count.
    pub best_views_per_day: u64,
    /// Date the best day happened on, if known.
    pub best_views_day: Option<NaiveDate>,
}

/// This year's totals and the most popular posting time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualAndMostPopularTimeInsight {
    /// Day of week, 0 = Monday.
    pub most_popular_day_of_week: u32,
    pub most_popular_day_of_week_percentage: f64,
    /// Hour of day, 0-23.
    pub most_popular_hour: u32,
    pub most_popular_hour_percentage: f64,
    pub annual_year: Option<i32>,
    pub annual_posts_count: u64,
    pub annual_words_count: u64,
    pub annual_likes_count: u64,
    pub annual_comments_count: u64,
}

/// A single follower entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Follower {
    pub name: String,
    pub avatar_url: Option<String>,
    pub subscribed_date: Option<String>,
}

/// Followers through WordPress.com accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DotComFollowersInsight {
    pub total_count: u64,
    pub top_followers: Vec<Follower>,
}

/// Followers subscribed by email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailFollowersInsight {
    pub total_count: u64,
    pub top_followers: Vec<Follower>,
}

/// Follower count on one connected service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicizeService {
    pub name: String,
    pub followers_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicizeInsight {
    pub services: Vec<PublicizeService>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub name: String,
    pub comments_count: u64,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentedPost {
    pub title: String,
    pub url: String,
    pub comments_count: u64,
}

/// Top commenters and most commented posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentsInsight {
    pub top_authors: Vec<CommentAuthor>,
    pub top_posts: Vec<CommentedPost>,
}

/// Today's numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodayInsight {
    pub views_count: u64,
    pub visitors_count: u64,
    pub likes_count: u64,
    pub comments_count: u64,
}

/// Number of posts published on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingStreakEvent {
    pub date: NaiveDate,
    pub post_count: u32,
}

impl PostingStreakEvent {
    pub fn new(date: NaiveDate, post_count: u32) -> Self {
        Self { date, post_count }
    }
}

/// Streak lengths and the sparse per-day posting history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingStreakInsight {
    pub current_streak_length: u32,
    pub longest_streak_length: u32,
    /// Only days with at least one post; not guaranteed to be sorted.
    pub posting_events: Vec<PostingStreakEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermKind {
    Tag,
    Category,
    Other,
}

impl From<&str> for TermKind {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "tag" => TermKind::Tag,
            "category" => TermKind::Category,
            _ => TermKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagAndCategory {
    pub name: String,
    pub kind: TermKind,
    pub url: Option<String>,
    pub views_count: u64,
}

/// Most viewed tags and categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagsAndCategoriesInsight {
    pub top_terms: Vec<TagAndCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_kinds_are_distinct() {
        let unique: HashSet<ReportKind> = ReportKind::ALL.iter().copied().collect();
        assert_eq!(unique.len(), 10);
    }

    #[test]
    fn test_error_context_is_distinct_per_kind() {
        let contexts: HashSet<&str> = ReportKind::ALL.iter().map(|k| k.error_context()).collect();
        assert_eq!(contexts.len(), ReportKind::ALL.len());
        assert_ne!(
            ReportKind::PostingStreak.error_context(),
            ReportKind::TagsAndCategories.error_context()
        );
    }

    #[test]
    fn test_term_kind_from_str() {
        assert_eq!(TermKind::from("tag"), TermKind::Tag);
        assert_eq!(TermKind::from("Category"), TermKind::Category);
        assert_eq!(TermKind::from("format"), TermKind::Other);
    }

    #[test]
    fn test_subject_debug_redacts_token() {
        let subject = Subject::new(42, "secret-token", chrono_tz::Europe::Paris);
        let printed = format!("{:?}", subject);
        assert!(printed.contains("42"));
        assert!(!printed.contains("secret-token"));
    }
}
