//! WordPress.com REST stats gateway.
//!
//! Each report maps to one GET request against the v1.1 REST API. Response
//! bodies are decoded by pure functions so they can be tested without a
//! server.

use crate::error::GatewayError;
use crate::gateway::InsightsGateway;
use crate::models::{
    AllTimeInsight, AnnualAndMostPopularTimeInsight, CommentAuthor, CommentedPost,
    CommentsInsight, DotComFollowersInsight, EmailFollowersInsight, Follower, LastPostInsight,
    PostingStreakEvent, PostingStreakInsight, PublicizeInsight, PublicizeService, Subject,
    TagAndCategory, TagsAndCategoriesInsight, TermKind, TodayInsight,
};
use async_trait::async_trait;
use chrono::{DateTime, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Number of entries requested for "top N" lists.
const TOP_ITEMS: usize = 7;

/// Settings for the REST gateway.
#[derive(Debug, Clone)]
pub struct RestGatewayConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for RestGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://public-api.wordpress.com/rest/v1.1".to_string(),
            timeout_seconds: 30,
            user_agent: format!("site-insights/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Gateway backed by the WordPress.com REST API.
pub struct RestGateway {
    config: RestGatewayConfig,
    http_client: reqwest::Client,
}

impl RestGateway {
    /// Create a gateway with its own HTTP client.
    pub fn new(config: RestGatewayConfig) -> Result<Self, GatewayError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(GatewayError::Invalid(format!(
                "base URL must start with 'http://' or 'https://': {}",
                config.base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn site_url(&self, subject: &Subject, path: &str) -> String {
        format!(
            "{}/sites/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            subject.site_id,
            path
        )
    }

    /// Issue a GET and return the JSON body.
    async fn get_json(
        &self,
        subject: &Subject,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, GatewayError> {
        let url = self.site_url(subject, path);
        debug!("GET {} for site {}", path, subject.site_id);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&subject.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    GatewayError::Connect(self.config.base_url.clone())
                } else {
                    GatewayError::Request(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status { status, body });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl InsightsGateway for RestGateway {
    async fn last_post(&self, subject: &Subject) -> Result<LastPostInsight, GatewayError> {
        let query = [
            ("number", "1".to_string()),
            ("order_by", "date".to_string()),
            ("type", "post".to_string()),
            ("status", "publish".to_string()),
            ("fields", "ID,title,URL,date,like_count,discussion".to_string()),
        ];
        let body = self.get_json(subject, "posts", &query).await?;
        decode_last_post(body, subject.timezone)
    }

    async fn all_time(&self, subject: &Subject) -> Result<AllTimeInsight, GatewayError> {
        let body = self.get_json(subject, "stats", &[]).await?;
        decode_all_time(body)
    }

    async fn annual_and_most_popular_time(
        &self,
        subject: &Subject,
    ) -> Result<AnnualAndMostPopularTimeInsight, GatewayError> {
        let body = self.get_json(subject, "stats/insights", &[]).await?;
        decode_annual_and_most_popular_time(body)
    }

    async fn dot_com_followers(
        &self,
        subject: &Subject,
    ) -> Result<DotComFollowersInsight, GatewayError> {
        let query = [("type", "wpcom".to_string()), ("max", TOP_ITEMS.to_string())];
        let body = self.get_json(subject, "stats/followers", &query).await?;
        decode_dot_com_followers(body)
    }

    async fn email_followers(
        &self,
        subject: &Subject,
    ) -> Result<EmailFollowersInsight, GatewayError> {
        let query = [("type", "email".to_string()), ("max", TOP_ITEMS.to_string())];
        let body = self.get_json(subject, "stats/followers", &query).await?;
        decode_email_followers(body)
    }

    async fn publicize(&self, subject: &Subject) -> Result<PublicizeInsight, GatewayError> {
        let body = self.get_json(subject, "stats/publicize", &[]).await?;
        decode_publicize(body)
    }

    async fn comments(&self, subject: &Subject) -> Result<CommentsInsight, GatewayError> {
        let query = [("max", TOP_ITEMS.to_string())];
        let body = self.get_json(subject, "stats/comments", &query).await?;
        decode_comments(body)
    }

    async fn today(&self, subject: &Subject) -> Result<TodayInsight, GatewayError> {
        let body = self.get_json(subject, "stats/summary", &[]).await?;
        decode_today(body)
    }

    async fn posting_streak(
        &self,
        subject: &Subject,
    ) -> Result<PostingStreakInsight, GatewayError> {
        let (start, end) = streak_window(Utc::now(), subject.timezone);
        let query = [
            ("startDate", start.format("%Y-%m-%d").to_string()),
            ("endDate", end.format("%Y-%m-%d").to_string()),
            ("max", "3000".to_string()),
        ];
        let body = self.get_json(subject, "stats/streak", &query).await?;
        decode_posting_streak(body, subject.timezone)
    }

    async fn tags_and_categories(
        &self,
        subject: &Subject,
    ) -> Result<TagsAndCategoriesInsight, GatewayError> {
        let query = [("max", TOP_ITEMS.to_string())];
        let body = self.get_json(subject, "stats/tags", &query).await?;
        decode_tags_and_categories(body)
    }
}

/// The twelve months ending today in the site's timezone.
fn streak_window(now: DateTime<Utc>, timezone: Tz) -> (NaiveDate, NaiveDate) {
    let today = now.with_timezone(&timezone).date_naive();
    let start = today.checked_sub_months(Months::new(12)).unwrap_or(today);
    (start, today)
}

// === Decoding ===

fn decode<T: DeserializeOwned>(endpoint: &'static str, body: Value) -> Result<T, GatewayError> {
    serde_json::from_value(body).map_err(|source| GatewayError::Decode { endpoint, source })
}

/// Counts arrive as numbers, numeric strings, or null depending on endpoint.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Integer(u64),
    Float(f64),
    Text(String),
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<LenientNumber>::deserialize(deserializer)? {
        Some(LenientNumber::Integer(n)) => n,
        Some(LenientNumber::Float(f)) if f.is_finite() && f >= 0.0 => f as u64,
        Some(LenientNumber::Text(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

#[derive(Deserialize)]
struct PostsWire {
    #[serde(default)]
    posts: Vec<PostWire>,
}

#[derive(Deserialize)]
struct PostWire {
    #[serde(default)]
    title: String,
    #[serde(rename = "URL", default)]
    url: String,
    date: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    like_count: u64,
    #[serde(default)]
    discussion: Option<DiscussionWire>,
}

#[derive(Deserialize)]
struct DiscussionWire {
    #[serde(default, deserialize_with = "lenient_u64")]
    comment_count: u64,
}

pub(crate) fn decode_last_post(body: Value, timezone: Tz) -> Result<LastPostInsight, GatewayError> {
    let wire: PostsWire = decode("posts", body)?;
    let post = wire
        .posts
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::Invalid("site has no published posts".to_string()))?;

    let published = DateTime::parse_from_rfc3339(&post.date)
        .map_err(|e| GatewayError::Invalid(format!("bad post date '{}': {}", post.date, e)))?;

    Ok(LastPostInsight {
        title: post.title,
        url: post.url,
        published_date: published.with_timezone(&timezone).date_naive(),
        likes_count: post.like_count,
        comments_count: post.discussion.map(|d| d.comment_count).unwrap_or(0),
    })
}

#[derive(Deserialize)]
struct AllTimeWire {
    stats: AllTimeStatsWire,
}

#[derive(Deserialize)]
struct AllTimeStatsWire {
    #[serde(default, deserialize_with = "lenient_u64")]
    posts: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    views: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    visitors: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    views_best_day_total: u64,
    #[serde(default)]
    views_best_day: Option<String>,
}

pub(crate) fn decode_all_time(body: Value) -> Result<AllTimeInsight, GatewayError> {
    let wire: AllTimeWire = decode("stats", body)?;
    let stats = wire.stats;

    Ok(AllTimeInsight {
        posts_count: stats.posts,
        views_count: stats.views,
        visitors_count: stats.visitors,
        best_views_per_day: stats.views_best_day_total,
        best_views_day: stats
            .views_best_day
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
    })
}

#[derive(Deserialize)]
struct InsightsWire {
    #[serde(default, deserialize_with = "lenient_u64")]
    highest_day_of_week: u64,
    #[serde(default)]
    highest_day_percent: f64,
    #[serde(default, deserialize_with = "lenient_u64")]
    highest_hour: u64,
    #[serde(default)]
    highest_hour_percent: f64,
    #[serde(default)]
    years: Vec<YearWire>,
}

#[derive(Deserialize)]
struct YearWire {
    #[serde(deserialize_with = "lenient_u64")]
    year: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    total_posts: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    total_words: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    total_likes: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    total_comments: u64,
}

pub(crate) fn decode_annual_and_most_popular_time(
    body: Value,
) -> Result<AnnualAndMostPopularTimeInsight, GatewayError> {
    let wire: InsightsWire = decode("stats/insights", body)?;
    let latest = wire.years.iter().max_by_key(|y| y.year);

    Ok(AnnualAndMostPopularTimeInsight {
        most_popular_day_of_week: wire.highest_day_of_week.min(6) as u32,
        most_popular_day_of_week_percentage: wire.highest_day_percent,
        most_popular_hour: wire.highest_hour.min(23) as u32,
        most_popular_hour_percentage: wire.highest_hour_percent,
        annual_year: latest.and_then(|y| i32::try_from(y.year).ok()),
        annual_posts_count: latest.map(|y| y.total_posts).unwrap_or(0),
        annual_words_count: latest.map(|y| y.total_words).unwrap_or(0),
        annual_likes_count: latest.map(|y| y.total_likes).unwrap_or(0),
        annual_comments_count: latest.map(|y| y.total_comments).unwrap_or(0),
    })
}

#[derive(Deserialize)]
struct FollowersWire {
    #[serde(default, deserialize_with = "lenient_u64")]
    total_wpcom: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    total_email: u64,
    #[serde(default)]
    subscribers: Vec<SubscriberWire>,
}

#[derive(Deserialize)]
struct SubscriberWire {
    #[serde(default)]
    label: String,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    date_subscribed: Option<String>,
}

impl From<SubscriberWire> for Follower {
    fn from(wire: SubscriberWire) -> Self {
        Self {
            name: wire.label,
            avatar_url: wire.avatar,
            subscribed_date: wire.date_subscribed,
        }
    }
}

pub(crate) fn decode_dot_com_followers(body: Value) -> Result<DotComFollowersInsight, GatewayError> {
    let wire: FollowersWire = decode("stats/followers", body)?;
    Ok(DotComFollowersInsight {
        total_count: wire.total_wpcom,
        top_followers: wire.subscribers.into_iter().map(Follower::from).collect(),
    })
}

pub(crate) fn decode_email_followers(body: Value) -> Result<EmailFollowersInsight, GatewayError> {
    let wire: FollowersWire = decode("stats/followers", body)?;
    Ok(EmailFollowersInsight {
        total_count: wire.total_email,
        top_followers: wire.subscribers.into_iter().map(Follower::from).collect(),
    })
}

#[derive(Deserialize)]
struct PublicizeWire {
    #[serde(default)]
    services: Vec<ServiceWire>,
}

#[derive(Deserialize)]
struct ServiceWire {
    service: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    followers: u64,
}

pub(crate) fn decode_publicize(body: Value) -> Result<PublicizeInsight, GatewayError> {
    let wire: PublicizeWire = decode("stats/publicize", body)?;
    let mut services: Vec<PublicizeService> = wire
        .services
        .into_iter()
        .map(|s| PublicizeService {
            name: s.service,
            followers_count: s.followers,
        })
        .collect();
    services.sort_by_key(|s| std::cmp::Reverse(s.followers_count));

    Ok(PublicizeInsight { services })
}

#[derive(Deserialize)]
struct CommentsWire {
    #[serde(default)]
    authors: Vec<CommentAuthorWire>,
    #[serde(default)]
    posts: Vec<CommentedPostWire>,
}

#[derive(Deserialize)]
struct CommentAuthorWire {
    name: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    comments: u64,
    #[serde(default)]
    gravatar: Option<String>,
}

#[derive(Deserialize)]
struct CommentedPostWire {
    name: String,
    #[serde(default)]
    link: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    comments: u64,
}

pub(crate) fn decode_comments(body: Value) -> Result<CommentsInsight, GatewayError> {
    let wire: CommentsWire = decode("stats/comments", body)?;
    Ok(CommentsInsight {
        top_authors: wire
            .authors
            .into_iter()
            .map(|a| CommentAuthor {
                name: a.name,
                comments_count: a.comments,
                avatar_url: a.gravatar,
            })
            .collect(),
        top_posts: wire
            .posts
            .into_iter()
            .map(|p| CommentedPost {
                title: p.name,
                url: p.link,
                comments_count: p.comments,
            })
            .collect(),
    })
}

#[derive(Deserialize)]
struct SummaryWire {
    #[serde(default, deserialize_with = "lenient_u64")]
    views: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    visitors: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    likes: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    comments: u64,
}

pub(crate) fn decode_today(body: Value) -> Result<TodayInsight, GatewayError> {
    let wire: SummaryWire = decode("stats/summary", body)?;
    Ok(TodayInsight {
        views_count: wire.views,
        visitors_count: wire.visitors,
        likes_count: wire.likes,
        comments_count: wire.comments,
    })
}

#[derive(Deserialize)]
struct StreakWire {
    #[serde(default)]
    streak: StreakLengthsWire,
    /// Unix timestamp (seconds, as a string key) to post count.
    #[serde(default)]
    data: BTreeMap<String, Value>,
}

#[derive(Deserialize, Default)]
struct StreakLengthsWire {
    #[serde(default)]
    long: StreakLengthWire,
    #[serde(default)]
    current: StreakLengthWire,
}

#[derive(Deserialize, Default)]
struct StreakLengthWire {
    #[serde(default, deserialize_with = "lenient_u64")]
    length: u64,
}

pub(crate) fn decode_posting_streak(
    body: Value,
    timezone: Tz,
) -> Result<PostingStreakInsight, GatewayError> {
    let wire: StreakWire = decode("stats/streak", body)?;

    // Several posts on one local day arrive under different timestamps.
    let mut per_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for (key, count) in &wire.data {
        let Ok(timestamp) = key.parse::<i64>() else {
            debug!("Skipping non-numeric streak key: {}", key);
            continue;
        };
        let Some(instant) = DateTime::from_timestamp(timestamp, 0) else {
            continue;
        };
        let posts = count
            .as_u64()
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(1);
        let day = instant.with_timezone(&timezone).date_naive();
        let total = per_day.entry(day).or_default();
        *total = total.saturating_add(posts);
    }

    Ok(PostingStreakInsight {
        current_streak_length: wire.streak.current.length as u32,
        longest_streak_length: wire.streak.long.length as u32,
        posting_events: per_day
            .into_iter()
            .map(|(date, post_count)| PostingStreakEvent::new(date, post_count))
            .collect(),
    })
}

#[derive(Deserialize)]
struct TagsWire {
    #[serde(default)]
    tags: Vec<TagGroupWire>,
}

#[derive(Deserialize)]
struct TagGroupWire {
    #[serde(default)]
    tags: Vec<TermWire>,
    #[serde(default, deserialize_with = "lenient_u64")]
    views: u64,
}

#[derive(Deserialize)]
struct TermWire {
    #[serde(rename = "type", default)]
    term_type: String,
    name: String,
    #[serde(default)]
    link: Option<String>,
}

pub(crate) fn decode_tags_and_categories(
    body: Value,
) -> Result<TagsAndCategoriesInsight, GatewayError> {
    let wire: TagsWire = decode("stats/tags", body)?;

    let top_terms = wire
        .tags
        .into_iter()
        .filter(|group| !group.tags.is_empty())
        .map(|group| {
            // Grouped terms share one view count; present them as one entry.
            let kind = TermKind::from(group.tags[0].term_type.as_str());
            let url = if group.tags.len() == 1 {
                group.tags[0].link.clone()
            } else {
                None
            };
            let name = group
                .tags
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");

            TagAndCategory {
                name,
                kind,
                url,
                views_count: group.views,
            }
        })
        .collect();

    Ok(TagsAndCategoriesInsight { top_terms })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_rest_gateway_rejects_bad_base_url() {
        let config = RestGatewayConfig {
            base_url: "ftp://example.com".to_string(),
            ..RestGatewayConfig::default()
        };
        assert!(matches!(
            RestGateway::new(config),
            Err(GatewayError::Invalid(_))
        ));
    }

    #[test]
    fn test_site_url() {
        let gateway = RestGateway::new(RestGatewayConfig {
            base_url: "https://api.example.com/rest/v1.1/".to_string(),
            ..RestGatewayConfig::default()
        })
        .unwrap();
        let subject = Subject::new(123, "token", chrono_tz::UTC);
        assert_eq!(
            gateway.site_url(&subject, "stats/streak"),
            "https://api.example.com/rest/v1.1/sites/123/stats/streak"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_instead_of_hanging() {
        let gateway = RestGateway::new(RestGatewayConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2,
            ..RestGatewayConfig::default()
        })
        .unwrap();
        let subject = Subject::new(1, "token", chrono_tz::UTC);

        tokio_test::assert_err!(gateway.today(&subject).await);
    }

    #[test]
    fn test_streak_window_uses_site_timezone() {
        // 2019-03-01 02:00 UTC is still February 28th in Los Angeles.
        let now = Utc.with_ymd_and_hms(2019, 3, 1, 2, 0, 0).unwrap();
        let (start, end) = streak_window(now, chrono_tz::America::Los_Angeles);
        assert_eq!(end, NaiveDate::from_ymd_opt(2019, 2, 28).unwrap());
        assert_eq!(start, NaiveDate::from_ymd_opt(2018, 2, 28).unwrap());
    }

    #[test]
    fn test_decode_last_post() {
        let body = json!({
            "found": 12,
            "posts": [{
                "ID": 99,
                "title": "Hello",
                "URL": "https://example.blog/hello",
                "date": "2019-01-10T23:30:00+00:00",
                "like_count": 4,
                "discussion": { "comment_count": "2" }
            }]
        });
        let post = decode_last_post(body, chrono_tz::Asia::Tokyo).unwrap();
        assert_eq!(post.title, "Hello");
        assert_eq!(post.likes_count, 4);
        assert_eq!(post.comments_count, 2);
        // Already the 11th in Tokyo.
        assert_eq!(post.published_date, NaiveDate::from_ymd_opt(2019, 1, 11).unwrap());
    }

    #[test]
    fn test_decode_last_post_without_posts() {
        let result = decode_last_post(json!({ "found": 0, "posts": [] }), chrono_tz::UTC);
        assert!(matches!(result, Err(GatewayError::Invalid(_))));
    }

    #[test]
    fn test_decode_all_time() {
        let body = json!({
            "stats": {
                "posts": 10,
                "views": "1500",
                "visitors": 700,
                "views_best_day": "2018-06-01",
                "views_best_day_total": 90
            }
        });
        let all_time = decode_all_time(body).unwrap();
        assert_eq!(all_time.posts_count, 10);
        assert_eq!(all_time.views_count, 1500);
        assert_eq!(all_time.best_views_per_day, 90);
        assert_eq!(
            all_time.best_views_day,
            NaiveDate::from_ymd_opt(2018, 6, 1)
        );
    }

    #[test]
    fn test_decode_all_time_rejects_missing_stats() {
        let result = decode_all_time(json!({ "date": "2019-01-01" }));
        assert!(matches!(
            result,
            Err(GatewayError::Decode { endpoint: "stats", .. })
        ));
    }

    #[test]
    fn test_decode_annual_picks_latest_year() {
        let body = json!({
            "highest_day_of_week": 2,
            "highest_day_percent": 31.5,
            "highest_hour": 14,
            "highest_hour_percent": 12.0,
            "years": [
                { "year": "2018", "total_posts": 40, "total_words": 9000 },
                { "year": "2019", "total_posts": 3, "total_words": 800, "total_likes": 5 }
            ]
        });
        let annual = decode_annual_and_most_popular_time(body).unwrap();
        assert_eq!(annual.most_popular_day_of_week, 2);
        assert_eq!(annual.most_popular_hour, 14);
        assert_eq!(annual.annual_year, Some(2019));
        assert_eq!(annual.annual_posts_count, 3);
        assert_eq!(annual.annual_likes_count, 5);
    }

    #[test]
    fn test_decode_followers_by_type() {
        let body = json!({
            "total_wpcom": 12,
            "total_email": 3,
            "subscribers": [{ "label": "alice", "avatar": null, "date_subscribed": "2019-01-01T00:00:00+00:00" }]
        });
        let dot_com = decode_dot_com_followers(body.clone()).unwrap();
        let email = decode_email_followers(body).unwrap();
        assert_eq!(dot_com.total_count, 12);
        assert_eq!(email.total_count, 3);
        assert_eq!(dot_com.top_followers[0].name, "alice");
    }

    #[test]
    fn test_decode_publicize_sorted_by_followers() {
        let body = json!({
            "services": [
                { "service": "twitter", "followers": 10 },
                { "service": "facebook", "followers": 25 }
            ]
        });
        let publicize = decode_publicize(body).unwrap();
        assert_eq!(publicize.services[0].name, "facebook");
        assert_eq!(publicize.services[1].followers_count, 10);
    }

    #[test]
    fn test_decode_comments() {
        let body = json!({
            "authors": [{ "name": "bob", "comments": "7", "gravatar": "https://g/bob" }],
            "posts": [{ "name": "A post", "link": "https://example.blog/a", "comments": 4 }]
        });
        let comments = decode_comments(body).unwrap();
        assert_eq!(comments.top_authors[0].comments_count, 7);
        assert_eq!(comments.top_posts[0].title, "A post");
    }

    #[test]
    fn test_decode_today() {
        let body = json!({ "views": 10, "visitors": 5, "likes": null, "comments": 1 });
        let today = decode_today(body).unwrap();
        assert_eq!(today.views_count, 10);
        assert_eq!(today.likes_count, 0);
    }

    #[test]
    fn test_decode_posting_streak_buckets_by_local_day() {
        // 1546300800 = 2019-01-01T00:00:00Z, 1546318800 = 2019-01-01T05:00:00Z
        let body = json!({
            "streak": { "long": { "length": 4 }, "current": { "length": 1 } },
            "data": { "1546300800": 1, "1546318800": 2, "garbage": 9 }
        });
        let streak = decode_posting_streak(body, chrono_tz::America::New_York).unwrap();
        assert_eq!(streak.longest_streak_length, 4);
        assert_eq!(streak.current_streak_length, 1);
        // New York is UTC-5: midnight UTC is Dec 31st, 05:00 UTC is Jan 1st.
        assert_eq!(
            streak.posting_events,
            vec![
                PostingStreakEvent::new(NaiveDate::from_ymd_opt(2018, 12, 31).unwrap(), 1),
                PostingStreakEvent::new(NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(), 2),
            ]
        );
    }

    #[test]
    fn test_decode_posting_streak_merges_same_day() {
        let body = json!({ "data": { "1546300800": 1, "1546304400": 1 } });
        let streak = decode_posting_streak(body, chrono_tz::UTC).unwrap();
        assert_eq!(streak.posting_events.len(), 1);
        assert_eq!(streak.posting_events[0].post_count, 2);
    }

    #[test]
    fn test_decode_posting_streak_saturates_large_counts() {
        let body = json!({ "data": { "1546300800": 4294967295u64, "1546304400": 5000000000u64 } });
        let streak = decode_posting_streak(body, chrono_tz::UTC).unwrap();
        assert_eq!(streak.posting_events.len(), 1);
        assert_eq!(streak.posting_events[0].post_count, u32::MAX);
    }

    #[test]
    fn test_decode_tags_and_categories() {
        let body = json!({
            "tags": [
                { "tags": [{ "type": "category", "name": "News", "link": "https://example.blog/news" }], "views": 40 },
                { "tags": [{ "type": "tag", "name": "rust" }, { "type": "tag", "name": "async" }], "views": 12 },
                { "tags": [], "views": 1 }
            ]
        });
        let tags = decode_tags_and_categories(body).unwrap();
        assert_eq!(tags.top_terms.len(), 2);
        assert_eq!(tags.top_terms[0].kind, TermKind::Category);
        assert_eq!(tags.top_terms[0].url.as_deref(), Some("https://example.blog/news"));
        assert_eq!(tags.top_terms[1].name, "rust, async");
        assert!(tags.top_terms[1].url.is_none());
    }
}
