//! Markdown and JSON report generation.
//!
//! This module renders every insight section from a store snapshot.
//! Reports that were never received render as unavailable.

use super::{InsightsReport, ReportMetadata};
use anyhow::Result;
use chrono::Datelike;
use site_insights::models::{
    AllTimeInsight, AnnualAndMostPopularTimeInsight, CommentsInsight, LastPostInsight,
    PostingStreakInsight, TagsAndCategoriesInsight, TermKind, TodayInsight,
};
use site_insights::store::activity::days_in_month;
use site_insights::{InsightsState, PostingStreakEvent};

const UNAVAILABLE: &str = "_Unavailable._\n\n";

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &InsightsReport) -> String {
    let mut output = String::new();
    let insights = &report.insights;

    output.push_str(&format!("# Site Insights: {}\n\n", report.metadata.site_id));

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_today_section(insights.today.payload.as_ref()));
    output.push_str(&generate_last_post_section(insights.last_post.payload.as_ref()));
    output.push_str(&generate_all_time_section(insights.all_time.payload.as_ref()));
    output.push_str(&generate_most_popular_section(
        insights.annual_and_most_popular_time.payload.as_ref(),
    ));
    output.push_str(&generate_followers_section(insights));
    output.push_str(&generate_comments_section(insights.comments.payload.as_ref()));
    output.push_str(&generate_tags_section(
        insights.tags_and_categories.payload.as_ref(),
    ));
    output.push_str(&generate_posting_activity_section(
        insights.posting_streak.payload.as_ref(),
        &report.monthly_activity,
        report.yearly_activity.as_deref(),
    ));

    output.push_str("---\n\n*Report generated by site-insights*\n");

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &InsightsReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Site:** {}\n", metadata.site_id));
    section.push_str(&format!("- **Timezone:** {}\n", metadata.timezone));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if !metadata.missing_reports.is_empty() {
        let missing: Vec<String> = metadata
            .missing_reports
            .iter()
            .map(|k| k.to_string())
            .collect();
        section.push_str(&format!("- **Unavailable:** {}\n", missing.join(", ")));
    }
    section.push_str(&format!(
        "- **Fetch Duration:** {:.1}s\n\n",
        metadata.duration_seconds
    ));

    section
}

fn generate_today_section(today: Option<&TodayInsight>) -> String {
    let mut section = String::from("## Today\n\n");
    let Some(today) = today else {
        section.push_str(UNAVAILABLE);
        return section;
    };

    section.push_str("| Views | Visitors | Likes | Comments |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        today.views_count, today.visitors_count, today.likes_count, today.comments_count
    ));
    section
}

fn generate_last_post_section(post: Option<&LastPostInsight>) -> String {
    let mut section = String::from("## Latest Post\n\n");
    let Some(post) = post else {
        section.push_str(UNAVAILABLE);
        return section;
    };

    section.push_str(&format!(
        "[{}]({}) published {}. {} likes, {} comments.\n\n",
        post.title,
        post.url,
        post.published_date.format("%Y-%m-%d"),
        post.likes_count,
        post.comments_count
    ));
    section
}

fn generate_all_time_section(all_time: Option<&AllTimeInsight>) -> String {
    let mut section = String::from("## All Time\n\n");
    let Some(all_time) = all_time else {
        section.push_str(UNAVAILABLE);
        return section;
    };

    section.push_str(&format!("- **Posts:** {}\n", all_time.posts_count));
    section.push_str(&format!("- **Views:** {}\n", all_time.views_count));
    section.push_str(&format!("- **Visitors:** {}\n", all_time.visitors_count));
    match all_time.best_views_day {
        Some(day) => section.push_str(&format!(
            "- **Best Views Ever:** {} on {}\n\n",
            all_time.best_views_per_day,
            day.format("%Y-%m-%d")
        )),
        None => section.push_str(&format!(
            "- **Best Views Ever:** {}\n\n",
            all_time.best_views_per_day
        )),
    }
    section
}

fn generate_most_popular_section(annual: Option<&AnnualAndMostPopularTimeInsight>) -> String {
    let mut section = String::from("## Most Popular Time\n\n");
    let Some(annual) = annual else {
        section.push_str(UNAVAILABLE);
        return section;
    };

    let weekday = WEEKDAYS
        .get(annual.most_popular_day_of_week as usize)
        .copied()
        .unwrap_or("Unknown");
    section.push_str(&format!(
        "- **Best Day:** {} ({:.0}% of views)\n",
        weekday, annual.most_popular_day_of_week_percentage
    ));
    section.push_str(&format!(
        "- **Best Hour:** {:02}:00 ({:.0}% of views)\n",
        annual.most_popular_hour, annual.most_popular_hour_percentage
    ));
    if let Some(year) = annual.annual_year {
        section.push_str(&format!(
            "- **{}:** {} posts, {} words, {} likes, {} comments\n",
            year,
            annual.annual_posts_count,
            annual.annual_words_count,
            annual.annual_likes_count,
            annual.annual_comments_count
        ));
    }
    section.push('\n');
    section
}

fn generate_followers_section(insights: &InsightsState) -> String {
    let mut section = String::from("## Followers\n\n");

    section.push_str("| Source | Followers |\n");
    section.push_str("|:---|:---:|\n");

    let count_or_dash = |count: Option<u64>| match count {
        Some(n) => n.to_string(),
        None => "-".to_string(),
    };

    section.push_str(&format!(
        "| WordPress.com | {} |\n",
        count_or_dash(insights.dot_com_followers.payload.as_ref().map(|f| f.total_count))
    ));
    section.push_str(&format!(
        "| Email | {} |\n",
        count_or_dash(insights.email_followers.payload.as_ref().map(|f| f.total_count))
    ));

    match insights.publicize.payload.as_ref() {
        Some(publicize) => {
            for service in &publicize.services {
                section.push_str(&format!(
                    "| {} | {} |\n",
                    service.name, service.followers_count
                ));
            }
        }
        None => section.push_str("| Publicize | - |\n"),
    }

    section.push('\n');
    section
}

fn generate_comments_section(comments: Option<&CommentsInsight>) -> String {
    let mut section = String::from("## Comments\n\n");
    let Some(comments) = comments else {
        section.push_str(UNAVAILABLE);
        return section;
    };

    if comments.top_authors.is_empty() && comments.top_posts.is_empty() {
        section.push_str("No comments yet.\n\n");
        return section;
    }

    if !comments.top_authors.is_empty() {
        section.push_str("### Top Commenters\n\n");
        for author in &comments.top_authors {
            section.push_str(&format!("- {} ({})\n", author.name, author.comments_count));
        }
        section.push('\n');
    }

    if !comments.top_posts.is_empty() {
        section.push_str("### Most Commented\n\n");
        for post in &comments.top_posts {
            section.push_str(&format!(
                "- [{}]({}) ({})\n",
                post.title, post.url, post.comments_count
            ));
        }
        section.push('\n');
    }

    section
}

fn generate_tags_section(tags: Option<&TagsAndCategoriesInsight>) -> String {
    let mut section = String::from("## Tags & Categories\n\n");
    let Some(tags) = tags else {
        section.push_str(UNAVAILABLE);
        return section;
    };

    if tags.top_terms.is_empty() {
        section.push_str("No tagged views yet.\n\n");
        return section;
    }

    section.push_str("| Term | Type | Views |\n");
    section.push_str("|:---|:---|:---:|\n");
    for term in &tags.top_terms {
        let kind = match term.kind {
            TermKind::Tag => "Tag",
            TermKind::Category => "Category",
            TermKind::Other => "Other",
        };
        section.push_str(&format!("| {} | {} | {} |\n", term.name, kind, term.views_count));
    }
    section.push('\n');
    section
}

fn generate_posting_activity_section(
    streak: Option<&PostingStreakInsight>,
    month: &[PostingStreakEvent],
    year: Option<&[Vec<PostingStreakEvent>]>,
) -> String {
    let mut section = String::from("## Posting Activity\n\n");
    let Some(streak) = streak else {
        section.push_str(UNAVAILABLE);
        return section;
    };

    section.push_str(&format!(
        "- **Current Streak:** {} days\n- **Longest Streak:** {} days\n\n",
        streak.current_streak_length, streak.longest_streak_length
    ));

    if let Some(first) = month.first() {
        section.push_str(&format!("### {}\n\n", first.date.format("%B %Y")));
        section.push_str(&format!("`{}`\n\n", activity_strip(month)));
        section.push_str(&format!(
            "{} posts on {} of {} days\n\n",
            total_posts(month),
            active_days(month),
            days_in_month(first.date)
        ));
    }

    if let Some(year) = year {
        section.push_str("### Last 12 Months\n\n");
        section.push_str("| Month | Posts | Active Days |\n");
        section.push_str("|:---|:---:|:---:|\n");
        for month in year.iter().filter(|m| !m.is_empty()) {
            let first = month[0].date;
            section.push_str(&format!(
                "| {} {} | {} | {} |\n",
                first.format("%b"),
                first.year(),
                total_posts(month),
                active_days(month)
            ));
        }
        section.push('\n');
    }

    section
}

/// One character per day: `.` none, `o` one post, `O` several.
fn activity_strip(month: &[PostingStreakEvent]) -> String {
    month
        .iter()
        .map(|event| match event.post_count {
            0 => '.',
            1 => 'o',
            _ => 'O',
        })
        .collect()
}

fn total_posts(month: &[PostingStreakEvent]) -> u32 {
    month.iter().map(|e| e.post_count).sum()
}

fn active_days(month: &[PostingStreakEvent]) -> usize {
    month.iter().filter(|e| e.post_count > 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use site_insights::models::{PublicizeInsight, PublicizeService};
    use site_insights::store::activity::monthly_posting_activity;
    use site_insights::ReportKind;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_report(insights: InsightsState) -> InsightsReport {
        let metadata = ReportMetadata {
            site_id: 42,
            timezone: "Europe/Paris".to_string(),
            generated_at: Utc::now(),
            activity_date: day(2019, 4, 10),
            missing_reports: Vec::new(),
            duration_seconds: 1.5,
        };
        let month = monthly_posting_activity(insights.posting_streak.payload.as_ref(), day(2019, 4, 10));
        InsightsReport::new(metadata, insights, month, None)
    }

    fn populated_state() -> InsightsState {
        let mut state = InsightsState::default();
        state.today.payload = Some(TodayInsight {
            views_count: 12,
            visitors_count: 4,
            likes_count: 1,
            comments_count: 0,
        });
        state.publicize.payload = Some(PublicizeInsight {
            services: vec![PublicizeService {
                name: "twitter".to_string(),
                followers_count: 33,
            }],
        });
        state.posting_streak.payload = Some(PostingStreakInsight {
            current_streak_length: 2,
            longest_streak_length: 5,
            posting_events: vec![
                PostingStreakEvent::new(day(2019, 4, 1), 1),
                PostingStreakEvent::new(day(2019, 4, 3), 2),
            ],
        });
        state
    }

    #[test]
    fn test_report_records_missing_reports() {
        let report = create_test_report(populated_state());
        assert_eq!(report.metadata.missing_reports.len(), 7);
        assert!(!report
            .metadata
            .missing_reports
            .contains(&ReportKind::TodaySnapshot));
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report(populated_state());
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Site Insights: 42"));
        assert!(markdown.contains("## Today"));
        assert!(markdown.contains("| 12 | 4 | 1 | 0 |"));
        assert!(markdown.contains("| twitter | 33 |"));
        assert!(markdown.contains("### April 2019"));
        assert!(markdown.contains("3 posts on 2 of 30 days"));
        assert!(markdown.contains("**Unavailable:**"));
    }

    #[test]
    fn test_unavailable_sections() {
        let report = create_test_report(InsightsState::default());
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("## Latest Post\n\n_Unavailable._"));
        assert!(markdown.contains("## Posting Activity\n\n_Unavailable._"));
        assert!(markdown.contains("| Email | - |"));
    }

    #[test]
    fn test_activity_strip() {
        let month = vec![
            PostingStreakEvent::new(day(2019, 4, 1), 0),
            PostingStreakEvent::new(day(2019, 4, 2), 1),
            PostingStreakEvent::new(day(2019, 4, 3), 4),
        ];
        assert_eq!(activity_strip(&month), ".oO");
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report(populated_state());
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"site_id\": 42"));
        assert!(json.contains("\"monthly_activity\""));
        assert!(!json.contains("\"yearly_activity\""));
    }
}
