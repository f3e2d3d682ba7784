//! Posting activity reshaping.
//!
//! Turns the sparse posting-streak history into dense per-month sequences
//! suitable for a calendar grid.

use crate::models::{PostingStreakEvent, PostingStreakInsight};
use chrono::{Datelike, Months, NaiveDate};
use std::collections::HashMap;

/// Number of days in `date`'s month.
pub fn days_in_month(date: NaiveDate) -> u32 {
    match date.with_day(1) {
        Some(first) => first
            .iter_days()
            .take_while(|day| day.month() == first.month())
            .count() as u32,
        None => 0,
    }
}

/// Every day of `date`'s month with its post count, oldest first.
///
/// Days missing from the source get a zero-count event. Returns an empty
/// sequence when no streak data has been received.
pub fn monthly_posting_activity(
    streak: Option<&PostingStreakInsight>,
    date: NaiveDate,
) -> Vec<PostingStreakEvent> {
    let Some(streak) = streak else {
        return Vec::new();
    };
    let Some(first) = date.with_day(1) else {
        return Vec::new();
    };

    // First event for a day wins.
    let mut counts: HashMap<NaiveDate, u32> = HashMap::new();
    for event in &streak.posting_events {
        if event.date.year() == first.year() && event.date.month() == first.month() {
            counts.entry(event.date).or_insert(event.post_count);
        }
    }

    first
        .iter_days()
        .take_while(|day| day.month() == first.month())
        .map(|day| PostingStreakEvent::new(day, counts.get(&day).copied().unwrap_or(0)))
        .collect()
}

/// Twelve monthly sequences ending with `date`'s month, oldest first.
///
/// Months that fall before the earliest representable date are left out,
/// so the result is shorter than twelve only within a year of
/// [`NaiveDate::MIN`].
pub fn yearly_posting_activity(
    streak: Option<&PostingStreakInsight>,
    date: NaiveDate,
) -> Vec<Vec<PostingStreakEvent>> {
    (0..12u32)
        .rev()
        .filter_map(|months_back| date.checked_sub_months(Months::new(months_back)))
        .map(|month| monthly_posting_activity(streak, month))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn streak(events: Vec<PostingStreakEvent>) -> PostingStreakInsight {
        PostingStreakInsight {
            current_streak_length: 0,
            longest_streak_length: 0,
            posting_events: events,
        }
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(day(2019, 4, 17)), 30);
        assert_eq!(days_in_month(day(2019, 1, 1)), 31);
        assert_eq!(days_in_month(day(2019, 2, 10)), 28);
        assert_eq!(days_in_month(day(2020, 2, 29)), 29);
    }

    #[test]
    fn test_monthly_without_payload_is_empty() {
        assert!(monthly_posting_activity(None, day(2019, 4, 1)).is_empty());
    }

    #[test]
    fn test_monthly_fills_missing_days_with_zero() {
        let data = streak(vec![
            PostingStreakEvent::new(day(2019, 4, 5), 3),
            PostingStreakEvent::new(day(2019, 4, 20), 1),
            PostingStreakEvent::new(day(2019, 5, 5), 8),
        ]);

        let month = monthly_posting_activity(Some(&data), day(2019, 4, 28));

        assert_eq!(month.len(), 30);
        assert_eq!(month[4].post_count, 3);
        assert_eq!(month[19].post_count, 1);
        for (i, event) in month.iter().enumerate() {
            assert_eq!(event.date, day(2019, 4, i as u32 + 1));
            if i != 4 && i != 19 {
                assert_eq!(event.post_count, 0, "day {}", i + 1);
            }
        }
    }

    #[test]
    fn test_monthly_ignores_same_month_of_other_year() {
        let data = streak(vec![PostingStreakEvent::new(day(2018, 4, 5), 3)]);
        let month = monthly_posting_activity(Some(&data), day(2019, 4, 1));
        assert!(month.iter().all(|e| e.post_count == 0));
    }

    #[test]
    fn test_monthly_with_empty_history_is_dense_zero() {
        let data = streak(Vec::new());
        let month = monthly_posting_activity(Some(&data), day(2019, 2, 1));
        assert_eq!(month.len(), 28);
        assert!(month.iter().all(|e| e.post_count == 0));
    }

    #[test]
    fn test_yearly_is_oldest_first() {
        let data = streak(vec![PostingStreakEvent::new(day(2019, 3, 31), 2)]);
        let year = yearly_posting_activity(Some(&data), day(2019, 3, 31));

        assert_eq!(year.len(), 12);
        assert_eq!(year[0][0].date, day(2018, 4, 1));
        assert_eq!(year[11][0].date, day(2019, 3, 1));
        assert_eq!(year[11][30].post_count, 2);
        // End-of-month dates clamp instead of skipping February.
        assert_eq!(year[10].len(), 28);
    }

    #[test]
    fn test_yearly_near_min_date_skips_unrepresentable_months() {
        let year = yearly_posting_activity(None, NaiveDate::MIN);
        assert_eq!(year.len(), 1);

        let data = streak(Vec::new());
        let year = yearly_posting_activity(Some(&data), NaiveDate::MIN);
        assert_eq!(year.len(), 1);
        assert_eq!(year[0][0].date, NaiveDate::MIN);
    }

    #[test]
    fn test_yearly_without_payload_has_twelve_empty_months() {
        let year = yearly_posting_activity(None, day(2019, 3, 1));
        assert_eq!(year.len(), 12);
        assert!(year.iter().all(|m| m.is_empty()));
    }
}
