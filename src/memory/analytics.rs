//! Derived analytics over a snapshot of memories: counts, top tags and
//! categories, daily and monthly series, streak, productivity score, peak
//! hours, and goal progress.
//!
//! Calendar buckets (days, months, hours) are taken in the time zone of the
//! `now` argument. Rolling windows (trailing 7/30 days) are exact durations.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::types::Memory;

const TOP_TAGS: usize = 10;
const TOP_CATEGORIES: usize = 5;
const PEAK_HOURS: usize = 3;
const WEEKLY_TREND_WEEKS: i64 = 4;

pub const DAILY_GOAL: usize = 3;
pub const WEEKLY_GOAL: usize = 20;
pub const MONTHLY_GOAL: usize = 80;

// ── Public types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Count for one labelled bucket (`YYYY-MM-DD` day or `YYYY-MM` month).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourCount {
    pub hour: u32,
    pub count: usize,
}

/// One rolling 7-day window, `(start, end]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekTrend {
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Goal {
    pub target: usize,
    pub current: usize,
    /// Percent complete, capped at 100.
    pub progress: u32,
}

impl Goal {
    pub fn new(target: usize, current: usize) -> Self {
        Self {
            target,
            current,
            progress: goal_progress(current, target),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Goals {
    pub daily: Goal,
    pub weekly: Goal,
    pub monthly: Goal,
}

/// Everything the analytics views render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total: usize,
    pub today: usize,
    pub last_7_days: usize,
    pub last_30_days: usize,
    pub favorites: usize,
    pub top_tags: Vec<TagCount>,
    pub top_categories: Vec<CategoryCount>,
    /// Trailing 7 local days, oldest first, today last.
    pub weekly_activity: Vec<BucketCount>,
    /// Trailing 12 calendar months, oldest first, current month last.
    pub monthly_growth: Vec<BucketCount>,
    pub streak_days: u32,
    pub productivity_score: u32,
    pub peak_hours: Vec<HourCount>,
    pub average_per_week: f64,
    pub average_daily: f64,
    pub weekly_trends: Vec<WeekTrend>,
    pub goals: Goals,
}

// ── Aggregation ───────────────────────────────────────────────────────────────

/// Compute the full snapshot. Empty input yields zeros and zero-count series.
pub fn aggregate<Tz: TimeZone>(memories: &[Memory], now: &DateTime<Tz>) -> AnalyticsSnapshot {
    let tz = now.timezone();
    let now_utc = now.with_timezone(&Utc);
    let today = now.date_naive();

    let last_7_days = count_since(memories, now_utc - Duration::days(7));
    let last_30_days = count_since(memories, now_utc - Duration::days(30));
    let favorites = memories.iter().filter(|m| m.is_favorite).count();
    let today_count = memories
        .iter()
        .filter(|m| local_date(m, &tz) == today)
        .count();

    let streak_days = streak(memories, now);

    AnalyticsSnapshot {
        total: memories.len(),
        today: today_count,
        last_7_days,
        last_30_days,
        favorites,
        top_tags: top_tags(memories),
        top_categories: top_categories(memories),
        weekly_activity: weekly_activity(memories, now),
        monthly_growth: monthly_growth(memories, now),
        streak_days,
        productivity_score: productivity_score(streak_days, last_7_days, favorites),
        peak_hours: peak_hours(memories, &tz),
        average_per_week: average_per_week(memories, now),
        average_daily: round1(last_30_days as f64 / 30.0),
        weekly_trends: weekly_trends(memories, now),
        goals: Goals {
            daily: Goal::new(DAILY_GOAL, today_count),
            weekly: Goal::new(WEEKLY_GOAL, last_7_days),
            monthly: Goal::new(MONTHLY_GOAL, last_30_days),
        },
    }
}

/// Consecutive local days ending today with at least one memory.
/// A day without memories, starting with today, ends the walk.
pub fn streak<Tz: TimeZone>(memories: &[Memory], now: &DateTime<Tz>) -> u32 {
    let tz = now.timezone();
    let days: HashSet<NaiveDate> = memories.iter().map(|m| local_date(m, &tz)).collect();

    let mut count = 0;
    let mut day = now.date_naive();
    while days.contains(&day) {
        count += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    count
}

/// Consistency + volume + engagement, each capped: 40 + 30 + 30.
pub fn productivity_score(streak_days: u32, last_7_days: usize, favorites: usize) -> u32 {
    let consistency = (streak_days.saturating_mul(10)).min(40);
    let volume = (last_7_days.saturating_mul(3)).min(30) as u32;
    let engagement = (favorites.saturating_mul(2)).min(30) as u32;
    consistency + volume + engagement
}

/// `total / weeks_active` to one decimal, where `weeks_active` counts whole
/// weeks since the oldest memory with a floor of one.
pub fn average_per_week<Tz: TimeZone>(memories: &[Memory], now: &DateTime<Tz>) -> f64 {
    let Some(oldest) = memories.iter().map(|m| m.created_at).min() else {
        return 0.0;
    };
    let elapsed = now.with_timezone(&Utc) - oldest;
    let week_ms = Duration::days(7).num_milliseconds() as f64;
    let weeks_active = (elapsed.num_milliseconds() as f64 / week_ms).ceil().max(1.0);
    round1(memories.len() as f64 / weeks_active)
}

/// Percent of `target` reached, rounded and capped at 100.
pub fn goal_progress(current: usize, target: usize) -> u32 {
    if target == 0 {
        return 100;
    }
    let pct = (current as f64 / target as f64 * 100.0).round();
    pct.min(100.0) as u32
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn local_date<Tz: TimeZone>(memory: &Memory, tz: &Tz) -> NaiveDate {
    memory.created_at.with_timezone(tz).date_naive()
}

fn count_since(memories: &[Memory], since: DateTime<Utc>) -> usize {
    memories.iter().filter(|m| m.created_at >= since).count()
}

fn top_tags(memories: &[Memory]) -> Vec<TagCount> {
    rank(memories.iter().flat_map(|m| m.tags.iter().map(String::as_str)), TOP_TAGS)
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect()
}

fn top_categories(memories: &[Memory]) -> Vec<CategoryCount> {
    rank(
        memories
            .iter()
            .filter_map(|m| m.category.as_deref())
            .filter(|c| !c.is_empty()),
        TOP_CATEGORIES,
    )
    .into_iter()
    .map(|(category, count)| CategoryCount { category, count })
    .collect()
}

/// Count occurrences and keep the `limit` most frequent. Equal counts keep
/// first-encounter order.
pub(crate) fn rank<'a>(keys: impl Iterator<Item = &'a str>, limit: usize) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for key in keys {
        match index.get(key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key, counts.len());
                counts.push((key, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(k, c)| (k.to_string(), c))
        .collect()
}

fn weekly_activity<Tz: TimeZone>(memories: &[Memory], now: &DateTime<Tz>) -> Vec<BucketCount> {
    let tz = now.timezone();
    let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
    for m in memories {
        *per_day.entry(local_date(m, &tz)).or_default() += 1;
    }

    let today = now.date_naive();
    (0..7)
        .rev()
        .filter_map(|offset| today.checked_sub_days(chrono::Days::new(offset)))
        .map(|day| BucketCount {
            label: day.format("%Y-%m-%d").to_string(),
            count: per_day.get(&day).copied().unwrap_or(0),
        })
        .collect()
}

fn monthly_growth<Tz: TimeZone>(memories: &[Memory], now: &DateTime<Tz>) -> Vec<BucketCount> {
    let tz = now.timezone();
    let mut per_month: HashMap<(i32, u32), usize> = HashMap::new();
    for m in memories {
        let local = m.created_at.with_timezone(&tz);
        *per_month.entry((local.year(), local.month())).or_default() += 1;
    }

    let current = now.year() * 12 + now.month0() as i32;
    (0..12)
        .rev()
        .map(|offset| {
            let index = current - offset;
            let year = index.div_euclid(12);
            let month = index.rem_euclid(12) as u32 + 1;
            BucketCount {
                label: format!("{year:04}-{month:02}"),
                count: per_month.get(&(year, month)).copied().unwrap_or(0),
            }
        })
        .collect()
}

fn peak_hours<Tz: TimeZone>(memories: &[Memory], tz: &Tz) -> Vec<HourCount> {
    let mut per_hour = [0usize; 24];
    for m in memories {
        per_hour[m.created_at.with_timezone(tz).hour() as usize] += 1;
    }

    let mut hours: Vec<HourCount> = per_hour
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(hour, &count)| HourCount {
            hour: hour as u32,
            count,
        })
        .collect();
    // Ascending hour already; a stable sort keeps it as the tie-break.
    hours.sort_by(|a, b| b.count.cmp(&a.count));
    hours.truncate(PEAK_HOURS);
    hours
}

fn weekly_trends<Tz: TimeZone>(memories: &[Memory], now: &DateTime<Tz>) -> Vec<WeekTrend> {
    let now_utc = now.with_timezone(&Utc);
    (0..WEEKLY_TREND_WEEKS)
        .rev()
        .map(|i| {
            let end = now_utc - Duration::days(7 * i);
            let start = end - Duration::days(7);
            let count = memories
                .iter()
                .filter(|m| m.created_at > start && m.created_at <= end)
                .count();
            WeekTrend {
                label: format!("Week {}", WEEKLY_TREND_WEEKS - i),
                start,
                end,
                count,
            }
        })
        .collect()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(created: DateTime<Utc>) -> Memory {
        Memory {
            id: created.to_rfc3339(),
            title: "t".into(),
            content: "c".into(),
            category: None,
            tags: Vec::new(),
            is_favorite: false,
            created_at: created,
            updated_at: created,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 15, 0, 0).unwrap()
    }

    #[test]
    fn empty_input_is_all_zero() {
        let snap = aggregate(&[], &now());
        assert_eq!(snap.total, 0);
        assert_eq!(snap.streak_days, 0);
        assert_eq!(snap.productivity_score, 0);
        assert_eq!(snap.average_per_week, 0.0);
        assert_eq!(snap.average_daily, 0.0);
        assert!(snap.top_tags.is_empty());
        assert!(snap.peak_hours.is_empty());
        assert_eq!(snap.weekly_activity.len(), 7);
        assert!(snap.weekly_activity.iter().all(|b| b.count == 0));
        assert_eq!(snap.monthly_growth.len(), 12);
        assert_eq!(snap.goals.daily.progress, 0);
    }

    #[test]
    fn productivity_score_caps_each_term() {
        assert_eq!(productivity_score(5, 10, 20), 100);
        assert_eq!(productivity_score(1, 2, 3), 10 + 6 + 6);
        assert_eq!(productivity_score(0, 0, 0), 0);
    }

    #[test]
    fn goal_progress_rounds_and_caps() {
        assert_eq!(goal_progress(1, 3), 33);
        assert_eq!(goal_progress(2, 3), 67);
        assert_eq!(goal_progress(200, 80), 100);
    }

    #[test]
    fn rank_breaks_ties_by_first_encounter() {
        let ranked = rank(["b", "a", "a", "c", "b", "d"].into_iter(), 3);
        assert_eq!(
            ranked,
            vec![("b".to_string(), 2), ("a".to_string(), 2), ("c".to_string(), 1)]
        );
    }

    #[test]
    fn peak_hours_tie_by_ascending_hour() {
        let day = Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap();
        let memories: Vec<Memory> = [22, 9, 14, 9, 14, 3]
            .iter()
            .map(|h| at(day + Duration::hours(*h)))
            .collect();
        let hours: Vec<u32> = peak_hours(&memories, &Utc).iter().map(|h| h.hour).collect();
        assert_eq!(hours, vec![9, 14, 3]);
    }

    #[test]
    fn monthly_growth_crosses_year_boundary() {
        let memories = vec![at(Utc.with_ymd_and_hms(2023, 4, 2, 0, 0, 0).unwrap())];
        let growth = monthly_growth(&memories, &now());
        assert_eq!(growth.first().unwrap().label, "2023-04");
        assert_eq!(growth.first().unwrap().count, 1);
        assert_eq!(growth.last().unwrap().label, "2024-03");
    }

    #[test]
    fn weekly_trends_are_rolling_windows() {
        let now = now();
        let memories = vec![
            at(now - Duration::days(1)),
            at(now - Duration::days(8)),
            at(now - Duration::days(9)),
            at(now - Duration::days(40)),
        ];
        let counts: Vec<usize> = weekly_trends(&memories, &now).iter().map(|w| w.count).collect();
        assert_eq!(counts, vec![0, 0, 2, 1]);
    }
}
