//! Local search pipeline: fuzzy relevance → category → tags → favorites →
//! date range → sort.
//!
//! [`apply`] is a pure function over a snapshot of memories. The only
//! ambient input is `now`, passed explicitly so date buckets resolve in the
//! caller's time zone and results are deterministic.
//!
//! The sort stage always runs last and always wins: relevance order from the
//! free-text stage survives only as the tie-break between records whose sort
//! keys compare equal.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;

use super::types::Memory;

/// Default normalized distance a field may have and still count as a match.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.6;

const TITLE_WEIGHT: f64 = 0.4;
const CONTENT_WEIGHT: f64 = 0.3;
const TAGS_WEIGHT: f64 = 0.2;
const CATEGORY_WEIGHT: f64 = 0.1;

// ── Sort keys and date buckets ────────────────────────────────────────────────

/// Field used by the sort stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Created,
    Updated,
    Title,
    Category,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Title => "title",
            Self::Category => "category",
        }
    }

    /// Parse a sort key, falling back to [`SortField::Created`] for anything
    /// unrecognized.
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" | "createdat" | "created_at" => Self::Created,
            "updated" | "updatedat" | "updated_at" => Self::Updated,
            "title" => Self::Title,
            "category" => Self::Category,
            other => {
                if !other.is_empty() {
                    tracing::debug!(sort_by = %other, "unknown sort key, using created");
                }
                Self::Created
            }
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SortField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SortField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_or_default(&raw))
    }
}

/// Direction of the sort stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Parse a direction, falling back to [`SortOrder::Desc`].
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Self::Asc,
            _ => Self::Desc,
        }
    }
}

impl Serialize for SortOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_or_default(&raw))
    }
}

/// Creation-date bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DateRange {
    /// Local midnight through now.
    Today,
    /// Rolling 7×24h window ending now.
    Week,
    /// Start of the current calendar month through now.
    Month,
    /// Start of the current calendar quarter through now.
    Quarter,
    /// Start of the current calendar year through now.
    Year,
    /// Caller-supplied bounds, both inclusive. A missing bound is open.
    Custom {
        #[serde(default)]
        start: Option<DateTime<Utc>>,
        #[serde(default)]
        end: Option<DateTime<Utc>>,
    },
}

impl DateRange {
    /// Resolve the bucket to inclusive `(start, end)` bounds in UTC.
    pub fn bounds<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let now_utc = now.with_timezone(&Utc);
        let tz = now.timezone();
        let today = now.date_naive();
        let start = match self {
            Self::Today => start_of_day(&tz, today),
            Self::Week => now_utc - Duration::days(7),
            Self::Month => start_of_day(&tz, first_of_month(today.year(), today.month())),
            Self::Quarter => {
                let quarter_month = (today.month0() / 3) * 3 + 1;
                start_of_day(&tz, first_of_month(today.year(), quarter_month))
            }
            Self::Year => start_of_day(&tz, first_of_month(today.year(), 1)),
            Self::Custom { start, end } => return (*start, *end),
        };
        (Some(start), Some(now_utc))
    }

    pub fn contains<Tz: TimeZone>(&self, ts: &DateTime<Utc>, now: &DateTime<Tz>) -> bool {
        let (start, end) = self.bounds(now);
        start.is_none_or(|s| *ts >= s) && end.is_none_or(|e| *ts <= e)
    }
}

impl std::str::FromStr for DateRange {
    type Err = String;

    /// Parses the preset names; `custom` yields open bounds to be filled in.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            "custom" => Ok(Self::Custom {
                start: None,
                end: None,
            }),
            other => Err(format!("unknown date range: {other}")),
        }
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date. A bare date
/// resolves to the start of that day in `tz`, or to its last millisecond
/// when `end_of_day` is set.
pub fn parse_date_bound<Tz: TimeZone>(
    raw: &str,
    tz: &Tz,
    end_of_day: bool,
) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("invalid date: {raw} (expected YYYY-MM-DD or RFC 3339)"))?;
    if end_of_day {
        let next = date.succ_opt().unwrap_or(date);
        Ok(start_of_day(tz, next) - Duration::milliseconds(1))
    } else {
        Ok(start_of_day(tz, date))
    }
}

/// Build a date range from loose inputs: explicit bounds make a custom
/// range, otherwise `range` names a preset.
pub fn date_range_from_parts<Tz: TimeZone>(
    range: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    tz: &Tz,
) -> Result<Option<DateRange>, String> {
    let start = start.filter(|s| !s.trim().is_empty());
    let end = end.filter(|s| !s.trim().is_empty());
    if start.is_some() || end.is_some() {
        return Ok(Some(DateRange::Custom {
            start: start.map(|s| parse_date_bound(s, tz, false)).transpose()?,
            end: end.map(|e| parse_date_bound(e, tz, true)).transpose()?,
        }));
    }
    match range.map(str::trim).filter(|r| !r.is_empty()) {
        Some(name) => name.parse().map(Some),
        None => Ok(None),
    }
}

/// A search request. Every field is independently optional; the default
/// value returns everything, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSpec {
    pub query: Option<String>,
    /// Exact, case-sensitive category match.
    pub category: Option<String>,
    /// OR semantics: a memory needs at least one of these tags.
    pub tags: Vec<String>,
    pub favorites: bool,
    pub date_range: Option<DateRange>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl FilterSpec {
    /// True when no stage would narrow or reorder beyond the default sort.
    pub fn is_empty(&self) -> bool {
        self.active_query().is_none()
            && self.active_category().is_none()
            && self.tags.is_empty()
            && !self.favorites
            && self.date_range.is_none()
    }

    fn active_query(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    fn active_category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Run the full pipeline with the default fuzzy threshold.
pub fn apply_default<Tz: TimeZone>(
    memories: &[Memory],
    filter: &FilterSpec,
    now: &DateTime<Tz>,
) -> Vec<Memory> {
    apply(memories, filter, now, DEFAULT_FUZZY_THRESHOLD)
}

/// Run the full pipeline over a snapshot of memories.
pub fn apply<Tz: TimeZone>(
    memories: &[Memory],
    filter: &FilterSpec,
    now: &DateTime<Tz>,
    threshold: f64,
) -> Vec<Memory> {
    // 1. Free-text relevance
    let mut candidates: Vec<&Memory> = match filter.active_query() {
        Some(query) => rank_by_relevance(memories, query, threshold),
        None => memories.iter().collect(),
    };

    // 2. Category equality
    if let Some(category) = filter.active_category() {
        candidates.retain(|m| m.category.as_deref() == Some(category));
    }

    // 3. Tag membership (OR)
    if !filter.tags.is_empty() {
        candidates.retain(|m| filter.tags.iter().any(|t| m.has_tag(t)));
    }

    // 4. Favorites
    if filter.favorites {
        candidates.retain(|m| m.is_favorite);
    }

    // 5. Date range on created_at
    if let Some(range) = filter.date_range {
        let (start, end) = range.bounds(now);
        candidates.retain(|m| {
            start.is_none_or(|s| m.created_at >= s) && end.is_none_or(|e| m.created_at <= e)
        });
    }

    // 6. Sort, always last
    sort_memories(&mut candidates, filter.sort_by, filter.sort_order);

    tracing::debug!(
        input = memories.len(),
        output = candidates.len(),
        sort_by = %filter.sort_by,
        "filter pipeline applied"
    );

    candidates.into_iter().cloned().collect()
}

/// Stable sort by `field` in `order`. Strings compare case-insensitively.
pub fn sort_memories<M: std::borrow::Borrow<Memory>>(
    memories: &mut [M],
    field: SortField,
    order: SortOrder,
) {
    memories.sort_by(|a, b| {
        let ord = compare_by(a.borrow(), b.borrow(), field);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

/// Weighted relevance of a memory for `query`, or `None` if no field matches
/// within `threshold`. Higher is better; the maximum is 1.0.
pub fn score_memory(memory: &Memory, query: &str, threshold: f64) -> Option<f64> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    let tag_distance = memory
        .tags
        .iter()
        .map(|tag| fuzzy_distance(query, tag))
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let category_distance = memory
        .category
        .as_deref()
        .map(|category| fuzzy_distance(query, category));

    let fields = [
        (TITLE_WEIGHT, Some(fuzzy_distance(query, &memory.title))),
        (CONTENT_WEIGHT, Some(fuzzy_distance(query, &memory.content))),
        (TAGS_WEIGHT, tag_distance),
        (CATEGORY_WEIGHT, category_distance),
    ];

    let mut matched = false;
    let mut score = 0.0;
    for (weight, distance) in fields {
        if let Some(d) = distance.filter(|d| *d <= threshold) {
            matched = true;
            score += weight * (1.0 - d);
        }
    }
    matched.then_some(score)
}

/// Normalized approximate-substring distance of `pattern` within `text`:
/// the fewest edits (insert, delete, substitute) turning `pattern` into some
/// substring of `text`, divided by the pattern length. Case-insensitive.
/// `0.0` is an exact substring match, `1.0` shares nothing.
pub fn fuzzy_distance(pattern: &str, text: &str) -> f64 {
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    if pattern.is_empty() {
        return 0.0;
    }
    let m = pattern.len();

    // column[i] = best edit distance of pattern[..i] ending at the current
    // text position; row 0 is free so a match may start anywhere.
    let mut column: Vec<usize> = (0..=m).collect();
    let mut best = m;

    for tc in text.to_lowercase().chars() {
        let mut diagonal = column[0];
        column[0] = 0;
        for i in 1..=m {
            let above = column[i];
            let cost = usize::from(pattern[i - 1] != tc);
            column[i] = (diagonal + cost).min(above + 1).min(column[i - 1] + 1);
            diagonal = above;
        }
        best = best.min(column[m]);
        if best == 0 {
            break;
        }
    }

    best as f64 / m as f64
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Keep memories that match the query, best match first (stable on ties).
fn rank_by_relevance<'a>(memories: &'a [Memory], query: &str, threshold: f64) -> Vec<&'a Memory> {
    let mut scored: Vec<(&Memory, f64)> = memories
        .iter()
        .filter_map(|m| score_memory(m, query, threshold).map(|s| (m, s)))
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(m, _)| m).collect()
}

fn compare_by(a: &Memory, b: &Memory, field: SortField) -> Ordering {
    match field {
        SortField::Created => a.created_at.cmp(&b.created_at),
        SortField::Updated => a.updated_at.cmp(&b.updated_at),
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::Category => {
            let ac = a.category.as_deref().unwrap_or_default().to_lowercase();
            let bc = b.category.as_deref().unwrap_or_default().to_lowercase();
            ac.cmp(&bc)
        }
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

/// Step used to walk past a DST gap at local midnight.
const GAP_STEP_MINUTES: i64 = 15;

/// First local instant of `date` in `tz`, as UTC. When midnight falls in a
/// DST gap this is the first valid local time after it.
pub(crate) fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..24 * 60 / GAP_STEP_MINUTES)
        .find_map(|step| {
            let local = midnight + Duration::minutes(step * GAP_STEP_MINUTES);
            tz.from_local_datetime(&local).earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}
