//! Contribution heat-map aggregation.
//!
//! Buckets commit timestamps into one count per UTC calendar day across a
//! trailing one-year window that ends on the reference day. Every day in the
//! window gets a bucket, including days without commits, so renderers can
//! lay the series out as a fixed grid.
//!
//! Aggregation never fails: repositories without fetched commits contribute
//! nothing, and commits with unparseable or out-of-window timestamps are
//! counted in [`DroppedCommits`] instead of the series.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single commit as seen by the aggregator. Only the creation timestamp
/// matters; it is kept raw so that malformed values can be skipped per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub created_at: Option<String>,
}

impl CommitRecord {
    pub fn new(created_at: impl Into<String>) -> Self {
        Self {
            created_at: Some(created_at.into()),
        }
    }

    /// UTC calendar day of the commit, or `None` when the timestamp is
    /// missing or cannot be parsed.
    #[must_use]
    pub fn day(&self) -> Option<NaiveDate> {
        self.created_at.as_deref().and_then(parse_commit_day)
    }
}

/// Parse a commit timestamp into a UTC instant.
///
/// Accepts RFC 3339 (any offset, converted to UTC), offset-less ISO
/// date-times (taken as UTC), and bare `YYYY-MM-DD` dates (midnight UTC).
#[must_use]
pub fn parse_commit_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// UTC calendar day of a commit timestamp.
#[must_use]
pub fn parse_commit_day(raw: &str) -> Option<NaiveDate> {
    parse_commit_timestamp(raw).map(|ts| ts.date_naive())
}

/// Display intensity of a day's contribution count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub enum SeverityTier {
    /// No contributions.
    None = 0,
    /// 1–2 contributions.
    Low = 1,
    /// 3–5 contributions.
    Medium = 2,
    /// 6–9 contributions.
    High = 3,
    /// 10 or more contributions.
    Max = 4,
}

impl SeverityTier {
    /// All tiers in ascending order, for legends.
    pub const ALL: [SeverityTier; 5] = [
        SeverityTier::None,
        SeverityTier::Low,
        SeverityTier::Medium,
        SeverityTier::High,
        SeverityTier::Max,
    ];

    #[must_use]
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => SeverityTier::None,
            1..=2 => SeverityTier::Low,
            3..=5 => SeverityTier::Medium,
            6..=9 => SeverityTier::High,
            _ => SeverityTier::Max,
        }
    }

    #[must_use]
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl From<SeverityTier> for u8 {
    fn from(tier: SeverityTier) -> Self {
        tier.level()
    }
}

/// One calendar day's contribution count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub count: u32,
}

impl DayBucket {
    #[must_use]
    pub fn tier(&self) -> SeverityTier {
        SeverityTier::from_count(self.count)
    }
}

impl Serialize for DayBucket {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("DayBucket", 3)?;
        state.serialize_field("date", &self.date)?;
        state.serialize_field("count", &self.count)?;
        state.serialize_field("tier", &self.tier())?;
        state.end()
    }
}

/// Commits that were seen but not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DroppedCommits {
    /// Missing or unparseable timestamp.
    pub malformed: u64,
    /// Parsed, but the day lies outside the window.
    pub out_of_window: u64,
}

/// Daily contribution counts for `start..=end`, one bucket per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivitySeries {
    start: NaiveDate,
    end: NaiveDate,
    buckets: Vec<DayBucket>,
    total_contributions: u64,
    dropped: DroppedCommits,
}

impl ActivitySeries {
    /// All-zero series for the window anchored at `reference`.
    #[must_use]
    pub fn empty(reference: DateTime<Utc>) -> Self {
        aggregate_contributions(
            std::iter::empty::<&str>(),
            &BTreeMap::new(),
            reference,
        )
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    #[must_use]
    pub fn buckets(&self) -> &[DayBucket] {
        &self.buckets
    }

    #[must_use]
    pub fn total_contributions(&self) -> u64 {
        self.total_contributions
    }

    #[must_use]
    pub fn dropped(&self) -> DroppedCommits {
        self.dropped
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Bucket for `date`, or `None` when the date is outside the window.
    #[must_use]
    pub fn bucket(&self, date: NaiveDate) -> Option<&DayBucket> {
        let offset = usize::try_from(date.signed_duration_since(self.start).num_days()).ok()?;
        self.buckets.get(offset)
    }

    pub fn iter_tiers(&self) -> impl Iterator<Item = (NaiveDate, SeverityTier)> + '_ {
        self.buckets.iter().map(|b| (b.date, b.tier()))
    }

    #[must_use]
    pub fn max_count(&self) -> u32 {
        self.buckets.iter().map(|b| b.count).max().unwrap_or(0)
    }

    /// Number of days with at least one contribution.
    #[must_use]
    pub fn active_days(&self) -> usize {
        self.buckets.iter().filter(|b| b.count > 0).count()
    }

    /// Longest run of consecutive active days anywhere in the window.
    #[must_use]
    pub fn longest_streak(&self) -> usize {
        let mut longest = 0;
        let mut run = 0;
        for bucket in &self.buckets {
            if bucket.count > 0 {
                run += 1;
                longest = longest.max(run);
            } else {
                run = 0;
            }
        }
        longest
    }

    /// Run of consecutive active days ending on the window's last day.
    #[must_use]
    pub fn current_streak(&self) -> usize {
        self.buckets
            .iter()
            .rev()
            .take_while(|b| b.count > 0)
            .count()
    }
}

/// First and last calendar day (inclusive) of the trailing window for
/// `reference`, in UTC.
///
/// The start is the same month and day one year earlier. A reference on
/// 29 February starts on 1 March of the previous year.
#[must_use]
pub fn trailing_window(reference: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let end = reference.date_naive();
    let previous_year = end.year() - 1;
    let start = end
        .with_year(previous_year)
        .or_else(|| NaiveDate::from_ymd_opt(previous_year, 3, 1))
        .unwrap_or(end);
    (start, end)
}

/// Build the activity series for `repositories` from their fetched commits.
///
/// Only repositories listed in `repositories` are counted, each once. A
/// repository with no entry in `commits_by_repository` contributes nothing.
#[must_use]
pub fn aggregate_contributions<'a, I>(
    repositories: I,
    commits_by_repository: &BTreeMap<String, Vec<CommitRecord>>,
    reference: DateTime<Utc>,
) -> ActivitySeries
where
    I: IntoIterator<Item = &'a str>,
{
    let (start, end) = trailing_window(reference);
    let days = usize::try_from(end.signed_duration_since(start).num_days()).unwrap_or(0) + 1;

    let mut counts = vec![0u32; days];
    let mut dropped = DroppedCommits::default();

    let repositories: BTreeSet<&str> = repositories.into_iter().collect();
    let commits = repositories
        .iter()
        .filter_map(|id| commits_by_repository.get(*id))
        .flatten();

    for commit in commits {
        let Some(day) = commit.day() else {
            dropped.malformed += 1;
            continue;
        };
        let slot = usize::try_from(day.signed_duration_since(start).num_days())
            .ok()
            .and_then(|offset| counts.get_mut(offset));
        match slot {
            Some(count) => *count = count.saturating_add(1),
            None => dropped.out_of_window += 1,
        }
    }

    let buckets: Vec<DayBucket> = start
        .iter_days()
        .zip(counts)
        .map(|(date, count)| DayBucket { date, count })
        .collect();
    let total_contributions = buckets.iter().map(|b| u64::from(b.count)).sum();

    ActivitySeries {
        start,
        end,
        buckets,
        total_contributions,
        dropped,
    }
}

#[cfg(test)]
#[path = "activity_test.rs"]
mod tests;
