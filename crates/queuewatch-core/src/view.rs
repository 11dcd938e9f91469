//! View models and display formatting for the dashboard page.

use std::fmt::Display;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{Result, WatchError};
use crate::model::{Job, Stats};

/// Shown in text elements that have no value.
pub const PLACEHOLDER: &str = "–";

/// Shown in the "updated" column of a job that was never updated.
pub const MISSING_TIMESTAMP: &str = "—";

/// Shown for timestamps that cannot be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

/// Number of characters kept from ids in the jobs table.
pub const SHORT_ID_LEN: usize = 8;

/// en-US `toLocaleString` layout, e.g. `5/1/2024, 2:05:09 PM`.
const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Element ids on the dashboard page.
pub mod element {
    pub const QUEUED: &str = "queued";
    pub const PROCESSING: &str = "processing";
    pub const DONE: &str = "done";
    pub const FAILED: &str = "failed";
    pub const P50: &str = "p50";
    pub const P95: &str = "p95";
    pub const JOBS_TABLE: &str = "jobs";
}

/// Display strings derived from one [`Stats`] snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsView {
    pub queued: String,
    pub processing: String,
    pub done: String,
    pub failed: String,
    /// `None` renders the placeholder.
    pub p50: Option<String>,
    /// `None` renders the placeholder.
    pub p95: Option<String>,
}

impl StatsView {
    pub fn from_stats(stats: &Stats) -> Self {
        Self {
            queued: stats.count("queued").to_string(),
            processing: stats.count("processing").to_string(),
            done: stats.count("done").to_string(),
            failed: stats.count("failed").to_string(),
            p50: format_latency(stats.p50_latency_s),
            p95: format_latency(stats.p95_latency_s),
        }
    }

    /// Element id / value pairs in page order.
    pub fn entries(&self) -> [(&'static str, Option<&str>); 6] {
        [
            (element::QUEUED, Some(self.queued.as_str())),
            (element::PROCESSING, Some(self.processing.as_str())),
            (element::DONE, Some(self.done.as_str())),
            (element::FAILED, Some(self.failed.as_str())),
            (element::P50, self.p50.as_deref()),
            (element::P95, self.p95.as_deref()),
        ]
    }
}

/// One row of the jobs table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRow {
    pub short_id: String,
    /// Full job id, shown as the tooltip of the id cell.
    pub title: String,
    pub status: String,
    pub media: String,
    pub created: String,
    pub updated: String,
}

impl JobRow {
    pub fn from_job(job: &Job, zone: &DisplayZone) -> Self {
        Self {
            short_id: truncate(&job.id, SHORT_ID_LEN).to_string(),
            title: job.id.clone(),
            status: job.status.clone(),
            media: format!("{}...", truncate(&job.media_id, SHORT_ID_LEN)),
            created: zone.localize(&job.created_at),
            updated: job
                .updated_at
                .as_deref()
                .filter(|raw| !raw.is_empty())
                .map(|raw| zone.localize(raw))
                .unwrap_or_else(|| MISSING_TIMESTAMP.to_string()),
        }
    }
}

/// Latency with one decimal place. Absent, zero and non-finite values have
/// no display value.
pub fn format_latency(seconds: Option<f64>) -> Option<String> {
    seconds
        .filter(|s| *s != 0.0 && s.is_finite())
        .map(to_fixed_1)
}

/// One decimal place with exact ties rounded away from zero.
///
/// `{:.1}` rounds the exact binary value and breaks ties to even. The only
/// f64 values sitting exactly on a `.x5` tie are quarters (`.25`, `.75`).
fn to_fixed_1(value: f64) -> String {
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        let tenths = (value * 10.0).round();
        return format!("{:.1}", tenths / 10.0);
    }
    format!("{:.1}", value)
}

/// First `max_chars` characters of `value`.
pub fn truncate(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// Time zone used to localize job timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    #[default]
    Local,
    Utc,
    Named(Tz),
}

impl DisplayZone {
    /// Parse `local`, `utc` or an IANA zone name such as `Europe/Berlin`.
    pub fn parse(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("local") {
            return Ok(DisplayZone::Local);
        }
        if name.eq_ignore_ascii_case("utc") {
            return Ok(DisplayZone::Utc);
        }
        name.parse::<Tz>()
            .map(DisplayZone::Named)
            .map_err(|_| WatchError::Config(format!("Unknown time zone: {}", name)))
    }

    /// Format a raw API timestamp for display in this zone.
    pub fn localize(&self, raw: &str) -> String {
        match self {
            DisplayZone::Local => localize_in(raw, &Local),
            DisplayZone::Utc => localize_in(raw, &Utc),
            DisplayZone::Named(tz) => localize_in(raw, tz),
        }
    }
}

/// Format a raw timestamp in `tz`, or [`INVALID_DATE`] if it cannot be parsed.
pub fn localize_in<Z>(raw: &str, tz: &Z) -> String
where
    Z: TimeZone,
    Z::Offset: Display,
{
    match parse_instant(raw, tz) {
        Some(instant) => instant.format(TIMESTAMP_FORMAT).to_string(),
        None => INVALID_DATE.to_string(),
    }
}

/// Offset-qualified timestamps are converted into `tz`; bare date-times are
/// wall-clock time in `tz`; bare dates are UTC midnight.
fn parse_instant<Z: TimeZone>(raw: &str, tz: &Z) -> Option<DateTime<Z>> {
    let raw = raw.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(tz));
    }

    let zoned = match raw.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{}+00:00", rest),
        None => raw.to_string(),
    };
    for layout in [
        "%Y-%m-%dT%H:%M%#z",
        "%Y-%m-%d %H:%M:%S%.f%#z",
        "%Y-%m-%d %H:%M%#z",
    ] {
        if let Ok(instant) = DateTime::parse_from_str(&zoned, layout) {
            return Some(instant.with_timezone(tz));
        }
    }

    for layout in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, layout) {
            return tz
                .from_local_datetime(&naive)
                .earliest()
                .or_else(|| Some(tz.from_utc_datetime(&naive)));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().with_timezone(tz))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn stats_with(counts: &[(&str, Option<u64>)], p50: Option<f64>, p95: Option<f64>) -> Stats {
        Stats {
            counts: Some(
                counts
                    .iter()
                    .map(|(k, v)| (k.to_string(), *v))
                    .collect::<BTreeMap<_, _>>(),
            ),
            p50_latency_s: p50,
            p95_latency_s: p95,
        }
    }

    fn job(id: &str, media_id: &str, updated_at: Option<&str>) -> Job {
        Job {
            id: id.to_string(),
            status: "processing".to_string(),
            media_id: media_id.to_string(),
            created_at: "2024-05-01T14:05:09".to_string(),
            updated_at: updated_at.map(str::to_string),
        }
    }

    #[test]
    fn test_counts_show_zero_not_placeholder() {
        let stats = stats_with(
            &[
                ("queued", Some(3)),
                ("processing", Some(1)),
                ("done", Some(10)),
                ("failed", Some(0)),
            ],
            None,
            None,
        );
        let view = StatsView::from_stats(&stats);

        assert_eq!(view.queued, "3");
        assert_eq!(view.processing, "1");
        assert_eq!(view.done, "10");
        assert_eq!(view.failed, "0");
    }

    #[test]
    fn test_missing_counts_default_to_zero() {
        let view = StatsView::from_stats(&Stats::default());
        assert_eq!(view.queued, "0");
        assert_eq!(view.processing, "0");
        assert_eq!(view.done, "0");
        assert_eq!(view.failed, "0");
        assert_eq!(view.p50, None);
        assert_eq!(view.p95, None);
    }

    #[test]
    fn test_latency_formatting() {
        assert_eq!(format_latency(Some(1.0)), Some("1.0".to_string()));
        assert_eq!(format_latency(Some(12.34)), Some("12.3".to_string()));
        assert_eq!(format_latency(Some(0.06)), Some("0.1".to_string()));
        assert_eq!(format_latency(Some(0.0)), None);
        assert_eq!(format_latency(Some(f64::NAN)), None);
        assert_eq!(format_latency(None), None);
    }

    #[test]
    fn test_latency_ties_round_up() {
        let shown: Vec<_> = [0.25, 2.25, 1.25, 0.75, 1.15, 2.35, 10.05]
            .into_iter()
            .map(|s| format_latency(Some(s)).unwrap())
            .collect();
        // 1.15, 2.35 and 10.05 are not exact ties in binary.
        assert_eq!(shown, ["0.3", "2.3", "1.3", "0.8", "1.1", "2.4", "10.1"]);
    }

    #[test]
    fn test_entries_order() {
        let stats = stats_with(&[("queued", Some(5))], Some(2.0), None);
        let view = StatsView::from_stats(&stats);
        let entries = view.entries();

        let ids: Vec<_> = entries.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, ["queued", "processing", "done", "failed", "p50", "p95"]);
        assert_eq!(entries[0].1, Some("5"));
        assert_eq!(entries[4].1, Some("2.0"));
        assert_eq!(entries[5].1, None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("0123456789abcdef", 8), "01234567");
        assert_eq!(truncate("abc", 8), "abc");
        assert_eq!(truncate("", 8), "");
        assert_eq!(truncate("ééééééééé", 8), "éééééééé");
    }

    #[test]
    fn test_job_row_truncates_ids() {
        let row = JobRow::from_job(
            &job(
                "9b2f6c1e-3a4d-4e5f-8a9b-0c1d2e3f4a5b",
                "d41d8cd9-8f00-b204-e980-0998ecf8427e",
                None,
            ),
            &DisplayZone::Utc,
        );

        assert_eq!(row.short_id, "9b2f6c1e");
        assert_eq!(row.title, "9b2f6c1e-3a4d-4e5f-8a9b-0c1d2e3f4a5b");
        assert_eq!(row.status, "processing");
        assert_eq!(row.media, "d41d8cd9...");
        assert_eq!(row.created, "5/1/2024, 2:05:09 PM");
        assert_eq!(row.updated, MISSING_TIMESTAMP);
    }

    #[test]
    fn test_job_row_short_media_id_still_suffixed() {
        let row = JobRow::from_job(&job("j1", "m1", None), &DisplayZone::Utc);
        assert_eq!(row.short_id, "j1");
        assert_eq!(row.media, "m1...");
    }

    #[test]
    fn test_job_row_updated_timestamp() {
        let row = JobRow::from_job(
            &job("j1", "m1", Some("2024-05-01T00:30:00Z")),
            &DisplayZone::Utc,
        );
        assert_eq!(row.updated, "5/1/2024, 12:30:00 AM");
    }

    #[test]
    fn test_localize_formats() {
        assert_eq!(
            localize_in("2024-05-01T14:05:09.123456", &Utc),
            "5/1/2024, 2:05:09 PM"
        );
        assert_eq!(
            localize_in("2024-12-31T23:59:59+02:00", &Utc),
            "12/31/2024, 9:59:59 PM"
        );
        assert_eq!(localize_in("2024-05-01", &Utc), "5/1/2024, 12:00:00 AM");
        assert_eq!(localize_in("yesterday", &Utc), INVALID_DATE);
    }

    #[test]
    fn test_localize_offset_without_seconds() {
        assert_eq!(
            localize_in("2024-05-01T12:00Z", &Utc),
            "5/1/2024, 12:00:00 PM"
        );
        assert_eq!(
            localize_in("2024-05-01T12:30+02:00", &Utc),
            "5/1/2024, 10:30:00 AM"
        );
        assert_eq!(
            localize_in("2024-05-01 08:15:00Z", &Utc),
            "5/1/2024, 8:15:00 AM"
        );
    }

    #[test]
    fn test_localize_named_zone() {
        let zone = DisplayZone::parse("Europe/Berlin").unwrap();
        // Offset-qualified times are converted, bare times are taken as local wall-clock.
        assert_eq!(zone.localize("2024-01-15T12:00:00Z"), "1/15/2024, 1:00:00 PM");
        assert_eq!(zone.localize("2024-01-15T12:00:00"), "1/15/2024, 12:00:00 PM");
    }

    #[test]
    fn test_display_zone_parse() {
        assert_eq!(DisplayZone::parse("local").unwrap(), DisplayZone::Local);
        assert_eq!(DisplayZone::parse("UTC").unwrap(), DisplayZone::Utc);
        assert!(matches!(
            DisplayZone::parse("America/New_York").unwrap(),
            DisplayZone::Named(_)
        ));
        assert!(DisplayZone::parse("Mars/Olympus").is_err());
    }
}
