//! Payloads returned by the job API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Statuses shown as counters, in display order.
pub const COUNTED_STATUSES: [&str; 4] = ["queued", "processing", "done", "failed"];

/// Aggregate snapshot returned by `GET /stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Job count per status. Missing or null counts are kept as `None`.
    #[serde(default)]
    pub counts: Option<BTreeMap<String, Option<u64>>>,
    /// Median processing latency in seconds.
    #[serde(default)]
    pub p50_latency_s: Option<f64>,
    /// 95th percentile processing latency in seconds.
    #[serde(default)]
    pub p95_latency_s: Option<f64>,
}

impl Stats {
    /// Count for a status, `0` when absent.
    pub fn count(&self, status: &str) -> u64 {
        self.counts
            .as_ref()
            .and_then(|counts| counts.get(status).copied().flatten())
            .unwrap_or(0)
    }
}

/// A job as listed by `GET /jobs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: String,
    pub media_id: String,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counts_default_to_zero() {
        let stats: Stats = serde_json::from_str(
            r#"{"counts": {"queued": 3, "processing": null}, "p50_latency_s": 1.25}"#,
        )
        .unwrap();

        assert_eq!(stats.count("queued"), 3);
        assert_eq!(stats.count("processing"), 0);
        assert_eq!(stats.count("done"), 0);
        assert_eq!(stats.p50_latency_s, Some(1.25));
        assert_eq!(stats.p95_latency_s, None);
    }

    #[test]
    fn test_stats_without_counts() {
        let empty: Stats = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, Stats::default());
        assert_eq!(empty.count("failed"), 0);

        let null_counts: Stats = serde_json::from_str(r#"{"counts": null}"#).unwrap();
        assert_eq!(null_counts.count("queued"), 0);
    }

    #[test]
    fn test_stats_keeps_unknown_statuses() {
        let stats: Stats =
            serde_json::from_str(r#"{"counts": {"cancelled": 2, "done": 7}}"#).unwrap();
        assert_eq!(stats.count("cancelled"), 2);
        assert_eq!(stats.count("done"), 7);
    }

    #[test]
    fn test_job_list_parsing() {
        let jobs: Vec<Job> = serde_json::from_str(
            r#"[
                {"id": "a", "status": "done", "media_id": "m", "created_at": "2024-05-01T12:00:00", "updated_at": "2024-05-01T12:00:05", "error": null},
                {"id": "b", "status": "queued", "media_id": "n", "created_at": "2024-05-01T12:01:00"},
                {"id": "c", "status": "queued", "media_id": "o", "created_at": "2024-05-01T12:02:00", "updated_at": null}
            ]"#,
        )
        .unwrap();

        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].updated_at.as_deref(), Some("2024-05-01T12:00:05"));
        assert_eq!(jobs[1].updated_at, None);
        assert_eq!(jobs[2].updated_at, None);
    }

    #[test]
    fn test_job_requires_id() {
        let result = serde_json::from_str::<Job>(
            r#"{"status": "done", "media_id": "m", "created_at": "2024-05-01"}"#,
        );
        assert!(result.is_err());
    }
}
