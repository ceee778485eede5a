//! Metrics Aggregator
//!
//! Reporting over the full stored corpus:
//! - Per-category counts, zero-filled, sentinels excluded but reported
//! - A chronological (date, emotion) timeline for time-series consumers
//! - The concatenated content of every dream, for word-frequency views
//!
//! Deterministic for the same stored data. Equal dates keep insertion order.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::journal::{Emotion, EmotionTag, MetricsRow};
use crate::storage::{DreamStore, Result};

// ============================================================================
// COUNTS
// ============================================================================

/// Counts over the fixed category set, always holding every category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmotionCounts([usize; 5]);

impl EmotionCounts {
    pub fn get(&self, emotion: Emotion) -> usize {
        self.0[slot(emotion)]
    }

    /// Every category in declaration order, zeros included
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, usize)> + '_ {
        Emotion::ALL.into_iter().map(|e| (e, self.get(e)))
    }

    /// Sum over all categories
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Count a tag. Returns false for sentinels, which are not counted.
    fn record(&mut self, tag: EmotionTag) -> bool {
        match tag.category() {
            Some(e) => {
                self.0[slot(e)] += 1;
                true
            }
            None => false,
        }
    }
}

impl Serialize for EmotionCounts {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(Emotion::ALL.len()))?;
        for (emotion, count) in self.iter() {
            map.serialize_entry(emotion.label(), &count)?;
        }
        map.end()
    }
}

fn slot(emotion: Emotion) -> usize {
    match emotion {
        Emotion::Joy => 0,
        Emotion::Sadness => 1,
        Emotion::Fear => 2,
        Emotion::Anger => 3,
        Emotion::Calm => 4,
    }
}

// ============================================================================
// REPORT
// ============================================================================

/// One day of the timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyEmotions {
    pub day: NaiveDate,
    pub counts: EmotionCounts,
    pub excluded: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub counts: EmotionCounts,
    /// Records tagged with a sentinel
    pub excluded: usize,
    /// Records read
    pub total: usize,
    /// Oldest first
    pub timeline: Vec<(DateTime<Utc>, EmotionTag)>,
    /// All content fields joined by single spaces
    pub corpus_text: String,
}

impl MetricsReport {
    /// Build a report from reporting rows in any order
    pub fn from_rows(rows: Vec<MetricsRow>) -> Self {
        let mut rows = rows;
        // Stable: equal dates keep the order storage returned them in
        rows.sort_by_key(|row| row.date_recorded);

        let mut report = MetricsReport {
            total: rows.len(),
            ..Default::default()
        };
        let mut contents = Vec::with_capacity(rows.len());

        for row in rows {
            if !report.counts.record(row.emotion) {
                report.excluded += 1;
            }
            report.timeline.push((row.date_recorded, row.emotion));
            contents.push(row.content);
        }
        report.corpus_text = contents.join(" ");

        report
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Timeline grouped by UTC calendar day, days ascending
    pub fn daily_breakdown(&self) -> Vec<DailyEmotions> {
        let mut days: Vec<DailyEmotions> = Vec::new();
        for (date, tag) in &self.timeline {
            let day = date.date_naive();
            let needs_new = days.last().is_none_or(|d| d.day != day);
            if needs_new {
                days.push(DailyEmotions {
                    day,
                    counts: EmotionCounts::default(),
                    excluded: 0,
                });
            }
            if let Some(current) = days.last_mut() {
                if !current.counts.record(*tag) {
                    current.excluded += 1;
                }
            }
        }
        days
    }
}

// ============================================================================
// AGGREGATOR
// ============================================================================

pub struct MetricsAggregator {
    store: Arc<dyn DreamStore>,
}

impl MetricsAggregator {
    pub fn new(store: Arc<dyn DreamStore>) -> Self {
        Self { store }
    }

    /// Read every stored dream and aggregate
    pub fn report(&self) -> Result<MetricsReport> {
        let rows = self.store.fetch_metrics()?;
        let report = MetricsReport::from_rows(rows);
        debug!(
            total = report.total,
            excluded = report.excluded,
            "Aggregated dream metrics"
        );
        Ok(report)
    }
}

// ============================================================================
// TESTS
// ============================================================================
