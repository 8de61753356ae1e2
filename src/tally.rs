use std::collections::HashMap;

use crate::models::{CategoryCount, CategoryCountSeries, SeriesOrder};

/// Counts labels while remembering the order they were first seen in.
#[derive(Debug, Default)]
pub struct Tally {
    index: HashMap<String, usize>,
    counts: Vec<CategoryCount>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &str) {
        self.add_many(label, 1);
    }

    pub fn add_many(&mut self, label: &str, amount: usize) {
        match self.index.get(label) {
            Some(&slot) => self.counts[slot].count += amount,
            None => {
                self.index.insert(label.to_string(), self.counts.len());
                self.counts.push(CategoryCount {
                    label: label.to_string(),
                    count: amount,
                });
            }
        }
    }

    /// Highest counts first; equal counts keep first-seen order.
    pub fn ranked(self, limit: Option<usize>) -> CategoryCountSeries {
        let mut points = self.counts;
        // sort_by is stable, which is what keeps the first-seen tie-break.
        points.sort_by(|a, b| b.count.cmp(&a.count));
        if let Some(limit) = limit {
            points.truncate(limit);
        }
        CategoryCountSeries::new(SeriesOrder::FrequencyDescending, points)
    }

    /// Ascending by label, for keys that sort chronologically as strings.
    pub fn chronological(self) -> CategoryCountSeries {
        let mut points = self.counts;
        points.sort_by(|a, b| a.label.cmp(&b.label));
        CategoryCountSeries::new(SeriesOrder::Chronological, points)
    }
}

pub fn round_one(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
