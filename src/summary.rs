use std::collections::HashSet;

use crate::models::{DateRange, RecordSet, SummaryStats};

pub fn summarize(records: &RecordSet) -> SummaryStats {
    let mut lineages = HashSet::new();
    let mut countries = HashSet::new();
    let mut burden_total = 0.0;
    let mut burden_count = 0usize;
    let mut min_date: Option<&str> = None;
    let mut max_date: Option<&str> = None;

    for record in records {
        if let Some(lineage) = record.lineage() {
            lineages.insert(lineage);
        }
        if let Some(country) = record.country() {
            countries.insert(country);
        }
        if let Some(burden) = record.total_substitutions.get() {
            burden_total += burden;
            burden_count += 1;
        }
        if let Some(date) = record.collection_date() {
            // Lexical comparison; only meaningful for ISO-8601 dates.
            if min_date.map_or(true, |current| date < current) {
                min_date = Some(date);
            }
            if max_date.map_or(true, |current| date > current) {
                max_date = Some(date);
            }
        }
    }

    SummaryStats {
        total_samples: records.len(),
        unique_lineage_count: lineages.len(),
        unique_country_count: countries.len(),
        avg_mutation_burden: if burden_count == 0 {
            None
        } else {
            Some(burden_total / burden_count as f64)
        },
        date_range: DateRange {
            min: min_date.unwrap_or_default().to_string(),
            max: max_date.unwrap_or_default().to_string(),
        },
    }
}
