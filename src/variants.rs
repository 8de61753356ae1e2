use std::collections::HashMap;

use crate::models::{CategoryCountSeries, RecordSet, VariantDetail};
use crate::tally::{percent, round_one, Tally};

pub const DEFAULT_VARIANT_LIMIT: usize = 10;
pub const UNKNOWN_DATE: &str = "Unknown";

/// Lineages by sample count, highest first, ties in first-seen order.
pub fn lineage_counts(records: &RecordSet, limit: usize) -> CategoryCountSeries {
    let mut tally = Tally::new();
    for lineage in records.iter().filter_map(|record| record.lineage()) {
        tally.add(lineage);
    }
    tally.ranked(Some(limit))
}

/// Detail rows for the top lineages. Percentages are shares of the shown
/// rows' combined count, not of the whole record set.
pub fn variant_details(records: &RecordSet, limit: usize) -> Vec<VariantDetail> {
    let top = lineage_counts(records, limit);
    let shown_total = top.total();

    let mut windows: HashMap<&str, (&str, &str)> = HashMap::new();
    for record in records {
        let (Some(lineage), Some(date)) = (record.lineage(), record.collection_date()) else {
            continue;
        };
        windows
            .entry(lineage)
            .and_modify(|(first, last)| {
                if date < *first {
                    *first = date;
                }
                if date > *last {
                    *last = date;
                }
            })
            .or_insert((date, date));
    }

    top.points
        .iter()
        .map(|point| {
            let (first, last) = windows
                .get(point.label.as_str())
                .copied()
                .unwrap_or((UNKNOWN_DATE, UNKNOWN_DATE));
            VariantDetail {
                lineage: point.label.clone(),
                count: point.count,
                first_detected: first.to_string(),
                last_detected: last.to_string(),
                percentage: round_one(percent(point.count, shown_total)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    fn sample(lineage: &str, date: Option<&str>) -> Record {
        Record {
            lineage: Some(lineage.to_string()),
            collection_date: date.map(str::to_string),
            ..Record::default()
        }
    }

    fn fixture() -> RecordSet {
        RecordSet::new(vec![
            sample("B.1.1.7", Some("2021-03-02")),
            sample("B.1.617.2", Some("2021-06-10")),
            sample("B.1.617.2", Some("2021-05-01")),
            sample("B.1.1.7", Some("2021-01-15")),
            sample("P.1", None),
            sample("B.1.617.2", Some("2021-07-21")),
            Record::default(),
        ])
    }

    #[test]
    fn ranks_by_frequency_with_first_seen_ties() {
        let series = lineage_counts(&fixture(), DEFAULT_VARIANT_LIMIT);
        assert_eq!(
            series.as_pairs(),
            vec![("B.1.617.2", 3), ("B.1.1.7", 2), ("P.1", 1)]
        );
    }

    #[test]
    fn limit_truncates_series() {
        let series = lineage_counts(&fixture(), 1);
        assert_eq!(series.labels(), vec!["B.1.617.2"]);
    }

    #[test]
    fn details_carry_detection_window() {
        let details = variant_details(&fixture(), DEFAULT_VARIANT_LIMIT);
        let delta = &details[0];
        assert_eq!(delta.first_detected, "2021-05-01");
        assert_eq!(delta.last_detected, "2021-07-21");
        let gamma = &details[2];
        assert_eq!(gamma.first_detected, UNKNOWN_DATE);
        assert_eq!(gamma.last_detected, UNKNOWN_DATE);
    }

    #[test]
    fn percentages_use_shown_rows_as_denominator() {
        let details = variant_details(&fixture(), 2);
        assert_eq!(details[0].percentage, 60.0);
        assert_eq!(details[1].percentage, 40.0);

        let all = variant_details(&fixture(), DEFAULT_VARIANT_LIMIT);
        let sum: f64 = all.iter().map(|detail| detail.percentage).sum();
        assert!((sum - 100.0).abs() < 0.2);
    }

    #[test]
    fn empty_set_has_no_rows() {
        assert!(lineage_counts(&RecordSet::default(), 10).is_empty());
        assert!(variant_details(&RecordSet::default(), 10).is_empty());
    }
}
