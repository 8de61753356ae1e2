use std::collections::{BTreeMap, HashMap};

use chrono::Month;

use crate::models::{
    CategoryCountSeries, GrowthPoint, RecordSet, ShareBucket, StackedShareSeries,
};
use crate::tally::{percent, Tally};
use crate::variants::lineage_counts;

pub const DEFAULT_SHARE_LINEAGES: usize = 8;
pub const OTHER_CATEGORY: &str = "Other";

/// Samples per `YYYY-MM`, oldest month first.
pub fn monthly_counts(records: &RecordSet) -> CategoryCountSeries {
    let mut tally = Tally::new();
    for key in records.iter().filter_map(|record| record.month_key()) {
        tally.add(&key);
    }
    tally.chronological()
}

/// Month-over-month change in percent, one point per consecutive pair.
pub fn growth_rates(monthly: &CategoryCountSeries) -> Vec<GrowthPoint> {
    monthly
        .points
        .windows(2)
        .map(|pair| {
            let (previous, current) = (&pair[0], &pair[1]);
            let rate = if previous.count == 0 {
                0.0
            } else {
                (current.count as f64 - previous.count as f64) / previous.count as f64 * 100.0
            };
            GrowthPoint {
                label: current.label.clone(),
                rate,
            }
        })
        .collect()
}

/// Per-month share of the `top` most frequent lineages plus an "Other" column.
///
/// Buckets stay separate per `YYYY-MM` but are labelled with the month name
/// alone, so a record set spanning several years shows repeated labels.
pub fn lineage_shares(records: &RecordSet, top: usize) -> StackedShareSeries {
    let leaders: Vec<String> = lineage_counts(records, top)
        .points
        .into_iter()
        .map(|point| point.label)
        .collect();
    let column: HashMap<&str, usize> = leaders
        .iter()
        .enumerate()
        .map(|(slot, lineage)| (lineage.as_str(), slot))
        .collect();

    // one slot per leader, then the trailing "Other" slot
    let mut months: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for record in records {
        let Some(key) = record.month_key() else {
            continue;
        };
        let slot = record
            .lineage()
            .and_then(|lineage| column.get(lineage).copied())
            .unwrap_or(leaders.len());
        months.entry(key).or_insert_with(|| vec![0; leaders.len() + 1])[slot] += 1;
    }

    let buckets: Vec<ShareBucket> = months
        .into_iter()
        .map(|(key, counts)| {
            let total: usize = counts.iter().sum();
            ShareBucket {
                label: month_label(&key),
                shares: counts.iter().map(|&count| percent(count, total)).collect(),
                total,
                key,
            }
        })
        .collect();

    let categories = if buckets.is_empty() {
        Vec::new()
    } else {
        let mut categories = leaders;
        categories.push(OTHER_CATEGORY.to_string());
        categories
    };
    StackedShareSeries {
        categories,
        buckets,
    }
}

fn month_label(key: &str) -> String {
    key.split_once('-')
        .and_then(|(_, month)| month.parse::<u8>().ok())
        .and_then(|month| Month::try_from(month).ok())
        .map(|month| month.name().to_string())
        .unwrap_or_else(|| key.to_string())
}
