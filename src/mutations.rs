use std::collections::{HashMap, HashSet};

use crate::models::{CategoryCountSeries, LineageBurden, MutationCorrelationMatrix, RecordSet};
use crate::tally::Tally;
use crate::variants::lineage_counts;

pub const TOP_MUTATIONS: usize = 15;
pub const TOP_PROTEIN_MUTATIONS: usize = 10;
pub const TOP_BURDEN_LINEAGES: usize = 10;
pub const SPIKE_PROTEIN: &str = "S";

/// Distinct codes of one record, in the order they first appear.
fn distinct_tokens<'a>(tokens: Vec<&'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    tokens.into_iter().filter(|token| seen.insert(*token)).collect()
}

fn protein_of(code: &str) -> Option<&str> {
    code.split_once(':').map(|(protein, _)| protein)
}

fn record_frequencies(records: &RecordSet, keep: impl Fn(&str) -> bool) -> Tally {
    let mut tally = Tally::new();
    for record in records {
        for code in distinct_tokens(record.mutation_tokens()) {
            if keep(code) {
                tally.add(code);
            }
        }
    }
    tally
}

/// Number of records carrying each code, most common first.
pub fn mutation_frequency(records: &RecordSet, limit: usize) -> CategoryCountSeries {
    record_frequencies(records, |_| true).ranked(Some(limit))
}

/// Same ranking restricted to codes whose prefix before `:` equals `protein`.
pub fn protein_mutations(records: &RecordSet, protein: &str, limit: usize) -> CategoryCountSeries {
    record_frequencies(records, |code| protein_of(code) == Some(protein)).ranked(Some(limit))
}

/// Every token occurrence counted under its protein prefix; codes without `:` are skipped.
pub fn protein_groups(records: &RecordSet) -> CategoryCountSeries {
    let mut tally = Tally::new();
    for record in records {
        for protein in record.mutation_tokens().into_iter().filter_map(protein_of) {
            tally.add(protein);
        }
    }
    tally.ranked(None)
}

/// Mean substitution count for the most sampled lineages. Lineages without
/// a numeric count are left out rather than reported as zero.
pub fn lineage_burden(records: &RecordSet, limit: usize) -> Vec<LineageBurden> {
    let leaders = lineage_counts(records, limit);
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for record in records {
        let (Some(lineage), Some(burden)) = (record.lineage(), record.total_substitutions.get())
        else {
            continue;
        };
        let entry = sums.entry(lineage).or_insert((0.0, 0));
        entry.0 += burden;
        entry.1 += 1;
    }

    leaders
        .points
        .iter()
        .filter_map(|point| {
            let &(total, samples) = sums.get(point.label.as_str())?;
            Some(LineageBurden {
                lineage: point.label.clone(),
                samples,
                avg_substitutions: total / samples as f64,
            })
        })
        .collect()
}

/// Pairwise co-occurrence over the `limit` most frequent codes.
pub fn co_occurrence(records: &RecordSet, limit: usize) -> MutationCorrelationMatrix {
    let codes: Vec<String> = mutation_frequency(records, limit)
        .points
        .into_iter()
        .map(|point| point.label)
        .collect();
    let position: HashMap<&str, usize> = codes
        .iter()
        .enumerate()
        .map(|(index, code)| (code.as_str(), index))
        .collect();

    let size = codes.len();
    let mut counts = vec![vec![0usize; size]; size];
    for record in records {
        let present: Vec<usize> = distinct_tokens(record.mutation_tokens())
            .into_iter()
            .filter_map(|code| position.get(code).copied())
            .collect();
        for (offset, &a) in present.iter().enumerate() {
            for &b in &present[offset + 1..] {
                counts[a][b] += 1;
                counts[b][a] += 1;
            }
        }
    }

    let cells = counts
        .into_iter()
        .enumerate()
        .map(|(row, values)| {
            values
                .into_iter()
                .enumerate()
                .map(|(col, count)| (row != col).then_some(count))
                .collect()
        })
        .collect();

    MutationCorrelationMatrix { codes, cells }
}
