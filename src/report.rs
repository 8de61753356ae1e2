use std::fmt::Write;

use chrono::NaiveDate;

use crate::dashboard::{Dashboard, ViewOptions};
use crate::models::{AgeDistribution, CategoryCountSeries, MutationCorrelationMatrix};
use crate::tally::{percent, round_one};

pub fn format_burden(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.1}"),
        None => "n/a".to_string(),
    }
}

fn write_series(output: &mut String, series: &CategoryCountSeries, empty: &str) {
    if series.is_empty() {
        let _ = writeln!(output, "{empty}");
        return;
    }
    let total = series.total();
    for point in &series.points {
        let _ = writeln!(
            output,
            "- {}: {} ({:.1}%)",
            point.label,
            point.count,
            percent(point.count, total)
        );
    }
}

/// Bare counts, for truncated views where a share of the shown rows would mislead.
fn write_counts(output: &mut String, series: &CategoryCountSeries, empty: &str) {
    if series.is_empty() {
        let _ = writeln!(output, "{empty}");
        return;
    }
    for point in &series.points {
        let _ = writeln!(output, "- {}: {} samples", point.label, point.count);
    }
}

fn write_matrix(output: &mut String, matrix: &MutationCorrelationMatrix) {
    if matrix.is_empty() {
        let _ = writeln!(output, "No mutation data.");
        return;
    }
    let _ = writeln!(output, "| | {} |", matrix.codes.join(" | "));
    let _ = writeln!(output, "|---{}", "|---".repeat(matrix.codes.len()) + "|");
    for (code, row) in matrix.codes.iter().zip(&matrix.cells) {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                Some(count) => count.to_string(),
                None => "-".to_string(),
            })
            .collect();
        let _ = writeln!(output, "| {} | {} |", code, cells.join(" | "));
    }
}

pub fn write_overview(output: &mut String, dashboard: &Dashboard) {
    let summary = dashboard.summary();
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Total samples: {}", summary.total_samples);
    let _ = writeln!(output, "- Lineages: {}", summary.unique_lineage_count);
    let _ = writeln!(output, "- Countries: {}", summary.unique_country_count);
    let _ = writeln!(
        output,
        "- Average mutation burden: {}",
        format_burden(summary.avg_mutation_burden)
    );
    if summary.date_range.min.is_empty() {
        let _ = writeln!(output, "- Collection dates: none recorded");
    } else {
        let _ = writeln!(
            output,
            "- Collection dates: {} to {}",
            summary.date_range.min, summary.date_range.max
        );
    }
}

pub fn write_variants(output: &mut String, dashboard: &Dashboard, limit: usize) {
    let details = dashboard.variant_details(limit);
    let _ = writeln!(output, "## Top {limit} Lineages");
    if details.is_empty() {
        let _ = writeln!(output, "No lineage data.");
        return;
    }
    let _ = writeln!(output, "| Lineage | Samples | Share | First seen | Last seen |");
    let _ = writeln!(output, "|---|---|---|---|---|");
    for detail in &details {
        let _ = writeln!(
            output,
            "| {} | {} | {:.1}% | {} | {} |",
            detail.lineage,
            detail.count,
            detail.percentage,
            detail.first_detected,
            detail.last_detected
        );
    }
}

pub fn write_temporal(output: &mut String, dashboard: &Dashboard, top: usize) {
    let monthly = dashboard.monthly();
    let _ = writeln!(output, "## Samples per Month");
    write_series(output, &monthly, "No dated samples.");

    let growth = dashboard.growth();
    if !growth.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "### Month-over-month Growth");
        for point in &growth {
            let _ = writeln!(output, "- {}: {:+.1}%", point.label, point.rate);
        }
    }

    let shares = dashboard.lineage_shares(top);
    if !shares.buckets.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "### Lineage Share by Month");
        let _ = writeln!(output, "| Month | {} |", shares.categories.join(" | "));
        let _ = writeln!(output, "|---{}", "|---".repeat(shares.categories.len()) + "|");
        for bucket in &shares.buckets {
            let cells: Vec<String> = bucket
                .shares
                .iter()
                .map(|share| format!("{share:.1}%"))
                .collect();
            let _ = writeln!(output, "| {} | {} |", bucket.label, cells.join(" | "));
        }
    }
}

pub fn write_demographics(output: &mut String, dashboard: &Dashboard) {
    let _ = writeln!(output, "## Gender");
    write_series(output, &dashboard.genders(), "No gender data.");

    let _ = writeln!(output);
    let _ = writeln!(output, "## Age");
    match dashboard.ages() {
        AgeDistribution::NoData => {
            let _ = writeln!(output, "No data.");
        }
        AgeDistribution::Classified {
            classified,
            bands,
            groups,
        } => {
            for point in &bands.points {
                let _ = writeln!(output, "- {}: {}", point.label, point.count);
            }
            let _ = writeln!(output);
            let _ = writeln!(output, "Across {classified} samples with a known age:");
            for share in &groups {
                let _ = writeln!(
                    output,
                    "- {}: {} ({:.1}%)",
                    share.group.label(),
                    share.count,
                    share.percentage
                );
            }
        }
    }
}

pub fn write_mutations(output: &mut String, dashboard: &Dashboard, protein: &str) {
    let _ = writeln!(output, "## Most Frequent Mutations");
    write_counts(output, &dashboard.mutation_frequency(), "No mutation data.");

    let _ = writeln!(output);
    let _ = writeln!(output, "### {protein} Protein Mutations");
    write_counts(
        output,
        &dashboard.protein_mutations(protein),
        "No mutations on this protein.",
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "### Mutations by Protein");
    write_series(output, &dashboard.protein_groups(), "No mutation data.");

    let _ = writeln!(output);
    let _ = writeln!(output, "### Average Mutations per Lineage");
    let burden = dashboard.lineage_burden();
    if burden.is_empty() {
        let _ = writeln!(output, "No substitution counts recorded.");
    } else {
        for row in &burden {
            let _ = writeln!(
                output,
                "- {}: {:.1} across {} samples",
                row.lineage,
                round_one(row.avg_substitutions),
                row.samples
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Co-occurrence");
    write_matrix(output, &dashboard.co_occurrence());
}

pub fn build_report(
    source: &str,
    generated_on: NaiveDate,
    dashboard: &Dashboard,
    options: &ViewOptions,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Genomic Surveillance Dashboard");
    let _ = writeln!(output, "Generated from {source} on {generated_on}");
    let _ = writeln!(output);
    write_overview(&mut output, dashboard);
    let _ = writeln!(output);
    write_variants(&mut output, dashboard, options.variant_limit);
    let _ = writeln!(output);
    write_temporal(&mut output, dashboard, options.share_lineages);
    let _ = writeln!(output);
    write_demographics(&mut output, dashboard);
    let _ = writeln!(output);
    write_mutations(&mut output, dashboard, &options.protein);

    output
}
