use std::path::PathBuf;

use surveillance_dashboard::dashboard::{Dashboard, ViewOptions};
use surveillance_dashboard::loader;
use surveillance_dashboard::models::AgeDistribution;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/sample_surveillance.csv")
}

async fn sample_dashboard() -> Dashboard {
    let records = loader::load(&sample_path()).await.expect("sample dataset loads");
    Dashboard::new(records)
}

#[tokio::test]
async fn malformed_row_is_skipped() {
    let dashboard = sample_dashboard().await;
    assert_eq!(dashboard.summary().total_samples, 12);
}

#[tokio::test]
async fn overview_matches_sample() {
    let summary = sample_dashboard().await.summary();
    assert_eq!(summary.unique_lineage_count, 6);
    assert_eq!(summary.unique_country_count, 7);
    assert_eq!(summary.date_range.min, "2021-01-12");
    assert_eq!(summary.date_range.max, "2022-02-07");
    let burden = summary.avg_mutation_burden.expect("burden present");
    assert!((burden - 479.0 / 11.0).abs() < 1e-9);
}

#[tokio::test]
async fn variant_percentages_sum_to_one_hundred() {
    let dashboard = sample_dashboard().await;
    let details = dashboard.variant_details(4);
    let lineages: Vec<&str> = details.iter().map(|row| row.lineage.as_str()).collect();
    assert_eq!(lineages, vec!["B.1.617.2", "BA.2", "B.1.1.7", "BA.1"]);
    let sum: f64 = details.iter().map(|row| row.percentage).sum();
    assert!((sum - 100.0).abs() < 0.2);
    assert_eq!(details[0].first_detected, "2021-04-18");
    assert_eq!(details[0].last_detected, "2021-06-21");
}

#[tokio::test]
async fn monthly_shares_are_complete() {
    let dashboard = sample_dashboard().await;
    let shares = dashboard.lineage_shares(3);
    assert_eq!(shares.categories.len(), 4);
    for bucket in &shares.buckets {
        let sum: f64 = bucket.shares.iter().sum();
        assert!((sum - 100.0).abs() < 1e-6);
    }
    let labels: Vec<&str> = shares.buckets.iter().map(|b| b.label.as_str()).collect();
    // January and February appear once per year
    assert_eq!(labels.iter().filter(|label| **label == "January").count(), 2);
}

#[tokio::test]
async fn ages_skip_unparsed_values() {
    let dashboard = sample_dashboard().await;
    let AgeDistribution::Classified { classified, bands, .. } = dashboard.ages() else {
        panic!("sample has ages");
    };
    assert_eq!(classified, 10);
    assert_eq!(bands.count_of("90+"), Some(1));
    assert_eq!(bands.count_of("10-19"), Some(1));
}

#[tokio::test]
async fn spike_mutations_and_matrix() {
    let dashboard = sample_dashboard().await;
    let spike = dashboard.protein_mutations("S");
    assert_eq!(spike.points[0].label, "S:D614G");
    assert_eq!(spike.points[0].count, 11);

    let matrix = dashboard.co_occurrence();
    assert_eq!(matrix.get("S:N501Y", "S:D614G"), Some(8));
    assert_eq!(matrix.get("S:D614G", "S:N501Y"), Some(8));
    assert_eq!(matrix.get("S:D614G", "S:D614G"), None);

    let json = serde_json::to_string(&dashboard.snapshot(&ViewOptions::default()))
        .expect("snapshot serialises");
    assert!(json.contains("\"totalSamples\":12"));
}
