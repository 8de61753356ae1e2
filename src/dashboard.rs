use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;
use tracing::debug;

use crate::demographics;
use crate::models::{
    AgeDistribution, CategoryCountSeries, GrowthPoint, LineageBurden, MutationCorrelationMatrix,
    RecordSet, StackedShareSeries, SummaryStats, VariantDetail,
};
use crate::mutations;
use crate::summary;
use crate::temporal;
use crate::variants;

/// Parameters the views are built with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewOptions {
    pub variant_limit: usize,
    pub share_lineages: usize,
    pub protein: String,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            variant_limit: variants::DEFAULT_VARIANT_LIMIT,
            share_lineages: temporal::DEFAULT_SHARE_LINEAGES,
            protein: mutations::SPIKE_PROTEIN.to_string(),
        }
    }
}

struct Memo<K, V> {
    name: &'static str,
    entries: RefCell<HashMap<K, V>>,
}

impl<K: Eq + Hash + std::fmt::Debug, V: Clone> Memo<K, V> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RefCell::new(HashMap::new()),
        }
    }

    fn get_or_build(&self, key: K, build: impl FnOnce() -> V) -> V {
        if let Some(value) = self.entries.borrow().get(&key) {
            return value.clone();
        }
        debug!(view = self.name, key = ?key, "building view");
        let value = build();
        self.entries.borrow_mut().insert(key, value.clone());
        value
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

/// One loaded record set plus every view derived from it, built on first use.
pub struct Dashboard {
    records: RecordSet,
    summary: Memo<(), SummaryStats>,
    variants: Memo<usize, CategoryCountSeries>,
    variant_details: Memo<usize, Vec<VariantDetail>>,
    monthly: Memo<(), CategoryCountSeries>,
    growth: Memo<(), Vec<GrowthPoint>>,
    shares: Memo<usize, StackedShareSeries>,
    genders: Memo<(), CategoryCountSeries>,
    ages: Memo<(), AgeDistribution>,
    mutation_frequency: Memo<usize, CategoryCountSeries>,
    protein_mutations: Memo<(String, usize), CategoryCountSeries>,
    protein_groups: Memo<(), CategoryCountSeries>,
    lineage_burden: Memo<usize, Vec<LineageBurden>>,
    co_occurrence: Memo<usize, MutationCorrelationMatrix>,
}

impl Dashboard {
    pub fn new(records: RecordSet) -> Self {
        Self {
            records,
            summary: Memo::new("summary"),
            variants: Memo::new("variants"),
            variant_details: Memo::new("variant_details"),
            monthly: Memo::new("monthly"),
            growth: Memo::new("growth"),
            shares: Memo::new("lineage_shares"),
            genders: Memo::new("genders"),
            ages: Memo::new("ages"),
            mutation_frequency: Memo::new("mutation_frequency"),
            protein_mutations: Memo::new("protein_mutations"),
            protein_groups: Memo::new("protein_groups"),
            lineage_burden: Memo::new("lineage_burden"),
            co_occurrence: Memo::new("co_occurrence"),
        }
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn summary(&self) -> SummaryStats {
        self.summary
            .get_or_build((), || summary::summarize(&self.records))
    }

    pub fn variants(&self, limit: usize) -> CategoryCountSeries {
        self.variants
            .get_or_build(limit, || variants::lineage_counts(&self.records, limit))
    }

    pub fn variant_details(&self, limit: usize) -> Vec<VariantDetail> {
        self.variant_details
            .get_or_build(limit, || variants::variant_details(&self.records, limit))
    }

    pub fn monthly(&self) -> CategoryCountSeries {
        self.monthly
            .get_or_build((), || temporal::monthly_counts(&self.records))
    }

    pub fn growth(&self) -> Vec<GrowthPoint> {
        self.growth
            .get_or_build((), || temporal::growth_rates(&self.monthly()))
    }

    pub fn lineage_shares(&self, top: usize) -> StackedShareSeries {
        self.shares
            .get_or_build(top, || temporal::lineage_shares(&self.records, top))
    }

    pub fn genders(&self) -> CategoryCountSeries {
        self.genders
            .get_or_build((), || demographics::gender_counts(&self.records))
    }

    pub fn ages(&self) -> AgeDistribution {
        self.ages
            .get_or_build((), || demographics::age_distribution(&self.records))
    }

    pub fn mutation_frequency(&self) -> CategoryCountSeries {
        let limit = mutations::TOP_MUTATIONS;
        self.mutation_frequency
            .get_or_build(limit, || mutations::mutation_frequency(&self.records, limit))
    }

    pub fn protein_mutations(&self, protein: &str) -> CategoryCountSeries {
        let limit = mutations::TOP_PROTEIN_MUTATIONS;
        self.protein_mutations
            .get_or_build((protein.to_string(), limit), || {
                mutations::protein_mutations(&self.records, protein, limit)
            })
    }

    pub fn protein_groups(&self) -> CategoryCountSeries {
        self.protein_groups
            .get_or_build((), || mutations::protein_groups(&self.records))
    }

    pub fn lineage_burden(&self) -> Vec<LineageBurden> {
        let limit = mutations::TOP_BURDEN_LINEAGES;
        self.lineage_burden
            .get_or_build(limit, || mutations::lineage_burden(&self.records, limit))
    }

    pub fn co_occurrence(&self) -> MutationCorrelationMatrix {
        let limit = mutations::TOP_MUTATIONS;
        self.co_occurrence
            .get_or_build(limit, || mutations::co_occurrence(&self.records, limit))
    }

    pub fn cached_views(&self) -> usize {
        self.summary.len()
            + self.variants.len()
            + self.variant_details.len()
            + self.monthly.len()
            + self.growth.len()
            + self.shares.len()
            + self.genders.len()
            + self.ages.len()
            + self.mutation_frequency.len()
            + self.protein_mutations.len()
            + self.protein_groups.len()
            + self.lineage_burden.len()
            + self.co_occurrence.len()
    }

    /// Every view in one serialisable document, grouped by dashboard tab.
    pub fn snapshot(&self, options: &ViewOptions) -> DashboardSnapshot {
        DashboardSnapshot {
            options: options.clone(),
            overview: self.summary(),
            variants: VariantsTab {
                counts: self.variants(options.variant_limit),
                details: self.variant_details(options.variant_limit),
            },
            temporal: TemporalTab {
                monthly: self.monthly(),
                growth: self.growth(),
                lineage_shares: self.lineage_shares(options.share_lineages),
            },
            demographics: DemographicsTab {
                genders: self.genders(),
                ages: self.ages(),
            },
            mutations: MutationsTab {
                frequency: self.mutation_frequency(),
                protein: self.protein_mutations(&options.protein),
                protein_groups: self.protein_groups(),
                lineage_burden: self.lineage_burden(),
                co_occurrence: self.co_occurrence(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub options: ViewOptions,
    pub overview: SummaryStats,
    pub variants: VariantsTab,
    pub temporal: TemporalTab,
    pub demographics: DemographicsTab,
    pub mutations: MutationsTab,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariantsTab {
    pub counts: CategoryCountSeries,
    pub details: Vec<VariantDetail>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalTab {
    pub monthly: CategoryCountSeries,
    pub growth: Vec<GrowthPoint>,
    pub lineage_shares: StackedShareSeries,
}

#[derive(Debug, Clone, Serialize)]
pub struct DemographicsTab {
    pub genders: CategoryCountSeries,
    pub ages: AgeDistribution,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationsTab {
    pub frequency: CategoryCountSeries,
    pub protein: CategoryCountSeries,
    pub protein_groups: CategoryCountSeries,
    pub lineage_burden: Vec<LineageBurden>,
    pub co_occurrence: MutationCorrelationMatrix,
}
