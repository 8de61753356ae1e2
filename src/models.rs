use serde::Serialize;

/// A typed cell. `Unparsed` keeps the raw text of a value that did not fit the column type.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Missing,
    Parsed(T),
    Unparsed(String),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Missing
    }
}

impl<T> Field<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Parsed(value) => Some(value),
            Field::Missing | Field::Unparsed(_) => None,
        }
    }
}

impl<T: Copy> Field<T> {
    pub fn get(&self) -> Option<T> {
        self.value().copied()
    }
}

/// Mutation codes as they arrive: one comma separated cell, or already split.
#[derive(Debug, Clone, PartialEq)]
pub enum Substitutions {
    Delimited(String),
    Tokens(Vec<String>),
}

impl Substitutions {
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            Substitutions::Delimited(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .collect(),
            Substitutions::Tokens(tokens) => tokens
                .iter()
                .map(String::as_str)
                .filter(|token| !token.trim().is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub lineage: Option<String>,
    pub country: Option<String>,
    pub collection_date: Option<String>,
    pub year: Field<i32>,
    pub month: Field<u32>,
    pub total_substitutions: Field<f64>,
    pub substitutions: Option<Substitutions>,
    pub sex: Option<String>,
    pub age: Field<f64>,
}

impl Record {
    pub fn lineage(&self) -> Option<&str> {
        non_empty(self.lineage.as_deref())
    }

    pub fn country(&self) -> Option<&str> {
        non_empty(self.country.as_deref())
    }

    pub fn collection_date(&self) -> Option<&str> {
        non_empty(self.collection_date.as_deref())
    }

    pub fn sex(&self) -> Option<&str> {
        non_empty(self.sex.as_deref())
    }

    /// `YYYY-MM` bucket key, present only when both year and month parsed.
    pub fn month_key(&self) -> Option<String> {
        let year = self.year.get()?;
        let month = self.month.get()?;
        Some(format!("{year:04}-{month:02}"))
    }

    pub fn mutation_tokens(&self) -> Vec<&str> {
        self.substitutions
            .as_ref()
            .map(Substitutions::tokens)
            .unwrap_or_default()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// The immutable sample table every aggregator reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub min: String,
    pub max: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_samples: usize,
    pub unique_lineage_count: usize,
    pub unique_country_count: usize,
    pub avg_mutation_burden: Option<f64>,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesOrder {
    FrequencyDescending,
    Chronological,
    BandOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCountSeries {
    pub order: SeriesOrder,
    pub points: Vec<CategoryCount>,
}

impl CategoryCountSeries {
    pub fn new(order: SeriesOrder, points: Vec<CategoryCount>) -> Self {
        Self { order, points }
    }

    pub fn empty(order: SeriesOrder) -> Self {
        Self::new(order, Vec::new())
    }

    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|point| point.label.as_str()).collect()
    }

    pub fn total(&self) -> usize {
        self.points.iter().map(|point| point.count).sum()
    }

    pub fn count_of(&self, label: &str) -> Option<usize> {
        self.points
            .iter()
            .find(|point| point.label == label)
            .map(|point| point.count)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_pairs(&self) -> Vec<(&str, usize)> {
        self.points
            .iter()
            .map(|point| (point.label.as_str(), point.count))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDetail {
    pub lineage: String,
    pub count: usize,
    pub first_detected: String,
    pub last_detected: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthPoint {
    pub label: String,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareBucket {
    pub key: String,
    pub label: String,
    pub total: usize,
    /// Aligned with `StackedShareSeries::categories`.
    pub shares: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedShareSeries {
    pub categories: Vec<String>,
    pub buckets: Vec<ShareBucket>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Children,
    YoungAdults,
    MiddleAged,
    Elderly,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 4] = [
        AgeGroup::Children,
        AgeGroup::YoungAdults,
        AgeGroup::MiddleAged,
        AgeGroup::Elderly,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Children => "Children (0-9)",
            AgeGroup::YoungAdults => "Young adults (20-39)",
            AgeGroup::MiddleAged => "Middle-aged (40-59)",
            AgeGroup::Elderly => "Elderly (60+)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeGroupShare {
    pub group: AgeGroup,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AgeDistribution {
    NoData,
    Classified {
        classified: usize,
        bands: CategoryCountSeries,
        groups: Vec<AgeGroupShare>,
    },
}

impl AgeDistribution {
    pub fn has_data(&self) -> bool {
        matches!(self, AgeDistribution::Classified { .. })
    }

    pub fn bands(&self) -> CategoryCountSeries {
        match self {
            AgeDistribution::NoData => CategoryCountSeries::empty(SeriesOrder::BandOrder),
            AgeDistribution::Classified { bands, .. } => bands.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageBurden {
    pub lineage: String,
    pub samples: usize,
    pub avg_substitutions: f64,
}

/// Pairwise co-occurrence counts. Diagonal cells hold `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationCorrelationMatrix {
    pub codes: Vec<String>,
    pub cells: Vec<Vec<Option<usize>>>,
}

impl MutationCorrelationMatrix {
    pub fn index_of(&self, code: &str) -> Option<usize> {
        self.codes.iter().position(|candidate| candidate == code)
    }

    pub fn get(&self, a: &str, b: &str) -> Option<usize> {
        let row = self.index_of(a)?;
        let col = self.index_of(b)?;
        self.cells[row][col]
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimited_substitutions_drop_blank_tokens() {
        let subs = Substitutions::Delimited(" S:N501Y, ,S:E484K ,".to_string());
        assert_eq!(subs.tokens(), vec!["S:N501Y", "S:E484K"]);
    }

    #[test]
    fn token_lists_pass_through() {
        let subs = Substitutions::Tokens(vec!["ORF1a:T3255I".to_string()]);
        assert_eq!(subs.tokens(), vec!["ORF1a:T3255I"]);
    }

    #[test]
    fn token_lists_drop_blank_entries() {
        let subs = Substitutions::Tokens(vec![
            String::new(),
            "  ".to_string(),
            "S:N501Y".to_string(),
        ]);
        assert_eq!(subs.tokens(), vec!["S:N501Y"]);
    }

    #[test]
    fn month_key_needs_both_parts() {
        let mut record = Record {
            year: Field::Parsed(2021),
            month: Field::Parsed(3),
            ..Record::default()
        };
        assert_eq!(record.month_key().as_deref(), Some("2021-03"));

        record.month = Field::Unparsed("March".to_string());
        assert_eq!(record.month_key(), None);
    }

    #[test]
    fn blank_text_fields_read_as_missing() {
        let record = Record {
            lineage: Some("   ".to_string()),
            sex: Some(" Female ".to_string()),
            ..Record::default()
        };
        assert_eq!(record.lineage(), None);
        assert_eq!(record.sex(), Some("Female"));
    }
}
