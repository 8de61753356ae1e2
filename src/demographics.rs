use crate::models::{
    AgeDistribution, AgeGroup, AgeGroupShare, CategoryCount, CategoryCountSeries, RecordSet,
    SeriesOrder,
};
use crate::tally::{percent, round_one, Tally};

pub const AGE_BANDS: [&str; 10] = [
    "0-9", "10-19", "20-29", "30-39", "40-49", "50-59", "60-69", "70-79", "80-89", "90+",
];

/// Free-text `sex` values as-is after trimming; "male" and "Male" stay distinct.
pub fn gender_counts(records: &RecordSet) -> CategoryCountSeries {
    let mut tally = Tally::new();
    for sex in records.iter().filter_map(|record| record.sex()) {
        tally.add(sex);
    }
    tally.ranked(None)
}

/// Index into `AGE_BANDS`. Everything below ten, negatives included, lands in the first band.
pub fn age_band(age: f64) -> usize {
    match age {
        a if a < 10.0 => 0,
        a if a >= 90.0 => 9,
        a => (a / 10.0).floor() as usize,
    }
}

pub fn age_distribution(records: &RecordSet) -> AgeDistribution {
    let mut counts = [0usize; AGE_BANDS.len()];
    for age in records.iter().filter_map(|record| record.age.get()) {
        counts[age_band(age)] += 1;
    }

    let classified: usize = counts.iter().sum();
    if classified == 0 {
        return AgeDistribution::NoData;
    }

    let groups = AgeGroup::ALL
        .iter()
        .map(|&group| {
            let count: usize = group_bands(group).map(|band| counts[band]).sum();
            AgeGroupShare {
                group,
                count,
                percentage: round_one(percent(count, classified)),
            }
        })
        .collect();

    let bands = AGE_BANDS
        .iter()
        .zip(counts)
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
        })
        .collect();

    AgeDistribution::Classified {
        classified,
        bands: CategoryCountSeries::new(SeriesOrder::BandOrder, bands),
        groups,
    }
}

// 10-19 belongs to no coarse group.
fn group_bands(group: AgeGroup) -> std::ops::Range<usize> {
    match group {
        AgeGroup::Children => 0..1,
        AgeGroup::YoungAdults => 2..4,
        AgeGroup::MiddleAged => 4..6,
        AgeGroup::Elderly => 6..10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, Record};

    fn aged(age: Field<f64>, sex: Option<&str>) -> Record {
        Record {
            age,
            sex: sex.map(str::to_string),
            ..Record::default()
        }
    }

    #[test]
    fn bands_partition_the_real_line() {
        assert_eq!(age_band(-3.0), 0);
        assert_eq!(age_band(0.0), 0);
        assert_eq!(age_band(9.9), 0);
        assert_eq!(age_band(10.0), 1);
        assert_eq!(age_band(89.99), 8);
        assert_eq!(age_band(90.0), 9);
        assert_eq!(age_band(104.0), 9);
    }

    #[test]
    fn gender_keeps_raw_categories() {
        let records = RecordSet::new(vec![
            aged(Field::Missing, Some("male")),
            aged(Field::Missing, Some(" Male ")),
            aged(Field::Missing, Some("Male")),
            aged(Field::Missing, Some("")),
            aged(Field::Missing, None),
        ]);
        let series = gender_counts(&records);
        assert_eq!(series.as_pairs(), vec![("Male", 2), ("male", 1)]);
    }

    #[test]
    fn groups_sum_constituent_bands() {
        let records = RecordSet::new(vec![
            aged(Field::Parsed(4.0), None),
            aged(Field::Parsed(15.0), None),
            aged(Field::Parsed(25.0), None),
            aged(Field::Parsed(38.5), None),
            aged(Field::Parsed(61.0), None),
            aged(Field::Parsed(77.0), None),
            aged(Field::Parsed(85.0), None),
            aged(Field::Parsed(96.0), None),
            aged(Field::Unparsed("unknown".to_string()), None),
        ]);
        let AgeDistribution::Classified {
            classified,
            bands,
            groups,
        } = age_distribution(&records)
        else {
            panic!("expected classified ages");
        };

        assert_eq!(classified, 8);
        assert_eq!(bands.labels(), AGE_BANDS.to_vec());
        assert_eq!(bands.count_of("10-19"), Some(1));
        assert_eq!(bands.count_of("90+"), Some(1));

        let counts: Vec<usize> = groups.iter().map(|share| share.count).collect();
        assert_eq!(counts, vec![1, 2, 0, 4]);
        assert_eq!(groups[3].percentage, 50.0);
        assert_eq!(groups[0].percentage, 12.5);
    }

    #[test]
    fn no_classifiable_age_reports_no_data() {
        let records = RecordSet::new(vec![aged(Field::Unparsed("not a number".to_string()), None)]);
        let distribution = age_distribution(&records);
        assert_eq!(distribution, AgeDistribution::NoData);
        assert!(distribution.bands().is_empty());
    }
}
