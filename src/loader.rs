use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{DashboardError, Result};
use crate::models::{Field, Record, RecordSet, Substitutions};

pub const COLUMNS: [&str; 9] = [
    "lineage",
    "country",
    "collectionDate",
    "year",
    "month",
    "totalSubstitutions",
    "substitutions",
    "sex",
    "age",
];

/// What a raw cell looks like once numeric and boolean text is recognised.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl CellValue {
    /// `None` for blank cells.
    pub fn coerce(raw: &str) -> Option<CellValue> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Some(CellValue::Boolean(true));
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Some(CellValue::Boolean(false));
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Some(CellValue::Number(number)),
            _ => Some(CellValue::Text(trimmed.to_string())),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CsvRow {
    lineage: Option<String>,
    country: Option<String>,
    collection_date: Option<String>,
    year: Option<String>,
    month: Option<String>,
    total_substitutions: Option<String>,
    substitutions: Option<String>,
    sex: Option<String>,
    age: Option<String>,
}

impl CsvRow {
    fn into_record(self) -> Record {
        Record {
            lineage: text_field(self.lineage),
            country: text_field(self.country),
            collection_date: text_field(self.collection_date),
            year: typed_field(self.year, |number| {
                // four-digit years keep `YYYY-MM` keys sorting chronologically
                (number.fract() == 0.0 && (0.0..=9999.0).contains(&number)).then_some(number as i32)
            }),
            month: typed_field(self.month, |number| {
                (number.fract() == 0.0 && (1.0..=12.0).contains(&number)).then_some(number as u32)
            }),
            total_substitutions: typed_field(self.total_substitutions, Some),
            substitutions: text_field(self.substitutions).map(Substitutions::Delimited),
            sex: text_field(self.sex),
            age: typed_field(self.age, Some),
        }
    }
}

fn text_field(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn typed_field<T>(raw: Option<String>, accept: impl Fn(f64) -> Option<T>) -> Field<T> {
    let Some(raw) = raw else {
        return Field::Missing;
    };
    match CellValue::coerce(&raw) {
        None => Field::Missing,
        Some(CellValue::Number(number)) => match accept(number) {
            Some(value) => Field::Parsed(value),
            None => Field::Unparsed(raw.trim().to_string()),
        },
        Some(CellValue::Boolean(_) | CellValue::Text(_)) => Field::Unparsed(raw.trim().to_string()),
    }
}

/// Parses CSV bytes. Rows that fail to decode are skipped; a missing or
/// unrecognisable header fails the whole load.
pub fn parse_records(data: &[u8]) -> Result<RecordSet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|err| DashboardError::parse(format!("unreadable header row: {err}")))?
        .clone();
    if headers.is_empty() || headers.iter().all(|name| name.trim().is_empty()) {
        return Err(DashboardError::parse("missing header row"));
    }
    if !headers.iter().any(|name| COLUMNS.contains(&name)) {
        return Err(DashboardError::parse(format!(
            "header row has none of the expected columns ({})",
            COLUMNS.join(", ")
        )));
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
        match row {
            Ok(row) => records.push(row.into_record()),
            Err(err) => {
                skipped += 1;
                warn!(row = index + 1, error = %err, "skipping malformed row");
            }
        }
    }

    info!(records = records.len(), skipped, "surveillance records parsed");
    Ok(RecordSet::new(records))
}

/// Reads one CSV file. The read is the only step that waits on I/O.
pub async fn load(path: &Path) -> Result<RecordSet> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|err| DashboardError::load(path, err.to_string()))?;
    parse_records(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
lineage,country,collectionDate,year,month,totalSubstitutions,substitutions,sex,age,extra
BA.1,Kenya,2022-01-04,2022,1,45,\"S:N501Y,S:E484K\",Female,25,x
BA.2,Ghana,2022-02-10,2022,2,,,Male,not a number,y
";

    #[test]
    fn coerces_numbers_booleans_and_text() {
        assert_eq!(CellValue::coerce(" 42 "), Some(CellValue::Number(42.0)));
        assert_eq!(CellValue::coerce("TRUE"), Some(CellValue::Boolean(true)));
        assert_eq!(
            CellValue::coerce("BA.1"),
            Some(CellValue::Text("BA.1".to_string()))
        );
        assert_eq!(CellValue::coerce("NaN"), Some(CellValue::Text("NaN".to_string())));
        assert_eq!(CellValue::coerce("   "), None);
    }

    #[test]
    fn parses_typed_records() {
        let records = parse_records(SAMPLE.as_bytes()).expect("parse");
        assert_eq!(records.len(), 2);

        let first = records.iter().next().expect("first record");
        assert_eq!(first.lineage(), Some("BA.1"));
        assert_eq!(first.year, Field::Parsed(2022));
        assert_eq!(first.month, Field::Parsed(1));
        assert_eq!(first.total_substitutions, Field::Parsed(45.0));
        assert_eq!(first.mutation_tokens(), vec!["S:N501Y", "S:E484K"]);

        let second = records.iter().nth(1).expect("second record");
        assert_eq!(second.total_substitutions, Field::Missing);
        assert_eq!(second.substitutions, None);
        assert_eq!(second.age, Field::Unparsed("not a number".to_string()));
    }

    #[test]
    fn out_of_range_month_is_unparsed() {
        let data = "lineage,year,month\nB.1,2021,13\nB.1,2021.5,2\n";
        let records = parse_records(data.as_bytes()).expect("parse");
        let rows: Vec<&Record> = records.iter().collect();
        assert_eq!(rows[0].month, Field::Unparsed("13".to_string()));
        assert_eq!(rows[1].year, Field::Unparsed("2021.5".to_string()));
        assert_eq!(rows[1].month_key(), None);
    }

    #[test]
    fn years_beyond_four_digits_are_unparsed() {
        let data = "lineage,year,month\nA,9999,12\nA,10000,1\nA,-5,3\n";
        let records = parse_records(data.as_bytes()).expect("parse");
        let rows: Vec<&Record> = records.iter().collect();
        assert_eq!(rows[0].year, Field::Parsed(9999));
        assert_eq!(rows[1].year, Field::Unparsed("10000".to_string()));
        assert_eq!(rows[2].year, Field::Unparsed("-5".to_string()));
        let keys: Vec<String> = records.iter().filter_map(Record::month_key).collect();
        assert_eq!(keys, vec!["9999-12"]);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let data = "lineage,country\nB.1,Peru\nB.2,Chile,extra\nB.3,Chile\n";
        let records = parse_records(data.as_bytes()).expect("parse");
        let lineages: Vec<&str> = records.iter().filter_map(Record::lineage).collect();
        assert_eq!(lineages, vec!["B.1", "B.3"]);
    }

    #[test]
    fn missing_header_is_a_parse_error() {
        let err = parse_records(b"").expect_err("empty input");
        assert!(matches!(err, DashboardError::Parse { .. }));

        let err = parse_records(b"foo,bar\n1,2\n").expect_err("unknown columns");
        assert!(matches!(err, DashboardError::Parse { .. }));
    }

    #[test]
    fn header_only_file_is_an_empty_set() {
        let records = parse_records(b"lineage,country\n").expect("parse");
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_a_load_error() {
        let err = load(Path::new("/nonexistent/surveillance.csv"))
            .await
            .expect_err("missing file");
        assert!(matches!(err, DashboardError::Load { .. }));
    }
}
