//! Row-oriented tabular data as returned by the reporting APIs.
//!
//! A [`Dataset`] is an ordered list of rows, each row a mapping from column
//! name to a scalar [`Value`]. The helpers here cover the small amount of
//! frame-style work the analyzers need: column checks, numeric lookups,
//! grouping by key and summing.

use crate::error::{AnalysisError, AnalysisResult, Side};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::Read;

/// A single cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Parses a raw metric cell, preferring a number when the text is numeric.
    pub fn parse(raw: &str) -> Self {
        match parse_number(raw) {
            Some(n) => Value::Number(n),
            None => Value::Text(raw.to_string()),
        }
    }

    /// Numeric reading of the cell. Text counts when it holds a finite number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => parse_number(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Finite numbers only; `nan` and `inf` stay text.
fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

pub type Row = BTreeMap<String, Value>;

/// Builds a row from `(column, value)` pairs.
pub fn row<V: Into<Value>>(cells: impl IntoIterator<Item = (&'static str, V)>) -> Row {
    cells
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.into()))
        .collect()
}

/// Reads a metric cell. Absent cells are `None`; non-numeric text is an error.
pub fn metric_value(row: &Row, column: &str) -> AnalysisResult<Option<f64>> {
    match row.get(column) {
        None => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or_else(|| AnalysisError::NonNumeric {
            column: column.to_string(),
            value: v.to_string(),
        }),
    }
}

/// An ordered sequence of rows from one reporting window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fails unless every row carries `column`.
    pub fn require_key(&self, column: &str, side: Side) -> AnalysisResult<()> {
        if self.rows.iter().all(|r| r.contains_key(column)) {
            Ok(())
        } else {
            Err(AnalysisError::MissingColumn {
                column: column.to_string(),
                dataset: side,
            })
        }
    }

    /// Fails when the dataset has rows but none of them carries `column`.
    ///
    /// Rows that individually lack the column are fine; their value counts
    /// as missing.
    pub fn require_metric(&self, column: &str, side: Side) -> AnalysisResult<()> {
        if self.rows.is_empty() || self.rows.iter().any(|r| r.contains_key(column)) {
            Ok(())
        } else {
            Err(AnalysisError::MissingColumn {
                column: column.to_string(),
                dataset: side,
            })
        }
    }

    /// Sums `column` across every row, treating missing cells as 0.
    pub fn sum(&self, column: &str) -> AnalysisResult<f64> {
        let mut total = 0.0;
        for r in &self.rows {
            total += metric_value(r, column)?.unwrap_or(0.0);
        }
        Ok(total)
    }

    /// Collapses rows sharing a key into one, summing `metrics`.
    ///
    /// Keys keep the order in which they were first seen. The caller must
    /// have checked that every row carries `key_column`.
    pub fn group_by_key(
        &self,
        key_column: &str,
        metrics: &[String],
    ) -> AnalysisResult<Vec<(String, HashMap<String, f64>)>> {
        let mut order: Vec<(String, HashMap<String, f64>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for r in &self.rows {
            let key = match r.get(key_column) {
                Some(v) => v.to_string(),
                None => continue,
            };

            let slot = *index.entry(key.clone()).or_insert_with(|| {
                order.push((key, HashMap::new()));
                order.len() - 1
            });

            for m in metrics {
                if let Some(v) = metric_value(r, m)? {
                    *order[slot].1.entry(m.clone()).or_insert(0.0) += v;
                }
            }
        }

        Ok(order)
    }

    /// Reads a headed CSV. Every cell is kept as text so keys such as `007`
    /// survive unchanged; metric readers parse numbers on demand.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers()?.clone();
        let mut rows = Vec::new();

        for record in rdr.records() {
            let record = record?;
            let r: Row = headers
                .iter()
                .zip(record.iter())
                .filter(|(_, cell)| !cell.is_empty())
                .map(|(h, cell)| (h.to_string(), Value::from(cell)))
                .collect();
            rows.push(r);
        }

        Ok(Self { rows })
    }

    pub fn from_csv_path(path: &str) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }
}

impl FromIterator<Row> for Dataset {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_value_parse() {
        assert_eq!(Value::parse("12.5"), Value::Number(12.5));
        assert_eq!(Value::parse("rust book"), Value::Text("rust book".into()));
        assert_eq!(Value::parse("nan"), Value::Text("nan".into()));
    }

    #[test]
    fn test_sum_treats_missing_as_zero() {
        let ds = Dataset::new(vec![
            row([("query", Value::from("a")), ("clicks", Value::from(4.0))]),
            row([("query", Value::from("b"))]),
            row([("query", Value::from("c")), ("clicks", Value::from(6.0))]),
        ]);
        assert_eq!(ds.sum("clicks").unwrap(), 10.0);
    }

    #[test]
    fn test_sum_rejects_text() {
        let ds = Dataset::new(vec![row([("clicks", "many")])]);
        assert!(matches!(
            ds.sum("clicks"),
            Err(AnalysisError::NonNumeric { .. })
        ));
    }

    #[test]
    fn test_require_key() {
        let ds = Dataset::new(vec![row([("query", "a")]), row([("page", "/x")])]);
        let err = ds.require_key("query", Side::Prior).unwrap_err();
        assert_eq!(err.to_string(), "missing column 'query' in prior dataset");
    }

    #[test]
    fn test_require_metric_allows_empty_dataset() {
        assert!(Dataset::empty().require_metric("clicks", Side::Current).is_ok());
        let ds = Dataset::new(vec![row([("query", "a")])]);
        assert!(ds.require_metric("clicks", Side::Current).is_err());
    }

    #[test]
    fn test_group_by_key_sums_duplicates_in_first_seen_order() {
        let ds = Dataset::new(vec![
            row([("query", Value::from("b")), ("clicks", Value::from(1.0))]),
            row([("query", Value::from("a")), ("clicks", Value::from(2.0))]),
            row([("query", Value::from("b")), ("clicks", Value::from(3.0))]),
        ]);
        let grouped = ds.group_by_key("query", &metrics(&["clicks"])).unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, "b");
        assert_eq!(grouped[0].1["clicks"], 4.0);
        assert_eq!(grouped[1].0, "a");
    }

    #[test]
    fn test_from_csv_reader() {
        let data = "query,clicks,ctr\nrust,10,0.5\ncargo,,0.1\n";
        let ds = Dataset::from_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows()[0]["query"], Value::Text("rust".into()));
        assert_eq!(ds.rows()[0]["clicks"], Value::Text("10".into()));
        assert_eq!(ds.sum("clicks").unwrap(), 10.0);
        assert!(!ds.rows()[1].contains_key("clicks"));
    }

    #[test]
    fn test_csv_numeric_looking_keys_stay_distinct() {
        let data = "query,clicks
007,1
7,2
1e3,3
1000,4
nan,5
";
        let ds = Dataset::from_csv_reader(data.as_bytes()).unwrap();
        let grouped = ds.group_by_key("query", &metrics(&["clicks"])).unwrap();
        let keys: Vec<_> = grouped.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["007", "7", "1e3", "1000", "nan"]);
        assert_eq!(grouped[0].1["clicks"], 1.0);
    }

    #[test]
    fn test_text_metric_cells_parse_or_fail() {
        let r = row([("clicks", " 12 "), ("ctr", "n/a"), ("position", "inf")]);
        assert_eq!(metric_value(&r, "clicks").unwrap(), Some(12.0));
        assert!(matches!(
            metric_value(&r, "ctr"),
            Err(AnalysisError::NonNumeric { .. })
        ));
        assert!(metric_value(&r, "position").is_err());
        assert_eq!(metric_value(&r, "impressions").unwrap(), None);
    }
}
