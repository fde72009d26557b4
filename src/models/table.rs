use chrono::NaiveDateTime;
use strsim::jaro_winkler;

use crate::error::{Result, SelectorError};

/// A named column of numeric values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// Time-indexed table of numeric columns, rows ordered oldest first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataTable {
    index: Vec<NaiveDateTime>,
    columns: Vec<Column>,
}

impl DataTable {
    /// Create an empty table over the given time index.
    pub fn new(index: Vec<NaiveDateTime>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    /// Add a column, or replace an existing one with the same name.
    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if values.len() != self.index.len() {
            return Err(SelectorError::config(format!(
                "column '{}' has {} values but the table has {} rows",
                name,
                values.len(),
                self.index.len()
            )));
        }

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(Column { name, values }),
        }
        Ok(())
    }

    /// Builder-style variant of [`DataTable::add_column`].
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        self.add_column(name, values)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Look up a column by exact name, suggesting close matches on a miss.
    pub fn column(&self, name: &str) -> Result<&[f64]> {
        if let Some(col) = self.columns.iter().find(|c| c.name == name) {
            return Ok(&col.values);
        }

        let mut candidates: Vec<(&str, f64)> = self
            .columns
            .iter()
            .map(|c| {
                (
                    c.name.as_str(),
                    jaro_winkler(&c.name.to_lowercase(), &name.to_lowercase()),
                )
            })
            .filter(|(_, score)| *score > 0.7)
            .collect();
        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let hint = match candidates.first() {
            Some((suggestion, _)) => format!(" (did you mean '{}'?)", suggestion),
            None => String::new(),
        };
        Err(SelectorError::config(format!(
            "unknown column '{}'{}",
            name, hint
        )))
    }

    /// Whether the index is sorted oldest first.
    pub fn is_time_ordered(&self) -> bool {
        self.index.is_sorted()
    }

    /// Rows from positional `offset` to the end.
    pub fn slice_from(&self, offset: usize) -> DataTable {
        let start = offset.min(self.len());
        DataTable {
            index: self.index[start..].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: c.values[start..].to_vec(),
                })
                .collect(),
        }
    }

    /// Rows whose timestamp is at or after `start`.
    pub fn filter_from(&self, start: NaiveDateTime) -> DataTable {
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| self.index[i] >= start)
            .collect();
        self.take_rows(&keep)
    }

    /// Number of rows at or after `start`.
    pub fn count_from(&self, start: NaiveDateTime) -> usize {
        self.index.iter().filter(|ts| **ts >= start).count()
    }

    fn take_rows(&self, rows: &[usize]) -> DataTable {
        DataTable {
            index: rows.iter().map(|&i| self.index[i]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: rows.iter().map(|&i| c.values[i]).collect(),
                })
                .collect(),
        }
    }

    /// Row-major feature matrix for the given rows. An empty feature list
    /// yields empty rows.
    pub fn feature_rows(&self, features: &[String], rows: &[usize]) -> Result<Vec<Vec<f64>>> {
        let cols = features
            .iter()
            .map(|f| self.column(f))
            .collect::<Result<Vec<_>>>()?;

        Ok(rows
            .iter()
            .map(|&r| cols.iter().map(|c| c[r]).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn sample_table() -> DataTable {
        DataTable::new((1..=5).map(ts).collect())
            .with_column("label", vec![1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap()
            .with_column("feature", vec![10.0, 20.0, 30.0, 40.0, 50.0])
            .unwrap()
    }

    #[test]
    fn test_add_column_length_mismatch() {
        let mut table = sample_table();
        let err = table.add_column("short", vec![1.0]).unwrap_err();
        assert!(matches!(err, SelectorError::Configuration(_)));
    }

    #[test]
    fn test_add_column_replaces_existing() {
        let mut table = sample_table();
        table.add_column("label", vec![0.0; 5]).unwrap();
        assert_eq!(table.columns().len(), 2);
        assert_eq!(table.column("label").unwrap(), &[0.0; 5]);
    }

    #[test]
    fn test_slice_from_offset() {
        let table = sample_table();
        let sliced = table.slice_from(2);
        assert_eq!(sliced.len(), 3);
        assert_eq!(sliced.index()[0], ts(3));
        assert_eq!(sliced.column("feature").unwrap(), &[30.0, 40.0, 50.0]);

        assert!(table.slice_from(99).is_empty());
    }

    #[test]
    fn test_filter_from_timestamp() {
        let table = sample_table();
        let filtered = table.filter_from(ts(4));
        assert_eq!(filtered.len(), 2);
        assert!(filtered.index().iter().all(|t| *t >= ts(4)));
        assert_eq!(table.count_from(ts(4)), 2);
    }

    #[test]
    fn test_unknown_column_suggests_match() {
        let table = sample_table();
        let err = table.column("featur").unwrap_err();
        assert!(err.to_string().contains("did you mean 'feature'"));
    }

    #[test]
    fn test_feature_rows() {
        let table = sample_table();
        let rows = table
            .feature_rows(&["feature".to_string(), "label".to_string()], &[0, 4])
            .unwrap();
        assert_eq!(rows, vec![vec![10.0, 1.0], vec![50.0, 5.0]]);

        let empty = table.feature_rows(&[], &[0, 1]).unwrap();
        assert_eq!(empty, vec![Vec::<f64>::new(), Vec::new()]);
    }

    #[test]
    fn test_time_ordering() {
        let table = sample_table();
        assert!(table.is_time_ordered());

        let reversed = DataTable::new(vec![ts(2), ts(1)]);
        assert!(!reversed.is_time_ordered());
    }
}
