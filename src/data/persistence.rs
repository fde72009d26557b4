use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Result, SelectorError};
use crate::models::DataTable;

/// Header of the index column in table CSV files.
pub const INDEX_COLUMN: &str = "timestamp";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accepts `YYYY-MM-DD HH:MM:SS`, the ISO `T` form, or a bare date.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        return Ok(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")?;
    Ok(date.and_time(NaiveTime::default()))
}

/// Load a table from CSV. The first column is the time index, every other
/// column must be numeric.
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<DataTable> {
    let mut rdr = csv::Reader::from_path(path)?;
    let headers = rdr.headers()?.clone();
    let names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut index = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let raw_ts = record.get(0).ok_or_else(|| {
            SelectorError::config(format!("row {} has no {} value", row + 1, INDEX_COLUMN))
        })?;
        index.push(parse_timestamp(raw_ts)?);

        for (col, name) in names.iter().enumerate() {
            let raw = record.get(col + 1).unwrap_or("").trim();
            let value = raw.parse::<f64>().map_err(|_| {
                SelectorError::config(format!(
                    "row {} column '{}': '{}' is not a number",
                    row + 1,
                    name,
                    raw
                ))
            })?;
            values[col].push(value);
        }
    }

    let mut table = DataTable::new(index);
    for (name, column) in names.into_iter().zip(values) {
        table.add_column(name, column)?;
    }
    Ok(table)
}

/// Save a table as CSV with the index first.
pub fn save_table<P: AsRef<Path>>(path: P, table: &DataTable) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec![INDEX_COLUMN.to_string()];
    header.extend(table.column_names());
    wtr.write_record(&header)?;

    for (row, ts) in table.index().iter().enumerate() {
        let mut record = vec![ts.format(TIMESTAMP_FORMAT).to_string()];
        record.extend(table.columns().iter().map(|c| c.values[row].to_string()));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
