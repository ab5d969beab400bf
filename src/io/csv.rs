//! CSV dataset loading and result-table export.

use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use log::info;

use crate::dataset::{Dataset, Value};
use crate::error::{Error, Result};
use crate::io::normalize_ascii;
use crate::table::{Cell, ResultTable};

/// Load a dataset from a CSV file with a header row.
///
/// A column whose every cell parses as a number becomes numeric; anything
/// else stays text. Blank cells load as empty.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path.as_ref())
        .map_err(|e| Error::DataSource(format!("could not open CSV file: {}", e)))?;

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| Error::DataSource(format!("could not read CSV header: {}", e)))?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let name = normalize_ascii(h);
            if name.is_empty() {
                format!("Column{}", i + 1)
            } else {
                name
            }
        })
        .collect();

    let mut columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in rdr.records() {
        let record = record.map_err(|e| Error::DataSource(format!("malformed CSV row: {}", e)))?;
        for (i, column) in columns.iter_mut().enumerate() {
            column.push(record.get(i).map_or_else(String::new, |s| s.to_string()));
        }
    }

    let mut data = Dataset::new();
    for (name, raw) in headers.into_iter().zip(columns) {
        data.add_variable(name.clone(), infer_column(&raw))
            .map_err(|_| Error::DataSource(format!("duplicate column '{}' in CSV", name)))?;
    }
    Ok(data)
}

fn infer_column(raw: &[String]) -> Vec<Value> {
    let numeric = raw
        .iter()
        .all(|s| s.is_empty() || s.parse::<f64>().is_ok());
    raw.iter()
        .map(|s| {
            if s.is_empty() {
                Value::Empty
            } else if numeric {
                Value::Number(s.parse::<f64>().unwrap_or_default())
            } else {
                Value::Text(normalize_ascii(s))
            }
        })
        .collect()
}

/// Export a result table to a CSV file, header first. An existing file at
/// `path` is overwritten.
pub fn write_results_csv<P: AsRef<Path>>(table: &ResultTable, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path.as_ref())?;
    wtr.write_record(table.header())?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(|cell| match cell {
            Cell::Number(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Empty => String::new(),
        }))?;
    }
    wtr.flush()?;
    info!("result table saved to {}", path.as_ref().display());
    Ok(())
}
