//! Excel (.xlsx) dataset loading and result-table export.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::info;
use simple_excel_writer::{Row, Workbook};

use crate::dataset::{Dataset, Value};
use crate::error::{Error, Result};
use crate::io::normalize_ascii;
use crate::table::{Cell, ResultTable};

fn cell_to_value(cell: &DataType) -> Value {
    match cell {
        DataType::Empty => Value::Empty,
        DataType::Int(i) => Value::Number(*i as f64),
        DataType::Float(f) => Value::Number(*f),
        DataType::Bool(b) => Value::Number(if *b { 1.0 } else { 0.0 }),
        DataType::String(s) => {
            let s = normalize_ascii(s);
            if s.is_empty() {
                Value::Empty
            } else {
                Value::Text(s)
            }
        }
        DataType::Error(_) => Value::Empty,
        other => Value::Text(normalize_ascii(&other.to_string())),
    }
}

/// Load a dataset from an .xlsx file.
///
/// Only the first sheet is read; its first row supplies the variable
/// names, every following row is one observation. Short rows are padded
/// with empty cells so all columns stay the same length.
pub fn read_excel<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let mut workbook: Xlsx<BufReader<File>> = open_workbook(path.as_ref())
        .map_err(|e| Error::DataSource(format!("could not open Excel file: {}", e)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .ok_or_else(|| Error::DataSource("Excel file has no sheets".to_string()))?
        .clone();

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| Error::DataSource(format!("could not read sheet '{}': {}", sheet_name, e)))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| Error::DataSource(format!("sheet '{}' has no header row", sheet_name)))?;

    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = normalize_ascii(&cell.to_string());
            if name.is_empty() {
                format!("Column{}", i + 1)
            } else {
                name
            }
        })
        .collect();

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (i, column) in columns.iter_mut().enumerate() {
            column.push(row.get(i).map_or(Value::Empty, cell_to_value));
        }
    }

    let mut data = Dataset::new();
    for (name, values) in headers.into_iter().zip(columns) {
        data.add_variable(name.clone(), values)
            .map_err(|_| Error::DataSource(format!("duplicate column '{}' in sheet", name)))?;
    }
    Ok(data)
}

/// Export a result table to a single-sheet .xlsx file, one worksheet row
/// per table row. An existing file at `path` is overwritten.
pub fn write_results<P: AsRef<Path>>(table: &ResultTable, path: P) -> Result<()> {
    let path_str = path
        .as_ref()
        .to_str()
        .ok_or_else(|| Error::DataSource("file path is not valid UTF-8".to_string()))?;
    let mut workbook = Workbook::create(path_str);
    let mut sheet = workbook.create_sheet("Results");

    workbook
        .write_sheet(&mut sheet, |sheet_writer| {
            sheet_writer.append_row(make_row(
                table.header().iter().map(|h| Cell::text(h.clone())),
            ))?;
            for row in table.rows() {
                sheet_writer.append_row(make_row(row.iter().cloned()))?;
            }
            Ok(())
        })
        .map_err(|e| Error::DataSource(format!("could not write Excel sheet: {}", e)))?;

    workbook
        .close()
        .map_err(|e| Error::DataSource(format!("could not save Excel file: {}", e)))?;
    info!("result table saved to {}", path_str);
    Ok(())
}

fn make_row(cells: impl Iterator<Item = Cell>) -> Row {
    let mut row = Row::new();
    for cell in cells {
        match cell {
            Cell::Number(v) => row.add_cell(v),
            Cell::Text(s) => row.add_cell(s),
            Cell::Empty => row.add_cell(String::new()),
        }
    }
    row
}
