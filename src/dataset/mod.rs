use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// A single cell of a dataset: a number, a text label, or an empty cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Empty,
}

impl Value {
    /// Numeric view of the cell, if it holds a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Render the cell as a category label. Whole numbers drop the
    /// fractional part so a numeric group code reads as "1", not "1.0".
    pub fn label(&self) -> String {
        match self {
            Value::Number(v) if v.fract() == 0.0 && v.is_finite() => format!("{}", *v as i64),
            Value::Number(v) => format!("{}", v),
            Value::Text(s) => s.clone(),
            Value::Empty => String::new(),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
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

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::Empty => Ok(()),
        }
    }
}

/// An ordered mapping from variable name to a column of values.
///
/// One row per observation: every column shares the same length, enforced
/// when columns are added. Insertion order of the variable names is
/// preserved for presentation.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    data: HashMap<String, Vec<Value>>,
    columns: Vec<String>, // preserves column order
}

impl Dataset {
    pub fn new() -> Self {
        Dataset {
            data: HashMap::new(),
            columns: Vec::new(),
        }
    }

    /// Add a variable (column) to the dataset.
    ///
    /// Fails if the name is already present, or if the column length does
    /// not match the existing row count.
    pub fn add_variable(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if self.data.contains_key(&name) {
            return Err(Error::InvalidInput(format!(
                "variable '{}' already exists in the dataset",
                name
            )));
        }
        if !self.columns.is_empty() && values.len() != self.row_count() {
            return Err(Error::InvalidInput(format!(
                "variable '{}' has {} rows but the dataset has {}",
                name,
                values.len(),
                self.row_count()
            )));
        }
        self.columns.push(name.clone());
        self.data.insert(name, values);
        Ok(())
    }

    /// Add a numeric column.
    pub fn add_numeric(&mut self, name: impl Into<String>, values: &[f64]) -> Result<()> {
        self.add_variable(name, values.iter().map(|&v| Value::Number(v)).collect())
    }

    /// Add a text column.
    pub fn add_text(&mut self, name: impl Into<String>, values: &[&str]) -> Result<()> {
        self.add_variable(name, values.iter().map(|&s| Value::from(s)).collect())
    }

    /// Column values for a variable.
    pub fn variable(&self, name: &str) -> Result<&[Value]> {
        self.data
            .get(name)
            .map(|v| v.as_slice())
            .ok_or_else(|| Error::VariableNotFound(name.to_string()))
    }

    /// Variable names in insertion order.
    pub fn variable_names(&self) -> &[String] {
        &self.columns
    }

    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    /// Number of observations (rows).
    pub fn row_count(&self) -> usize {
        self.columns
            .first()
            .and_then(|c| self.data.get(c))
            .map_or(0, |v| v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// A variable's column as f64 samples.
    ///
    /// Fails if any cell is non-numeric; statistical tests never silently
    /// coerce labels or empty cells.
    pub fn numeric(&self, name: &str) -> Result<Vec<f64>> {
        let values = self.variable(name)?;
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_number().ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "variable '{}' holds a non-numeric value at row {}",
                        name, i
                    ))
                })
            })
            .collect()
    }
}
