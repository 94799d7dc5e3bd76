//! Minimal CSV tables for the report files.
//!
//! Values are written the way the analysis notebooks expect them: whole
//! floats keep a `.0`, booleans are `True`/`False`, missing values are empty.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::{self, Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Missing,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Text(s) => write!(f, "{}", s),
            Field::Int(i) => write!(f, "{}", i),
            Field::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            Field::Float(x) => write!(f, "{}", x),
            Field::Bool(true) => write!(f, "True"),
            Field::Bool(false) => write!(f, "False"),
            Field::Missing => Ok(()),
        }
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Field::Text(s.to_string())
    }
}

impl From<String> for Field {
    fn from(s: String) -> Self {
        Field::Text(s)
    }
}

impl From<i64> for Field {
    fn from(i: i64) -> Self {
        Field::Int(i)
    }
}

impl From<u64> for Field {
    fn from(i: u64) -> Self {
        Field::Int(i as i64)
    }
}

impl From<usize> for Field {
    fn from(i: usize) -> Self {
        Field::Int(i as i64)
    }
}

impl From<u32> for Field {
    fn from(i: u32) -> Self {
        Field::Int(i as i64)
    }
}

impl From<f64> for Field {
    fn from(x: f64) -> Self {
        Field::Float(x)
    }
}

impl From<bool> for Field {
    fn from(b: bool) -> Self {
        Field::Bool(b)
    }
}

impl<T: Into<Field>> From<Option<T>> for Field {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Field::Missing)
    }
}

fn quote(cell: &str) -> String {
    if cell.contains(|c| c == ',' || c == '"' || c == '\n' || c == '\r') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Table with a fixed header; every row must have one field per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<Field>>,
}

impl Table {
    pub fn new(header: &[&str]) -> Table {
        Table {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Field>) {
        debug_assert_eq!(row.len(), self.header.len());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let line = |cells: Vec<String>| cells.iter().map(|c| quote(c)).collect::<Vec<_>>().join(",");
        out.push_str(&line(self.header.clone()));
        out.push('\n');
        for row in self.rows.iter() {
            out.push_str(&line(row.iter().map(|f| f.to_string()).collect()));
            out.push('\n');
        }
        out
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        error::write(path, &self.to_text())
    }
}

/// Splits one line into cells, honouring double quotes.
fn split_line(line: &str) -> Option<Vec<String>> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                chars.next();
                cell.push('"');
            }
            ('"', true) => quoted = false,
            ('"', false) if cell.is_empty() => quoted = true,
            (',', false) => cells.push(std::mem::take(&mut cell)),
            (c, _) => cell.push(c),
        }
    }
    if quoted {
        return None;
    }
    cells.push(cell);
    Some(cells)
}

/// One data row, addressed by column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record(HashMap<String, String>);

impl Record {
    /// The cell of `column`; `None` for unknown columns and empty cells.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(|s| s.as_str()).filter(|s| !s.is_empty())
    }

    pub fn parse<T: std::str::FromStr>(&self, column: &str) -> Option<T> {
        self.get(column).and_then(|s| s.parse().ok())
    }
}

pub fn parse(text: &str, path: &Path) -> Result<Vec<Record>> {
    let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
    let header = match lines.next() {
        Some((n, line)) => split_line(line).ok_or_else(|| Error::Csv {
            path: path.to_path_buf(),
            line: n + 1,
            reason: "unterminated quote".to_string(),
        })?,
        None => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    for (n, line) in lines {
        let cells = split_line(line).ok_or_else(|| Error::Csv {
            path: path.to_path_buf(),
            line: n + 1,
            reason: "unterminated quote".to_string(),
        })?;
        if cells.len() != header.len() {
            return Err(Error::Csv {
                path: path.to_path_buf(),
                line: n + 1,
                reason: format!("expected {} fields, found {}", header.len(), cells.len()),
            });
        }
        records.push(Record(header.iter().cloned().zip(cells).collect()));
    }
    Ok(records)
}

pub fn read(path: &Path) -> Result<Vec<Record>> {
    let text = error::read_to_string(path)?;
    parse(&text, path)
}
