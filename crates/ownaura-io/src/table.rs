//! Delimited text tables.
//!
//! Reads the early-reflection export of the room simulation and writes
//! result tables as CSV.

use crate::{Error, Result};
use ownaura_core::ReflectionLevels;
use std::fs;
use std::path::Path;

/// Non-blank lines preceding the column header in an early-reflection export.
const HEADER_ROW: usize = 3;
/// Column of the arrival time in milliseconds.
const TIME_COLUMN: usize = 2;
/// First of the eight octave-band SPL columns (63 Hz to 8 kHz).
const FIRST_BAND_COLUMN: usize = 3;

/// Parse a number written with a decimal comma or point.
fn parse_number(field: &str, line: usize) -> Result<f64> {
    let normalized = field.trim().replace(',', ".");
    normalized.parse::<f64>().map_err(|_| Error::Parse {
        line,
        message: format!("'{}' is not a number", field.trim()),
    })
}

fn parse_reflection_row(fields: &[&str], line: usize) -> Result<(f64, [f64; 8])> {
    if fields.len() < FIRST_BAND_COLUMN + 8 {
        return Err(Error::Parse {
            line,
            message: format!(
                "expected at least {} columns, found {}",
                FIRST_BAND_COLUMN + 8,
                fields.len()
            ),
        });
    }
    let time_ms = parse_number(fields[TIME_COLUMN], line)?;
    let mut levels = [0.0; 8];
    for (level, field) in levels.iter_mut().zip(&fields[FIRST_BAND_COLUMN..]) {
        *level = parse_number(field, line)?;
    }
    Ok((time_ms, levels))
}

/// Parse the text of an early-reflection export.
///
/// The file is tab-separated with a decimal comma. After three lines of
/// preamble comes the column header; the first data row is the direct sound
/// and the second the first reflection. Column 2 holds the arrival time in
/// milliseconds and columns 3 to 10 the octave-band levels.
pub fn parse_early_reflections(text: &str) -> Result<ReflectionLevels> {
    let mut rows = text
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .skip(HEADER_ROW + 1)
        .map(|(i, l)| (i + 1, l.split('\t').collect::<Vec<_>>()));

    let missing = |what: &str| Error::Parse {
        line: text.lines().count(),
        message: format!("missing {what} row"),
    };
    let (direct_line, direct) = rows.next().ok_or_else(|| missing("direct sound"))?;
    let (reflection_line, reflection) = rows.next().ok_or_else(|| missing("first reflection"))?;

    let (_, direct_db) = parse_reflection_row(&direct, direct_line)?;
    let (delay_ms, reflected_db) = parse_reflection_row(&reflection, reflection_line)?;
    if delay_ms <= 0.0 {
        return Err(Error::Parse {
            line: reflection_line,
            message: format!("reflection arrival time {delay_ms} ms must be positive"),
        });
    }

    Ok(ReflectionLevels {
        direct_db,
        reflected_db,
        delay_seconds: delay_ms / 1000.0,
    })
}

/// Read an early-reflection export from disk.
pub fn read_early_reflections<P: AsRef<Path>>(path: P) -> Result<ReflectionLevels> {
    let text = fs::read_to_string(path)?;
    parse_early_reflections(&text)
}

/// Format a value for a result table; missing values print as `nan`.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v}"),
        None => "nan".to_string(),
    }
}

/// A result table with a header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Column names.
    pub header: Vec<String>,
    /// Data rows, each as long as the header.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// An empty table with the given columns.
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Append a row.
    ///
    /// # Errors
    ///
    /// Fails if the row length differs from the header length.
    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.header.len() {
            return Err(Error::Parse {
                line: self.rows.len() + 2,
                message: format!(
                    "row has {} fields, header has {}",
                    row.len(),
                    self.header.len()
                ),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Render as CSV with RFC 4180 quoting and CRLF line endings.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for row in std::iter::once(&self.header).chain(&self.rows) {
            let line: Vec<String> = row.iter().map(|f| quote(f)).collect();
            out.push_str(&line.join(","));
            out.push_str("\r\n");
        }
        out
    }

    /// Write as CSV.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_csv())?;
        Ok(())
    }
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
