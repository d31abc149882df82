//! Observation tables loaded from CSV.
//!
//! A table is a header plus rows of string cells. Columns are typed lazily:
//! a grouping column is read as labels, a measurement column is parsed into
//! `Option<f64>` with the usual missing-value tokens mapped to `None`.
//!
//! # Format
//!
//! - first record is the header
//! - `,` separator, `"` quoting with `""` as an escaped quote
//! - quoted fields may span lines
//! - LF or CRLF line endings, optional UTF-8 BOM, blank lines ignored

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use csv::{ErrorKind, ReaderBuilder, StringRecord};

use serde::Serialize;

use crate::error::{Result, SefError};

/// Cell values treated as missing in measurement columns (case-insensitive).
pub const MISSING_TOKENS: &[&str] = &["", "na", "n/a", "nan", "null", "none"];

/// A label and the number of rows carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub rows: usize,
}

/// Coverage of one column, used by `inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub numeric: usize,
    pub missing: usize,
    pub text: usize,
}

impl ColumnProfile {
    /// A column is numeric when every non-missing cell parses as a number.
    pub fn is_numeric(&self) -> bool {
        self.text == 0 && self.numeric > 0
    }
}

/// Header plus string rows. Every row has exactly one cell per column.
///
/// Each row remembers the line it started on in its source file so that
/// errors point at the right place after blank lines or multi-line fields.
/// Equality compares header and cells only.
#[derive(Debug, Clone, Default)]
pub struct ObservationTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    lines: Vec<usize>,
}

impl PartialEq for ObservationTable {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns && self.rows == other.rows
    }
}

impl ObservationTable {
    /// Create an empty table with the given header.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            lines: Vec::new(),
        }
    }

    fn next_line(&self) -> usize {
        self.lines.last().map_or(2, |l| l + 1)
    }

    /// Append a row. Fails if the cell count does not match the header.
    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        let line = self.next_line();
        if row.len() != self.columns.len() {
            return Err(SefError::Parse {
                line,
                message: format!(
                    "expected {} field(s), found {}",
                    self.columns.len(),
                    row.len()
                ),
            });
        }
        self.rows.push(row);
        self.lines.push(line);
        Ok(())
    }

    /// Load a CSV file.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SefError::io(path, e))?;
        let mut text = String::new();
        BufReader::new(file)
            .read_to_string(&mut text)
            .map_err(|e| SefError::io(path, e))?;
        let table = Self::from_csv_str(&text)?;
        log::debug!(
            "loaded {} row(s) x {} column(s) from {}",
            table.len(),
            table.columns.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse CSV text.
    pub fn from_csv_str(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());
        let header = reader.headers().map_err(parse_error)?;
        if header.is_empty() {
            return Err(SefError::Parse {
                line: 1,
                message: "missing header row".to_string(),
            });
        }
        let mut table = Self::new(header.iter().map(|h| h.trim().to_string()).collect());
        for record in reader.records() {
            let record = record.map_err(parse_error)?;
            let line = record_line(&record).unwrap_or_else(|| table.next_line());
            table.rows.push(record.iter().map(str::to_string).collect());
            table.lines.push(line);
        }
        Ok(table)
    }

    /// Write the table as CSV.
    pub fn write_csv<W: Write>(&self, out: W) -> std::io::Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()
    }

    /// Write the table as CSV to a file.
    pub fn write_csv_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| SefError::io(path, e))?;
        self.write_csv(BufWriter::new(file))
            .map_err(|e| SefError::io(path, e))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Position of a column in the header.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| SefError::MissingColumn(name.to_string()))
    }

    /// Distinct values of a column with row counts, in first-seen order.
    pub fn distinct_labels(&self, column: &str) -> Result<Vec<LabelCount>> {
        let idx = self.column_index(column)?;
        let mut counts: Vec<LabelCount> = Vec::new();
        for row in &self.rows {
            let label = &row[idx];
            match counts.iter_mut().find(|c| &c.label == label) {
                Some(c) => c.rows += 1,
                None => counts.push(LabelCount {
                    label: label.clone(),
                    rows: 1,
                }),
            }
        }
        Ok(counts)
    }

    /// Rows whose `column` equals `label` exactly. An absent label yields an
    /// empty table.
    pub fn filter_by_label(&self, column: &str, label: &str) -> Result<ObservationTable> {
        let idx = self.column_index(column)?;
        let mut out = ObservationTable::new(self.columns.clone());
        for (row, &line) in self.rows.iter().zip(&self.lines) {
            if row[idx] == label {
                out.rows.push(row.clone());
                out.lines.push(line);
            }
        }
        Ok(out)
    }

    /// Parse a measurement column. Missing tokens map to `None`; any other
    /// non-numeric cell is a parse error.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .zip(&self.lines)
            .map(|(row, &line)| {
                parse_cell(&row[idx]).map_err(|cell| SefError::Parse {
                    line,
                    message: format!("column '{name}': '{cell}' is not numeric"),
                })
            })
            .collect()
    }

    /// Valid values of a measurement column, missing cells dropped.
    pub fn measurements(&self, name: &str) -> Result<Vec<f64>> {
        let cells = self.numeric_column(name)?;
        let total = cells.len();
        let values: Vec<f64> = cells.into_iter().flatten().collect();
        if values.len() < total {
            log::warn!(
                "column '{name}': dropped {} missing cell(s) of {total}",
                total - values.len()
            );
        }
        Ok(values)
    }

    /// Per-column numeric/missing/text cell counts.
    pub fn profile(&self) -> Vec<ColumnProfile> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let mut p = ColumnProfile {
                    name: name.clone(),
                    numeric: 0,
                    missing: 0,
                    text: 0,
                };
                for row in &self.rows {
                    match parse_cell(&row[idx]) {
                        Ok(Some(_)) => p.numeric += 1,
                        Ok(None) => p.missing += 1,
                        Err(_) => p.text += 1,
                    }
                }
                p
            })
            .collect()
    }

    /// Append all rows of `other`, which must share this table's header.
    pub fn extend(&mut self, other: &ObservationTable) -> Result<()> {
        if other.columns != self.columns {
            return Err(SefError::Config(
                "cannot concatenate tables with different headers".to_string(),
            ));
        }
        self.rows.extend(other.rows.iter().cloned());
        self.lines.extend(other.lines.iter().copied());
        Ok(())
    }
}

/// Parse one cell: `Ok(None)` for a missing token, `Err(cell)` for text.
fn parse_cell(cell: &str) -> std::result::Result<Option<f64>, &str> {
    let trimmed = cell.trim();
    if MISSING_TOKENS
        .iter()
        .any(|t| trimmed.eq_ignore_ascii_case(t))
    {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        Ok(_) => Ok(None),
        Err(_) => Err(cell),
    }
}

/// 1-based line on which a record starts.
fn record_line(record: &StringRecord) -> Option<usize> {
    record.position().map(|p| p.line() as usize)
}

fn parse_error(err: csv::Error) -> SefError {
    let line = err.position().map_or(1, |p| p.line() as usize);
    let message = match err.kind() {
        ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} field(s), found {len}"),
        _ => err.to_string(),
    };
    SefError::Parse { line, message }
}
