//! # Draws Table I/O
//!
//! Reads and writes sampler draws tables as CSV.
//!
//! ## Reading
//!
//! - Lines starting with `#` (CmdStan configuration and adaptation
//!   comments) and blank lines are skipped.
//! - The first remaining line is the header. Coordinate column names
//!   contain commas (`xi[1,2]`), so fields may be double-quoted, with `""`
//!   as an escaped quote.
//! - Every data field must parse as `f64` (`nan`/`inf` included).
//!
//! ## Writing
//!
//! Header in table order, fields quoted only when they contain a comma or
//! a quote, values in shortest round-trip `f64` form.

use std::path::{Path, PathBuf};

use lsirt_core::{DrawsTable, TableError};

/// Errors reading or writing a draws CSV.
#[derive(Debug, thiserror::Error)]
pub enum DrawsIoError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("draws file has no header line")]
    MissingHeader,
    #[error("line {line}: unterminated quoted field")]
    UnterminatedQuote { line: usize },
    #[error("line {line}: expected {expected} fields, found {actual}")]
    Ragged {
        line: usize,
        expected: usize,
        actual: usize,
    },
    #[error("line {line}: column \"{column}\": cannot parse \"{value}\" as a number")]
    BadNumber {
        line: usize,
        column: String,
        value: String,
    },
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Read a draws CSV file.
pub fn read_draws_csv(path: &Path, chain_column: &str) -> Result<DrawsTable, DrawsIoError> {
    let content = std::fs::read_to_string(path).map_err(|source| DrawsIoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_draws_csv(&content, chain_column)?;
    tracing::debug!(
        path = %path.display(),
        rows = table.n_rows(),
        columns = table.n_columns(),
        "read draws table"
    );
    Ok(table)
}

/// Parse draws CSV text.
pub fn parse_draws_csv(content: &str, chain_column: &str) -> Result<DrawsTable, DrawsIoError> {
    let mut records = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'));

    let (header_line, header) = records.next().ok_or(DrawsIoError::MissingHeader)?;
    let names = split_record(header, header_line)?;
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

    for (line, record) in records {
        let fields = split_record(record, line)?;
        if fields.len() != names.len() {
            return Err(DrawsIoError::Ragged {
                line,
                expected: names.len(),
                actual: fields.len(),
            });
        }
        for ((field, column), name) in fields.iter().zip(columns.iter_mut()).zip(&names) {
            let value = field.trim().parse::<f64>().map_err(|_| DrawsIoError::BadNumber {
                line,
                column: name.clone(),
                value: field.clone(),
            })?;
            column.push(value);
        }
    }

    Ok(DrawsTable::new(chain_column, names.into_iter().zip(columns))?)
}

/// Write a draws table as CSV.
pub fn write_draws_csv(path: &Path, table: &DrawsTable) -> Result<(), DrawsIoError> {
    std::fs::write(path, render_draws_csv(table)).map_err(|source| DrawsIoError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Render a draws table as CSV text.
pub fn render_draws_csv(table: &DrawsTable) -> String {
    let mut out = String::new();
    let header: Vec<String> = table.column_names().map(quote_field).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in 0..table.n_rows() {
        for (k, value) in table.row(row).enumerate() {
            if k > 0 {
                out.push(',');
            }
            out.push_str(&value.to_string());
        }
        out.push('\n');
    }
    out
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split one CSV record, honouring double quotes.
fn split_record(record: &str, line: usize) -> Result<Vec<String>, DrawsIoError> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = record.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            ('"', true) => quoted = false,
            ('"', false) if field.is_empty() => quoted = true,
            (',', false) => fields.push(std::mem::take(&mut field)),
            (c, _) => field.push(c),
        }
    }
    if quoted {
        return Err(DrawsIoError::UnterminatedQuote { line });
    }
    fields.push(field);
    Ok(fields)
}
