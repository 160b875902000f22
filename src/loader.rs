//! Delimited-text loading.
//!
//! Turns rows of an auction export into [`Record`]s and feeds them to a
//! store. Rows that cannot produce a well-formed record, and rows repeating
//! a key already loaded from the same input, are skipped and counted; only
//! I/O failures abort a load.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};

use crate::error::LoadError;
use crate::util::parse_amount;
use crate::{Record, RecordStore};

/// Column positions and framing of the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvLayout {
    pub key_column: usize,
    pub title_column: usize,
    pub category_column: usize,
    pub amount_column: usize,
    pub delimiter: char,
    /// Whether the first line is a header row.
    pub has_header: bool,
}

impl Default for CsvLayout {
    /// The monthly sales export: title, id, ..., winning bid at 4, fund at 8.
    fn default() -> Self {
        Self {
            key_column: 1,
            title_column: 0,
            category_column: 8,
            amount_column: 4,
            delimiter: ',',
            has_header: true,
        }
    }
}

/// Outcome of a load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub loaded: usize,
    /// Malformed rows.
    pub skipped: usize,
    /// Rows whose key was already loaded earlier in the same input.
    pub duplicates: usize,
    /// Header fields, when the layout has a header row.
    pub header: Vec<String>,
}

/// Split one line into fields.
///
/// Fields may be wrapped in double quotes; inside quotes the delimiter is
/// data and `""` is a literal quote. An unterminated quote runs to the end of
/// the line.
pub fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            c if c == delimiter && !in_quotes => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Build a record from one row's fields.
pub fn parse_row(fields: &[String], layout: &CsvLayout, line: usize) -> Result<Record, LoadError> {
    let column = |index: usize, name: &str| {
        fields
            .get(index)
            .map(|f| f.trim())
            .ok_or_else(|| LoadError::Parse {
                line,
                message: format!("missing {name} column {index} ({} fields)", fields.len()),
            })
    };

    let key = column(layout.key_column, "key")?;
    if key.is_empty() {
        return Err(LoadError::Parse {
            line,
            message: "empty key".to_string(),
        });
    }

    Ok(Record {
        key: key.to_string(),
        title: column(layout.title_column, "title")?.to_string(),
        category: column(layout.category_column, "category")?.to_string(),
        amount: parse_amount(column(layout.amount_column, "amount")?),
    })
}

/// Read every record from `reader`, calling `sink` once per record.
///
/// Blank lines are ignored. A byte order mark at the start of the input is
/// dropped. Malformed rows are logged and counted as skipped; a row whose key
/// was already read from this input is logged and counted as a duplicate.
pub fn read_records<R: BufRead>(
    reader: R,
    layout: &CsvLayout,
    source: &Path,
    mut sink: impl FnMut(Record),
) -> Result<LoadSummary, LoadError> {
    let mut summary = LoadSummary::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| LoadError::io(source, e))?;
        let line_no = idx + 1;
        let mut line = line.trim_end_matches('\r');
        if idx == 0 {
            line = line.strip_prefix('\u{feff}').unwrap_or(line);
        }

        if idx == 0 && layout.has_header {
            summary.header = split_fields(line, layout.delimiter);
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        match parse_row(&split_fields(line, layout.delimiter), layout, line_no) {
            Ok(record) => {
                if !seen.insert(record.key.clone()) {
                    warn!(
                        "{}: skipping line {line_no}: duplicate key {}",
                        source.display(),
                        record.key
                    );
                    summary.duplicates += 1;
                    continue;
                }
                sink(record);
                summary.loaded += 1;
            }
            Err(e) => {
                warn!("{}: skipping row: {e}", source.display());
                summary.skipped += 1;
            }
        }
    }

    Ok(summary)
}

/// Parse `reader` into a vector of records.
pub fn load_records<R: BufRead>(reader: R, layout: &CsvLayout) -> Result<Vec<Record>, LoadError> {
    let mut records = Vec::new();
    read_records(reader, layout, Path::new("<input>"), |r| records.push(r))?;
    Ok(records)
}

/// Load the file at `path` into `store`.
pub fn load_file<S: RecordStore + ?Sized>(
    path: impl AsRef<Path>,
    layout: &CsvLayout,
    store: &mut S,
) -> Result<LoadSummary, LoadError> {
    let path = path.as_ref();
    info!("loading {} into {}", path.display(), store.backend_name());

    let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
    let summary = read_records(BufReader::new(file), layout, path, |r| store.insert(r))?;

    info!(
        "loaded {} records from {} ({} skipped, {} duplicates)",
        summary.loaded,
        path.display(),
        summary.skipped,
        summary.duplicates
    );
    Ok(summary)
}
