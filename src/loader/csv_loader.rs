use crate::loader::error::LoadError;
use crate::types::frames::wide_frame::WideFrame;
use crate::types::month::YEAR_COLUMN;
use log::{info, warn};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

/// Header pandas writes for an unnamed index column.
const PANDAS_INDEX_HEADER: &str = "Unnamed: 0";

/// How the leading column of the file relates to the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexLayout {
    /// Every column is data.
    None,
    /// The first header cell is empty (or pandas' `Unnamed: 0`): the first column is an index.
    Named,
    /// Every data row has one field more than the header: the first column is an index
    /// without a header cell.
    Implicit,
}

/// Result of the structural pass over the raw text.
struct CsvLayout {
    index: IndexLayout,
    /// Non-blank records, header first.
    records: Vec<String>,
}

/// Parses a comma-separated upload into a [`WideFrame`].
///
/// The first record is the header; a UTF-8 byte-order mark before it is ignored, and quoted
/// cells may span lines. A leading row-index column is recognised and dropped
/// when the header's first cell is empty (`,YEAR,JAN,...`) or when every data row has exactly
/// one field more than the header. Every remaining column except `YEAR` is coerced to
/// `Float64`; empty cells become nulls.
///
/// # Errors
///
/// * [`LoadError::EmptyInput`] when there are no data rows.
/// * [`LoadError::MalformedInput`] when a row has a different number of fields than the
///   others, the header does not match the rows, or a temperature column is not numeric.
/// * [`LoadError::OtherInput`] for any other failure (e.g. invalid UTF-8).
///
/// # Example
///
/// ```
/// use tempcast::{load_bytes, LoadError};
///
/// let wide = load_bytes(b"YEAR,JAN,FEB\n2001,10.0,12.5\n2002,11.0,13.0\n").unwrap();
/// assert_eq!(wide.height(), 2);
///
/// assert!(matches!(load_bytes(b""), Err(LoadError::EmptyInput)));
/// assert!(matches!(
///     load_bytes(b"YEAR,JAN,FEB\n2001,10.0\n2002,11.0,13.0\n"),
///     Err(LoadError::MalformedInput(_))
/// ));
/// ```
pub fn load_bytes(bytes: &[u8]) -> Result<WideFrame, LoadError> {
    let text = std::str::from_utf8(bytes).map_err(|e| LoadError::OtherInput(e.to_string()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let layout = inspect_layout(text)?;

    let mut csv = String::with_capacity(text.len() + 1);
    if layout.index == IndexLayout::Implicit {
        // Give the index column an empty header cell so the header matches the rows.
        csv.push(',');
    }
    for record in &layout.records {
        csv.push_str(record);
        csv.push('\n');
    }

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(Cursor::new(csv.into_bytes()))
        .finish()
        .map_err(classify_polars_error)?;

    if layout.index != IndexLayout::None {
        let names = df.get_column_names_owned();
        warn!("Dropping leading index column '{}'", names[0]);
        df = df
            .select(names.into_iter().skip(1))
            .map_err(classify_polars_error)?;
    }

    if df.height() == 0 {
        return Err(LoadError::EmptyInput);
    }

    let wide = WideFrame::new(coerce_value_columns(&df)?);
    info!(
        "Loaded {} rows with columns {:?}",
        wide.height(),
        wide.column_names()
    );
    Ok(wide)
}

/// Reads a file from disk and parses it with [`load_bytes`].
///
/// # Errors
///
/// [`LoadError::Io`] when the file cannot be read, otherwise the errors of [`load_bytes`].
pub fn load_path(path: impl AsRef<Path>) -> Result<WideFrame, LoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| LoadError::Io(path.to_path_buf(), e))?;
    load_bytes(&bytes)
}

/// Checks that every data row has the same number of fields and works out whether the
/// first column is a row index. Nothing is handed to the CSV parser unless this passes.
fn inspect_layout(text: &str) -> Result<CsvLayout, LoadError> {
    let mut records = split_records(text)
        .into_iter()
        .enumerate()
        .filter(|(_, record)| !record.trim().is_empty());

    let (_, header) = records.next().ok_or(LoadError::EmptyInput)?;
    let header_cells = split_fields(&header);

    let mut kept = Vec::new();
    let mut row_width: Option<usize> = None;
    for (record_idx, record) in records {
        let width = split_fields(&record).len();
        match row_width {
            None => row_width = Some(width),
            Some(expected) if expected != width => {
                return Err(LoadError::MalformedInput(format!(
                    "record {} has {} fields, expected {}",
                    record_idx + 1,
                    width,
                    expected
                )));
            }
            Some(_) => {}
        }
        kept.push(record);
    }

    let row_width = row_width.ok_or(LoadError::EmptyInput)?;
    let index = if row_width == header_cells.len() {
        let first = header_cells[0].trim();
        if first.is_empty() || first == PANDAS_INDEX_HEADER {
            IndexLayout::Named
        } else {
            IndexLayout::None
        }
    } else if row_width == header_cells.len() + 1 {
        IndexLayout::Implicit
    } else {
        return Err(LoadError::MalformedInput(format!(
            "header has {} fields but rows have {}",
            header_cells.len(),
            row_width
        )));
    };

    kept.insert(0, header);
    Ok(CsvLayout {
        index,
        records: kept,
    })
}

/// Splits the text into records on line breaks outside double quotes. A quoted cell may
/// span several lines; a trailing `\r` is dropped from each record.
fn split_records(text: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in text.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            '\n' if !in_quotes => {
                if current.ends_with('\r') {
                    current.pop();
                }
                records.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        records.push(current);
    }
    records
}

/// Splits one record on commas outside double quotes.
fn split_fields(record: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in record.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Casts every column except `YEAR` to `Float64`, refusing non-numeric text.
fn coerce_value_columns(df: &DataFrame) -> Result<DataFrame, LoadError> {
    let columns = df
        .get_columns()
        .iter()
        .map(|column| {
            if column.name().as_str() == YEAR_COLUMN {
                return Ok(column.clone());
            }
            column
                .as_materialized_series()
                .strict_cast(&DataType::Float64)
                .map(Column::from)
                .map_err(|e| {
                    LoadError::MalformedInput(format!(
                        "column '{}' is not numeric: {}",
                        column.name(),
                        e
                    ))
                })
        })
        .collect::<Result<Vec<Column>, LoadError>>()?;
    DataFrame::new(columns).map_err(classify_polars_error)
}

fn classify_polars_error(err: PolarsError) -> LoadError {
    match err {
        PolarsError::NoData(_) => LoadError::EmptyInput,
        e @ (PolarsError::ComputeError(_)
        | PolarsError::ShapeMismatch(_)
        | PolarsError::SchemaMismatch(_)
        | PolarsError::Duplicate(_)) => LoadError::MalformedInput(e.to_string()),
        other => LoadError::OtherInput(other.to_string()),
    }
}
