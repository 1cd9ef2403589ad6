//! Delimited file reading under an input definition's declared settings.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use encoding_rs::Encoding;
use tabula_model::InputDefinition;

use crate::error::{FileKind, IngestError, Result};

/// Decoded cells of an input file, before any schema check.
///
/// Cells are trimmed and a leading byte-order mark is removed. Records keep
/// their original widths; short or long records are the validator's concern.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    headers: Option<Vec<String>>,
    records: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Option<Vec<String>>, records: Vec<Vec<String>>) -> Self {
        Self { headers, records }
    }

    /// The header row, when the file declares one.
    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    pub fn records(&self) -> &[Vec<String>] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Vec<String>> {
        self.records
    }

    /// Width of the widest data record.
    pub fn widest_record(&self) -> usize {
        self.records.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Column count as seen in the file: the header width when present,
    /// otherwise the widest record.
    pub fn column_count(&self) -> usize {
        match &self.headers {
            Some(headers) => headers.len(),
            None => self.widest_record(),
        }
    }

    pub fn height(&self) -> usize {
        self.records.len()
    }
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Location of an input's file inside the data directory.
pub fn input_path(data_dir: &Path, input: &InputDefinition) -> PathBuf {
    data_dir.join(input.file_name())
}

/// Decodes bytes with the given encoding label, removing a matching BOM.
///
/// Malformed sequences are an error rather than being replaced.
pub fn decode_bytes<'a>(bytes: &'a [u8], label: &str, path: &Path) -> Result<Cow<'a, str>> {
    let encoding =
        Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| IngestError::UnsupportedEncoding {
            path: path.to_path_buf(),
            encoding: label.to_string(),
        })?;
    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        return Err(IngestError::Decode {
            path: path.to_path_buf(),
            encoding: encoding.name().to_string(),
        });
    }
    Ok(text)
}

/// Reads the input file at `path` using the definition's encoding, delimiter
/// and header setting.
pub fn read_raw_table(path: &Path, input: &InputDefinition) -> Result<RawTable> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::from_io(FileKind::Input, path, e))?;
    let text = decode_bytes(&bytes, input.encoding(), path)?;
    let table = parse_text(&text, input, path)?;
    tracing::debug!(
        path = %path.display(),
        input_id = input.id(),
        records = table.height(),
        columns = table.column_count(),
        "read input file"
    );
    Ok(table)
}

/// Parses already decoded text; used by tests and in-memory callers.
pub fn read_raw_table_from_str(text: &str, input: &InputDefinition) -> Result<RawTable> {
    parse_text(text, input, Path::new("<memory>"))
}

fn parse_text(text: &str, input: &InputDefinition, path: &Path) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(input.delimiter())
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        rows.push(record.iter().map(normalize_cell).collect::<Vec<_>>());
    }

    if !input.has_headers() {
        return Ok(RawTable::new(None, rows));
    }
    let mut rows = rows.into_iter();
    let headers = rows.next().unwrap_or_default();
    Ok(RawTable::new(Some(headers), rows.collect()))
}
