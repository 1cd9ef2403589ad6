//! Delimited writer for formatted tables.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tabula_model::OutputDefinition;

use crate::error::{OutputError, Result};
use crate::format::FormattedTable;

/// Location of an output's file inside the output directory.
pub fn output_path(output_dir: &Path, output: &OutputDefinition) -> PathBuf {
    output_dir.join(output.output_file_name())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn csv_error(path: &Path, err: &csv::Error) -> OutputError {
    OutputError::Csv {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Writes header and rows as UTF-8 delimited text.
///
/// The table is written to a sibling temp file which is then renamed over
/// `path`, so the destination never holds a partial table. Parent
/// directories are created as needed.
pub fn write_table(path: &Path, table: &FormattedTable, delimiter: u8) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| OutputError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = temp_path_for(path);
    if let Err(err) = write_temp(&temp_path, table, delimiter) {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    fs::rename(&temp_path, path).map_err(|source| {
        let _ = fs::remove_file(&temp_path);
        OutputError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.to_path_buf(),
            source,
        }
    })?;

    tracing::debug!(
        path = %path.display(),
        rows = table.height(),
        columns = table.header().len(),
        "wrote output table"
    );
    Ok(())
}

fn write_temp(temp_path: &Path, table: &FormattedTable, delimiter: u8) -> Result<()> {
    let file = File::create(temp_path).map_err(|source| OutputError::Io {
        operation: "create",
        path: temp_path.to_path_buf(),
        source,
    })?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(false)
        .from_writer(file);
    writer
        .write_record(table.header())
        .map_err(|e| csv_error(temp_path, &e))?;
    for row in table.rows() {
        writer.write_record(row).map_err(|e| csv_error(temp_path, &e))?;
    }

    let file = writer.into_inner().map_err(|e| OutputError::Io {
        operation: "flush",
        path: temp_path.to_path_buf(),
        source: e.into_error(),
    })?;
    file.sync_all().map_err(|source| OutputError::Io {
        operation: "sync",
        path: temp_path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> FormattedTable {
        FormattedTable::new(
            vec!["ID".to_string(), "PRICE".to_string()],
            vec![
                vec!["1".to_string(), "1234,50".to_string()],
                vec!["2".to_string(), "".to_string()],
            ],
        )
    }

    #[test]
    fn test_writes_header_and_rows_with_delimiter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        write_table(&path, &sample(), b';').unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "ID;PRICE\n1;1234,50\n2;\n");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_quotes_cells_containing_the_delimiter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_table(&path, &sample(), b',').unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "ID,PRICE\n1,\"1234,50\"\n2,\n");
    }

    #[test]
    fn test_header_written_for_empty_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        let table = FormattedTable::new(vec!["A".to_string(), "B".to_string()], Vec::new());

        write_table(&path, &table, b',').unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "A,B\n");
    }

    #[test]
    fn test_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "stale").unwrap();

        write_table(&path, &sample(), b';').unwrap();

        assert!(fs::read_to_string(&path).unwrap().starts_with("ID;PRICE"));
    }
}
