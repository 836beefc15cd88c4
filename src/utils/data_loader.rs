//! CSV loading and saving

use crate::error::{ChronofoldError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// CSV loader
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Field separator
    separator: u8,
    /// Rows scanned to infer column types, `None` scans the whole file
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            separator: b',',
            infer_schema_length: Some(100),
        }
    }

    /// Set the field separator
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Set how many rows are used for type inference
    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = rows;
        self
    }

    /// Load a CSV file with a header row. Empty fields load as nulls.
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let start = Instant::now();
        let file = File::open(path)?;

        let parse_opts = CsvParseOptions::default().with_separator(self.separator);

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| {
                ChronofoldError::DataError(format!("failed to read {}: {}", path.display(), e))
            })?;

        info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded CSV"
        );

        Ok(df)
    }
}

/// Save DataFrames to disk
pub struct DataSaver;

impl DataSaver {
    /// Save to CSV with a header row
    pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path)?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| {
                ChronofoldError::DataError(format!("failed to write {}: {}", path.display(), e))
            })?;

        info!(path = %path.display(), rows = df.height(), "Saved CSV");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        writeln!(file, "YEAR,MONTH,CONTRAGENT,SALES").unwrap();
        writeln!(file, "2017,8,A,10").unwrap();
        writeln!(file, "2017,9,,5").unwrap();
        writeln!(file, "2017,10,B,7").unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = create_test_csv();
        let df = DataLoader::new().load_csv(file.path()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 4);
        assert_eq!(df.column("CONTRAGENT").unwrap().null_count(), 1);
    }

    #[test]
    fn test_load_with_separator() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a;b").unwrap();
        writeln!(file, "1;2").unwrap();

        let df = DataLoader::new()
            .with_separator(b';')
            .load_csv(file.path())
            .unwrap();
        assert_eq!(df.width(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = DataLoader::new()
            .load_csv("/definitely/not/here.csv")
            .unwrap_err();
        assert!(matches!(err, ChronofoldError::IoError(_)));
    }

    #[test]
    fn test_save_and_reload() {
        let mut df = df!(
            "YEAR_MONTH" => &[1i64, 2],
            "GB_CONTRAGENT_PREV_SUM_SALES_1" => &[4.0, 15.0]
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.csv");
        DataSaver::save_csv(&mut df, &path).unwrap();

        let loaded = DataLoader::new().load_csv(&path).unwrap();
        assert_eq!(loaded.height(), 2);
        assert_eq!(
            loaded.get_column_names(),
            df.get_column_names()
        );
    }
}
