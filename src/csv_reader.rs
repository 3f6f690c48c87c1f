use crate::structs::{CsvData, NetError, Result};
use csv::ReaderBuilder;
use std::path::Path;

/// Field separator byte for the reader; `tsv` overrides `delimiter` with a tab
///
/// # Errors
/// Returns error if the delimiter is not a single-byte ASCII character
pub fn parse_delimiter(delimiter: char, tsv: bool) -> Result<u8> {
    if tsv {
        return Ok(b'\t');
    }
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| {
            NetError::Config(format!(
                "Delimiter must be an ASCII character, got {delimiter:?}"
            ))
        })
}

impl CsvData {
    /// Parse a delimited file such as CSV or TSV
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or a record is malformed
    pub fn from_file(path: &Path, delimiter: u8) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }
}
