use crate::domain::model::RawRecord;
use crate::domain::ports::{SpreadsheetImporter, Storage};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Json,
}

impl SheetFormat {
    pub fn from_locator(locator: &str) -> Option<Self> {
        let extension = Path::new(locator)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(SheetFormat::Csv),
            "json" => Some(SheetFormat::Json),
            _ => None,
        }
    }
}

/// Reads spreadsheet exports from a `Storage` backend, choosing the parser
/// from the locator's extension.
pub struct FileImporter<S: Storage> {
    storage: S,
}

impl<S: Storage> FileImporter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: Storage> SpreadsheetImporter for FileImporter<S> {
    async fn import(&self, locator: &str) -> Result<Vec<RawRecord>> {
        let format =
            SheetFormat::from_locator(locator).ok_or_else(|| ImportError::UnsupportedSource {
                locator: locator.to_string(),
            })?;

        let data = self
            .storage
            .read_file(locator)
            .await
            .map_err(|e| ImportError::SourceError {
                locator: locator.to_string(),
                message: e.to_string(),
            })?;
        let data = data.strip_prefix(UTF8_BOM).unwrap_or(&data[..]);

        let records = match format {
            SheetFormat::Csv => parse_csv(data)?,
            SheetFormat::Json => parse_json(locator, data)?,
        };
        tracing::debug!("Read {} rows from {}", records.len(), locator);
        Ok(records)
    }
}

/// Header row names the fields; every cell is kept as a string. A row that
/// is not valid UTF-8 becomes an empty record so it is rejected on its own.
pub fn parse_csv(data: &[u8]) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(data);
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for (index, row) in reader.byte_records().enumerate() {
        let row = row?;
        let cells = match row
            .iter()
            .map(std::str::from_utf8)
            .collect::<std::result::Result<Vec<&str>, _>>()
        {
            Ok(cells) => cells,
            Err(e) => {
                tracing::debug!("Row {} is not valid UTF-8: {}", index + 1, e);
                records.push(RawRecord::new());
                continue;
            }
        };
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut record = RawRecord::new();
        for (header, cell) in headers.iter().zip(cells) {
            if header.is_empty() {
                continue;
            }
            record
                .data
                .insert(header.to_string(), Value::String(cell.to_string()));
        }
        records.push(record);
    }
    Ok(records)
}

/// Expects a top-level array of objects.
pub fn parse_json(locator: &str, data: &[u8]) -> Result<Vec<RawRecord>> {
    let value: Value = serde_json::from_slice(data).map_err(|e| ImportError::SourceError {
        locator: locator.to_string(),
        message: format!("invalid JSON: {}", e),
    })?;

    let Value::Array(items) = value else {
        return Err(ImportError::SourceError {
            locator: locator.to_string(),
            message: "expected a JSON array of rows".to_string(),
        });
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(obj) => RawRecord::from(obj),
            other => {
                tracing::debug!("Row {} is not an object: {}", index + 1, other);
                RawRecord::new()
            }
        })
        .collect())
}
