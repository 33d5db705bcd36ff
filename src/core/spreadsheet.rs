use crate::core::row::RowDecoder;
use crate::domain::model::{ImageProcessingRequest, ImportReport, NewProduct, RawRecord};
use crate::domain::ports::{ImageDispatcher, ProductStore, SpreadsheetImporter};
use crate::utils::error::{ImportError, Result};
use std::collections::HashSet;

/// Imports products from a spreadsheet and queues image processing for
/// every product it creates.
///
/// Rows are handled strictly in input order. Invalid rows and rows whose
/// code already exists are skipped; only a reader, store or dispatcher
/// failure ends the run early.
pub struct SpreadsheetService<I, S, D> {
    importer: I,
    store: S,
    dispatcher: D,
    decoder: RowDecoder,
}

enum RowOutcome {
    Created,
    Invalid,
    Duplicate,
}

impl<I, S, D> SpreadsheetService<I, S, D>
where
    I: SpreadsheetImporter,
    S: ProductStore,
    D: ImageDispatcher,
{
    pub fn new(importer: I, store: S, dispatcher: D) -> Self {
        Self {
            importer,
            store,
            dispatcher,
            decoder: RowDecoder::default(),
        }
    }

    pub fn with_decoder(mut self, decoder: RowDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn process_spreadsheet(&self, locator: &str) -> Result<()> {
        self.import(locator).await.map(|_| ())
    }

    pub async fn import(&self, locator: &str) -> Result<ImportReport> {
        tracing::info!("Importing products from {}", locator);

        let records = self.importer.import(locator).await?;
        let mut report = ImportReport {
            rows_read: records.len(),
            ..ImportReport::default()
        };
        let mut seen: HashSet<String> = HashSet::new();

        for (index, record) in records.iter().enumerate() {
            // Row numbers are 1-based to match what users see in the sheet.
            match self.process_row(index + 1, record, &mut seen, &mut report).await? {
                RowOutcome::Created => {}
                RowOutcome::Invalid => report.skipped_invalid += 1,
                RowOutcome::Duplicate => report.skipped_duplicate += 1,
            }
        }

        tracing::info!(
            "Import of {} finished: {} rows, {} created, {} invalid, {} duplicate",
            locator,
            report.rows_read,
            report.created_count(),
            report.skipped_invalid,
            report.skipped_duplicate
        );
        Ok(report)
    }

    async fn process_row(
        &self,
        row_number: usize,
        record: &RawRecord,
        seen: &mut HashSet<String>,
        report: &mut ImportReport,
    ) -> Result<RowOutcome> {
        let row = match self.decoder.decode(record) {
            Ok(row) => row,
            Err(rejection) => {
                tracing::debug!("Skipping row {}: {}", row_number, rejection);
                return Ok(RowOutcome::Invalid);
            }
        };

        if seen.contains(&row.code) {
            tracing::debug!(
                "Skipping row {}: product {} already imported in this run",
                row_number,
                row.code
            );
            return Ok(RowOutcome::Duplicate);
        }

        if self.store.exists(&row.code).await? {
            tracing::debug!(
                "Skipping row {}: product {} already exists",
                row_number,
                row.code
            );
            seen.insert(row.code);
            return Ok(RowOutcome::Duplicate);
        }

        let product = match self.store.create(NewProduct::from(row)).await {
            Ok(product) => product,
            // Lost a race with a concurrent import.
            Err(ImportError::DuplicateProduct { code }) => {
                tracing::debug!(
                    "Skipping row {}: product {} was created concurrently",
                    row_number,
                    code
                );
                seen.insert(code);
                return Ok(RowOutcome::Duplicate);
            }
            Err(e) => return Err(e),
        };
        seen.insert(product.code.clone());
        tracing::debug!(
            "Row {}: created product {} (id {}, quantity {})",
            row_number,
            product.code,
            product.id,
            product.quantity
        );

        self.dispatcher
            .enqueue(ImageProcessingRequest::for_product(&product))
            .await?;
        tracing::debug!("Queued image processing for {}", product.code);

        report.created.push(product);
        Ok(RowOutcome::Created)
    }

    /// Decodes and deduplicates without touching the store or dispatcher
    /// beyond existence checks.
    pub async fn preview(&self, locator: &str) -> Result<ImportReport> {
        let records = self.importer.import(locator).await?;
        let mut report = ImportReport {
            rows_read: records.len(),
            ..ImportReport::default()
        };
        let mut seen: HashSet<String> = HashSet::new();

        for (index, record) in records.iter().enumerate() {
            let row = match self.decoder.decode(record) {
                Ok(row) => row,
                Err(rejection) => {
                    tracing::info!("Row {} would be skipped: {}", index + 1, rejection);
                    report.skipped_invalid += 1;
                    continue;
                }
            };
            if seen.contains(&row.code) || self.store.exists(&row.code).await? {
                tracing::info!("Row {} would be skipped: duplicate {}", index + 1, row.code);
                report.skipped_duplicate += 1;
                continue;
            }
            seen.insert(row.code);
        }

        tracing::info!(
            "Preview of {}: {} rows, {} would be created, {} skipped",
            locator,
            report.rows_read,
            report.rows_read - report.skipped(),
            report.skipped()
        );
        Ok(report)
    }
}
