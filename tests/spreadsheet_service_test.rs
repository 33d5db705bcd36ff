use async_trait::async_trait;
use product_import::core::{ImageDispatcher, NewProduct, Product, ProductStore, SpreadsheetImporter};
use product_import::{
    ImageProcessingRequest, ImportError, InMemoryProductStore, InMemoryQueue, RawRecord, Result,
    SpreadsheetService,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Returns canned rows and counts how often it was asked.
#[derive(Clone)]
struct StubImporter {
    rows: Vec<RawRecord>,
    calls: Arc<AtomicUsize>,
    locators: Arc<std::sync::Mutex<Vec<String>>>,
}

impl StubImporter {
    fn new(rows: Vec<RawRecord>) -> Self {
        Self {
            rows,
            calls: Arc::new(AtomicUsize::new(0)),
            locators: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpreadsheetImporter for StubImporter {
    async fn import(&self, locator: &str) -> Result<Vec<RawRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.locators.lock().unwrap().push(locator.to_string());
        Ok(self.rows.clone())
    }
}

struct FailingImporter;

#[async_trait]
impl SpreadsheetImporter for FailingImporter {
    async fn import(&self, locator: &str) -> Result<Vec<RawRecord>> {
        Err(ImportError::SourceError {
            locator: locator.to_string(),
            message: "file is corrupt".to_string(),
        })
    }
}

/// Accepts requests until `fail_at` have been delivered, then errors.
struct FlakyDispatcher {
    delivered: InMemoryQueue,
    fail_at: usize,
}

#[async_trait]
impl ImageDispatcher for FlakyDispatcher {
    async fn enqueue(&self, request: ImageProcessingRequest) -> Result<()> {
        if self.delivered.len().await >= self.fail_at {
            return Err(ImportError::DispatchError {
                product_code: request.product_code,
                message: "queue unavailable".to_string(),
            });
        }
        self.delivered.enqueue(request).await
    }
}

/// Claims every code is free, then lets the inner store reject duplicates,
/// as happens when another import wins the race.
struct RacingStore {
    inner: InMemoryProductStore,
}

#[async_trait]
impl ProductStore for RacingStore {
    async fn exists(&self, _code: &str) -> Result<bool> {
        Ok(false)
    }

    async fn create(&self, product: NewProduct) -> Result<Product> {
        self.inner.create(product).await
    }
}

fn row(code: &str, quantity: serde_json::Value) -> RawRecord {
    RawRecord::new()
        .with("product_code", code)
        .with("quantity", quantity)
}

fn setup(
    rows: Vec<RawRecord>,
) -> (
    SpreadsheetService<StubImporter, InMemoryProductStore, InMemoryQueue>,
    StubImporter,
    InMemoryProductStore,
    InMemoryQueue,
) {
    let importer = StubImporter::new(rows);
    let store = InMemoryProductStore::new();
    let queue = InMemoryQueue::new();
    let service = SpreadsheetService::new(importer.clone(), store.clone(), queue.clone());
    (service, importer, store, queue)
}

async fn codes(store: &InMemoryProductStore) -> Vec<String> {
    store.all().await.into_iter().map(|p| p.code).collect()
}

#[tokio::test]
async fn test_processes_a_valid_spreadsheet_with_multiple_products() {
    let (service, importer, store, queue) = setup(vec![
        row("PROD001", json!(10)),
        row("PROD002", json!(5)),
        row("PROD003", json!(20)),
    ]);

    service.process_spreadsheet("dummy_path.xlsx").await.unwrap();

    assert_eq!(importer.calls(), 1);
    assert_eq!(
        *importer.locators.lock().unwrap(),
        vec!["dummy_path.xlsx".to_string()]
    );
    assert_eq!(store.count().await, 3);
    assert_eq!(queue.len().await, 3);
}

#[tokio::test]
async fn test_skips_rows_with_missing_product_code() {
    let (service, _importer, store, queue) = setup(vec![
        row("PROD001", json!(10)),
        RawRecord::new().with("quantity", 5),
        row("PROD003", json!(20)),
    ]);

    service.process_spreadsheet("dummy_path.xlsx").await.unwrap();

    assert_eq!(codes(&store).await, vec!["PROD001", "PROD003"]);
    assert_eq!(queue.len().await, 2);
}

#[tokio::test]
async fn test_skips_rows_with_duplicate_product_codes() {
    let (service, _importer, store, queue) = setup(vec![
        row("PROD001", json!(10)),
        row("PROD001", json!(5)),
        row("PROD002", json!(20)),
    ]);
    store.seed("PROD001", 15).await.unwrap();

    let report = service.import("dummy_path.xlsx").await.unwrap();

    assert_eq!(store.count().await, 2);
    // The existing product is left untouched.
    assert_eq!(store.find("PROD001").await.unwrap().quantity, 15);

    let requests = queue.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].product_code, "PROD002");
    assert_eq!(report.skipped_duplicate, 2);
}

#[tokio::test]
async fn test_skips_rows_with_invalid_quantity() {
    let (service, _importer, store, queue) = setup(vec![
        row("PROD001", json!(10)),
        row("PROD002", json!(0)),
        row("PROD003", json!("abc")),
        row("PROD004", json!(5)),
    ]);

    let report = service.import("dummy_path.xlsx").await.unwrap();

    assert_eq!(codes(&store).await, vec!["PROD001", "PROD004"]);
    assert_eq!(queue.len().await, 2);
    assert_eq!(report.skipped_invalid, 2);
}

#[tokio::test]
async fn test_handles_empty_spreadsheet_gracefully() {
    let (service, importer, store, queue) = setup(vec![]);

    let report = service.import("empty_file.xlsx").await.unwrap();

    assert_eq!(importer.calls(), 1);
    assert_eq!(store.count().await, 0);
    assert!(queue.is_empty().await);
    assert_eq!(report.rows_read, 0);
    assert_eq!(report.skipped(), 0);
}

#[tokio::test]
async fn test_dispatches_image_processing_job_for_each_valid_product() {
    let (service, _importer, store, queue) =
        setup(vec![row("PROD001", json!(10)), row("PROD002", json!(5))]);

    service.process_spreadsheet("dummy_path.xlsx").await.unwrap();

    let products = store.all().await;
    let requests = queue.requests().await;
    assert_eq!(requests.len(), 2);
    for (request, product) in requests.iter().zip(products.iter()) {
        assert!(request.references(product));
    }
}

#[tokio::test]
async fn test_within_run_duplicate_first_valid_row_wins() {
    let (service, _importer, store, queue) = setup(vec![
        row("PROD001", json!("abc")),
        row("PROD001", json!(4)),
        row("PROD001", json!(9)),
        row("PROD001", json!(0)),
    ]);

    let report = service.import("sheet.csv").await.unwrap();

    let products = store.all().await;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].quantity, 4);
    assert_eq!(queue.len().await, 1);
    assert_eq!(report.created_count(), 1);
    assert_eq!(report.skipped(), 3);
}

#[tokio::test]
async fn test_dispatch_order_follows_input_order() {
    let (service, _importer, _store, queue) = setup(vec![
        row("C", json!(1)),
        row("A", json!(2)),
        row("B", json!(3)),
    ]);

    service.process_spreadsheet("sheet.csv").await.unwrap();

    let order: Vec<String> = queue
        .requests()
        .await
        .into_iter()
        .map(|r| r.product_code)
        .collect();
    assert_eq!(order, vec!["C", "A", "B"]);
}

#[tokio::test]
async fn test_reader_failure_propagates() {
    let store = InMemoryProductStore::new();
    let queue = InMemoryQueue::new();
    let service = SpreadsheetService::new(FailingImporter, store.clone(), queue.clone());

    let err = service.process_spreadsheet("broken.csv").await.unwrap_err();

    assert!(matches!(err, ImportError::SourceError { .. }));
    assert_eq!(store.count().await, 0);
    assert!(queue.is_empty().await);
}

#[tokio::test]
async fn test_dispatch_failure_stops_the_run() {
    let importer = StubImporter::new(vec![
        row("PROD001", json!(1)),
        row("PROD002", json!(2)),
        row("PROD003", json!(3)),
    ]);
    let store = InMemoryProductStore::new();
    let delivered = InMemoryQueue::new();
    let dispatcher = FlakyDispatcher {
        delivered: delivered.clone(),
        fail_at: 1,
    };
    let service = SpreadsheetService::new(importer, store.clone(), dispatcher);

    let err = service.process_spreadsheet("sheet.csv").await.unwrap_err();

    assert!(matches!(
        err,
        ImportError::DispatchError { ref product_code, .. } if product_code == "PROD002"
    ));
    // Products created before the failure are kept; later rows are not touched.
    assert_eq!(codes(&store).await, vec!["PROD001", "PROD002"]);
    assert_eq!(delivered.len().await, 1);
}

#[tokio::test]
async fn test_store_rejecting_duplicate_counts_as_skip() {
    let importer = StubImporter::new(vec![row("PROD001", json!(3)), row("PROD002", json!(4))]);
    let inner = InMemoryProductStore::new();
    inner.seed("PROD001", 1).await.unwrap();
    let queue = InMemoryQueue::new();
    let service = SpreadsheetService::new(
        importer,
        RacingStore {
            inner: inner.clone(),
        },
        queue.clone(),
    );

    let report = service.import("sheet.csv").await.unwrap();

    assert_eq!(report.skipped_duplicate, 1);
    assert_eq!(inner.count().await, 2);
    let requests = queue.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].product_code, "PROD002");
}

#[tokio::test]
async fn test_preview_changes_nothing() {
    let (service, _importer, store, queue) = setup(vec![
        row("PROD001", json!(10)),
        row("PROD001", json!(11)),
        row("PROD002", json!(-1)),
    ]);

    let report = service.preview("sheet.csv").await.unwrap();

    assert_eq!(report.rows_read, 3);
    assert_eq!(report.skipped_duplicate, 1);
    assert_eq!(report.skipped_invalid, 1);
    assert_eq!(store.count().await, 0);
    assert!(queue.is_empty().await);
}
