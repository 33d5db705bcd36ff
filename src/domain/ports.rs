use crate::domain::model::{ImageProcessingRequest, NewProduct, Product, RawRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Reads a spreadsheet identified by an opaque locator.
#[async_trait]
pub trait SpreadsheetImporter: Send + Sync {
    async fn import(&self, locator: &str) -> Result<Vec<RawRecord>>;
}

/// Product persistence. `create` must reject a code that already exists
/// with `ImportError::DuplicateProduct`.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn exists(&self, code: &str) -> Result<bool>;
    async fn create(&self, product: NewProduct) -> Result<Product>;
}

#[async_trait]
pub trait ImageDispatcher: Send + Sync {
    async fn enqueue(&self, request: ImageProcessingRequest) -> Result<()>;
}
