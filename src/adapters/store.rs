use crate::adapters::storage::LocalStorage;
use crate::config::toml_config::StoreConfig;
use crate::domain::model::{NewProduct, Product};
use crate::domain::ports::{ProductStore, Storage};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct ProductTable {
    products: Vec<Product>,
    next_id: u64,
}

impl ProductTable {
    fn from_products(products: Vec<Product>) -> Self {
        let next_id = products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        Self { products, next_id }
    }

    fn contains(&self, code: &str) -> bool {
        self.products.iter().any(|p| p.code == code)
    }

    fn insert(&mut self, product: NewProduct) -> Result<Product> {
        if self.contains(&product.code) {
            return Err(ImportError::DuplicateProduct { code: product.code });
        }
        let product = Product {
            id: self.next_id.max(1),
            code: product.code,
            quantity: product.quantity,
            created_at: Utc::now(),
        };
        self.next_id = product.id + 1;
        self.products.push(product.clone());
        Ok(product)
    }
}

/// Process-local product table. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductStore {
    table: Arc<Mutex<ProductTable>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a product directly, bypassing the import service.
    pub async fn seed(&self, code: &str, quantity: i64) -> Result<Product> {
        let mut table = self.table.lock().await;
        table.insert(NewProduct {
            code: code.to_string(),
            quantity,
        })
    }

    pub async fn all(&self) -> Vec<Product> {
        self.table.lock().await.products.clone()
    }

    pub async fn count(&self) -> usize {
        self.table.lock().await.products.len()
    }

    pub async fn find(&self, code: &str) -> Option<Product> {
        let table = self.table.lock().await;
        table.products.iter().find(|p| p.code == code).cloned()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn exists(&self, code: &str) -> Result<bool> {
        Ok(self.table.lock().await.contains(code))
    }

    async fn create(&self, product: NewProduct) -> Result<Product> {
        self.table.lock().await.insert(product)
    }
}

/// Product table persisted as a JSON array through `LocalStorage`.
///
/// The file is the source of truth: `exists` and `create` re-read it, and
/// `create` holds an exclusive lock on `<file>.lock` from the read until the
/// rewrite, so stores opened on one file (in this process or another) never
/// create the same code twice or drop each other's products.
#[derive(Debug, Clone)]
pub struct JsonFileProductStore {
    storage: LocalStorage,
    file_name: String,
    table: Arc<Mutex<ProductTable>>,
}

impl JsonFileProductStore {
    /// Opens the store, starting empty when the file does not exist yet.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ImportError::StoreError {
                message: format!("{} does not name a file", path.display()),
            })?
            .to_string();
        let dir = path.parent().unwrap_or_else(|| Path::new(""));

        let store = Self {
            storage: LocalStorage::new(dir),
            file_name,
            table: Arc::new(Mutex::new(ProductTable::default())),
        };
        let table = store.load().await?;
        tracing::debug!(
            "Opened product store {} with {} products",
            path.display(),
            table.products.len()
        );
        *store.table.lock().await = table;
        Ok(store)
    }

    /// Products as of the last store operation on this handle.
    pub async fn all(&self) -> Vec<Product> {
        self.table.lock().await.products.clone()
    }

    async fn load(&self) -> Result<ProductTable> {
        let content = match self.storage.read_file(&self.file_name).await {
            Ok(content) => content,
            Err(ImportError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ProductTable::default());
            }
            Err(e) => return Err(e),
        };
        if content.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(ProductTable::default());
        }
        let products: Vec<Product> =
            serde_json::from_slice(&content).map_err(|e| ImportError::StoreError {
                message: format!("cannot parse {}: {}", self.file_name, e),
            })?;
        Ok(ProductTable::from_products(products))
    }
}

#[async_trait]
impl ProductStore for JsonFileProductStore {
    async fn exists(&self, code: &str) -> Result<bool> {
        let mut table = self.table.lock().await;
        *table = self.load().await?;
        Ok(table.contains(code))
    }

    async fn create(&self, product: NewProduct) -> Result<Product> {
        let mut table = self.table.lock().await;
        let _lock = self.storage.lock(&self.file_name)?;

        let mut latest = self.load().await?;
        let created = latest.insert(product)?;

        let data = serde_json::to_vec_pretty(&latest.products)?;
        self.storage.write_file(&self.file_name, &data).await?;
        // Only a successful write replaces what this handle has seen.
        *table = latest;
        Ok(created)
    }
}

/// Store selected by configuration.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    Memory(InMemoryProductStore),
    JsonFile(JsonFileProductStore),
}

impl StoreBackend {
    pub async fn from_config(config: &StoreConfig) -> Result<Self> {
        match config {
            StoreConfig::Memory => Ok(StoreBackend::Memory(InMemoryProductStore::new())),
            StoreConfig::JsonFile { path } => Ok(StoreBackend::JsonFile(
                JsonFileProductStore::open(path).await?,
            )),
        }
    }

    pub async fn count(&self) -> usize {
        match self {
            StoreBackend::Memory(store) => store.count().await,
            StoreBackend::JsonFile(store) => store.all().await.len(),
        }
    }
}

#[async_trait]
impl ProductStore for StoreBackend {
    async fn exists(&self, code: &str) -> Result<bool> {
        match self {
            StoreBackend::Memory(store) => store.exists(code).await,
            StoreBackend::JsonFile(store) => store.exists(code).await,
        }
    }

    async fn create(&self, product: NewProduct) -> Result<Product> {
        match self {
            StoreBackend::Memory(store) => store.create(product).await,
            StoreBackend::JsonFile(store) => store.create(product).await,
        }
    }
}
