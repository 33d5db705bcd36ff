use crate::config::toml_config::DispatchConfig;
use crate::domain::model::ImageProcessingRequest;
use crate::domain::ports::ImageDispatcher;
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const DEFAULT_DISPATCH_TIMEOUT_SECS: u64 = 10;

/// Keeps requests in memory, in enqueue order. Clones share the queue.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQueue {
    requests: Arc<Mutex<Vec<ImageProcessingRequest>>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn requests(&self) -> Vec<ImageProcessingRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.requests.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.requests.lock().await.is_empty()
    }
}

#[async_trait]
impl ImageDispatcher for InMemoryQueue {
    async fn enqueue(&self, request: ImageProcessingRequest) -> Result<()> {
        self.requests.lock().await.push(request);
        Ok(())
    }
}

/// Appends one JSON document per line to an outbox file that a worker tails.
#[derive(Debug, Clone)]
pub struct JsonLinesDispatcher {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonLinesDispatcher {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    fn append(&self, line: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line)?;
        file.write_all(b"\n")
    }
}

#[async_trait]
impl ImageDispatcher for JsonLinesDispatcher {
    async fn enqueue(&self, request: ImageProcessingRequest) -> Result<()> {
        let line = serde_json::to_vec(&request)?;
        let _guard = self.lock.lock().await;
        self.append(&line).map_err(|e| ImportError::DispatchError {
            product_code: request.product_code.clone(),
            message: format!("cannot write {}: {}", self.path.display(), e),
        })
    }
}

/// Posts each request as JSON to an image-processing endpoint.
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    client: Client,
    endpoint: String,
}

impl HttpDispatcher {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl ImageDispatcher for HttpDispatcher {
    async fn enqueue(&self, request: ImageProcessingRequest) -> Result<()> {
        tracing::debug!("Posting image request for {} to {}", request.product_code, self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ImportError::DispatchError {
                product_code: request.product_code.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::DispatchError {
                product_code: request.product_code,
                message: format!("endpoint responded with {}", status),
            });
        }
        Ok(())
    }
}

/// Dispatcher selected by configuration.
#[derive(Debug, Clone)]
pub enum DispatchBackend {
    Memory(InMemoryQueue),
    JsonLines(JsonLinesDispatcher),
    Http(HttpDispatcher),
}

impl DispatchBackend {
    pub fn from_config(config: &DispatchConfig) -> Result<Self> {
        match config {
            DispatchConfig::Memory => Ok(DispatchBackend::Memory(InMemoryQueue::new())),
            DispatchConfig::JsonLines { path } => {
                Ok(DispatchBackend::JsonLines(JsonLinesDispatcher::new(path)))
            }
            DispatchConfig::Http {
                endpoint,
                timeout_seconds,
            } => {
                let timeout =
                    Duration::from_secs(timeout_seconds.unwrap_or(DEFAULT_DISPATCH_TIMEOUT_SECS));
                Ok(DispatchBackend::Http(HttpDispatcher::new(endpoint, timeout)?))
            }
        }
    }
}

#[async_trait]
impl ImageDispatcher for DispatchBackend {
    async fn enqueue(&self, request: ImageProcessingRequest) -> Result<()> {
        match self {
            DispatchBackend::Memory(queue) => queue.enqueue(request).await,
            DispatchBackend::JsonLines(outbox) => outbox.enqueue(request).await,
            DispatchBackend::Http(http) => http.enqueue(request).await,
        }
    }
}
