// Adapters layer: concrete readers, stores and dispatchers behind the domain ports.

pub mod dispatch;
pub mod importer;
pub mod storage;
pub mod store;

pub use dispatch::{DispatchBackend, HttpDispatcher, InMemoryQueue, JsonLinesDispatcher};
pub use importer::FileImporter;
pub use storage::LocalStorage;
pub use store::{InMemoryProductStore, JsonFileProductStore, StoreBackend};
