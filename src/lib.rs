pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::ImportConfig;

pub use adapters::{
    DispatchBackend, FileImporter, InMemoryProductStore, InMemoryQueue, LocalStorage,
    StoreBackend,
};
pub use core::{row::RowDecoder, spreadsheet::SpreadsheetService};
pub use domain::model::{ImageProcessingRequest, ImportReport, Product, RawRecord};
pub use utils::error::{ImportError, Result};
