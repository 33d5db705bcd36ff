pub mod row;
pub mod spreadsheet;

pub use crate::domain::model::{
    ImageProcessingRequest, ImportReport, NewProduct, Product, ProductRow, RawRecord,
};
pub use crate::domain::ports::{ImageDispatcher, ProductStore, SpreadsheetImporter, Storage};
pub use crate::utils::error::Result;
