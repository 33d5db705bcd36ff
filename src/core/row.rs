use crate::domain::model::{ProductRow, RawRecord};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_CODE_FIELD: &str = "product_code";
pub const DEFAULT_QUANTITY_FIELD: &str = "quantity";
pub const MIN_QUANTITY: i64 = 1;

/// Why a row was not imported. Never escapes the import service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowRejection {
    #[error("missing product code")]
    MissingProductCode,

    #[error("product code is empty")]
    EmptyProductCode,

    #[error("product code must be text, got {value}")]
    InvalidProductCode { value: Value },

    #[error("missing quantity")]
    MissingQuantity,

    #[error("quantity is not an integer: {value}")]
    NonIntegerQuantity { value: Value },

    #[error("quantity {value} is below the minimum of {}", MIN_QUANTITY)]
    QuantityBelowMinimum { value: i64 },
}

/// Turns untyped rows into `ProductRow`s.
///
/// Column names default to `product_code` and `quantity` and can be remapped
/// for exports that use other headers.
#[derive(Debug, Clone)]
pub struct RowDecoder {
    code_field: String,
    quantity_field: String,
}

impl Default for RowDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_FIELD, DEFAULT_QUANTITY_FIELD)
    }
}

impl RowDecoder {
    pub fn new(code_field: &str, quantity_field: &str) -> Self {
        Self {
            code_field: code_field.to_string(),
            quantity_field: quantity_field.to_string(),
        }
    }

    pub fn code_field(&self) -> &str {
        &self.code_field
    }

    pub fn quantity_field(&self) -> &str {
        &self.quantity_field
    }

    pub fn decode(&self, record: &RawRecord) -> Result<ProductRow, RowRejection> {
        let code = decode_code(record.get(&self.code_field))?;
        let quantity = decode_quantity(record.get(&self.quantity_field))?;
        Ok(ProductRow { code, quantity })
    }
}

fn decode_code(value: Option<&Value>) -> Result<String, RowRejection> {
    match value {
        None | Some(Value::Null) => Err(RowRejection::MissingProductCode),
        Some(Value::String(s)) => {
            let code = s.trim();
            if code.is_empty() {
                Err(RowRejection::EmptyProductCode)
            } else {
                Ok(code.to_string())
            }
        }
        Some(other) => Err(RowRejection::InvalidProductCode {
            value: other.clone(),
        }),
    }
}

fn decode_quantity(value: Option<&Value>) -> Result<i64, RowRejection> {
    let quantity = match value {
        None | Some(Value::Null) => return Err(RowRejection::MissingQuantity),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err(RowRejection::MissingQuantity)
        }
        Some(v) => coerce_integer(v).ok_or_else(|| RowRejection::NonIntegerQuantity {
            value: v.clone(),
        })?,
    };

    if quantity < MIN_QUANTITY {
        return Err(RowRejection::QuantityBelowMinimum { value: quantity });
    }
    Ok(quantity)
}

/// Accepts JSON integers, integral floats, and signed decimal digit strings.
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            if n.is_u64() {
                return None;
            }
            let f = n.as_f64()?;
            let bound = 2f64.powi(63);
            if f.fract() == 0.0 && f >= -bound && f < bound {
                Some(f as i64)
            } else {
                None
            }
        }
        Value::String(s) => {
            let s = s.trim();
            let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            s.parse::<i64>().ok()
        }
        _ => None,
    }
}
