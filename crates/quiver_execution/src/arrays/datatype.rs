use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported data types.
///
/// Only `String`, `Number`, and `Boolean` have typed vector storage and
/// expression kernels; the remaining variants are declared for forward
/// compatibility and fall back to string storage during materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Constant null columns.
    Null,
    Boolean,
    /// Utf-8 encoded string.
    String,
    /// 64-bit float.
    Number,
    BigInt,
    Decimal,
    Date,
    DateTime,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Boolean => write!(f, "Boolean"),
            Self::String => write!(f, "String"),
            Self::Number => write!(f, "Number"),
            Self::BigInt => write!(f, "BigInt"),
            Self::Decimal => write!(f, "Decimal"),
            Self::Date => write!(f, "Date"),
            Self::DateTime => write!(f, "DateTime"),
        }
    }
}
