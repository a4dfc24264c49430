//! Runtime scalar values.

mod value;

pub use value::{DATETIME_FORMAT, ScalarType, Value};
