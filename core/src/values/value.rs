use core::fmt;

use chrono::NaiveDateTime;
use ecow::EcoString;
use rust_decimal::Decimal;

/// Format used when a date-time is rendered as text.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The scalar types a non-null [`Value`] can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Integer,
    Float,
    Boolean,
    String,
    Decimal,
    DateTime,
}

impl ScalarType {
    /// Whether values of this type carry a fractional part (floating point or decimal).
    pub fn is_real(self) -> bool {
        matches!(self, ScalarType::Float | ScalarType::Decimal)
    }

    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Integer => "integer",
            ScalarType::Float => "float",
            ScalarType::Boolean => "boolean",
            ScalarType::String => "string",
            ScalarType::Decimal => "decimal",
            ScalarType::DateTime => "datetime",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dynamically-typed scalar produced by evaluation.
///
/// `Null` stands for an absent value: a parameter bound to nothing, or a host hook
/// that produced nothing usable. Strings are reference counted, so cloning a value
/// out of a parameter mapping is cheap.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(EcoString),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
}

impl Value {
    /// The scalar type of this value, or `None` for [`Value::Null`].
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Value::Null => None,
            Value::Integer(_) => Some(ScalarType::Integer),
            Value::Float(_) => Some(ScalarType::Float),
            Value::Boolean(_) => Some(ScalarType::Boolean),
            Value::String(_) => Some(ScalarType::String),
            Value::Decimal(_) => Some(ScalarType::Decimal),
            Value::DateTime(_) => Some(ScalarType::DateTime),
        }
    }

    /// Name of the value's type, `"null"` included.
    pub fn type_name(&self) -> &'static str {
        self.scalar_type().map_or("null", ScalarType::name)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(value) => write!(f, "{}", value),
            Value::Float(value) => format_float(f, *value),
            Value::Boolean(value) => write!(f, "{}", value),
            Value::String(value) => f.write_str(value),
            Value::Decimal(value) => write!(f, "{}", value.normalize()),
            Value::DateTime(value) => write!(f, "{}", value.format(DATETIME_FORMAT)),
        }
    }
}

fn format_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        write!(f, "NaN")
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            write!(f, "Infinity")
        } else {
            write!(f, "-Infinity")
        }
    } else {
        // Shortest round-trip form; integral floats print without a fraction.
        write!(f, "{}", value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value.into())
    }
}

impl From<EcoString> for Value {
    fn from(value: EcoString) -> Self {
        Value::String(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
