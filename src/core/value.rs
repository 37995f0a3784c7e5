use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::converter::ValueTypeError;

/// A single cell value as exchanged between a record and a column converter.
///
/// `Null` is produced by converters for blank input on non-text columns, and
/// is accepted by every converter on encode (it formats as blank text).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    String(String),
    Char(char),
    Boolean(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    /// Name of an enumerated variant.
    Enum(String),
}

impl Value {
    /// Short name of the variant, used in type mismatch messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Char(_) => "char",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Time(_) => "time",
            Value::Enum(_) => "enum",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Builds an enum value from anything that renders as the variant name.
    pub fn variant(name: impl Into<String>) -> Self {
        Value::Enum(name.into())
    }

    /// Converts into `Option<T>`, mapping `Null` to `None`.
    pub fn into_option<T>(self) -> Result<Option<T>, ValueTypeError>
    where
        T: TryFrom<Value, Error = ValueTypeError>,
    {
        match self {
            Value::Null => Ok(None),
            other => T::try_from(other).map(Some),
        }
    }

    fn mismatch(self, expected: &'static str) -> ValueTypeError {
        ValueTypeError::new(expected, self.kind())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<NaiveTime> for Value {
    fn from(value: NaiveTime) -> Self {
        Value::Time(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

macro_rules! signed_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int(i64::from(value))
                }
            }

            impl TryFrom<Value> for $ty {
                type Error = ValueTypeError;

                fn try_from(value: Value) -> Result<Self, Self::Error> {
                    let expected = stringify!($ty);
                    match value {
                        Value::Int(v) => <$ty>::try_from(v)
                            .map_err(|_| ValueTypeError::out_of_range(expected, v.to_string())),
                        Value::UInt(v) => <$ty>::try_from(v)
                            .map_err(|_| ValueTypeError::out_of_range(expected, v.to_string())),
                        other => Err(other.mismatch(expected)),
                    }
                }
            }
        )*
    };
}

macro_rules! unsigned_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::UInt(u64::from(value))
                }
            }

            impl TryFrom<Value> for $ty {
                type Error = ValueTypeError;

                fn try_from(value: Value) -> Result<Self, Self::Error> {
                    let expected = stringify!($ty);
                    match value {
                        Value::UInt(v) => <$ty>::try_from(v)
                            .map_err(|_| ValueTypeError::out_of_range(expected, v.to_string())),
                        Value::Int(v) => <$ty>::try_from(v)
                            .map_err(|_| ValueTypeError::out_of_range(expected, v.to_string())),
                        other => Err(other.mismatch(expected)),
                    }
                }
            }
        )*
    };
}

signed_value!(i8, i16, i32, i64);
unsigned_value!(u8, u16, u32, u64);

impl TryFrom<Value> for String {
    type Error = ValueTypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) | Value::Enum(s) => Ok(s),
            other => Err(other.mismatch("string")),
        }
    }
}

impl TryFrom<Value> for char {
    type Error = ValueTypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Char(c) => Ok(c),
            other => Err(other.mismatch("char")),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = ValueTypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Boolean(b) => Ok(b),
            other => Err(other.mismatch("boolean")),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = ValueTypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Float(v) => Ok(v),
            other => Err(other.mismatch("f64")),
        }
    }
}

impl TryFrom<Value> for f32 {
    type Error = ValueTypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            // narrowing is the documented behaviour for f32 columns
            Value::Float(v) => Ok(v as f32),
            other => Err(other.mismatch("f32")),
        }
    }
}

impl TryFrom<Value> for NaiveDate {
    type Error = ValueTypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Date(d) => Ok(d),
            other => Err(other.mismatch("date")),
        }
    }
}

impl TryFrom<Value> for NaiveDateTime {
    type Error = ValueTypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::DateTime(d) => Ok(d),
            other => Err(other.mismatch("datetime")),
        }
    }
}

impl TryFrom<Value> for NaiveTime {
    type Error = ValueTypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Time(t) => Ok(t),
            other => Err(other.mismatch("time")),
        }
    }
}
