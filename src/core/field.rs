use std::fmt;

use serde::{Deserialize, Serialize};

use super::{column::ColumnConfig, converter::ValueTypeError, value::Value};

/// Width of an integer field, used by the integer converter for range checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegerKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntegerKind {
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            IntegerKind::I8 | IntegerKind::I16 | IntegerKind::I32 | IntegerKind::I64
        )
    }

    /// Inclusive bounds of the kind, widened to `i128`.
    pub fn bounds(self) -> (i128, i128) {
        match self {
            IntegerKind::I8 => (i8::MIN.into(), i8::MAX.into()),
            IntegerKind::I16 => (i16::MIN.into(), i16::MAX.into()),
            IntegerKind::I32 => (i32::MIN.into(), i32::MAX.into()),
            IntegerKind::I64 => (i64::MIN.into(), i64::MAX.into()),
            IntegerKind::U8 => (0, u8::MAX.into()),
            IntegerKind::U16 => (0, u16::MAX.into()),
            IntegerKind::U32 => (0, u32::MAX.into()),
            IntegerKind::U64 => (0, u64::MAX.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatKind {
    F32,
    F64,
}

/// Declared type of a record field.
///
/// The registry picks a default converter from this tag. `Custom` lets an
/// application register its own converter under a type name of its choice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Char,
    Boolean,
    Integer(IntegerKind),
    Float(FloatKind),
    Date,
    DateTime,
    Time,
    Enum { variants: Vec<String> },
    Custom(String),
}

impl FieldType {
    /// Builds an enumerated type from its variant names in declaration order.
    pub fn enumeration<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldType::Enum {
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    /// The registry lookup key: the type tag without its payload.
    pub fn key(&self) -> TypeKey {
        match self {
            FieldType::String => TypeKey::String,
            FieldType::Char => TypeKey::Char,
            FieldType::Boolean => TypeKey::Boolean,
            FieldType::Integer(_) => TypeKey::Integer,
            FieldType::Float(_) => TypeKey::Float,
            FieldType::Date => TypeKey::Date,
            FieldType::DateTime => TypeKey::DateTime,
            FieldType::Time => TypeKey::Time,
            FieldType::Enum { .. } => TypeKey::Enum,
            FieldType::Custom(name) => TypeKey::Custom(name.clone()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Integer(kind) => write!(f, "integer({kind:?})"),
            FieldType::Float(kind) => write!(f, "float({kind:?})"),
            FieldType::Enum { variants } => write!(f, "enum[{}]", variants.join("|")),
            FieldType::Custom(name) => write!(f, "custom({name})"),
            other => write!(f, "{}", other.key()),
        }
    }
}

/// Registry key derived from a [`FieldType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    String,
    Char,
    Boolean,
    Integer,
    Float,
    Date,
    DateTime,
    Time,
    Enum,
    Custom(String),
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeKey::String => "string",
            TypeKey::Char => "char",
            TypeKey::Boolean => "boolean",
            TypeKey::Integer => "integer",
            TypeKey::Float => "float",
            TypeKey::Date => "date",
            TypeKey::DateTime => "datetime",
            TypeKey::Time => "time",
            TypeKey::Enum => "enum",
            TypeKey::Custom(name) => name,
        };
        f.write_str(name)
    }
}

/// Identity of a record field, independent of any CSV concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    name: String,
    field_type: FieldType,
    index: usize,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, field_type: FieldType, index: usize) -> Self {
        Self {
            name: name.into(),
            field_type,
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Position of the field in the record's declaration list, including
    /// fields that are not mapped to a column.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// One entry of a record type's declaration list.
///
/// A declaration without `config` is a plain field that is not part of the
/// CSV row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ColumnConfig>,
}

impl FieldDeclaration {
    /// Declares a field mapped to a CSV column.
    pub fn column(name: impl Into<String>, field_type: FieldType, config: ColumnConfig) -> Self {
        Self {
            name: name.into(),
            field_type,
            config: Some(config),
        }
    }

    /// Declares a field that is not part of the CSV row.
    pub fn unmapped(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            config: None,
        }
    }

    /// Loads a declaration list from a JSON array.
    ///
    /// ```
    /// use csv_mapper::core::field::{FieldDeclaration, FieldType, IntegerKind};
    ///
    /// let json = r#"[
    ///     {"name": "name", "type": "string", "config": {"must_not_be_blank": true}},
    ///     {"name": "age", "type": {"integer": "u8"}, "config": {"default_value": "0"}},
    ///     {"name": "notes", "type": "string"}
    /// ]"#;
    ///
    /// let declarations = FieldDeclaration::list_from_json(json).unwrap();
    /// assert_eq!(declarations.len(), 3);
    /// assert_eq!(declarations[1].field_type, FieldType::Integer(IntegerKind::U8));
    /// assert!(declarations[2].config.is_none());
    /// ```
    #[cfg(feature = "json")]
    pub fn list_from_json(json: &str) -> Result<Vec<FieldDeclaration>, crate::MappingError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A record type that can be mapped to CSV rows.
///
/// Implementors enumerate their fields in declaration order and expose
/// get/set access by field identity. Decoding starts from `Default::default()`
/// and assigns every decoded column, so fields whose column is absent or
/// decodes to [`Value::Null`] keep their default value.
///
/// ```
/// use csv_mapper::core::column::ColumnConfig;
/// use csv_mapper::core::converter::ValueTypeError;
/// use csv_mapper::core::field::{CsvRecord, FieldDeclaration, FieldInfo, FieldType, IntegerKind};
/// use csv_mapper::core::value::Value;
///
/// #[derive(Default)]
/// struct Person {
///     name: String,
///     age: u8,
/// }
///
/// impl CsvRecord for Person {
///     fn declarations() -> Vec<FieldDeclaration> {
///         vec![
///             FieldDeclaration::column("name", FieldType::String, ColumnConfig::new()),
///             FieldDeclaration::column(
///                 "age",
///                 FieldType::Integer(IntegerKind::U8),
///                 ColumnConfig::new().default_value("0"),
///             ),
///         ]
///     }
///
///     fn get_field(&self, field: &FieldInfo) -> Value {
///         match field.name() {
///             "name" => self.name.as_str().into(),
///             "age" => self.age.into(),
///             _ => Value::Null,
///         }
///     }
///
///     fn set_field(&mut self, field: &FieldInfo, value: Value) -> Result<(), ValueTypeError> {
///         match field.name() {
///             "name" => self.name = value.try_into()?,
///             "age" => self.age = value.try_into()?,
///             _ => {}
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait CsvRecord: Default {
    /// The record's fields in declaration order.
    fn declarations() -> Vec<FieldDeclaration>;

    /// Reads the value of a field.
    fn get_field(&self, field: &FieldInfo) -> Value;

    /// Writes a decoded value into a field.
    fn set_field(&mut self, field: &FieldInfo, value: Value) -> Result<(), ValueTypeError>;
}
