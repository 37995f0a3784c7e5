use std::{collections::HashMap, fmt, sync::Arc};

use super::{
    boolean::BooleanConverter, character::CharConverter, enumeration::EnumConverter,
    number::{FloatConverter, IntegerConverter}, string::StringConverter,
    temporal::TemporalConverter, Converter, ErasedConverter,
};
use crate::core::field::{FieldType, TypeKey};

/// Maps declared field types to default converters, and names to converters
/// that a column can select explicitly.
///
/// `ConverterRegistry::default()` contains every built-in converter, each
/// registered both for its type and under its name (`"string"`, `"char"`,
/// `"boolean"`, `"integer"`, `"float"`, `"date"`, `"datetime"`, `"time"`,
/// `"enum"`).
///
/// ```
/// use csv_mapper::core::converter::ConverterRegistry;
/// use csv_mapper::core::field::FieldType;
///
/// let registry = ConverterRegistry::default();
/// let converter = registry.resolve(&FieldType::Boolean).unwrap();
/// assert_eq!(converter.name(), "boolean");
/// assert!(registry.resolve(&FieldType::Custom("money".to_string())).is_none());
/// ```
#[derive(Clone)]
pub struct ConverterRegistry {
    by_type: HashMap<TypeKey, Arc<dyn ErasedConverter>>,
    by_name: HashMap<String, Arc<dyn ErasedConverter>>,
}

impl ConverterRegistry {
    /// A registry without any converter.
    pub fn empty() -> Self {
        Self {
            by_type: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Registers `converter` as the default for `key` and under its name.
    pub fn register<C: Converter>(&mut self, key: TypeKey, converter: C) -> &mut Self {
        let converter: Arc<dyn ErasedConverter> = Arc::new(converter);
        self.by_name
            .insert(converter.name().to_owned(), Arc::clone(&converter));
        self.by_type.insert(key, converter);
        self
    }

    /// Registers `converter` for explicit selection only.
    pub fn register_named<C: Converter>(&mut self, name: impl Into<String>, converter: C) -> &mut Self {
        self.by_name.insert(name.into(), Arc::new(converter));
        self
    }

    /// The default converter for a declared type.
    pub fn resolve(&self, field_type: &FieldType) -> Option<Arc<dyn ErasedConverter>> {
        self.by_type.get(&field_type.key()).cloned()
    }

    /// A converter selected explicitly by name.
    pub fn named(&self, name: &str) -> Option<Arc<dyn ErasedConverter>> {
        self.by_name.get(name).cloned()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(TypeKey::String, StringConverter)
            .register(TypeKey::Char, CharConverter)
            .register(TypeKey::Boolean, BooleanConverter)
            .register(TypeKey::Integer, IntegerConverter)
            .register(TypeKey::Float, FloatConverter)
            .register(TypeKey::Date, TemporalConverter::date())
            .register(TypeKey::DateTime, TemporalConverter::date_time())
            .register(TypeKey::Time, TemporalConverter::time())
            .register(TypeKey::Enum, EnumConverter);
        registry
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ConverterRegistry")
            .field("types", &self.by_type.len())
            .field("names", &names)
            .finish()
    }
}
