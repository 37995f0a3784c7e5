use super::{ConfigError, Converter, ConverterFlags, ParseError, ValueTypeError};
use crate::core::{field::FieldInfo, value::Value};

/// Converter for single character columns. Blank text decodes to `Null`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CharConverter;

impl Converter for CharConverter {
    type Config = ();

    fn name(&self) -> &'static str {
        "char"
    }

    fn configure(
        &self,
        format: Option<&str>,
        flags: &ConverterFlags,
        _field: &FieldInfo,
    ) -> Result<(), ConfigError> {
        if format.is_some() {
            return Err(ConfigError::new("char columns take no format"));
        }
        flags.ensure_supported(&[])
    }

    fn needs_quotes(&self, _config: &()) -> bool {
        true
    }

    fn value_to_text(&self, value: &Value, _config: &()) -> Result<String, ValueTypeError> {
        match value {
            Value::Char(c) => Ok(c.to_string()),
            other => Err(ValueTypeError::new("char", other.kind())),
        }
    }

    fn text_to_value(&self, text: &str, _config: &()) -> Result<Value, ParseError> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Ok(Value::Null),
            (Some(c), None) => Ok(Value::Char(c)),
            (Some(_), Some(_)) => Err(ParseError::new("expected a single character", text)),
        }
    }
}
