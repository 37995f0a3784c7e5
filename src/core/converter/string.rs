use super::{ConfigError, Converter, ConverterFlag, ConverterFlags, ParseError, ValueTypeError};
use crate::core::{field::FieldInfo, value::Value};

/// Converter for free text columns. The text is taken as is.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringConverter;

#[derive(Debug)]
pub struct StringConfig {
    blank_is_null: bool,
}

impl Converter for StringConverter {
    type Config = StringConfig;

    fn name(&self) -> &'static str {
        "string"
    }

    fn configure(
        &self,
        format: Option<&str>,
        flags: &ConverterFlags,
        _field: &FieldInfo,
    ) -> Result<StringConfig, ConfigError> {
        if let Some(format) = format {
            return Err(ConfigError::new(format!(
                "string columns take no format, got '{format}'"
            )));
        }
        flags.ensure_supported(&[ConverterFlag::BlankIsNull])?;
        Ok(StringConfig {
            blank_is_null: flags.contains(ConverterFlag::BlankIsNull),
        })
    }

    fn needs_quotes(&self, _config: &StringConfig) -> bool {
        true
    }

    fn value_to_text(&self, value: &Value, _config: &StringConfig) -> Result<String, ValueTypeError> {
        match value {
            Value::String(s) | Value::Enum(s) => Ok(s.clone()),
            Value::Char(c) => Ok(c.to_string()),
            other => Err(ValueTypeError::new("string", other.kind())),
        }
    }

    fn text_to_value(&self, text: &str, config: &StringConfig) -> Result<Value, ParseError> {
        if text.is_empty() && config.blank_is_null {
            Ok(Value::Null)
        } else {
            Ok(Value::String(text.to_owned()))
        }
    }
}
