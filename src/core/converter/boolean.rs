use super::{
    has_special_chars, ConfigError, Converter, ConverterFlag, ConverterFlags, ParseError,
    ValueTypeError,
};
use crate::core::{field::FieldInfo, value::Value};

/// Converter for boolean columns.
///
/// The format, when given, is `"<true text>,<false text>"` (for example
/// `"Y,N"`). Text matching neither decodes to `false` unless the
/// `ParseErrorOnInvalidValue` flag is set. Matching ignores case unless
/// `CaseSensitive` is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct BooleanConverter;

#[derive(Debug)]
pub struct BooleanConfig {
    true_text: String,
    false_text: String,
    case_sensitive: bool,
    error_on_invalid: bool,
}

impl BooleanConfig {
    fn matches(&self, expected: &str, text: &str) -> bool {
        if self.case_sensitive {
            expected == text
        } else {
            expected.eq_ignore_ascii_case(text)
        }
    }
}

impl Converter for BooleanConverter {
    type Config = BooleanConfig;

    fn name(&self) -> &'static str {
        "boolean"
    }

    fn configure(
        &self,
        format: Option<&str>,
        flags: &ConverterFlags,
        _field: &FieldInfo,
    ) -> Result<BooleanConfig, ConfigError> {
        flags.ensure_supported(&[
            ConverterFlag::CaseSensitive,
            ConverterFlag::ParseErrorOnInvalidValue,
        ])?;

        let (true_text, false_text) = match format {
            None => ("true", "false"),
            Some(format) => {
                let parts: Vec<&str> = format.split(',').collect();
                match parts.as_slice() {
                    [t, f] if !t.is_empty() && !f.is_empty() => (*t, *f),
                    _ => {
                        return Err(ConfigError::new(format!(
                            "boolean format must be '<true>,<false>', got '{format}'"
                        )));
                    }
                }
            }
        };

        let config = BooleanConfig {
            true_text: true_text.to_owned(),
            false_text: false_text.to_owned(),
            case_sensitive: flags.contains(ConverterFlag::CaseSensitive),
            error_on_invalid: flags.contains(ConverterFlag::ParseErrorOnInvalidValue),
        };
        if config.matches(&config.true_text, &config.false_text) {
            return Err(ConfigError::new(format!(
                "boolean true and false text are the same: '{true_text}'"
            )));
        }
        Ok(config)
    }

    fn needs_quotes(&self, config: &BooleanConfig) -> bool {
        has_special_chars(&config.true_text) || has_special_chars(&config.false_text)
    }

    fn value_to_text(&self, value: &Value, config: &BooleanConfig) -> Result<String, ValueTypeError> {
        match value {
            Value::Boolean(true) => Ok(config.true_text.clone()),
            Value::Boolean(false) => Ok(config.false_text.clone()),
            other => Err(ValueTypeError::new("boolean", other.kind())),
        }
    }

    fn text_to_value(&self, text: &str, config: &BooleanConfig) -> Result<Value, ParseError> {
        if text.is_empty() {
            Ok(Value::Null)
        } else if config.matches(&config.true_text, text) {
            Ok(Value::Boolean(true))
        } else if !config.error_on_invalid || config.matches(&config.false_text, text) {
            Ok(Value::Boolean(false))
        } else {
            Err(ParseError::new(
                format!(
                    "expected '{}' or '{}'",
                    config.true_text, config.false_text
                ),
                text,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::FieldType;

    fn configure(format: Option<&str>, flags: ConverterFlags) -> Result<BooleanConfig, ConfigError> {
        let field = FieldInfo::new("active", FieldType::Boolean, 0);
        BooleanConverter.configure(format, &flags, &field)
    }

    #[test]
    fn default_text_is_true_false() {
        let config = configure(None, ConverterFlags::new()).unwrap();
        assert_eq!(
            BooleanConverter
                .value_to_text(&Value::Boolean(true), &config)
                .unwrap(),
            "true"
        );
        assert_eq!(
            BooleanConverter.text_to_value("TRUE", &config).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            BooleanConverter.text_to_value("nope", &config).unwrap(),
            Value::Boolean(false)
        );
        assert_eq!(BooleanConverter.text_to_value("", &config).unwrap(), Value::Null);
        assert!(!BooleanConverter.needs_quotes(&config));
    }

    #[test]
    fn custom_format_and_strict_parsing() {
        let flags = ConverterFlags::new()
            .with(ConverterFlag::CaseSensitive)
            .with(ConverterFlag::ParseErrorOnInvalidValue);
        let config = configure(Some("Y,N"), flags).unwrap();

        assert_eq!(
            BooleanConverter.text_to_value("Y", &config).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            BooleanConverter.text_to_value("N", &config).unwrap(),
            Value::Boolean(false)
        );
        assert!(BooleanConverter.text_to_value("y", &config).is_err());
        assert!(BooleanConverter.text_to_value("maybe", &config).is_err());
    }

    #[test]
    fn malformed_format_is_rejected_at_configuration() {
        assert!(configure(Some("yes"), ConverterFlags::new()).is_err());
        assert!(configure(Some("a,b,c"), ConverterFlags::new()).is_err());
        assert!(configure(Some(",no"), ConverterFlags::new()).is_err());
        assert!(configure(Some("Yes,yes"), ConverterFlags::new()).is_err());
        assert!(
            configure(None, ConverterFlags::new().with(ConverterFlag::BlankIsNull)).is_err()
        );
    }

    #[test]
    fn quotes_needed_when_text_has_separators() {
        let config = configure(Some("yes;really,no"), ConverterFlags::new()).unwrap();
        assert!(BooleanConverter.needs_quotes(&config));
    }
}
