use super::{
    has_special_chars, ConfigError, Converter, ConverterFlag, ConverterFlags, ParseError,
    ValueTypeError,
};
use crate::core::{
    field::{FieldInfo, FieldType},
    value::Value,
};

/// Converter for enumerated columns.
///
/// The variant names come from the field's `FieldType::Enum` declaration.
/// The format, when given, names the variant used for unknown text instead
/// of failing. The `CaseInsensitive` flag relaxes name matching.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnumConverter;

#[derive(Debug)]
pub struct EnumConfig {
    variants: Vec<String>,
    unknown: Option<String>,
    case_insensitive: bool,
}

impl EnumConfig {
    fn lookup(&self, text: &str) -> Option<&String> {
        self.variants.iter().find(|variant| {
            if self.case_insensitive {
                variant.eq_ignore_ascii_case(text)
            } else {
                variant.as_str() == text
            }
        })
    }
}

impl Converter for EnumConverter {
    type Config = EnumConfig;

    fn name(&self) -> &'static str {
        "enum"
    }

    fn configure(
        &self,
        format: Option<&str>,
        flags: &ConverterFlags,
        field: &FieldInfo,
    ) -> Result<EnumConfig, ConfigError> {
        flags.ensure_supported(&[ConverterFlag::CaseInsensitive])?;

        let variants = match field.field_type() {
            FieldType::Enum { variants } if !variants.is_empty() => variants.clone(),
            other => {
                return Err(ConfigError::new(format!(
                    "enum converter needs a non-empty enum type, field is {other}"
                )));
            }
        };

        let mut config = EnumConfig {
            variants,
            unknown: None,
            case_insensitive: flags.contains(ConverterFlag::CaseInsensitive),
        };
        if let Some(format) = format {
            let unknown = config.lookup(format).cloned().ok_or_else(|| {
                ConfigError::new(format!("unknown value '{format}' is not a variant"))
            })?;
            config.unknown = Some(unknown);
        }
        Ok(config)
    }

    fn needs_quotes(&self, config: &EnumConfig) -> bool {
        config.variants.iter().any(|variant| has_special_chars(variant))
    }

    fn value_to_text(&self, value: &Value, config: &EnumConfig) -> Result<String, ValueTypeError> {
        match value {
            Value::Enum(name) | Value::String(name) => config
                .lookup(name)
                .cloned()
                .ok_or_else(|| ValueTypeError::new("enum variant", name.clone())),
            other => Err(ValueTypeError::new("enum", other.kind())),
        }
    }

    fn text_to_value(&self, text: &str, config: &EnumConfig) -> Result<Value, ParseError> {
        if text.is_empty() {
            return Ok(Value::Null);
        }
        config
            .lookup(text)
            .or(config.unknown.as_ref())
            .map(|variant| Value::Enum(variant.clone()))
            .ok_or_else(|| ParseError::new(format!("expected one of {:?}", config.variants), text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> FieldInfo {
        FieldInfo::new("color", FieldType::enumeration(["Red", "Green", "Blue"]), 0)
    }

    #[test]
    fn exact_match_by_default() {
        let config = EnumConverter
            .configure(None, &ConverterFlags::new(), &field())
            .unwrap();
        assert_eq!(
            EnumConverter.text_to_value("Green", &config).unwrap(),
            Value::variant("Green")
        );
        assert!(EnumConverter.text_to_value("green", &config).is_err());
        assert_eq!(EnumConverter.text_to_value("", &config).unwrap(), Value::Null);
    }

    #[test]
    fn unknown_value_and_case_insensitive() {
        let flags = ConverterFlags::new().with(ConverterFlag::CaseInsensitive);
        let config = EnumConverter.configure(Some("red"), &flags, &field()).unwrap();
        assert_eq!(
            EnumConverter.text_to_value("BLUE", &config).unwrap(),
            Value::variant("Blue")
        );
        assert_eq!(
            EnumConverter.text_to_value("purple", &config).unwrap(),
            Value::variant("Red")
        );
    }

    #[test]
    fn configuration_errors() {
        assert!(
            EnumConverter
                .configure(Some("Purple"), &ConverterFlags::new(), &field())
                .is_err()
        );
        let not_enum = FieldInfo::new("color", FieldType::String, 0);
        assert!(
            EnumConverter
                .configure(None, &ConverterFlags::new(), &not_enum)
                .is_err()
        );
    }

    #[test]
    fn formatting_requires_a_known_variant() {
        let config = EnumConverter
            .configure(None, &ConverterFlags::new(), &field())
            .unwrap();
        assert_eq!(
            EnumConverter
                .value_to_text(&Value::variant("Blue"), &config)
                .unwrap(),
            "Blue"
        );
        assert!(
            EnumConverter
                .value_to_text(&Value::variant("Purple"), &config)
                .is_err()
        );
        assert!(!EnumConverter.needs_quotes(&config));
    }
}
