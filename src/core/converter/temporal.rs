//! Date, date-time and time converters using chrono strftime patterns.

use std::fmt::Write;

use chrono::{
    format::{Item, StrftimeItems},
    NaiveDate, NaiveDateTime, NaiveTime,
};

use super::{has_special_chars, ConfigError, Converter, ConverterFlags, ParseError, ValueTypeError};
use crate::core::{field::FieldInfo, value::Value};

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TemporalKind {
    Date,
    DateTime,
    Time,
}

/// Converter for `NaiveDate`, `NaiveDateTime` or `NaiveTime` columns.
#[derive(Debug, Clone, Copy)]
pub struct TemporalConverter {
    kind: TemporalKind,
}

#[derive(Debug)]
pub struct TemporalConfig {
    format: String,
}

impl TemporalConverter {
    pub fn date() -> Self {
        Self {
            kind: TemporalKind::Date,
        }
    }

    pub fn date_time() -> Self {
        Self {
            kind: TemporalKind::DateTime,
        }
    }

    pub fn time() -> Self {
        Self {
            kind: TemporalKind::Time,
        }
    }

    fn default_format(&self) -> &'static str {
        match self.kind {
            TemporalKind::Date => DEFAULT_DATE_FORMAT,
            TemporalKind::DateTime => DEFAULT_DATE_TIME_FORMAT,
            TemporalKind::Time => DEFAULT_TIME_FORMAT,
        }
    }

    /// A fixed value used to check that a pattern reads back what it writes.
    fn sample(&self) -> Value {
        let date = NaiveDate::from_ymd_opt(2001, 2, 3).unwrap_or_default();
        let time = NaiveTime::from_hms_opt(4, 5, 6).unwrap_or_default();
        match self.kind {
            TemporalKind::Date => Value::Date(date),
            TemporalKind::DateTime => Value::DateTime(date.and_time(time)),
            TemporalKind::Time => Value::Time(time),
        }
    }

    fn format(&self, value: &Value, format: &str) -> Result<Option<String>, ValueTypeError> {
        let mut text = String::new();
        let written = match (self.kind, value) {
            (TemporalKind::Date, Value::Date(d)) => write!(text, "{}", d.format(format)),
            (TemporalKind::DateTime, Value::DateTime(d)) => write!(text, "{}", d.format(format)),
            (TemporalKind::Time, Value::Time(t)) => write!(text, "{}", t.format(format)),
            (_, other) => return Err(ValueTypeError::new(Converter::name(self), other.kind())),
        };
        Ok(written.ok().map(|()| text))
    }
}

impl Converter for TemporalConverter {
    type Config = TemporalConfig;

    fn name(&self) -> &'static str {
        match self.kind {
            TemporalKind::Date => "date",
            TemporalKind::DateTime => "datetime",
            TemporalKind::Time => "time",
        }
    }

    fn configure(
        &self,
        format: Option<&str>,
        flags: &ConverterFlags,
        _field: &FieldInfo,
    ) -> Result<TemporalConfig, ConfigError> {
        flags.ensure_supported(&[])?;
        let format = format.unwrap_or(self.default_format());

        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::new(format!("invalid {} pattern '{format}'", Converter::name(self))));
        }

        let config = TemporalConfig {
            format: format.to_owned(),
        };
        let round_trips = self
            .format(&self.sample(), format)
            .ok()
            .flatten()
            .and_then(|text| {
                let value = self.text_to_value(&text, &config).ok()?;
                let again = self.format(&value, format).ok().flatten()?;
                Some(again == text)
            })
            .unwrap_or(false);
        if !round_trips {
            return Err(ConfigError::new(format!(
                "{} pattern '{format}' cannot be read back",
                Converter::name(self)
            )));
        }
        Ok(config)
    }

    fn needs_quotes(&self, config: &TemporalConfig) -> bool {
        // %e, %k, %l and %_ pad with spaces
        has_special_chars(&config.format)
            || ["%e", "%k", "%l", "%_"]
                .iter()
                .any(|padded| config.format.contains(padded))
    }

    fn value_to_text(&self, value: &Value, config: &TemporalConfig) -> Result<String, ValueTypeError> {
        // configure already proved the pattern formats, so None cannot happen here
        Ok(self.format(value, &config.format)?.unwrap_or_default())
    }

    fn text_to_value(&self, text: &str, config: &TemporalConfig) -> Result<Value, ParseError> {
        if text.is_empty() {
            return Ok(Value::Null);
        }
        let parsed = match self.kind {
            TemporalKind::Date => NaiveDate::parse_from_str(text, &config.format).map(Value::Date),
            TemporalKind::DateTime => {
                NaiveDateTime::parse_from_str(text, &config.format).map(Value::DateTime)
            }
            TemporalKind::Time => NaiveTime::parse_from_str(text, &config.format).map(Value::Time),
        };
        parsed.map_err(|error| {
            ParseError::new(format!("does not match '{}': {error}", config.format), text)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::FieldType;

    fn configure(
        converter: TemporalConverter,
        format: Option<&str>,
    ) -> Result<TemporalConfig, ConfigError> {
        let field = FieldInfo::new("when", FieldType::Date, 0);
        converter.configure(format, &ConverterFlags::new(), &field)
    }

    #[test]
    fn date_with_default_format() {
        let converter = TemporalConverter::date();
        let config = configure(converter, None).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();

        assert_eq!(
            converter.value_to_text(&Value::Date(date), &config).unwrap(),
            "2024-02-29"
        );
        assert_eq!(
            converter.text_to_value("2024-02-29", &config).unwrap(),
            Value::Date(date)
        );
        assert!(converter.text_to_value("2024-02-30", &config).is_err());
        assert_eq!(converter.text_to_value("", &config).unwrap(), Value::Null);
        assert!(!converter.needs_quotes(&config));
    }

    #[test]
    fn custom_date_format_with_comma_needs_quotes() {
        let converter = TemporalConverter::date();
        let config = configure(converter, Some("%b %d, %Y")).unwrap();
        let date = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();

        assert_eq!(
            converter.value_to_text(&Value::Date(date), &config).unwrap(),
            "Dec 31, 1999"
        );
        assert!(converter.needs_quotes(&config));
    }

    #[test]
    fn space_padded_pattern_needs_quotes() {
        let converter = TemporalConverter::date();
        let config = configure(converter, Some("%e.%m.%Y")).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

        assert_eq!(
            converter.value_to_text(&Value::Date(date), &config).unwrap(),
            " 5.01.2024"
        );
        assert!(converter.needs_quotes(&config));
        assert!(!converter.needs_quotes(&configure(converter, Some("%d.%m.%Y")).unwrap()));
    }

    #[test]
    fn invalid_patterns_fail_configuration() {
        assert!(configure(TemporalConverter::date(), Some("%Q")).is_err());
        // year only cannot identify a date
        assert!(configure(TemporalConverter::date(), Some("%Y")).is_err());
        assert!(configure(TemporalConverter::time(), Some("%H")).is_err());
    }

    #[test]
    fn date_time_and_time() {
        let converter = TemporalConverter::date_time();
        let config = configure(converter, Some("%d/%m/%Y %H:%M")).unwrap();
        let value = converter.text_to_value("03/02/2001 04:05", &config).unwrap();
        assert_eq!(
            converter.value_to_text(&value, &config).unwrap(),
            "03/02/2001 04:05"
        );

        let converter = TemporalConverter::time();
        let config = configure(converter, None).unwrap();
        let time = NaiveTime::from_hms_opt(23, 59, 1).unwrap();
        assert_eq!(
            converter.text_to_value("23:59:01", &config).unwrap(),
            Value::Time(time)
        );
        assert!(
            converter
                .value_to_text(&Value::Date(NaiveDate::default()), &config)
                .is_err()
        );
    }
}
