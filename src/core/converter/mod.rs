//! Value converters: the per-column text <-> value capability.
//!
//! A converter is configured exactly once per column. Everything that can be
//! validated (format patterns, flags) is checked in [`Converter::configure`],
//! so the per-row calls only transform data.
//!
//! Implement [`Converter`] for a new value type and register it in a
//! [`ConverterRegistry`], either for a [`TypeKey`](super::field::TypeKey) or
//! under a name that column configurations select explicitly.

use std::{
    any::Any,
    collections::BTreeSet,
    fmt,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{field::FieldInfo, value::Value};

pub mod boolean;
pub mod character;
pub mod enumeration;
pub mod number;
pub mod registry;
pub mod string;
pub mod temporal;

pub use registry::ConverterRegistry;

/// Raised by [`Converter::configure`] for a malformed format or flag set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ConfigError {
    reason: String,
}

impl ConfigError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Raised by [`Converter::text_to_value`] when text cannot be interpreted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not parse '{text}': {reason}")]
pub struct ParseError {
    reason: String,
    text: String,
}

impl ParseError {
    pub fn new(reason: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            text: text.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The text handed to the converter, after trimming and defaulting.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A value did not have the type a converter or record field expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected {expected} but found {found}")]
pub struct ValueTypeError {
    expected: &'static str,
    found: String,
}

impl ValueTypeError {
    pub fn new(expected: &'static str, found: impl Into<String>) -> Self {
        Self {
            expected,
            found: found.into(),
        }
    }

    pub fn out_of_range(expected: &'static str, value: impl fmt::Display) -> Self {
        Self {
            expected,
            found: format!("out of range value {value}"),
        }
    }

    pub fn expected(&self) -> &'static str {
        self.expected
    }

    pub fn found(&self) -> &str {
        &self.found
    }
}

/// Converter-specific options attached to a column.
///
/// Each converter declares which flags it understands; any other flag fails
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConverterFlag {
    /// String columns decode blank text as `Null` instead of `""`.
    BlankIsNull,
    /// Boolean columns reject text that is neither the true nor false text.
    ParseErrorOnInvalidValue,
    /// Boolean columns compare the true/false text case sensitively.
    CaseSensitive,
    /// Enum columns match variant names ignoring case.
    CaseInsensitive,
}

/// Set of [`ConverterFlag`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConverterFlags(BTreeSet<ConverterFlag>);

impl ConverterFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, flag: ConverterFlag) -> Self {
        self.0.insert(flag);
        self
    }

    pub fn contains(&self, flag: ConverterFlag) -> bool {
        self.0.contains(&flag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ConverterFlag> + '_ {
        self.0.iter().copied()
    }

    /// Fails on the first flag not listed in `supported`.
    pub fn ensure_supported(&self, supported: &[ConverterFlag]) -> Result<(), ConfigError> {
        match self.iter().find(|flag| !supported.contains(flag)) {
            Some(flag) => Err(ConfigError::new(format!(
                "flag {flag:?} is not supported by this converter"
            ))),
            None => Ok(()),
        }
    }
}

impl FromIterator<ConverterFlag> for ConverterFlags {
    fn from_iter<I: IntoIterator<Item = ConverterFlag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Type-directed text <-> value transformation for one kind of column.
///
/// The lifecycle per column is: `configure` once, `needs_quotes` once, then
/// `value_to_text` / `text_to_value` once per row. `Config` is private state
/// produced by `configure` and handed back on every later call.
pub trait Converter: Send + Sync + 'static {
    type Config: Send + Sync + 'static;

    /// Name used in logs and for explicit selection in a registry.
    fn name(&self) -> &'static str;

    fn configure(
        &self,
        format: Option<&str>,
        flags: &ConverterFlags,
        field: &FieldInfo,
    ) -> Result<Self::Config, ConfigError>;

    /// Whether text produced for this configuration may contain characters
    /// the line writer has to quote.
    fn needs_quotes(&self, config: &Self::Config) -> bool;

    /// Formats a value. Only fails when the value is not of the converter's
    /// type. `Value::Null` is handled before this is called.
    fn value_to_text(&self, value: &Value, config: &Self::Config) -> Result<String, ValueTypeError>;

    /// Parses text that already went through trim and default handling.
    fn text_to_value(&self, text: &str, config: &Self::Config) -> Result<Value, ParseError>;
}

/// Opaque per-column converter state produced by configuration.
pub struct ConfigInfo(Box<dyn Any + Send + Sync>);

impl ConfigInfo {
    fn new<T: Any + Send + Sync>(config: T) -> Self {
        Self(Box::new(config))
    }

    fn get<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for ConfigInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConfigInfo(..)")
    }
}

/// Object-safe form of [`Converter`] with the configuration type erased.
///
/// Every `Converter` gets this through a blanket impl; columns and the
/// registry store `Arc<dyn ErasedConverter>`.
pub trait ErasedConverter: Send + Sync {
    fn name(&self) -> &'static str;

    fn configure(
        &self,
        format: Option<&str>,
        flags: &ConverterFlags,
        field: &FieldInfo,
    ) -> Result<ConfigInfo, ConfigError>;

    fn needs_quotes(&self, config: &ConfigInfo) -> bool;

    fn value_to_text(&self, value: &Value, config: &ConfigInfo) -> Result<String, ValueTypeError>;

    fn text_to_value(&self, text: &str, config: &ConfigInfo) -> Result<Value, ParseError>;
}

const FOREIGN_CONFIG: &str = "configuration of another converter";

impl<C: Converter> ErasedConverter for C {
    fn name(&self) -> &'static str {
        Converter::name(self)
    }

    fn configure(
        &self,
        format: Option<&str>,
        flags: &ConverterFlags,
        field: &FieldInfo,
    ) -> Result<ConfigInfo, ConfigError> {
        Converter::configure(self, format, flags, field).map(ConfigInfo::new)
    }

    fn needs_quotes(&self, config: &ConfigInfo) -> bool {
        // a foreign configuration is never produced by column resolution, quote to be safe
        config
            .get::<C::Config>()
            .is_none_or(|config| Converter::needs_quotes(self, config))
    }

    fn value_to_text(&self, value: &Value, config: &ConfigInfo) -> Result<String, ValueTypeError> {
        let config = config
            .get::<C::Config>()
            .ok_or_else(|| ValueTypeError::new(Converter::name(self), FOREIGN_CONFIG))?;
        Converter::value_to_text(self, value, config)
    }

    fn text_to_value(&self, text: &str, config: &ConfigInfo) -> Result<Value, ParseError> {
        let config = config
            .get::<C::Config>()
            .ok_or_else(|| ParseError::new(FOREIGN_CONFIG, text))?;
        Converter::text_to_value(self, text, config)
    }
}

/// Whether `text` holds a character that commonly needs quoting in a CSV
/// line: a usual delimiter, a quote, a line break, or edge whitespace.
pub(crate) fn has_special_chars(text: &str) -> bool {
    text.starts_with(char::is_whitespace)
        || text.ends_with(char::is_whitespace)
        || text
            .chars()
            .any(|c| matches!(c, ',' | ';' | '\t' | '|' | '"' | '\n' | '\r'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::FieldType;

    #[test]
    fn unsupported_flag_fails() {
        let flags = ConverterFlags::new().with(ConverterFlag::CaseSensitive);
        assert!(flags.ensure_supported(&[ConverterFlag::CaseSensitive]).is_ok());
        let err = flags
            .ensure_supported(&[ConverterFlag::BlankIsNull])
            .unwrap_err();
        assert!(err.reason().contains("CaseSensitive"));
    }

    #[test]
    fn erased_converter_rejects_foreign_config() {
        let field = FieldInfo::new("f", FieldType::String, 0);
        let flags = ConverterFlags::new();
        let string_config =
            ErasedConverter::configure(&string::StringConverter, None, &flags, &field).unwrap();

        let converter = boolean::BooleanConverter;
        let err = ErasedConverter::text_to_value(&converter, "true", &string_config).unwrap_err();
        assert_eq!(err.reason(), FOREIGN_CONFIG);
        assert!(ErasedConverter::needs_quotes(&converter, &string_config));
    }

    #[test]
    fn special_chars() {
        assert!(has_special_chars("a,b"));
        assert!(has_special_chars(" a"));
        assert!(has_special_chars("say \"hi\""));
        assert!(!has_special_chars("plain-text_1.0"));
        assert!(!has_special_chars(""));
    }

    #[test]
    fn flags_deserialize_from_list() {
        let flags: ConverterFlags =
            serde_json::from_str(r#"["case_sensitive", "parse_error_on_invalid_value"]"#).unwrap();
        assert!(flags.contains(ConverterFlag::CaseSensitive));
        assert!(flags.contains(ConverterFlag::ParseErrorOnInvalidValue));
        assert!(!flags.contains(ConverterFlag::BlankIsNull));
    }
}
