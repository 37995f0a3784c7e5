//! Integer and floating point converters.
//!
//! Both accept an optional decimal pattern built from `0` (mandatory digit),
//! `#` (optional digit), `,` (thousands grouping) and, for floats only, one
//! `.` followed by the fraction digits. `"#,##0"` groups thousands,
//! `"000"` pads to three digits, `"0.00"` always prints two decimals and
//! `"0.0##"` prints between one and three.

use super::{ConfigError, Converter, ConverterFlags, ParseError, ValueTypeError};
use crate::core::{
    field::{FieldInfo, FieldType, FloatKind, IntegerKind},
    value::Value,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberPattern {
    grouping: bool,
    min_integer_digits: usize,
    min_fraction_digits: usize,
    max_fraction_digits: usize,
}

impl NumberPattern {
    pub fn parse(pattern: &str, allow_fraction: bool) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::new(format!("invalid number pattern '{pattern}': {reason}"));

        let (integer, fraction) = match pattern.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (pattern, None),
        };

        if !integer.chars().any(|c| c == '0' || c == '#') {
            return Err(invalid("no integer digits"));
        }
        if let Some(c) = integer.chars().find(|c| !matches!(c, '0' | '#' | ',')) {
            return Err(invalid(&format!("unexpected character '{c}'")));
        }
        if integer.ends_with(',') {
            return Err(invalid("grouping separator at the end of the integer part"));
        }

        let (min_fraction_digits, max_fraction_digits) = match fraction {
            None => (0, 0),
            Some(_) if !allow_fraction => return Err(invalid("fraction digits are not allowed")),
            Some(fraction) => {
                if fraction.is_empty() {
                    return Err(invalid("no fraction digits after '.'"));
                }
                if let Some(c) = fraction.chars().find(|c| !matches!(c, '0' | '#')) {
                    return Err(invalid(&format!("unexpected character '{c}'")));
                }
                let zeros = fraction.chars().take_while(|c| *c == '0').count();
                if fraction[zeros..].contains('0') {
                    return Err(invalid("mandatory fraction digits must come first"));
                }
                (zeros, fraction.len())
            }
        };

        Ok(Self {
            grouping: integer.contains(','),
            min_integer_digits: integer.chars().filter(|c| *c == '0').count(),
            min_fraction_digits,
            max_fraction_digits,
        })
    }

    pub fn grouping(&self) -> bool {
        self.grouping
    }

    /// Pads and groups an unsigned digit string.
    fn integer_digits(&self, digits: &str) -> String {
        let mut padded = String::with_capacity(digits.len() + self.min_integer_digits);
        for _ in digits.len()..self.min_integer_digits {
            padded.push('0');
        }
        padded.push_str(digits);

        if !self.grouping || padded.len() <= 3 {
            return padded;
        }

        let mut grouped = String::with_capacity(padded.len() + padded.len() / 3);
        let head = padded.len() % 3;
        for (i, c) in padded.chars().enumerate() {
            if i > 0 && (i + 3 - head) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        grouped
    }

    fn format_integer(&self, value: i128) -> String {
        let digits = self.integer_digits(&value.unsigned_abs().to_string());
        if value < 0 {
            format!("-{digits}")
        } else {
            digits
        }
    }

    fn format_float(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let rounded = format!("{:.*}", self.max_fraction_digits, value.abs());
        let (integer, fraction) = match rounded.split_once('.') {
            Some((integer, fraction)) => (integer, fraction),
            None => (rounded.as_str(), ""),
        };
        let mut fraction = fraction.to_owned();
        while fraction.len() > self.min_fraction_digits && fraction.ends_with('0') {
            fraction.pop();
        }

        let is_zero = integer.chars().chain(fraction.chars()).all(|c| c == '0');
        let mut text = String::new();
        if value.is_sign_negative() && !is_zero {
            text.push('-');
        }
        text.push_str(&self.integer_digits(integer));
        if !fraction.is_empty() {
            text.push('.');
            text.push_str(&fraction);
        }
        text
    }

    /// Removes grouping separators before handing text to the std parser.
    fn strip<'a>(&self, text: &'a str) -> std::borrow::Cow<'a, str> {
        if self.grouping && text.contains(',') {
            text.replace(',', "").into()
        } else {
            text.into()
        }
    }
}

fn configure_pattern(
    format: Option<&str>,
    flags: &ConverterFlags,
    allow_fraction: bool,
) -> Result<Option<NumberPattern>, ConfigError> {
    flags.ensure_supported(&[])?;
    format
        .map(|format| NumberPattern::parse(format, allow_fraction))
        .transpose()
}

/// Converter for all integer widths. The width comes from the field's
/// declared type (`i64` when the field is not an integer type).
#[derive(Debug, Default, Clone, Copy)]
pub struct IntegerConverter;

#[derive(Debug)]
pub struct IntegerConfig {
    kind: IntegerKind,
    pattern: Option<NumberPattern>,
}

impl Converter for IntegerConverter {
    type Config = IntegerConfig;

    fn name(&self) -> &'static str {
        "integer"
    }

    fn configure(
        &self,
        format: Option<&str>,
        flags: &ConverterFlags,
        field: &FieldInfo,
    ) -> Result<IntegerConfig, ConfigError> {
        let kind = match field.field_type() {
            FieldType::Integer(kind) => *kind,
            _ => IntegerKind::I64,
        };
        Ok(IntegerConfig {
            kind,
            pattern: configure_pattern(format, flags, false)?,
        })
    }

    fn needs_quotes(&self, config: &IntegerConfig) -> bool {
        config.pattern.as_ref().is_some_and(NumberPattern::grouping)
    }

    fn value_to_text(&self, value: &Value, config: &IntegerConfig) -> Result<String, ValueTypeError> {
        let number = match value {
            Value::Int(v) => i128::from(*v),
            Value::UInt(v) => i128::from(*v),
            other => return Err(ValueTypeError::new("integer", other.kind())),
        };
        Ok(match &config.pattern {
            Some(pattern) => pattern.format_integer(number),
            None => number.to_string(),
        })
    }

    fn text_to_value(&self, text: &str, config: &IntegerConfig) -> Result<Value, ParseError> {
        if text.is_empty() {
            return Ok(Value::Null);
        }
        let digits = match &config.pattern {
            Some(pattern) => pattern.strip(text),
            None => text.into(),
        };
        let number: i128 = digits
            .parse()
            .map_err(|_| ParseError::new("invalid integer", text))?;

        let (min, max) = config.kind.bounds();
        let out_of_range = || ParseError::new(format!("out of range for {:?}", config.kind), text);
        if number < min || number > max {
            return Err(out_of_range());
        }
        if config.kind.is_signed() {
            i64::try_from(number).map(Value::Int).map_err(|_| out_of_range())
        } else {
            u64::try_from(number).map(Value::UInt).map_err(|_| out_of_range())
        }
    }
}

/// Converter for `f32` and `f64` columns.
#[derive(Debug, Default, Clone, Copy)]
pub struct FloatConverter;

#[derive(Debug)]
pub struct FloatConfig {
    kind: FloatKind,
    pattern: Option<NumberPattern>,
}

impl Converter for FloatConverter {
    type Config = FloatConfig;

    fn name(&self) -> &'static str {
        "float"
    }

    fn configure(
        &self,
        format: Option<&str>,
        flags: &ConverterFlags,
        field: &FieldInfo,
    ) -> Result<FloatConfig, ConfigError> {
        let kind = match field.field_type() {
            FieldType::Float(kind) => *kind,
            _ => FloatKind::F64,
        };
        Ok(FloatConfig {
            kind,
            pattern: configure_pattern(format, flags, true)?,
        })
    }

    fn needs_quotes(&self, config: &FloatConfig) -> bool {
        config.pattern.as_ref().is_some_and(NumberPattern::grouping)
    }

    fn value_to_text(&self, value: &Value, config: &FloatConfig) -> Result<String, ValueTypeError> {
        let number = match value {
            Value::Float(v) => *v,
            other => return Err(ValueTypeError::new("float", other.kind())),
        };
        Ok(match (&config.pattern, config.kind) {
            (Some(pattern), _) => pattern.format_float(number),
            // shortest text that reads back as the same f32
            (None, FloatKind::F32) => (number as f32).to_string(),
            (None, FloatKind::F64) => number.to_string(),
        })
    }

    fn text_to_value(&self, text: &str, config: &FloatConfig) -> Result<Value, ParseError> {
        if text.is_empty() {
            return Ok(Value::Null);
        }
        let digits = match &config.pattern {
            Some(pattern) => pattern.strip(text),
            None => text.into(),
        };
        let invalid = || ParseError::new("invalid number", text);
        match config.kind {
            FloatKind::F32 => digits
                .parse::<f32>()
                .map(|v| Value::Float(f64::from(v)))
                .map_err(|_| invalid()),
            FloatKind::F64 => digits.parse::<f64>().map(Value::Float).map_err(|_| invalid()),
        }
    }
}
