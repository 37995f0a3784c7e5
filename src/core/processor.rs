use std::{any::type_name, fmt, marker::PhantomData, sync::Arc};

use log::{debug, trace};

use super::{
    column::ColumnInfo,
    converter::ConverterRegistry,
    field::CsvRecord,
};
use crate::error::MappingError;

/// One encoded column handed to the line writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedColumn {
    pub text: String,
    /// Whether the column's converter may produce text with characters
    /// that commonly need quoting (delimiters, quotes, line breaks, edge
    /// whitespace). A hint for line writers; the CSV writer quotes by
    /// content whatever this says.
    pub needs_quotes: bool,
}

/// Record-level check run after a row decoded successfully.
///
/// Any `Fn(&R, usize) -> Result<(), String>` closure is a validator.
pub trait RowValidator<R>: Send + Sync {
    fn validate(&self, record: &R, row_number: usize) -> Result<(), String>;
}

impl<R, F> RowValidator<R> for F
where
    F: Fn(&R, usize) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, record: &R, row_number: usize) -> Result<(), String> {
        self(record, row_number)
    }
}

/// Encodes records into column texts and decodes raw fields into records,
/// following the resolved columns of the record type.
///
/// The processor is immutable after [`RowProcessorBuilder::build`]; clones
/// share the same columns and it can be used from several threads.
///
/// # Examples
///
/// ```
/// # use csv_mapper::core::column::ColumnConfig;
/// # use csv_mapper::core::converter::ValueTypeError;
/// # use csv_mapper::core::field::{CsvRecord, FieldDeclaration, FieldInfo, FieldType, IntegerKind};
/// # use csv_mapper::core::value::Value;
/// use csv_mapper::core::processor::RowProcessor;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Person {
///     name: String,
///     age: u8,
/// }
/// # impl CsvRecord for Person {
/// #     fn declarations() -> Vec<FieldDeclaration> {
/// #         vec![
/// #             FieldDeclaration::column("name", FieldType::String, ColumnConfig::new()),
/// #             FieldDeclaration::column(
/// #                 "age",
/// #                 FieldType::Integer(IntegerKind::U8),
/// #                 ColumnConfig::new().default_value("0").must_be_supplied(false),
/// #             ),
/// #         ]
/// #     }
/// #     fn get_field(&self, field: &FieldInfo) -> Value {
/// #         match field.name() {
/// #             "name" => self.name.as_str().into(),
/// #             _ => self.age.into(),
/// #         }
/// #     }
/// #     fn set_field(&mut self, field: &FieldInfo, value: Value) -> Result<(), ValueTypeError> {
/// #         match field.name() {
/// #             "name" => self.name = value.try_into()?,
/// #             _ => self.age = value.try_into()?,
/// #         }
/// #         Ok(())
/// #     }
/// # }
///
/// let processor = RowProcessor::<Person>::new().unwrap();
///
/// let alice = processor.decode(&["Alice"], 1).unwrap();
/// assert_eq!(alice, Person { name: "Alice".to_string(), age: 0 });
///
/// let columns = processor.encode(&Person { name: "Bob".to_string(), age: 42 }).unwrap();
/// assert_eq!(columns[1].text, "42");
/// ```
pub struct RowProcessor<R> {
    columns: Arc<[ColumnInfo]>,
    always_trim_input: bool,
    allow_extra_columns: bool,
    header_case_insensitive: bool,
    validator: Option<Arc<dyn RowValidator<R>>>,
    _record: PhantomData<fn() -> R>,
}

impl<R: CsvRecord> RowProcessor<R> {
    /// Builds a processor with the default converter registry and options.
    pub fn new() -> Result<Self, MappingError> {
        RowProcessorBuilder::new().build()
    }

    pub fn builder() -> RowProcessorBuilder<R> {
        RowProcessorBuilder::new()
    }

    /// Columns in position order.
    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.column_name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(ColumnInfo::column_name).collect()
    }

    /// The header row as encoded columns.
    pub fn header(&self) -> Vec<EncodedColumn> {
        self.columns
            .iter()
            .map(|column| EncodedColumn {
                text: column.column_name().to_owned(),
                needs_quotes: true,
            })
            .collect()
    }

    /// Checks a header row read from input against the columns.
    ///
    /// Trailing columns that need not be supplied may be missing from the
    /// header. Extra header fields are only accepted with
    /// `allow_extra_columns`.
    pub fn validate_header<S: AsRef<str>>(
        &self,
        fields: &[S],
        row_number: usize,
    ) -> Result<(), MappingError> {
        let invalid = |reason: String| MappingError::InvalidHeader {
            row: row_number,
            reason,
        };

        if fields.len() > self.columns.len() && !self.allow_extra_columns {
            return Err(invalid(format!(
                "expected {} columns but found {}",
                self.columns.len(),
                fields.len()
            )));
        }

        for column in self.columns.iter() {
            match fields.get(column.position()) {
                None if column.must_be_supplied() => {
                    return Err(invalid(format!(
                        "column '{}' is missing",
                        column.column_name()
                    )));
                }
                None => {}
                Some(found) => {
                    let found = found.as_ref().trim();
                    let matches = if self.header_case_insensitive {
                        found.eq_ignore_ascii_case(column.column_name())
                    } else {
                        found == column.column_name()
                    };
                    if !matches {
                        return Err(invalid(format!(
                            "column {} should be '{}' but was '{}'",
                            column.position(),
                            column.column_name(),
                            found
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Encodes a record into one text per column, in position order.
    ///
    /// A `Null` field value is written as the column's default text, or
    /// blank when there is none.
    pub fn encode(&self, record: &R) -> Result<Vec<EncodedColumn>, MappingError> {
        self.columns
            .iter()
            .map(|column| {
                let value = record.get_field(column.field());
                let text = if value.is_null() {
                    column.default_value().unwrap_or_default().to_owned()
                } else {
                    column
                        .converter()
                        .value_to_text(&value, column.config_info())
                        .map_err(|source| MappingError::ValueType {
                            column: column.column_name().to_owned(),
                            source,
                        })?
                };
                Ok(EncodedColumn {
                    text,
                    needs_quotes: column.needs_quotes(),
                })
            })
            .collect()
    }

    /// Decodes the raw fields of one line into a record.
    ///
    /// `row_number` is only used to report errors. The first failing column
    /// aborts the row.
    pub fn decode<S: AsRef<str>>(&self, fields: &[S], row_number: usize) -> Result<R, MappingError> {
        if fields.len() > self.columns.len() && !self.allow_extra_columns {
            return Err(MappingError::TooManyColumns {
                row: row_number,
                expected: self.columns.len(),
                found: fields.len(),
            });
        }

        let mut record = R::default();
        for column in self.columns.iter() {
            let text = match fields.get(column.position()) {
                None if column.must_be_supplied() => {
                    return Err(MappingError::MissingColumn {
                        row: row_number,
                        column: column.column_name().to_owned(),
                        position: column.position(),
                    });
                }
                None => match column.default_value() {
                    Some(default) => default,
                    None => continue,
                },
                Some(raw) => {
                    let raw = raw.as_ref();
                    let text = if column.trim_input() || self.always_trim_input {
                        raw.trim()
                    } else {
                        raw
                    };
                    match column.default_value() {
                        Some(default) if text.is_empty() => default,
                        None if text.is_empty() && column.must_not_be_blank() => {
                            return Err(MappingError::BlankColumn {
                                row: row_number,
                                column: column.column_name().to_owned(),
                            });
                        }
                        _ => text,
                    }
                }
            };

            let value = column
                .converter()
                .text_to_value(text, column.config_info())
                .map_err(|source| MappingError::Parse {
                    row: row_number,
                    column: column.column_name().to_owned(),
                    source,
                })?;
            if value.is_null() {
                continue;
            }
            record
                .set_field(column.field(), value)
                .map_err(|source| MappingError::FieldAssignment {
                    row: row_number,
                    column: column.column_name().to_owned(),
                    source,
                })?;
        }

        if let Some(validator) = &self.validator {
            validator
                .validate(&record, row_number)
                .map_err(|reason| MappingError::RowValidation {
                    row: row_number,
                    reason,
                })?;
        }
        trace!("Decoded row {row_number}");
        Ok(record)
    }
}

impl<R> Clone for RowProcessor<R> {
    fn clone(&self) -> Self {
        Self {
            columns: Arc::clone(&self.columns),
            always_trim_input: self.always_trim_input,
            allow_extra_columns: self.allow_extra_columns,
            header_case_insensitive: self.header_case_insensitive,
            validator: self.validator.clone(),
            _record: PhantomData,
        }
    }
}

impl<R> fmt::Debug for RowProcessor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowProcessor")
            .field("record", &type_name::<R>())
            .field("columns", &self.columns)
            .field("always_trim_input", &self.always_trim_input)
            .field("allow_extra_columns", &self.allow_extra_columns)
            .field("header_case_insensitive", &self.header_case_insensitive)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// Builder for [`RowProcessor`].
///
/// # Default Configuration
///
/// - Registry: [`ConverterRegistry::default`]
/// - Always trim input: disabled
/// - Extra columns: rejected
/// - Header matching: case sensitive
/// - Row validator: none
pub struct RowProcessorBuilder<R> {
    registry: ConverterRegistry,
    always_trim_input: bool,
    allow_extra_columns: bool,
    header_case_insensitive: bool,
    validator: Option<Arc<dyn RowValidator<R>>>,
}

impl<R: CsvRecord> Default for RowProcessorBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CsvRecord> RowProcessorBuilder<R> {
    pub fn new() -> Self {
        Self {
            registry: ConverterRegistry::default(),
            always_trim_input: false,
            allow_extra_columns: false,
            header_case_insensitive: false,
            validator: None,
        }
    }

    /// Uses `registry` to resolve converters, e.g. one with custom types.
    pub fn registry(mut self, registry: ConverterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Trims every column on decode, as if each had `trim_input` set.
    pub fn always_trim_input(mut self, yes: bool) -> Self {
        self.always_trim_input = yes;
        self
    }

    /// Ignores raw fields past the last column instead of failing the row.
    pub fn allow_extra_columns(mut self, yes: bool) -> Self {
        self.allow_extra_columns = yes;
        self
    }

    pub fn header_case_insensitive(mut self, yes: bool) -> Self {
        self.header_case_insensitive = yes;
        self
    }

    pub fn row_validator(mut self, validator: impl RowValidator<R> + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Resolves every column of `R`. Fails on the first setup error, so no
    /// processor ever runs with a partial column set.
    pub fn build(self) -> Result<RowProcessor<R>, MappingError> {
        let columns = ColumnInfo::resolve_all(&R::declarations(), &self.registry)?;
        if columns.is_empty() {
            return Err(MappingError::NoColumns {
                record: type_name::<R>(),
            });
        }
        debug!(
            "Built row processor for {} with {} columns",
            type_name::<R>(),
            columns.len()
        );

        Ok(RowProcessor {
            columns: columns.into(),
            always_trim_input: self.always_trim_input,
            allow_extra_columns: self.allow_extra_columns,
            header_case_insensitive: self.header_case_insensitive,
            validator: self.validator,
            _record: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        column::ColumnConfig,
        converter::ValueTypeError,
        field::{FieldDeclaration, FieldInfo, FieldType, IntegerKind},
        value::Value,
    };

    #[derive(Debug, Default, PartialEq)]
    struct Person {
        name: String,
        age: i32,
    }

    impl CsvRecord for Person {
        fn declarations() -> Vec<FieldDeclaration> {
            vec![
                FieldDeclaration::column("name", FieldType::String, ColumnConfig::new()),
                FieldDeclaration::column(
                    "age",
                    FieldType::Integer(IntegerKind::I32),
                    ColumnConfig::new()
                        .default_value("0")
                        .must_be_supplied(false),
                ),
            ]
        }

        fn get_field(&self, field: &FieldInfo) -> Value {
            match field.name() {
                "name" => self.name.as_str().into(),
                "age" => self.age.into(),
                _ => Value::Null,
            }
        }

        fn set_field(&mut self, field: &FieldInfo, value: Value) -> Result<(), ValueTypeError> {
            match field.name() {
                "name" => self.name = value.try_into()?,
                "age" => self.age = value.try_into()?,
                _ => {}
            }
            Ok(())
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Strict {
        name: String,
        age: i32,
    }

    impl CsvRecord for Strict {
        fn declarations() -> Vec<FieldDeclaration> {
            vec![
                FieldDeclaration::column("name", FieldType::String, ColumnConfig::new()),
                FieldDeclaration::column(
                    "age",
                    FieldType::Integer(IntegerKind::I32),
                    ColumnConfig::new().must_not_be_blank(true),
                ),
            ]
        }

        fn get_field(&self, field: &FieldInfo) -> Value {
            match field.name() {
                "name" => self.name.as_str().into(),
                _ => self.age.into(),
            }
        }

        fn set_field(&mut self, field: &FieldInfo, value: Value) -> Result<(), ValueTypeError> {
            match field.name() {
                "name" => self.name = value.try_into()?,
                _ => self.age = value.try_into()?,
            }
            Ok(())
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Defaults {
        label: String,
        size: i32,
        count: i32,
    }

    impl CsvRecord for Defaults {
        fn declarations() -> Vec<FieldDeclaration> {
            vec![
                FieldDeclaration::column(
                    "label",
                    FieldType::String,
                    ColumnConfig::new().must_not_be_blank(true).default_value(""),
                ),
                FieldDeclaration::column(
                    "size",
                    FieldType::Integer(IntegerKind::I32),
                    ColumnConfig::new().must_not_be_blank(true).default_value("5"),
                ),
                FieldDeclaration::column(
                    "count",
                    FieldType::Integer(IntegerKind::I32),
                    ColumnConfig::new().must_be_supplied(true).default_value("9"),
                ),
            ]
        }

        fn get_field(&self, field: &FieldInfo) -> Value {
            match field.name() {
                "label" => self.label.as_str().into(),
                "size" => self.size.into(),
                _ => self.count.into(),
            }
        }

        fn set_field(&mut self, field: &FieldInfo, value: Value) -> Result<(), ValueTypeError> {
            match field.name() {
                "label" => self.label = value.try_into()?,
                "size" => self.size = value.try_into()?,
                _ => self.count = value.try_into()?,
            }
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct Nothing;

    impl CsvRecord for Nothing {
        fn declarations() -> Vec<FieldDeclaration> {
            vec![FieldDeclaration::unmapped("x", FieldType::String)]
        }

        fn get_field(&self, _field: &FieldInfo) -> Value {
            Value::Null
        }

        fn set_field(&mut self, _field: &FieldInfo, _value: Value) -> Result<(), ValueTypeError> {
            Ok(())
        }
    }

    #[test]
    fn missing_trailing_column_uses_default() {
        let processor = RowProcessor::<Person>::new().unwrap();
        let person = processor.decode(&["Alice"], 1).unwrap();
        assert_eq!(
            person,
            Person {
                name: "Alice".to_owned(),
                age: 0
            }
        );
    }

    #[test]
    fn blank_required_column_fails() {
        let processor = RowProcessor::<Strict>::new().unwrap();
        let err = processor.decode(&["Bob", ""], 2).unwrap_err();
        match err {
            MappingError::BlankColumn { row, column } => {
                assert_eq!(row, 2);
                assert_eq!(column, "age");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_supplied_column_fails() {
        let processor = RowProcessor::<Strict>::new().unwrap();
        let err = processor.decode(&["Bob"], 7).unwrap_err();
        assert!(matches!(
            err,
            MappingError::MissingColumn { row: 7, position: 1, .. }
        ));
        assert!(err.is_row_error());
    }

    #[test]
    fn missing_supplied_column_fails_despite_default() {
        let processor = RowProcessor::<Defaults>::new().unwrap();
        let err = processor.decode(&["x", "2"], 4).unwrap_err();
        match err {
            MappingError::MissingColumn { row, column, position } => {
                assert_eq!(row, 4);
                assert_eq!(column, "count");
                assert_eq!(position, 2);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn blank_column_takes_its_default() {
        let processor = RowProcessor::<Defaults>::new().unwrap();
        let decoded = processor.decode(&["x", "", "1"], 1).unwrap();
        assert_eq!(
            decoded,
            Defaults {
                label: "x".to_owned(),
                size: 5,
                count: 1
            }
        );
    }

    #[test]
    fn blank_default_does_not_trip_must_not_be_blank() {
        let processor = RowProcessor::<Defaults>::new().unwrap();
        let decoded = processor.decode(&["", "3", "1"], 1).unwrap();
        assert_eq!(decoded.label, "");
        assert_eq!(decoded.size, 3);
    }

    #[test]
    fn too_many_columns() {
        let processor = RowProcessor::<Person>::new().unwrap();
        let err = processor.decode(&["a", "1", "extra"], 3).unwrap_err();
        assert!(matches!(
            err,
            MappingError::TooManyColumns { expected: 2, found: 3, .. }
        ));

        let lenient = RowProcessor::<Person>::builder()
            .allow_extra_columns(true)
            .build()
            .unwrap();
        assert_eq!(lenient.decode(&["a", "1", "extra"], 3).unwrap().age, 1);
    }

    #[test]
    fn always_trim_input() {
        let processor = RowProcessor::<Person>::new().unwrap();
        assert!(matches!(
            processor.decode(&["a", " 1 "], 1),
            Err(MappingError::Parse { .. })
        ));

        let processor = RowProcessor::<Person>::builder()
            .always_trim_input(true)
            .build()
            .unwrap();
        assert_eq!(processor.decode(&[" a ", " 1 "], 1).unwrap().name, "a");
    }

    #[test]
    fn row_validator_runs_after_decode() {
        let processor = RowProcessor::<Person>::builder()
            .row_validator(|person: &Person, _row: usize| {
                if person.age < 0 {
                    Err(format!("negative age {}", person.age))
                } else {
                    Ok(())
                }
            })
            .build()
            .unwrap();

        assert!(processor.decode(&["a", "3"], 1).is_ok());
        let err = processor.decode(&["a", "-3"], 2).unwrap_err();
        assert!(matches!(err, MappingError::RowValidation { row: 2, .. }));
    }

    #[test]
    fn record_without_columns_is_rejected() {
        let err = RowProcessor::<Nothing>::new().unwrap_err();
        assert!(matches!(err, MappingError::NoColumns { .. }));
    }

    #[test]
    fn encode_in_position_order() {
        let processor = RowProcessor::<Person>::new().unwrap();
        let columns = processor
            .encode(&Person {
                name: "Zed, Jr.".to_owned(),
                age: 40,
            })
            .unwrap();
        assert_eq!(
            columns,
            vec![
                EncodedColumn {
                    text: "Zed, Jr.".to_owned(),
                    needs_quotes: true
                },
                EncodedColumn {
                    text: "40".to_owned(),
                    needs_quotes: false
                },
            ]
        );
    }

    #[test]
    fn header_validation() {
        let processor = RowProcessor::<Person>::new().unwrap();
        assert!(processor.validate_header(&["name", "age"], 1).is_ok());
        // age need not be supplied, so a short header is fine
        assert!(processor.validate_header(&["name"], 1).is_ok());
        assert!(processor.validate_header(&["NAME", "age"], 1).is_err());
        assert!(processor.validate_header(&["name", "age", "x"], 1).is_err());

        let processor = RowProcessor::<Person>::builder()
            .header_case_insensitive(true)
            .build()
            .unwrap();
        assert!(processor.validate_header(&["NAME", " Age "], 1).is_ok());
        assert_eq!(processor.column_names(), vec!["name", "age"]);
    }
}
