/// CSV support for reading and writing mapped records.
///
/// The `csv` crate does the character-level work: splitting a physical line
/// into raw fields on read, and joining and quoting fields on write. The
/// [`RowProcessor`](crate::core::processor::RowProcessor) does everything
/// else: defaults, blank checks, trimming and value conversion.
///
/// # Module Architecture
///
/// 1. **CsvRecordReader**: reads physical lines, optionally checks the header
///    line against the record's columns, and decodes each line into a record.
///
/// 2. **CsvRecordWriter**: encodes records, quotes the fields that hold the
///    delimiter, the quote or a line break (or every field with
///    `always_quote`), and writes an optional header line first.
///
/// Both are configured through builders.
///
/// # Examples
///
/// ```
/// use csv_mapper::core::column::ColumnConfig;
/// use csv_mapper::core::converter::ValueTypeError;
/// use csv_mapper::core::field::{CsvRecord, FieldDeclaration, FieldInfo, FieldType, IntegerKind};
/// use csv_mapper::core::item::{ItemReader, ItemWriter};
/// use csv_mapper::core::value::Value;
/// use csv_mapper::item::csv::csv_reader::CsvRecordReaderBuilder;
/// use csv_mapper::item::csv::csv_writer::CsvRecordWriterBuilder;
///
/// #[derive(Debug, Default, Clone, PartialEq)]
/// struct City {
///     city: String,
///     pop: u32,
/// }
///
/// impl CsvRecord for City {
///     fn declarations() -> Vec<FieldDeclaration> {
///         vec![
///             FieldDeclaration::column("city", FieldType::String, ColumnConfig::new()),
///             FieldDeclaration::column(
///                 "pop",
///                 FieldType::Integer(IntegerKind::U32),
///                 ColumnConfig::new().format("#,##0"),
///             ),
///         ]
///     }
///
///     fn get_field(&self, field: &FieldInfo) -> Value {
///         match field.name() {
///             "city" => self.city.as_str().into(),
///             _ => self.pop.into(),
///         }
///     }
///
///     fn set_field(&mut self, field: &FieldInfo, value: Value) -> Result<(), ValueTypeError> {
///         match field.name() {
///             "city" => self.city = value.try_into()?,
///             _ => self.pop = value.try_into()?,
///         }
///         Ok(())
///     }
/// }
///
/// let cities = vec![
///     City { city: "Boston".to_string(), pop: 4628910 },
///     City { city: "Concord".to_string(), pop: 42695 },
/// ];
///
/// let writer = CsvRecordWriterBuilder::<City>::new()
///     .has_headers(true)
///     .from_writer(vec![])
///     .unwrap();
/// writer.write(&cities).unwrap();
/// let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(data, "city,pop\nBoston,\"4,628,910\"\nConcord,\"42,695\"\n");
///
/// let reader = CsvRecordReaderBuilder::<City>::new()
///     .has_headers(true)
///     .from_reader(data.as_bytes())
///     .unwrap();
/// assert_eq!(reader.read_all().unwrap(), cities);
/// ```

/// A module providing facilities for reading CSV records.
pub mod csv_reader;

/// A module providing facilities for writing CSV records.
pub mod csv_writer;
