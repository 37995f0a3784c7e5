use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Terminator, Trim};
use log::{debug, warn};
use std::{
    cell::{Cell, RefCell},
    fs::File,
    io::Read,
    path::Path,
};

use crate::{
    core::{
        field::CsvRecord,
        item::{ItemReader, ItemReaderResult},
        processor::RowProcessor,
    },
    error::MappingError,
};

/// A CSV reader that decodes each line into a record of type `R`.
///
/// The `csv` crate splits lines into raw fields; the [`RowProcessor`]
/// decodes them. Short lines are accepted by the splitter so that optional
/// trailing columns can be handled by the processor. Errors carry the
/// physical line number of the offending row.
///
/// # Examples
///
/// ```
/// # use csv_mapper::core::column::ColumnConfig;
/// # use csv_mapper::core::converter::ValueTypeError;
/// # use csv_mapper::core::field::{CsvRecord, FieldDeclaration, FieldInfo, FieldType};
/// # use csv_mapper::core::value::Value;
/// use csv_mapper::core::item::ItemReader;
/// use csv_mapper::item::csv::csv_reader::CsvRecordReaderBuilder;
///
/// #[derive(Debug, Default)]
/// struct Flag {
///     name: String,
///     on: bool,
/// }
/// # impl CsvRecord for Flag {
/// #     fn declarations() -> Vec<FieldDeclaration> {
/// #         vec![
/// #             FieldDeclaration::column("name", FieldType::String, ColumnConfig::new()),
/// #             FieldDeclaration::column("on", FieldType::Boolean, ColumnConfig::new().format("Y,N")),
/// #         ]
/// #     }
/// #     fn get_field(&self, field: &FieldInfo) -> Value {
/// #         match field.name() {
/// #             "name" => self.name.as_str().into(),
/// #             _ => self.on.into(),
/// #         }
/// #     }
/// #     fn set_field(&mut self, field: &FieldInfo, value: Value) -> Result<(), ValueTypeError> {
/// #         match field.name() {
/// #             "name" => self.name = value.try_into()?,
/// #             _ => self.on = value.try_into()?,
/// #         }
/// #         Ok(())
/// #     }
/// # }
///
/// let data = "name,on\ndebug,Y\ntrace,N";
/// let reader = CsvRecordReaderBuilder::<Flag>::new()
///     .has_headers(true)
///     .from_reader(data.as_bytes())
///     .unwrap();
///
/// let flag = reader.read().unwrap().unwrap();
/// assert_eq!(flag.name, "debug");
/// assert!(flag.on);
/// let flag = reader.read().unwrap().unwrap();
/// assert!(!flag.on);
/// assert!(reader.read().unwrap().is_none());
/// ```
pub struct CsvRecordReader<R, Rd> {
    processor: RowProcessor<R>,
    /// Uses `RefCell` so `read` can advance the iterator through `&self`,
    /// as the `ItemReader` trait requires.
    records: RefCell<StringRecordsIntoIter<Rd>>,
    has_headers: bool,
    validate_header: bool,
    header_read: Cell<bool>,
}

fn line_of(record: &StringRecord) -> usize {
    record
        .position()
        .and_then(|position| usize::try_from(position.line()).ok())
        .unwrap_or_default()
}

impl<R: CsvRecord, Rd: Read> CsvRecordReader<R, Rd> {
    pub fn processor(&self) -> &RowProcessor<R> {
        &self.processor
    }

    /// Consumes the header line if one is expected and not read yet.
    fn read_header(&self, records: &mut StringRecordsIntoIter<Rd>) -> Result<(), MappingError> {
        if !self.has_headers || self.header_read.get() {
            return Ok(());
        }
        self.header_read.set(true);

        if let Some(header) = records.next() {
            let header = header?;
            debug!("Read header {:?}", header);
            if self.validate_header {
                let fields: Vec<&str> = header.iter().collect();
                self.processor.validate_header(&fields, line_of(&header))?;
            }
        }
        Ok(())
    }

    /// Reads every remaining record, stopping at the first error.
    pub fn read_all(&self) -> Result<Vec<R>, MappingError> {
        let mut items = Vec::new();
        while let Some(item) = self.read()? {
            items.push(item);
        }
        Ok(items)
    }

    /// Reads every remaining record, collecting row errors instead of
    /// stopping on them. Header, I/O and CSV syntax errors still abort.
    pub fn read_all_lenient(&self) -> Result<(Vec<R>, Vec<MappingError>), MappingError> {
        let mut items = Vec::new();
        let mut errors = Vec::new();
        loop {
            match self.read() {
                Ok(Some(item)) => items.push(item),
                Ok(None) => break,
                Err(error) if error.is_row_error() => {
                    warn!("Skipping row: {}", error);
                    errors.push(error);
                }
                Err(error) => return Err(error),
            }
        }
        Ok((items, errors))
    }
}

impl<R: CsvRecord, Rd: Read> ItemReader<R> for CsvRecordReader<R, Rd> {
    /// Reads and decodes the next line.
    ///
    /// # Returns
    /// - `Ok(Some(record))` if a record is successfully decoded
    /// - `Ok(None)` if there are no more lines
    /// - `Err(error)` if the line cannot be split or decoded; the next call
    ///   continues with the following line
    fn read(&self) -> ItemReaderResult<R> {
        let mut records = self.records.borrow_mut();
        self.read_header(&mut records)?;

        match records.next() {
            Some(result) => {
                let record = result?;
                let fields: Vec<&str> = record.iter().collect();
                self.processor.decode(&fields, line_of(&record)).map(Some)
            }
            None => Ok(None),
        }
    }
}

/// A builder for configuring CSV record reading.
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Quote: double quote (")
/// - Terminator: CRLF (accepts `\r\n`, `\r` and `\n`)
/// - Headers: disabled
/// - Header validation: enabled when headers are enabled
/// - Processor: `RowProcessor::new()` for `R`
pub struct CsvRecordReaderBuilder<R> {
    processor: Option<RowProcessor<R>>,
    delimiter: u8,
    quote: u8,
    terminator: Terminator,
    has_headers: bool,
    validate_header: bool,
}

impl<R: CsvRecord> Default for CsvRecordReaderBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CsvRecord> CsvRecordReaderBuilder<R> {
    pub fn new() -> Self {
        Self {
            processor: None,
            delimiter: b',',
            quote: b'"',
            terminator: Terminator::CRLF,
            has_headers: false,
            validate_header: true,
        }
    }

    /// Uses an already built processor, e.g. one with custom options or
    /// shared with a writer.
    pub fn processor(mut self, processor: RowProcessor<R>) -> Self {
        self.processor = Some(processor);
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    /// Sets the line terminator.
    ///
    /// - `Terminator::CRLF`: any of `\r\n`, `\r`, `\n` (default)
    /// - `Terminator::Any(byte)`: a custom terminator
    pub fn terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }

    /// Sets whether the first line is a header line.
    pub fn has_headers(mut self, yes: bool) -> Self {
        self.has_headers = yes;
        self
    }

    /// Sets whether a header line is checked against the column names.
    pub fn validate_header(mut self, yes: bool) -> Self {
        self.validate_header = yes;
        self
    }

    fn build<Rd: Read>(self, records: StringRecordsIntoIter<Rd>, processor: RowProcessor<R>) -> CsvRecordReader<R, Rd> {
        CsvRecordReader {
            processor,
            records: RefCell::new(records),
            has_headers: self.has_headers,
            validate_header: self.validate_header,
            header_read: Cell::new(false),
        }
    }

    fn reader_builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .trim(Trim::None) // trimming is a per-column decision
            .delimiter(self.delimiter)
            .quote(self.quote)
            .terminator(self.terminator)
            .has_headers(false) // the header line is handled by the reader itself
            .flexible(true); // short lines are judged per column
        builder
    }

    fn take_processor(&mut self) -> Result<RowProcessor<R>, MappingError> {
        match self.processor.take() {
            Some(processor) => Ok(processor),
            None => RowProcessor::new(),
        }
    }

    /// Creates a `CsvRecordReader` from any source implementing `Read`.
    ///
    /// Fails if the record type's columns cannot be resolved.
    pub fn from_reader<Rd: Read>(mut self, rdr: Rd) -> Result<CsvRecordReader<R, Rd>, MappingError> {
        let processor = self.take_processor()?;
        let records = self.reader_builder().from_reader(rdr).into_records();
        Ok(self.build(records, processor))
    }

    /// Creates a `CsvRecordReader` from a file path.
    ///
    /// Fails if the file cannot be opened or the columns cannot be resolved.
    pub fn from_path<P: AsRef<Path>>(mut self, path: P) -> Result<CsvRecordReader<R, File>, MappingError> {
        let processor = self.take_processor()?;
        let records = self.reader_builder().from_path(path)?.into_records();
        Ok(self.build(records, processor))
    }
}
