use std::{
    cell::{Cell, RefCell},
    fs::File,
    io::Write,
    path::Path,
};

use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};

use crate::{
    core::{
        field::CsvRecord,
        item::{ItemWriter, ItemWriterResult},
        processor::{EncodedColumn, RowProcessor},
    },
    error::MappingError,
};

/// A CSV writer that encodes records of type `R`.
///
/// The [`RowProcessor`] turns each record into column texts and the `csv`
/// crate joins them, quoting any field that holds the configured delimiter,
/// the quote character or a line break.
pub struct CsvRecordWriter<R, W: Write> {
    processor: RowProcessor<R>,
    wrapper: RefCell<Writer<W>>,
    has_headers: bool,
    header_written: Cell<bool>,
}

impl<R: CsvRecord, W: Write> CsvRecordWriter<R, W> {
    pub fn processor(&self) -> &RowProcessor<R> {
        &self.processor
    }

    fn write_columns(&self, columns: &[EncodedColumn]) -> ItemWriterResult {
        self.wrapper
            .borrow_mut()
            .write_record(columns.iter().map(|column| column.text.as_str()))?;
        Ok(())
    }

    fn write_header_once(&self) -> ItemWriterResult {
        if self.has_headers && !self.header_written.get() {
            self.header_written.set(true);
            let header = self.processor.header();
            self.write_columns(&header)?;
        }
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, MappingError> {
        self.write_header_once()?;
        self.wrapper
            .into_inner()
            .into_inner()
            .map_err(|error| MappingError::Io(error.into_error()))
    }
}

impl<R: CsvRecord, W: Write> ItemWriter<R> for CsvRecordWriter<R, W> {
    fn write(&self, items: &[R]) -> ItemWriterResult {
        self.write_header_once()?;
        for item in items {
            let columns = self.processor.encode(item)?;
            self.write_columns(&columns)?;
        }
        Ok(())
    }

    /// Flush the contents of the internal buffer to the underlying writer.
    fn flush(&self) -> ItemWriterResult {
        self.wrapper.borrow_mut().flush()?;
        Ok(())
    }

    /// Writes the header line, so that it is present even when no record
    /// gets written.
    fn open(&self) -> ItemWriterResult {
        self.write_header_once()
    }

    fn close(&self) -> ItemWriterResult {
        ItemWriter::<R>::flush(self)
    }
}

/// A builder for configuring CSV record writing.
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Quote: double quote (")
/// - Terminator: `\n`
/// - Headers: disabled
/// - Always quote: disabled
/// - Processor: `RowProcessor::new()` for `R`
pub struct CsvRecordWriterBuilder<R> {
    processor: Option<RowProcessor<R>>,
    delimiter: u8,
    quote: u8,
    terminator: Terminator,
    has_headers: bool,
    always_quote: bool,
}

impl<R: CsvRecord> Default for CsvRecordWriterBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CsvRecord> CsvRecordWriterBuilder<R> {
    pub fn new() -> Self {
        Self {
            processor: None,
            delimiter: b',',
            quote: b'"',
            terminator: Terminator::Any(b'\n'),
            has_headers: false,
            always_quote: false,
        }
    }

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

    pub fn terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }

    /// Sets whether a header line with the column names is written first.
    pub fn has_headers(mut self, yes: bool) -> Self {
        self.has_headers = yes;
        self
    }

    /// Quotes every field, whatever its column needs.
    pub fn always_quote(mut self, yes: bool) -> Self {
        self.always_quote = yes;
        self
    }

    fn writer_builder(&self) -> WriterBuilder {
        let mut builder = WriterBuilder::new();
        builder
            .delimiter(self.delimiter)
            .terminator(self.terminator)
            .quote(self.quote)
            .quote_style(if self.always_quote {
                QuoteStyle::Always
            } else {
                QuoteStyle::Necessary
            })
            .has_headers(false) // the header comes from the processor
            .flexible(false);
        builder
    }

    fn build<W: Write>(self, wtr: Writer<W>, processor: RowProcessor<R>) -> CsvRecordWriter<R, W> {
        CsvRecordWriter {
            processor,
            wrapper: RefCell::new(wtr),
            has_headers: self.has_headers,
            header_written: Cell::new(false),
        }
    }

    fn take_processor(&mut self) -> Result<RowProcessor<R>, MappingError> {
        match self.processor.take() {
            Some(processor) => Ok(processor),
            None => RowProcessor::new(),
        }
    }

    /// Creates a `CsvRecordWriter` writing to any `Write` destination.
    pub fn from_writer<W: Write>(mut self, wtr: W) -> Result<CsvRecordWriter<R, W>, MappingError> {
        let processor = self.take_processor()?;
        let wtr = self.writer_builder().from_writer(wtr);
        Ok(self.build(wtr, processor))
    }

    /// Creates a `CsvRecordWriter` writing to a new file at `path`.
    pub fn from_path<P: AsRef<Path>>(mut self, path: P) -> Result<CsvRecordWriter<R, File>, MappingError> {
        let processor = self.take_processor()?;
        let wtr = self.writer_builder().from_path(path)?;
        Ok(self.build(wtr, processor))
    }
}
