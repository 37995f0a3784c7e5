use std::cell::Cell;

use csv::WriterBuilder;
use log::info;

use crate::{
    core::{
        field::CsvRecord,
        item::{ItemWriter, ItemWriterResult},
        processor::RowProcessor,
    },
    error::MappingError,
};

/// Logs each record as the CSV line it would be written as. Useful to check
/// a column configuration without producing a file.
pub struct LoggerWriter<R> {
    processor: RowProcessor<R>,
    delimiter: u8,
    count: Cell<usize>,
}

impl<R: CsvRecord> LoggerWriter<R> {
    pub fn new(processor: RowProcessor<R>) -> Self {
        Self {
            processor,
            delimiter: b',',
            count: Cell::new(0),
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Number of records logged so far.
    pub fn count(&self) -> usize {
        self.count.get()
    }

    /// The line logged for `item`, without its terminator.
    pub fn line(&self, item: &R) -> Result<String, MappingError> {
        let columns = self.processor.encode(item)?;
        let mut wtr = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());
        wtr.write_record(columns.iter().map(|column| column.text.as_str()))?;
        let bytes = wtr
            .into_inner()
            .map_err(|error| MappingError::Io(error.into_error()))?;

        let line = String::from_utf8_lossy(&bytes);
        Ok(line.strip_suffix('\n').unwrap_or(&line).to_owned())
    }
}

impl<R: CsvRecord> ItemWriter<R> for LoggerWriter<R> {
    fn write(&self, items: &[R]) -> ItemWriterResult {
        for item in items {
            let line = self.line(item)?;
            self.count.set(self.count.get() + 1);
            info!("Record {}: {}", self.count.get(), line);
        }
        Ok(())
    }
}
