use crate::error::MappingError;

/// Result of a read: `Ok(None)` once the input is exhausted.
pub type ItemReaderResult<R> = Result<Option<R>, MappingError>;

/// Result of a write or flush.
pub type ItemWriterResult = Result<(), MappingError>;

/// A source of records, read one at a time.
pub trait ItemReader<R> {
    fn read(&self) -> ItemReaderResult<R>;
}

/// A sink of records, written in batches.
pub trait ItemWriter<W> {
    fn write(&self, items: &[W]) -> ItemWriterResult;

    fn flush(&self) -> ItemWriterResult {
        Ok(())
    }

    /// Called once before the first write.
    fn open(&self) -> ItemWriterResult {
        Ok(())
    }

    fn close(&self) -> ItemWriterResult {
        Ok(())
    }
}
