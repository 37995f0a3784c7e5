#[cfg(feature = "csv")]
/// This module provides a CSV record reader and writer.
pub mod csv;

#[cfg(feature = "logger")]
/// This module provides a writer that logs records as CSV lines.
pub mod logger;
