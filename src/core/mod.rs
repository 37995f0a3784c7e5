/// Resolved column descriptors and their raw configuration.
pub mod column;

/// The converter contract, registry and built-in converters.
pub mod converter;

/// Field identity, declared types and the record accessor trait.
pub mod field;

/// Reader and writer seams used by the CSV adapters.
pub mod item;

/// Record-level encode and decode.
pub mod processor;

/// Dynamically typed cell values.
pub mod value;
