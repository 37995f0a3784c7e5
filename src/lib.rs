#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # CSV Mapper

 Maps typed records to and from CSV rows. Every field of a record is bound
 to a column, and every column to a converter that turns the field value
 into text and back.

 ## Core Concepts

- **CsvRecord:** A record type. It declares its fields in order and gives
  dynamic access to them through [`core::value::Value`].
- **ColumnConfig:** Per-field options: converter, format, column name,
  default value, blank and presence checks.
- **Converter:** Turns a value into text and text into a value for one
  field type. Built-in converters cover strings, characters, booleans,
  integers, floats, dates, times and enumerations; custom converters can be
  added to a [`core::converter::ConverterRegistry`].
- **RowProcessor:** Resolves the columns of a record type once, then
  encodes records into column texts and decodes raw fields into records.
- **ItemReader / ItemWriter:** Read and write records from CSV sources.

 ## Features

| **Feature**   | **Description**                                               |
|---------------|---------------------------------------------------------------|
| csv           | Enables the CSV `ItemReader` and `ItemWriter`                 |
| json          | Enables loading field declarations from JSON                  |
| logger        | Enables a logger `ItemWriter`, useful for debugging purposes  |
| full          | Enables all available features                                |

 ## Getting Started

```toml
[dependencies]
csv-mapper = { version = "<version>", features = ["<full|csv|json|logger>"] }
```

```rust
# use chrono::NaiveDate;
# use csv_mapper::{
#     core::{
#         column::ColumnConfig,
#         converter::ValueTypeError,
#         field::{CsvRecord, FieldDeclaration, FieldInfo, FieldType, IntegerKind},
#         item::ItemWriter,
#         value::Value,
#     },
#     error::MappingError,
#     item::csv::{csv_reader::CsvRecordReaderBuilder, csv_writer::CsvRecordWriterBuilder},
# };
#[derive(Debug, Default, PartialEq)]
struct Car {
    year: u16,
    make: String,
    released: NaiveDate,
}

impl CsvRecord for Car {
    fn declarations() -> Vec<FieldDeclaration> {
        vec![
            FieldDeclaration::column(
                "year",
                FieldType::Integer(IntegerKind::U16),
                ColumnConfig::new().must_not_be_blank(true),
            ),
            FieldDeclaration::column("make", FieldType::String, ColumnConfig::new().trim_input(true)),
            FieldDeclaration::column(
                "released",
                FieldType::Date,
                ColumnConfig::new().format("%d/%m/%Y"),
            ),
        ]
    }

    fn get_field(&self, field: &FieldInfo) -> Value {
        match field.name() {
            "year" => self.year.into(),
            "make" => self.make.as_str().into(),
            _ => self.released.into(),
        }
    }

    fn set_field(&mut self, field: &FieldInfo, value: Value) -> Result<(), ValueTypeError> {
        match field.name() {
            "year" => self.year = value.try_into()?,
            "make" => self.make = value.try_into()?,
            _ => self.released = value.try_into()?,
        }
        Ok(())
    }
}

fn main() -> Result<(), MappingError> {
    let csv = "year,make,released
1948, Porsche ,08/06/1948
1995,Peugeot,24/02/1983";

    let reader = CsvRecordReaderBuilder::<Car>::new()
        .has_headers(true)
        .from_reader(csv.as_bytes())?;
    let cars = reader.read_all()?;
    assert_eq!(cars[0].make, "Porsche");

    let writer = CsvRecordWriterBuilder::<Car>::new()
        .has_headers(true)
        .from_writer(vec![])?;
    writer.write(&cars)?;

    let text = String::from_utf8(writer.into_inner()?).unwrap();
    assert_eq!(text, "year,make,released\n1948,Porsche,08/06/1948\n1995,Peugeot,24/02/1983\n");
    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Records, values, converters and the row processor
pub mod core;

/// Error types for mapping operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of record readers / writers (for example: csv reader and writer)
pub mod item;
