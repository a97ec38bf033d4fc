#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 # CSV Stream for Rust

 A streaming CSV reader and writer built around a row-decoding pipeline:
 each physical row is tokenized, its character encoding detected and
 converted when needed, then mapped against the headings of the file.
 Rows are pulled one at a time, so files of any size are read with a
 constant amount of memory.

 ## Core Concepts

- **ItemReader:** pulls one item at a time. `CsvReader` is an `ItemReader` of `MappedRecord`s.
- **ItemProcessor:** a per-item transform. Any `Fn(I) -> O` closure is one.
- **ItemWriter:** accepts items in slices. `CsvWriter` is an `ItemWriter` of any `Serialize` type.
- **MappedRecord:** a decoded row, either positional, keyed by heading, or an object with one property per heading.

 ## Features

| **Concern**        | **Description**                                                        |
|--------------------|------------------------------------------------------------------------|
| Encoding detection | Per-row detection among ordered search encodings, conversion on demand |
| Header mapping     | Canonical snake_case ASCII headings, strict arity checks               |
| Lazy reading       | `rows()` iterator, re-iterable after `rewind()` on seekable sources    |
| Writing            | Bulk serde serialization, optional column headings, single-row `put`   |
| Fakes              | In-memory files spilling to disk past a size threshold                 |

 ## Getting Started

```rust
# use csv_stream_rs::{
#     error::CsvError,
#     item::csv::{csv_reader::CsvReaderBuilder, csv_writer::CsvWriterBuilder},
# };
fn main() -> Result<(), CsvError> {
    let reader = CsvReaderBuilder::new()
        .delimiter(b';')
        .to_encoding("UTF-8")
        .key_by_column_name()
        .fake(&["Column Name*;Count", "foo;1", "bar;2", "baz;3"], None)?;

    let writer = CsvWriterBuilder::new()
        .delimiter(b',')
        .columns(&["name", "double"])
        .from_writer(vec![]);

    let doubled = reader.to_collection(|record: csv_stream_rs::item::csv::mapping::MappedRecord| {
        let count: u32 = record.get("count").unwrap_or("0").parse().unwrap_or(0);
        (record.get("column_name").unwrap_or_default().to_string(), count * 2)
    })?;
    writer.write(&doubled)?;

    let data = String::from_utf8(writer.into_inner()?).unwrap();
    assert_eq!(data, "name,double\nfoo,2\nbar,4\nbaz,6\n");

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

/// Core abstractions for reading, processing and writing items
pub mod core;

/// Error types for csv operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of items readers / writers
pub mod item;
