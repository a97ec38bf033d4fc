//! CSV support for reading and writing delimited text.
//!
//! # Module Architecture
//!
//! Reading is a pipeline, run lazily one physical row at a time:
//!
//! 1. **Tokenizer**: the `csv` crate splits the source into raw byte rows
//! 2. **Encoding resolver** ([`encoding`]): detects the encoding of each row
//!    among the search encodings and decodes its cells
//! 3. **Field mapper** ([`mapping`]): derives canonical headings from the
//!    first row and shapes every row as a [`MappedRecord`]
//! 4. **Reader** ([`csv_reader`]): drives the pipeline and applies the
//!    caller's per-row transform
//!
//! Writing ([`csv_writer`]) formats rows, optionally preceded by a column
//! heading row, and appends them to a sink.
//!
//! [`fake`] provides in-memory files usable wherever a real file is.
//!
//! [`MappedRecord`]: mapping::MappedRecord
//!
//! # Ownership
//!
//! Readers and writers take ownership of their source or sink and never
//! close it; [`CsvReader::into_inner`](csv_reader::CsvReader::into_inner)
//! and [`CsvWriter::into_inner`](csv_writer::CsvWriter::into_inner) hand it
//! back.
//!
//! # Examples
//!
//! ## Reading records keyed by column name
//!
//! ```
//! use csv_stream_rs::item::csv::csv_reader::CsvReaderBuilder;
//!
//! let reader = CsvReaderBuilder::new()
//!     .key_by_column_name()
//!     .fake(&["Column Name*;Count", "foo;1", "bar;2"], None)
//!     .unwrap();
//!
//! for record in reader.rows() {
//!     let record = record.unwrap();
//!     assert_eq!(record.keys(), Some(vec!["column_name", "count"]));
//! }
//! ```
//!
//! ## Converting legacy encodings
//!
//! ```
//! use csv_stream_rs::item::csv::csv_reader::CsvReaderBuilder;
//!
//! let latin1: &[u8] = b"pr\xe9nom;nom\ncl\xe9mentine;dupont\n";
//!
//! let reader = CsvReaderBuilder::new()
//!     .to_encoding("UTF-8")
//!     .key_by_column_name()
//!     .from_reader(latin1)
//!     .unwrap();
//!
//! let records = reader.to_vec().unwrap();
//! assert_eq!(records[0].get("prenom"), Some("clémentine"));
//! ```
//!
//! ## Writing and reading back
//!
//! ```
//! use csv_stream_rs::item::csv::csv_reader::CsvReaderBuilder;
//! use csv_stream_rs::item::csv::csv_writer::CsvWriterBuilder;
//!
//! let writer = CsvWriterBuilder::new()
//!     .columns(&["name", "count"])
//!     .from_writer(vec![]);
//! writer.write(&[("foo", 1), ("bar", 2)]).unwrap();
//! let data = writer.into_inner().unwrap();
//!
//! let reader = CsvReaderBuilder::new()
//!     .key_by_column_name()
//!     .from_reader(data.as_slice())
//!     .unwrap();
//!
//! let records = reader.to_vec().unwrap();
//! assert_eq!(records[1].values(), vec!["bar", "2"]);
//! ```

/// A module providing facilities for reading CSV data records.
pub mod csv_reader;

/// A module providing facilities for writing CSV data records.
pub mod csv_writer;

pub mod encoding;

/// In-memory files standing in for real ones.
pub mod fake;

pub mod mapping;
