use std::{
    cell::{Cell, RefCell},
    fs::File,
    io::Write,
    path::Path,
};

use csv::{QuoteStyle, Terminator, WriterBuilder};
use log::debug;
use serde::Serialize;
use tempfile::SpooledTempFile;

use crate::{
    core::item::{ItemWriter, ItemWriterResult},
    error::CsvError,
    item::csv::fake::FakeFile,
};

/// A CSV writer appending rows to a sink.
///
/// Rows come either in bulk, from a collection written in one call, or one
/// at a time through [`put`](CsvWriter::put). When column headings are
/// configured they are written before the first bulk record.
///
/// No encoding conversion happens here: values are written as the UTF-8
/// text they are.
///
/// # Examples
///
/// ```
/// use csv_stream_rs::item::csv::csv_writer::CsvWriterBuilder;
///
/// let writer = CsvWriterBuilder::new()
///     .columns(&["name", "count"])
///     .from_writer(vec![]);
///
/// writer.write(&[("foo", 1), ("bar", 2)]).unwrap();
///
/// let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(data, "name;count\nfoo;1\nbar;2\n");
/// ```
pub struct CsvWriter<W: Write> {
    wrapper: RefCell<csv::Writer<W>>,
    columns: Vec<String>,
    columns_written: Cell<bool>,
    delimiter: u8,
    quote: u8,
    escape: Option<u8>,
}

impl<W: Write, T: Serialize> ItemWriter<T> for CsvWriter<W> {
    fn write(&self, items: &[T]) -> ItemWriterResult {
        self.write_items(items)
    }

    /// Flush the contents of the internal buffer to the underlying writer.
    ///
    /// Note that this also flushes the underlying writer.
    fn flush(&self) -> ItemWriterResult {
        self.wrapper.borrow_mut().flush()?;
        Ok(())
    }

    /// Writes the column headings, if any and not written yet.
    fn open(&self) -> ItemWriterResult {
        self.write_columns()
    }
}

impl<W: Write> CsvWriter<W> {
    fn write_columns(&self) -> Result<(), CsvError> {
        if self.columns.is_empty() || self.columns_written.get() {
            return Ok(());
        }

        self.wrapper.borrow_mut().write_record(&self.columns)?;
        self.columns_written.set(true);
        debug!("Column headings written: {:?}", self.columns);
        Ok(())
    }

    fn write_items<T, I>(&self, data: I) -> Result<(), CsvError>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        self.write_columns()?;

        let mut wrapper = self.wrapper.borrow_mut();
        let mut count = 0;
        for item in data {
            wrapper.serialize(item)?;
            count += 1;
        }
        debug!("{} records written", count);
        Ok(())
    }

    /// Writes a whole collection of records.
    ///
    /// Records are serialized with serde: structs in field declaration
    /// order, tuples and sequences in element order. Column headings, when
    /// configured, are written first, once per writer: later calls append
    /// records only.
    ///
    /// ```
    /// use csv_stream_rs::item::csv::csv_writer::CsvWriterBuilder;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct Line {
    ///     name: &'static str,
    ///     count: u32,
    /// }
    ///
    /// let writer = CsvWriterBuilder::new().from_writer(vec![]);
    /// writer
    ///     .write(&[Line { name: "foo", count: 1 }, Line { name: "bar", count: 2 }])
    ///     .unwrap();
    ///
    /// let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
    /// assert_eq!(data, "foo;1\nbar;2\n");
    /// ```
    pub fn write<T, I>(&self, data: I) -> Result<(), CsvError>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        self.write_items(data)
    }

    /// Writes a whole collection, turning each record into cells with
    /// `mapping` first.
    ///
    /// ```
    /// use csv_stream_rs::item::csv::csv_writer::CsvWriterBuilder;
    ///
    /// let lines = vec![("foo", 1), ("bar", 2)];
    /// let writer = CsvWriterBuilder::new().from_writer(vec![]);
    /// writer
    ///     .write_with(&lines, |(name, count)| vec![name.to_string(), (count * 2).to_string()])
    ///     .unwrap();
    ///
    /// let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
    /// assert_eq!(data, "foo;2\nbar;4\n");
    /// ```
    pub fn write_with<T, I, F, C, V>(&self, data: I, mapping: F) -> Result<(), CsvError>
    where
        I: IntoIterator<Item = T>,
        F: Fn(T) -> C,
        C: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        self.write_columns()?;

        let mut wrapper = self.wrapper.borrow_mut();
        for item in data {
            wrapper.write_record(mapping(item))?;
        }
        Ok(())
    }

    /// Writes one row immediately. Column headings are not written.
    pub fn put<C, V>(&self, row: C) -> Result<(), CsvError>
    where
        C: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        self.wrapper.borrow_mut().write_record(row)?;
        Ok(())
    }

    /// Writes the row returned by `producer` immediately.
    pub fn put_with<F, C, V>(&self, producer: F) -> Result<(), CsvError>
    where
        F: FnOnce() -> C,
        C: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        self.put(producer())
    }

    pub fn flush(&self) -> Result<(), CsvError> {
        self.wrapper.borrow_mut().flush()?;
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn quote(&self) -> u8 {
        self.quote
    }

    pub fn escape(&self) -> Option<u8> {
        self.escape
    }

    /// Flushes and returns the sink.
    pub fn into_inner(self) -> Result<W, CsvError> {
        self.wrapper
            .into_inner()
            .into_inner()
            .map_err(|error| CsvError::Io(error.into_error()))
    }
}

/// A builder for configuring CSV writing.
///
/// # Default Configuration
///
/// - Delimiter: semicolon (;)
/// - Quote: double quote ("), only around fields that need it
/// - Escape: none, quotes are escaped by doubling them
/// - Terminator: `\n`
/// - Column headings: none
#[derive(Clone)]
pub struct CsvWriterBuilder {
    delimiter: u8,
    quote: u8,
    escape: Option<u8>,
    quote_style: QuoteStyle,
    terminator: Terminator,
    columns: Vec<String>,
}

impl Default for CsvWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvWriterBuilder {
    pub fn new() -> CsvWriterBuilder {
        CsvWriterBuilder {
            delimiter: b';',
            quote: b'"',
            escape: None,
            quote_style: QuoteStyle::Necessary,
            terminator: Terminator::Any(b'\n'),
            columns: Vec::new(),
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> CsvWriterBuilder {
        self.delimiter = delimiter;
        self
    }

    /// Sets the enclosure character.
    pub fn quote(mut self, quote: u8) -> CsvWriterBuilder {
        self.quote = quote;
        self
    }

    /// Escapes quotes inside fields with `escape` instead of doubling them.
    pub fn escape(mut self, escape: Option<u8>) -> CsvWriterBuilder {
        self.escape = escape;
        self
    }

    pub fn quote_style(mut self, quote_style: QuoteStyle) -> CsvWriterBuilder {
        self.quote_style = quote_style;
        self
    }

    pub fn terminator(mut self, terminator: Terminator) -> CsvWriterBuilder {
        self.terminator = terminator;
        self
    }

    /// Sets the row written before the first bulk record.
    pub fn columns<S: AsRef<str>>(mut self, columns: &[S]) -> CsvWriterBuilder {
        self.columns = columns
            .iter()
            .map(|column| column.as_ref().to_string())
            .collect();
        self
    }

    fn csv_builder(&self) -> WriterBuilder {
        let mut builder = WriterBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(self.quote)
            .double_quote(self.escape.is_none())
            .quote_style(self.quote_style)
            .terminator(self.terminator)
            .has_headers(false)
            .flexible(true);
        if let Some(escape) = self.escape {
            builder.escape(escape);
        }
        builder
    }

    fn build<W: Write>(self, wrapper: csv::Writer<W>) -> CsvWriter<W> {
        CsvWriter {
            wrapper: RefCell::new(wrapper),
            columns: self.columns,
            columns_written: Cell::new(false),
            delimiter: self.delimiter,
            quote: self.quote,
            escape: self.escape,
        }
    }

    /// Creates a `CsvWriter` appending to `wtr`.
    pub fn from_writer<W: Write>(self, wtr: W) -> CsvWriter<W> {
        let wrapper = self.csv_builder().from_writer(wtr);
        self.build(wrapper)
    }

    /// Creates a `CsvWriter` writing to the file at `path`, truncating it.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<CsvWriter<File>, CsvError> {
        let wrapper = self.csv_builder().from_path(path)?;
        Ok(self.build(wrapper))
    }

    /// Creates a `CsvWriter` over an empty in-memory file.
    ///
    /// ```
    /// use csv_stream_rs::item::csv::csv_writer::CsvWriterBuilder;
    /// use csv_stream_rs::item::csv::fake::FakeFile;
    ///
    /// let writer = CsvWriterBuilder::new().fake(None);
    /// writer.put(["foo", "1"]).unwrap();
    ///
    /// let mut file = writer.into_inner().unwrap();
    /// assert_eq!(FakeFile::contents(&mut file).unwrap(), "foo;1\n");
    /// ```
    pub fn fake(self, max_memory: Option<usize>) -> CsvWriter<SpooledTempFile> {
        self.from_writer(FakeFile::empty(max_memory))
    }
}
