use csv::{ByteRecord, Position, ReaderBuilder, Terminator, Trim};
use log::{debug, trace};
use std::{
    cell::{Cell, RefCell},
    fs::File,
    fmt::Display,
    io::{Read, Seek},
    marker::PhantomData,
    path::Path,
    sync::Arc,
};
use tempfile::SpooledTempFile;

use crate::{
    core::item::{ItemProcessor, ItemReader, ItemReaderResult, PassThroughProcessor, TryProcessor},
    error::CsvError,
    item::csv::{
        encoding::{DEFAULT_SEARCH_ENCODINGS, EncodingConfig, EncodingResolver},
        fake::FakeFile,
        mapping::{Headings, MappedRecord, RecordShape, map_fields},
    },
};

/// A streaming CSV reader producing one [`MappedRecord`] per pull.
///
/// Each pull tokenizes the next physical row, fixes its encoding when a
/// target encoding is configured, maps it against the headings and hands it
/// back. Nothing beyond the current row is buffered.
///
/// # Type Parameters
///
/// - `R`: The source of CSV data. Must implement `Read`; sources that also
///   implement `Seek` can be rewound and read again.
///
/// # Implementation Details
///
/// - Uses `RefCell` for interior mutability of the underlying tokenizer so
///   rows can be pulled through `&self`, as [`ItemReader`] requires
/// - The logical row index lives in a `Cell` and is reset by [`rewind`]
/// - Headings are derived from logical row 1 and shared by every record of
///   the pass through an `Arc`
///
/// [`rewind`]: CsvReader::rewind
///
/// # Examples
///
/// ```
/// use csv_stream_rs::item::csv::csv_reader::CsvReaderBuilder;
///
/// let data = "\
/// column name*;count
/// foo;1
/// bar;2
/// ";
///
/// let reader = CsvReaderBuilder::new()
///     .key_by_column_name()
///     .from_reader(data.as_bytes())
///     .unwrap();
///
/// let records = reader.to_vec().unwrap();
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].get("column_name"), Some("foo"));
/// assert_eq!(records[1].get("count"), Some("2"));
/// ```
pub struct CsvReader<R> {
    /// Underlying tokenizer, configured without headers and with flexible
    /// row lengths: arity is checked by the mapper, not by `csv`.
    reader: RefCell<csv::Reader<R>>,
    record: RefCell<ByteRecord>,
    resolver: EncodingResolver,
    shape: RecordShape,
    skip_headings: bool,
    /// Fields are trimmed, so whitespace-only lines come out empty.
    trim_fields: bool,
    headings: RefCell<Option<Arc<Headings>>>,
    /// Logical index of the last row pulled, blank lines excluded.
    row_index: Cell<u64>,
    delimiter: u8,
    quote: u8,
    escape: Option<u8>,
}

impl<R: Read> ItemReader<MappedRecord> for CsvReader<R> {
    /// Reads the next record.
    ///
    /// # Decoding Process
    ///
    /// 1. Pulls the next physical row; returns `Ok(None)` at end of input
    /// 2. Skips lines left empty by trimming without counting them; the
    ///    tokenizer already drops empty lines
    /// 3. Decodes the cells, converting their encoding when required
    /// 4. On logical row 1, derives the headings when mapping is enabled
    /// 5. Maps the row; on logical row 1 the record is dropped when headings
    ///    are skipped
    ///
    /// # Returns
    /// - `Ok(Some(record))` if a record is read
    /// - `Ok(None)` once the source is exhausted
    /// - `Err(CsvError::ArityMismatch { .. })` if a row does not match the
    ///   headings; the next pull carries on with the following row
    /// - `Err(CsvError::MissingHeadings { .. })` for every row of a keyed
    ///   reader whose headings row could not be decoded
    fn read(&self) -> ItemReaderResult<MappedRecord> {
        let mut reader = self.reader.borrow_mut();
        let mut record = self.record.borrow_mut();

        loop {
            if !reader.read_byte_record(&mut record)? {
                debug!("End of CSV source after {} rows", self.row_index.get());
                return Ok(None);
            }

            if self.trim_fields && is_blank(&record) {
                trace!("Skipping blank line {}", line_of(&record, self.row_index.get()));
                continue;
            }

            let index = self.row_index.get() + 1;
            self.row_index.set(index);
            let line = line_of(&record, index);

            let cells = self.resolver.decode_row(&record, line)?;
            let mapped = self.map(index, cells, line)?;

            if index == 1 && self.skip_headings {
                trace!("Skipping headings row");
                continue;
            }

            return Ok(Some(mapped));
        }
    }
}

impl<R: Read> CsvReader<R> {
    fn map(&self, index: u64, cells: Vec<String>, line: u64) -> Result<MappedRecord, CsvError> {
        if self.shape == RecordShape::Positional {
            return Ok(MappedRecord::Positional(cells));
        }

        let mut headings = self.headings.borrow_mut();
        if index == 1 {
            let derived = Headings::derive(&cells);
            debug!("Headings derived: {:?}", derived.as_slice());
            *headings = Some(Arc::new(derived));
        }

        match headings.as_ref() {
            Some(headings) => map_fields(headings, cells, self.shape, line),
            None => Err(CsvError::MissingHeadings { line }),
        }
    }

    /// Headings derived from the first row, once it has been read with
    /// mapping enabled.
    pub fn headings(&self) -> Option<Arc<Headings>> {
        self.headings.borrow().clone()
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

    /// Names of the candidate encodings, in priority order.
    pub fn search_encodings(&self) -> Vec<&'static str> {
        self.resolver
            .config()
            .candidates()
            .iter()
            .map(|encoding| encoding.name())
            .collect()
    }

    pub fn to_encoding(&self) -> Option<&'static str> {
        self.resolver.config().target().map(|encoding| encoding.name())
    }

    /// Returns the source. Data buffered by the tokenizer is lost.
    pub fn into_inner(self) -> R {
        self.reader.into_inner().into_inner()
    }

    /// Lazily iterates the remaining records of the source.
    ///
    /// The iterator pulls one row per call to `next`; dropping it early is
    /// always safe. Calling `rows` again continues where the source stands,
    /// so a drained source yields nothing until it is [rewound].
    ///
    /// [rewound]: CsvReader::rewind
    pub fn rows(&self) -> Rows<'_, R> {
        Rows {
            reader: self,
            done: false,
        }
    }

    /// Like [`rows`](CsvReader::rows), applying `processor` to every record.
    ///
    /// ```
    /// use csv_stream_rs::item::csv::csv_reader::CsvReaderBuilder;
    /// use csv_stream_rs::item::csv::mapping::MappedRecord;
    ///
    /// let reader = CsvReaderBuilder::new()
    ///     .from_reader("name;count\nfoo;1\nbar;2".as_bytes())
    ///     .unwrap();
    ///
    /// let names = reader
    ///     .rows_with(|record: MappedRecord| record.into_values().remove(0))
    ///     .collect::<Result<Vec<String>, _>>()
    ///     .unwrap();
    /// assert_eq!(names, vec!["foo", "bar"]);
    /// ```
    pub fn rows_with<P, O>(&self, processor: P) -> ProcessedRows<'_, R, P, O>
    where
        P: ItemProcessor<MappedRecord, O>,
    {
        ProcessedRows {
            rows: self.rows(),
            processor,
            output: PhantomData,
        }
    }

    /// Like [`rows_with`](CsvReader::rows_with) with a fallible transform.
    ///
    /// A record rejected by `processor` surfaces as
    /// [`CsvError::Processor`]; the next pull carries on with the following
    /// row.
    ///
    /// ```
    /// use csv_stream_rs::error::CsvError;
    /// use csv_stream_rs::item::csv::csv_reader::CsvReaderBuilder;
    /// use csv_stream_rs::item::csv::mapping::MappedRecord;
    ///
    /// let reader = CsvReaderBuilder::new()
    ///     .from_reader("name;count\nfoo;1\nbar;x".as_bytes())
    ///     .unwrap();
    ///
    /// let counts = reader
    ///     .try_rows_with(|record: MappedRecord| record.values()[1].parse::<u32>())
    ///     .collect::<Vec<_>>();
    /// assert_eq!(counts.len(), 2);
    /// assert!(matches!(counts[1], Err(CsvError::Processor(_))));
    /// ```
    pub fn try_rows_with<F, O, E>(
        &self,
        processor: F,
    ) -> ProcessedRows<'_, R, TryProcessor<F>, O>
    where
        F: Fn(MappedRecord) -> Result<O, E>,
        E: Display,
    {
        self.rows_with(TryProcessor(processor))
    }

    /// Reads every remaining record into memory.
    pub fn to_vec(&self) -> Result<Vec<MappedRecord>, CsvError> {
        self.to_collection(PassThroughProcessor)
    }

    /// Reads every remaining record into memory, applying `processor`.
    pub fn to_collection<P, O>(&self, processor: P) -> Result<Vec<O>, CsvError>
    where
        P: ItemProcessor<MappedRecord, O>,
    {
        self.rows_with(processor).collect()
    }

    /// Reads every remaining record into memory, stopping at the first
    /// record rejected by `processor`.
    pub fn try_to_collection<F, O, E>(&self, processor: F) -> Result<Vec<O>, CsvError>
    where
        F: Fn(MappedRecord) -> Result<O, E>,
        E: Display,
    {
        self.try_rows_with(processor).collect()
    }
}

impl<R: Read + Seek> CsvReader<R> {
    /// Moves the source back to its start so it can be read again.
    ///
    /// Headings are forgotten and derived again from the first row.
    pub fn rewind(&self) -> Result<(), CsvError> {
        self.reader.borrow_mut().seek(Position::new())?;
        self.row_index.set(0);
        *self.headings.borrow_mut() = None;
        debug!("CSV source rewound");
        Ok(())
    }
}

fn is_blank(record: &ByteRecord) -> bool {
    record.len() == 1 && record[0].is_empty()
}

fn line_of(record: &ByteRecord, fallback: u64) -> u64 {
    record.position().map_or(fallback, Position::line)
}

/// Lazy sequence of records returned by [`CsvReader::rows`].
pub struct Rows<'r, R> {
    reader: &'r CsvReader<R>,
    done: bool,
}

impl<R: Read> Iterator for Rows<'_, R> {
    type Item = Result<MappedRecord, CsvError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.read() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => Some(Err(error)),
        }
    }
}

/// Lazy sequence of transformed records returned by [`CsvReader::rows_with`].
pub struct ProcessedRows<'r, R, P, O> {
    rows: Rows<'r, R>,
    processor: P,
    output: PhantomData<fn() -> O>,
}

impl<R, P, O> Iterator for ProcessedRows<'_, R, P, O>
where
    R: Read,
    P: ItemProcessor<MappedRecord, O>,
{
    type Item = Result<O, CsvError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows
            .next()
            .map(|result| result.and_then(|record| self.processor.process(record)))
    }
}

/// A builder for configuring CSV reading.
///
/// Every option is collected here and validated once, when the reader is
/// built, so a reader can never be reconfigured while it is streaming.
///
/// # Default Configuration
///
/// - Delimiter: semicolon (;)
/// - Quote: double quote (")
/// - Escape: none, quotes are escaped by doubling them
/// - Terminator: CRLF (any of `\r\n`, `\r` or `\n`)
/// - Trimming: none
/// - First row: skipped
/// - Output: positional records
/// - Search encodings: ISO-8859-1, ISO-8859-15, UTF-8; no target encoding
///
/// # Examples
///
/// ```
/// use csv_stream_rs::item::csv::csv_reader::CsvReaderBuilder;
///
/// let reader = CsvReaderBuilder::new()
///     .delimiter(b'|')
///     .with_headings()
///     .search_encodings(&["ISO-8859-1", "UTF-8"])
///     .to_encoding("UTF-8")
///     .from_reader("name|count\nfoo|1".as_bytes())
///     .unwrap();
///
/// assert_eq!(reader.to_vec().unwrap().len(), 2);
/// ```
pub struct CsvReaderBuilder {
    delimiter: u8,
    quote: u8,
    escape: Option<u8>,
    terminator: Terminator,
    trim: Trim,
    comment: Option<u8>,
    skip_headings: bool,
    shape: RecordShape,
    search_encodings: Vec<String>,
    to_encoding: Option<String>,
}

impl Default for CsvReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvReaderBuilder {
    pub fn new() -> Self {
        Self {
            delimiter: b';',
            quote: b'"',
            escape: None,
            terminator: Terminator::CRLF,
            trim: Trim::None,
            comment: None,
            skip_headings: true,
            shape: RecordShape::Positional,
            search_encodings: DEFAULT_SEARCH_ENCODINGS
                .iter()
                .map(|label| label.to_string())
                .collect(),
            to_encoding: None,
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the enclosure character wrapping fields that contain delimiters,
    /// quotes or line breaks.
    pub fn quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    /// Sets the escape character used inside quoted fields.
    ///
    /// With an escape character, `\"` stands for a literal quote and doubled
    /// quotes are no longer recognized. `None` restores doubled quotes.
    pub fn escape(mut self, escape: Option<u8>) -> Self {
        self.escape = escape;
        self
    }

    pub fn terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }

    pub fn trim(mut self, trim: Trim) -> Self {
        self.trim = trim;
        self
    }

    /// Lines starting with `comment` are ignored.
    pub fn comment(mut self, comment: Option<u8>) -> Self {
        self.comment = comment;
        self
    }

    /// Yields the first row too instead of discarding it.
    pub fn with_headings(self) -> Self {
        self.skip_headings(false)
    }

    pub fn skip_headings(mut self, yes: bool) -> Self {
        self.skip_headings = yes;
        self
    }

    /// Keys records by the canonicalized names of the first row.
    ///
    /// Rows must then have exactly one value per heading. Whether the first
    /// row itself is yielded is still decided by
    /// [`skip_headings`](CsvReaderBuilder::skip_headings).
    pub fn key_by_column_name(mut self) -> Self {
        self.shape = RecordShape::Named;
        self
    }

    /// Like [`key_by_column_name`](CsvReaderBuilder::key_by_column_name),
    /// producing [`RowObject`](crate::item::csv::mapping::RowObject) records.
    pub fn to_object(mut self) -> Self {
        self.shape = RecordShape::Object;
        self
    }

    /// Encodings to detect, in priority order.
    pub fn search_encodings<S: AsRef<str>>(mut self, encodings: &[S]) -> Self {
        self.search_encodings = encodings
            .iter()
            .map(|label| label.as_ref().to_string())
            .collect();
        self
    }

    /// Converts rows that are not in `encoding` from their detected encoding.
    ///
    /// `encoding` must be one of the search encodings, otherwise building
    /// the reader fails with [`CsvError::InvalidEncodingConfiguration`].
    pub fn to_encoding(mut self, encoding: &str) -> Self {
        self.to_encoding = Some(encoding.to_string());
        self
    }

    fn encoding_config(&self) -> Result<EncodingConfig, CsvError> {
        EncodingConfig::new(&self.search_encodings, self.to_encoding.as_deref())
    }

    fn csv_builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(self.quote)
            .escape(self.escape)
            .double_quote(self.escape.is_none())
            .terminator(self.terminator)
            .trim(self.trim)
            .comment(self.comment)
            .has_headers(false)
            .flexible(true);
        builder
    }

    fn build<R: Read>(self, reader: csv::Reader<R>, config: EncodingConfig) -> CsvReader<R> {
        debug!(
            "CSV reader built: delimiter {:?}, shape {:?}, skip headings {}",
            self.delimiter as char, self.shape, self.skip_headings
        );

        CsvReader {
            reader: RefCell::new(reader),
            record: RefCell::new(ByteRecord::new()),
            resolver: EncodingResolver::new(config),
            shape: self.shape,
            skip_headings: self.skip_headings,
            trim_fields: matches!(self.trim, Trim::Fields | Trim::All),
            headings: RefCell::new(None),
            row_index: Cell::new(0),
            delimiter: self.delimiter,
            quote: self.quote,
            escape: self.escape,
        }
    }

    /// Creates a `CsvReader` from any source implementing `Read`.
    ///
    /// The encoding configuration is validated before the source is touched.
    ///
    /// # Errors
    ///
    /// - [`CsvError::UnknownEncoding`] if an encoding label is not recognized
    /// - [`CsvError::InvalidEncodingConfiguration`] if the target encoding is
    ///   not one of the search encodings
    pub fn from_reader<R: Read>(self, rdr: R) -> Result<CsvReader<R>, CsvError> {
        let config = self.encoding_config()?;
        let reader = self.csv_builder().from_reader(rdr);
        Ok(self.build(reader, config))
    }

    /// Creates a `CsvReader` reading the file at `path`.
    ///
    /// ```no_run
    /// use csv_stream_rs::item::csv::csv_reader::CsvReaderBuilder;
    ///
    /// let reader = CsvReaderBuilder::new()
    ///     .to_object()
    ///     .from_path("data.csv")
    ///     .unwrap();
    ///
    /// for record in reader.rows() {
    ///     println!("{:?}", record.unwrap());
    /// }
    /// ```
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<CsvReader<File>, CsvError> {
        let config = self.encoding_config()?;
        let reader = self.csv_builder().from_path(path)?;
        Ok(self.build(reader, config))
    }

    /// Creates a `CsvReader` over an in-memory file holding `lines`.
    ///
    /// See [`FakeFile::from_lines`] for the meaning of `max_memory`.
    ///
    /// ```
    /// use csv_stream_rs::item::csv::csv_reader::CsvReaderBuilder;
    ///
    /// let reader = CsvReaderBuilder::new()
    ///     .fake(&["name;count", "foo;1", "bar;2"], None)
    ///     .unwrap();
    ///
    /// assert_eq!(reader.to_vec().unwrap().len(), 2);
    /// ```
    pub fn fake<S: AsRef<str>>(
        self,
        lines: &[S],
        max_memory: Option<usize>,
    ) -> Result<CsvReader<SpooledTempFile>, CsvError> {
        let config = self.encoding_config()?;
        let file = FakeFile::from_lines(lines, max_memory)?;
        let reader = self.csv_builder().from_reader(file);
        Ok(self.build(reader, config))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use csv::Trim;

    use crate::{
        core::item::ItemReader,
        error::CsvError,
        item::csv::{csv_reader::CsvReaderBuilder, mapping::MappedRecord},
    };

    fn lines() -> Vec<&'static str> {
        vec!["column name*;count", "foo;1", "bar;2", "baz;3"]
    }

    #[test]
    fn reads_positional_rows_without_headings() -> Result<(), Box<dyn Error>> {
        let reader = CsvReaderBuilder::new()
            .with_headings()
            .fake(&lines(), None)?;

        let records = reader.to_vec()?;

        assert_eq!(
            records,
            lines()
                .iter()
                .map(|line| MappedRecord::Positional(
                    line.split(';').map(str::to_string).collect()
                ))
                .collect::<Vec<_>>()
        );

        Ok(())
    }

    #[test]
    fn item_reader_pulls_one_record_at_a_time() -> Result<(), Box<dyn Error>> {
        let reader = CsvReaderBuilder::new().fake(&lines(), None)?;

        let first = reader.read()?.unwrap();
        assert_eq!(first.values(), vec!["foo", "1"]);
        assert_eq!(reader.read()?.unwrap().values(), vec!["bar", "2"]);
        assert_eq!(reader.read()?.unwrap().values(), vec!["baz", "3"]);
        assert!(reader.read()?.is_none());
        assert!(reader.read()?.is_none());

        Ok(())
    }

    #[test]
    fn blank_lines_are_skipped_without_counting() -> Result<(), Box<dyn Error>> {
        let reader = CsvReaderBuilder::new()
            .key_by_column_name()
            .fake(&["", "name;count", "", "foo;1", "", "bar;2"], None)?;

        let records = reader.to_vec()?;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("name"), Some("foo"));
        assert_eq!(records[1].get("count"), Some("2"));

        Ok(())
    }

    #[test]
    fn whitespace_only_lines_are_skipped_when_trimming() -> Result<(), Box<dyn Error>> {
        let reader = CsvReaderBuilder::new()
            .trim(Trim::All)
            .key_by_column_name()
            .fake(&["   ", "name;count", "  ", "foo ; 1", "\t", "bar;2"], None)?;

        let records = reader.to_vec()?;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("count"), Some("1"));
        assert_eq!(records[1].get("name"), Some("bar"));

        Ok(())
    }

    #[test]
    fn single_column_values_are_kept_without_trimming() -> Result<(), Box<dyn Error>> {
        let reader = CsvReaderBuilder::new().fake(&["comment", "  ", "\"\"", "done"], None)?;

        let records = reader.to_vec()?;

        assert_eq!(
            records,
            vec![
                MappedRecord::Positional(vec!["  ".to_string()]),
                MappedRecord::Positional(vec![String::new()]),
                MappedRecord::Positional(vec!["done".to_string()]),
            ]
        );

        Ok(())
    }

    #[test]
    fn unreadable_headings_fail_every_keyed_row() -> Result<(), Box<dyn Error>> {
        let data: &[u8] = b"Pr\xe9nom;Nom\nfoo;bar\nonly_one\n";
        let reader = CsvReaderBuilder::new().key_by_column_name().from_reader(data)?;

        assert!(matches!(reader.read(), Err(CsvError::Utf8 { line: 1 })));
        assert!(matches!(reader.read(), Err(CsvError::MissingHeadings { line: 2 })));
        assert!(matches!(reader.read(), Err(CsvError::MissingHeadings { line: 3 })));
        assert!(reader.read()?.is_none());
        assert!(reader.headings().is_none());

        Ok(())
    }

    #[test]
    fn rejected_records_surface_as_processor_errors() -> Result<(), Box<dyn Error>> {
        let reader = CsvReaderBuilder::new()
            .key_by_column_name()
            .fake(&lines(), None)?;

        let result = reader.try_to_collection(|record: MappedRecord| {
            if record.get("column_name") == Some("bar") {
                Err(format!("rejected {:?}", record.values()))
            } else {
                Ok(record.into_values())
            }
        });

        match result {
            Err(CsvError::Processor(message)) => assert_eq!(message, r#"rejected ["bar", "2"]"#),
            other => panic!("expected a processor error, got {:?}", other),
        }

        let rest = reader.to_vec()?;
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].get("column_name"), Some("baz"));

        Ok(())
    }

    #[test]
    fn headings_are_exposed_after_the_first_pull() -> Result<(), Box<dyn Error>> {
        let reader = CsvReaderBuilder::new()
            .key_by_column_name()
            .fake(&lines(), None)?;

        assert!(reader.headings().is_none());
        reader.read()?;

        let headings = reader.headings().unwrap();
        assert_eq!(headings.as_slice(), &["column_name", "count"]);

        Ok(())
    }

    #[test]
    fn positional_mode_never_derives_headings() -> Result<(), Box<dyn Error>> {
        let reader = CsvReaderBuilder::new().fake(&lines(), None)?;
        reader.to_vec()?;
        assert!(reader.headings().is_none());
        Ok(())
    }

    #[test]
    fn getters_reflect_the_configuration() -> Result<(), Box<dyn Error>> {
        let reader = CsvReaderBuilder::new()
            .delimiter(b'|')
            .quote(b'\'')
            .escape(Some(b'*'))
            .search_encodings(&["UTF-16", "UTF-8"])
            .to_encoding("UTF-8")
            .fake(&lines(), None)?;

        assert_eq!(reader.delimiter(), b'|');
        assert_eq!(reader.quote(), b'\'');
        assert_eq!(reader.escape(), Some(b'*'));
        assert_eq!(reader.search_encodings(), vec!["UTF-16LE", "UTF-8"]);
        assert_eq!(reader.to_encoding(), Some("UTF-8"));

        Ok(())
    }

    #[test]
    fn invalid_utf8_without_target_encoding_is_an_error() -> Result<(), Box<dyn Error>> {
        let data: &[u8] = b"name;count\nfoo;1\ncl\xe9mentine;2\n";
        let reader = CsvReaderBuilder::new().from_reader(data)?;

        assert!(reader.read()?.is_some());
        assert!(matches!(reader.read(), Err(CsvError::Utf8 { line: 3 })));
        assert!(reader.read()?.is_none());

        Ok(())
    }

    #[test]
    fn escape_character_replaces_doubled_quotes() -> Result<(), Box<dyn Error>> {
        let data = "name;quote\nfoo;\"say \\\"hi\\\"\"\n";
        let reader = CsvReaderBuilder::new()
            .escape(Some(b'\\'))
            .from_reader(data.as_bytes())?;

        let record = reader.read()?.unwrap();
        assert_eq!(record.values(), vec!["foo", "say \"hi\""]);

        Ok(())
    }
}
