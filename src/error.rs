use thiserror::Error;

#[derive(Error, Debug)]
/// Csv error
pub enum CsvError {
    /// A data row does not have as many fields as the headings.
    #[error("Row {line} has {found} fields but headings define {expected}")]
    ArityMismatch {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A keyed reader cannot map a row because its headings row could not
    /// be read.
    #[error("Row {line} cannot be mapped: the headings row could not be read")]
    MissingHeadings { line: u64 },

    /// The target encoding is not part of the candidate encodings.
    #[error("Target encoding {target} is not one of the search encodings [{candidates}]")]
    InvalidEncodingConfiguration { target: String, candidates: String },

    #[error("Unknown encoding label: {0}")]
    UnknownEncoding(String),

    /// A row is not valid UTF-8 and no target encoding was configured.
    #[error("Row {line} is not valid UTF-8")]
    Utf8 { line: u64 },

    #[error("Csv from: {0}")]
    Csv(#[from] csv::Error),

    #[error("Io from: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json from: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Deserialize from: {0}")]
    Deserialize(String),

    /// A caller transform rejected a record.
    #[error("ItemProcessor from: {0}")]
    Processor(String),
}
