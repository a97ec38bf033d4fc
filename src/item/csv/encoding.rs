//! Per-row character encoding detection and conversion.
//!
//! Detection looks at the whole physical row at once, conversion is applied
//! cell by cell. Short cells on their own carry too little signal to tell a
//! legacy 8-bit charset from UTF-8.

use csv::ByteRecord;
use encoding_rs::{Encoding, UTF_8};
use log::{trace, warn};

use crate::error::CsvError;

/// Encodings searched when the caller does not provide a list.
pub const DEFAULT_SEARCH_ENCODINGS: [&str; 3] = ["ISO-8859-1", "ISO-8859-15", "UTF-8"];

/// Resolves an encoding label (`"UTF-8"`, `"latin1"`, `"ISO-8859-15"`, ...).
///
/// Labels follow the WHATWG Encoding Standard, so `"ISO-8859-1"` resolves to
/// windows-1252, its superset.
pub fn lookup(label: &str) -> Result<&'static Encoding, CsvError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| CsvError::UnknownEncoding(label.to_string()))
}

/// Candidate encodings in priority order, plus the optional target encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodingConfig {
    candidates: Vec<&'static Encoding>,
    target: Option<&'static Encoding>,
}

impl EncodingConfig {
    /// Builds and validates a configuration.
    ///
    /// A target encoding that is not one of the candidates is rejected here,
    /// before any row is read.
    ///
    /// ```
    /// use csv_stream_rs::item::csv::encoding::EncodingConfig;
    ///
    /// assert!(EncodingConfig::new(&["ISO-8859-1", "UTF-8"], Some("UTF-8")).is_ok());
    /// assert!(EncodingConfig::new(&["ISO-8859-1"], Some("UTF-8")).is_err());
    /// ```
    pub fn new<S: AsRef<str>>(candidates: &[S], target: Option<&str>) -> Result<Self, CsvError> {
        let mut resolved: Vec<&'static Encoding> = Vec::with_capacity(candidates.len());
        for label in candidates {
            let encoding = lookup(label.as_ref())?;
            if !resolved.contains(&encoding) {
                resolved.push(encoding);
            }
        }

        let target = target.map(lookup).transpose()?;

        if let Some(target) = target {
            if !resolved.contains(&target) {
                return Err(CsvError::InvalidEncodingConfiguration {
                    target: target.name().to_string(),
                    candidates: resolved
                        .iter()
                        .map(|encoding| encoding.name())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }

        Ok(Self {
            candidates: resolved,
            target,
        })
    }

    pub fn candidates(&self) -> &[&'static Encoding] {
        &self.candidates
    }

    pub fn target(&self) -> Option<&'static Encoding> {
        self.target
    }
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_SEARCH_ENCODINGS
                .iter()
                .filter_map(|label| Encoding::for_label(label.as_bytes()))
                .collect(),
            target: None,
        }
    }
}

/// Best-guess source encoding of `raw` among `candidates`.
///
/// Rules, in order:
/// - pure ASCII is consistent with `preferred` (or the first ASCII
///   compatible candidate), so it never needs converting;
/// - a byte order mark selects the matching candidate;
/// - valid UTF-8 containing multi-byte sequences selects UTF-8;
/// - otherwise the first single-byte candidate decoding without malformed
///   sequences or control characters wins.
///
/// Returns `None` when no candidate fits.
pub fn resolve(
    raw: &[u8],
    candidates: &[&'static Encoding],
    preferred: Option<&'static Encoding>,
) -> Option<&'static Encoding> {
    if raw.is_ascii() {
        return preferred
            .filter(|encoding| encoding.is_ascii_compatible())
            .or_else(|| {
                candidates
                    .iter()
                    .copied()
                    .find(|encoding| encoding.is_ascii_compatible())
            });
    }

    if let Some((encoding, _)) = Encoding::for_bom(raw) {
        if candidates.contains(&encoding) {
            return Some(encoding);
        }
    }

    if candidates.contains(&UTF_8) && std::str::from_utf8(raw).is_ok() {
        return Some(UTF_8);
    }

    candidates
        .iter()
        .copied()
        .filter(|encoding| encoding.is_single_byte())
        .find(|&encoding| decodes_cleanly(encoding, raw))
}

fn decodes_cleanly(encoding: &'static Encoding, raw: &[u8]) -> bool {
    match encoding.decode_without_bom_handling_and_without_replacement(raw) {
        Some(text) => !text
            .chars()
            .any(|c| c.is_control() && !matches!(c, '\t' | '\r' | '\n')),
        None => false,
    }
}

/// Decodes every cell of `record` from `from`. Empty cells are left as is.
pub fn convert(record: &ByteRecord, from: &'static Encoding) -> Vec<String> {
    record
        .iter()
        .map(|cell| {
            if cell.is_empty() {
                String::new()
            } else {
                from.decode_with_bom_removal(cell).0.into_owned()
            }
        })
        .collect()
}

/// Turns raw tokenized rows into text according to an [`EncodingConfig`].
#[derive(Debug, Clone, Default)]
pub struct EncodingResolver {
    config: EncodingConfig,
}

impl EncodingResolver {
    pub fn new(config: EncodingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncodingConfig {
        &self.config
    }

    /// Decodes one physical row. `line` is only used for error reporting.
    pub fn decode_row(&self, record: &ByteRecord, line: u64) -> Result<Vec<String>, CsvError> {
        let Some(target) = self.config.target else {
            return record
                .iter()
                .map(|cell| {
                    std::str::from_utf8(cell)
                        .map(str::to_string)
                        .map_err(|_| CsvError::Utf8 { line })
                })
                .collect();
        };

        match resolve(record.as_slice(), &self.config.candidates, Some(target)) {
            Some(detected) => {
                if detected != target {
                    trace!(
                        "Row {} detected as {}, converting to {}",
                        line,
                        detected.name(),
                        target.name()
                    );
                }
                Ok(convert(record, detected))
            }
            None => {
                warn!(
                    "Row {} matches none of the search encodings, keeping it as {}",
                    line,
                    target.name()
                );
                Ok(convert(record, target))
            }
        }
    }
}
