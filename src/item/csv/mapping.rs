//! Header canonicalization and row to record mapping.

use std::{collections::HashSet, sync::Arc};

use csv::StringRecord;
use deunicode::deunicode;
use indexmap::IndexMap;
use serde::{
    Serialize, Serializer,
    de::DeserializeOwned,
    ser::{SerializeMap, SerializeSeq},
};

use crate::error::CsvError;

/// Normalizes a raw header cell into a lowercase ASCII identifier.
///
/// The text is transliterated to ASCII, split into words on anything that
/// is not a letter or a digit, lowercased, and the words are joined with `_`.
///
/// ```
/// use csv_stream_rs::item::csv::mapping::canonicalize;
///
/// assert_eq!(canonicalize("Column Name*"), "column_name");
/// assert_eq!(canonicalize("Nom d'usage"), "nom_d_usage");
/// assert_eq!(canonicalize("Prénom"), "prenom");
/// ```
pub fn canonicalize(raw: &str) -> String {
    deunicode(raw)
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Canonical field names taken from the first row of a file.
///
/// Names are unique: an empty name becomes `column_<position>` and a
/// repeated name gets a numeric suffix (`count`, `count_2`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headings(Vec<String>);

impl Headings {
    pub fn derive<S: AsRef<str>>(row: &[S]) -> Self {
        let mut seen: HashSet<String> = HashSet::with_capacity(row.len());
        let mut names = Vec::with_capacity(row.len());

        for (position, cell) in row.iter().enumerate() {
            let mut base = canonicalize(cell.as_ref());
            if base.is_empty() {
                base = format!("column_{}", position + 1);
            }

            let mut name = base.clone();
            let mut suffix = 2;
            while seen.contains(&name) {
                name = format!("{}_{}", base, suffix);
                suffix += 1;
            }

            seen.insert(name.clone());
            names.push(name);
        }

        Headings(names)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|heading| heading == name)
    }
}

/// Which variant of [`MappedRecord`] the mapper produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordShape {
    /// The row as tokenized.
    #[default]
    Positional,
    /// Keyed by heading, in heading order.
    Named,
    /// A read-only object with one property per heading.
    Object,
}

/// A row with named, read-only properties.
#[derive(Debug, Clone, PartialEq)]
pub struct RowObject {
    headings: Arc<Headings>,
    values: Vec<String>,
}

impl RowObject {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.headings
            .position(property)
            .map(|index| self.values[index].as_str())
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.headings.position(property).is_some()
    }

    /// `(property, value)` pairs in heading order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headings
            .iter()
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn headings(&self) -> &Headings {
        &self.headings
    }

    /// Deserializes the object into `T`, matching struct fields by heading.
    ///
    /// ```
    /// use csv_stream_rs::item::csv::csv_reader::CsvReaderBuilder;
    /// use csv_stream_rs::item::csv::mapping::MappedRecord;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Line {
    ///     column_name: String,
    ///     count: u32,
    /// }
    ///
    /// let reader = CsvReaderBuilder::new()
    ///     .to_object()
    ///     .from_reader("column name*;count\nfoo;1".as_bytes())
    ///     .unwrap();
    ///
    /// let Some(MappedRecord::Object(object)) = reader.rows().next().transpose().unwrap() else {
    ///     panic!("expected an object");
    /// };
    /// let line: Line = object.deserialize().unwrap();
    /// assert_eq!(line.column_name, "foo");
    /// assert_eq!(line.count, 1);
    /// ```
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, CsvError> {
        let headers = StringRecord::from(self.headings.as_slice().to_vec());
        let record = StringRecord::from(self.values.clone());
        record
            .deserialize(Some(&headers))
            .map_err(|error| CsvError::Deserialize(error.to_string()))
    }
}

/// One decoded row, shaped according to the reader configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum MappedRecord {
    Positional(Vec<String>),
    Named(IndexMap<String, String>),
    Object(RowObject),
}

impl MappedRecord {
    /// Cell values in column order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            MappedRecord::Positional(values) => values.iter().map(String::as_str).collect(),
            MappedRecord::Named(map) => map.values().map(String::as_str).collect(),
            MappedRecord::Object(object) => object.values.iter().map(String::as_str).collect(),
        }
    }

    pub fn into_values(self) -> Vec<String> {
        match self {
            MappedRecord::Positional(values) => values,
            MappedRecord::Named(map) => map.into_values().collect(),
            MappedRecord::Object(object) => object.values,
        }
    }

    /// Field names in column order, `None` for positional rows.
    pub fn keys(&self) -> Option<Vec<&str>> {
        match self {
            MappedRecord::Positional(_) => None,
            MappedRecord::Named(map) => Some(map.keys().map(String::as_str).collect()),
            MappedRecord::Object(object) => Some(object.headings.iter().collect()),
        }
    }

    /// Value of a named field. Positional rows have no names.
    pub fn get(&self, name: &str) -> Option<&str> {
        match self {
            MappedRecord::Positional(_) => None,
            MappedRecord::Named(map) => map.get(name).map(String::as_str),
            MappedRecord::Object(object) => object.get(name),
        }
    }

    pub fn get_index(&self, index: usize) -> Option<&str> {
        match self {
            MappedRecord::Positional(values) => values.get(index).map(String::as_str),
            MappedRecord::Named(map) => map.get_index(index).map(|(_, value)| value.as_str()),
            MappedRecord::Object(object) => object.values.get(index).map(String::as_str),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            MappedRecord::Positional(values) => values.len(),
            MappedRecord::Named(map) => map.len(),
            MappedRecord::Object(object) => object.values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// JSON array for positional rows, JSON object otherwise.
    pub fn to_json(&self) -> Result<serde_json::Value, CsvError> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Serialize for MappedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MappedRecord::Positional(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            MappedRecord::Named(named) => {
                let mut map = serializer.serialize_map(Some(named.len()))?;
                for (key, value) in named {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            MappedRecord::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.values.len()))?;
                for (key, value) in object.properties() {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// Combines a decoded row with the headings into the requested shape.
///
/// Named and object shapes require exactly one value per heading; `line` is
/// reported in the [`CsvError::ArityMismatch`] raised otherwise.
pub fn map_fields(
    headings: &Arc<Headings>,
    row: Vec<String>,
    shape: RecordShape,
    line: u64,
) -> Result<MappedRecord, CsvError> {
    if shape == RecordShape::Positional {
        return Ok(MappedRecord::Positional(row));
    }

    if row.len() != headings.len() {
        return Err(CsvError::ArityMismatch {
            line,
            expected: headings.len(),
            found: row.len(),
        });
    }

    Ok(match shape {
        RecordShape::Object => MappedRecord::Object(RowObject {
            headings: Arc::clone(headings),
            values: row,
        }),
        _ => MappedRecord::Named(headings.iter().map(str::to_string).zip(row).collect()),
    })
}
