use std::io::{self, Read, Seek, SeekFrom, Write};

use log::debug;
use tempfile::SpooledTempFile;

/// Size kept in memory before a fake file spills to disk (2 MiB).
pub const DEFAULT_MAX_MEMORY: usize = 2 * 1024 * 1024;

/// In-memory files standing in for real ones in tests and small programs.
///
/// A fake file lives in memory until it grows past `max_memory` bytes, then
/// transparently moves to an anonymous temporary file.
///
/// ```
/// use csv_stream_rs::item::csv::fake::FakeFile;
///
/// let mut file = FakeFile::from_lines(&["name;count", "foo;1"], None).unwrap();
/// assert_eq!(FakeFile::contents(&mut file).unwrap(), "name;count\nfoo;1");
/// ```
pub struct FakeFile;

impl FakeFile {
    /// An empty file, ready for writing.
    pub fn empty(max_memory: Option<usize>) -> SpooledTempFile {
        SpooledTempFile::new(max_memory.unwrap_or(DEFAULT_MAX_MEMORY))
    }

    /// A file holding `lines` joined with `\n`, rewound to its start.
    pub fn from_lines<S: AsRef<str>>(
        lines: &[S],
        max_memory: Option<usize>,
    ) -> io::Result<SpooledTempFile> {
        let content = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join("\n");
        Self::from_bytes(content.as_bytes(), max_memory)
    }

    /// A file holding `bytes` verbatim, rewound to its start.
    pub fn from_bytes(bytes: &[u8], max_memory: Option<usize>) -> io::Result<SpooledTempFile> {
        let mut file = Self::empty(max_memory);
        file.write_all(bytes)?;
        file.rewind()?;
        debug!("Fake file created with {} bytes", bytes.len());
        Ok(file)
    }

    /// Everything written to `file` so far, as text. The cursor is left at
    /// the end of the file.
    pub fn contents(file: &mut SpooledTempFile) -> io::Result<String> {
        file.seek(SeekFrom::Start(0))?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Ok(content)
    }
}
