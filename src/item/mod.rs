/// This module provides the CSV reader and writer, with encoding detection and header mapping.
pub mod csv;
