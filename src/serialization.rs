//! Writers for flattened mappings.

use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::mapping::Mapping;

/// Failure while writing mappings
#[derive(Debug)]
pub enum SerializationError {
    Encode(serde_json::Error),
    Write(std::io::Error),
}

impl From<serde_json::Error> for SerializationError {
    fn from(err: serde_json::Error) -> Self {
        SerializationError::Encode(err)
    }
}

impl From<std::io::Error> for SerializationError {
    fn from(err: std::io::Error) -> Self {
        SerializationError::Write(err)
    }
}

impl std::fmt::Display for SerializationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializationError::Encode(e) => write!(f, "Cannot encode mapping as JSON: {}", e),
            SerializationError::Write(e) => write!(f, "Cannot write mapping output: {}", e),
        }
    }
}

impl std::error::Error for SerializationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SerializationError::Encode(e) => Some(e),
            SerializationError::Write(e) => Some(e),
        }
    }
}

/// Output layout for a stream of mappings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// One JSON object per line
    #[default]
    Ndjson,
    /// A single JSON array
    JsonArray,
}

/// Streams mappings to a writer as NDJSON or as one JSON array.
///
/// Call [`MappingWriter::finish`] to close the array and flush.
pub struct MappingWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    written: usize,
}

impl<W: Write> MappingWriter<W> {
    /// Create a writer; for `JsonArray` the opening bracket is written now
    pub fn new(mut writer: W, format: OutputFormat) -> Result<Self, SerializationError> {
        if format == OutputFormat::JsonArray {
            write!(writer, "[")?;
        }
        Ok(Self {
            writer,
            format,
            written: 0,
        })
    }

    pub fn write(&mut self, mapping: &Mapping) -> Result<(), SerializationError> {
        let json = serde_json::to_string(mapping)?;
        match self.format {
            OutputFormat::Ndjson => writeln!(self.writer, "{}", json)?,
            OutputFormat::JsonArray => {
                if self.written > 0 {
                    write!(self.writer, ",")?;
                }
                write!(self.writer, "{}", json)?;
            }
        }
        self.written += 1;
        Ok(())
    }

    pub fn write_all(&mut self, mappings: &[Mapping]) -> Result<(), SerializationError> {
        for mapping in mappings {
            self.write(mapping)?;
        }
        Ok(())
    }

    /// Close the output and return how many mappings were written
    pub fn finish(mut self) -> Result<usize, SerializationError> {
        if self.format == OutputFormat::JsonArray {
            write!(self.writer, "]")?;
        }
        self.writer.flush()?;
        Ok(self.written)
    }
}
