//! File formats: STL for meshes, SVG for outlines.

use std::path::{Path, PathBuf};

pub mod stl;
pub mod svg;

/// Failures while reading or writing STL and SVG files.
#[derive(Debug)]
pub enum IoError {
    StdIo(std::io::Error),

    /// The document is structurally unusable (e.g. no size information).
    MalformedInput(String),
    /// A path `d` attribute has the wrong number of arguments or no initial moveto.
    MalformedPath(String),
    /// The write returned success but the file is missing or empty.
    NotWritten(PathBuf),

    SvgParsing(::svg::parser::Error),
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoError::StdIo(error) => write!(f, "I/O error: {error}"),
            IoError::MalformedInput(msg) => write!(f, "malformed document: {msg}"),
            IoError::MalformedPath(msg) => write!(f, "malformed path data: {msg}"),
            IoError::NotWritten(path) => {
                write!(f, "{} is missing or empty after writing", path.display())
            },
            IoError::SvgParsing(error) => write!(f, "cannot parse SVG: {error}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IoError::StdIo(error) => Some(error),
            _ => None,
        }
    }
}

impl From<std::io::Error> for IoError {
    fn from(value: std::io::Error) -> Self {
        Self::StdIo(value)
    }
}

impl From<::svg::parser::Error> for IoError {
    fn from(value: ::svg::parser::Error) -> Self {
        Self::SvgParsing(value)
    }
}

/// Check that `path` exists and holds data after a write.
pub(crate) fn verify_written(path: &Path) -> Result<(), IoError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        _ => Err(IoError::NotWritten(path.to_path_buf())),
    }
}
