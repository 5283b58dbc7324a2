//! Error types for opac2ftb

use thiserror::Error;

/// Main error type for conversion operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed NBT input: {0}")]
    MalformedInput(String),

    #[error("No claimed chunks in any dimension")]
    EmptyResult,

    #[error("Cannot encode value as SNBT: {0}")]
    UnencodableValue(String),
}

impl Error {
    /// Short label used in per-file reports
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::MalformedInput(_) => "malformed",
            Error::EmptyResult => "empty",
            Error::UnencodableValue(_) => "unencodable",
        }
    }
}

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, Error>;
