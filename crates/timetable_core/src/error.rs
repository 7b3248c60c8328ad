//! Error types for the timetable extraction engine.
//!
//! Only a document the CSV decoder cannot tokenize aborts a parse. Every
//! other problem degrades into empty fields or validation log records.

use thiserror::Error;

/// Fatal errors raised by the engine
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("CSV decoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid parser configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ParseError>;
