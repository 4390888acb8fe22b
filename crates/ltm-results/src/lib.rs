//! ltm-results: append-only snapshot streams of network temperatures.
//!
//! Two layouts are supported:
//! - CSV: a header of quoted body labels, then one row of temperatures per snapshot
//! - binary: a label header, then little-endian `f64` records closed by two zero bytes

pub mod binary;
pub mod csv;
pub mod writer;

pub use binary::{BinaryReader, BinaryWriter, END_OF_RECORD};
pub use csv::CsvWriter;
pub use writer::{OutputFormat, SnapshotWriter, create_writer};

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {message}")]
    Format { message: String },
}

impl ResultsError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        ResultsError::Format {
            message: message.into(),
        }
    }
}
