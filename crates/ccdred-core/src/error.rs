use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input not found or unreadable: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Input is a directory, expected a single FITS file: {}", path.display())]
    InputIsDirectory { path: PathBuf },

    #[error("Dimension mismatch for {frame}: expected {}x{}, got {}x{}", expected.1, expected.0, found.1, found.0)]
    DimensionMismatch {
        frame: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Missing EXPTIME keyword in {frame}")]
    MissingExposure { frame: String },

    #[error("Invalid EXPTIME {value} in {frame}")]
    InvalidExposure { frame: String, value: f64 },

    #[error("Failed to write output {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid FITS file: {0}")]
    InvalidFits(String),
}

impl From<fitsio::errors::Error> for CalibrationError {
    fn from(e: fitsio::errors::Error) -> Self {
        CalibrationError::InvalidFits(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CalibrationError>;
