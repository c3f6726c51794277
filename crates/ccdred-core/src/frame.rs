use ndarray::Array2;

use crate::consts::EXPTIME_KEY;
use crate::io::header::Header;

/// A CCD image during calibration.
/// Pixel values are f64 counts in adu.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f64>,
    /// Instrument/exposure metadata and the history log
    pub header: Header,
}

impl Frame {
    pub fn new(data: Array2<f64>) -> Self {
        Self {
            data,
            header: Header::new(),
        }
    }

    pub fn with_header(data: Array2<f64>, header: Header) -> Self {
        Self { data, header }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Shape as (rows, cols).
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Numeric EXPTIME, if present.
    pub fn exposure_time(&self) -> Option<f64> {
        self.header.get_f64(EXPTIME_KEY)
    }

    pub fn history(&self) -> Vec<&str> {
        self.header.history()
    }
}

/// Final calibrated image with unsigned 16-bit pixels.
#[derive(Clone, Debug)]
pub struct QuantizedFrame {
    pub data: Array2<u16>,
    pub header: Header,
}

impl QuantizedFrame {
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn history(&self) -> Vec<&str> {
        self.header.history()
    }
}
