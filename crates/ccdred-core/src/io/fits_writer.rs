use std::io;
use std::path::Path;

use fitsio::hdu::FitsHdu;
use fitsio::images::{ImageDescription, ImageType};
use fitsio::FitsFile;
use tracing::debug;

use crate::consts::PIXEL_UNIT;
use crate::error::{CalibrationError, Result};
use crate::frame::{Frame, QuantizedFrame};
use crate::io::header::Header;
use crate::io::raw;

/// Write a calibrated frame as unsigned 16-bit data (BITPIX=16, BZERO=32768).
///
/// The file is written next to its destination and renamed into place, so an
/// interrupted write never leaves a partial file at `path`.
pub fn write_quantized(path: &Path, frame: &QuantizedFrame) -> Result<()> {
    let (rows, cols) = frame.data.dim();
    let description = ImageDescription {
        data_type: ImageType::UnsignedShort,
        dimensions: &[rows, cols],
    };
    let pixels: Vec<u16> = frame.data.iter().copied().collect();
    write_atomic(path, &description, |fits, hdu| {
        write_metadata(fits, hdu, &frame.header)?;
        hdu.write_image(fits, &pixels)?;
        Ok(())
    })
}

/// Write a floating-point frame as BITPIX=-64.
pub fn write_frame(path: &Path, frame: &Frame) -> Result<()> {
    let (rows, cols) = frame.data.dim();
    let description = ImageDescription {
        data_type: ImageType::Double,
        dimensions: &[rows, cols],
    };
    let pixels: Vec<f64> = frame.data.iter().copied().collect();
    write_atomic(path, &description, |fits, hdu| {
        write_metadata(fits, hdu, &frame.header)?;
        hdu.write_image(fits, &pixels)?;
        Ok(())
    })
}

/// Metadata cards follow the layout keywords cfitsio generates, with BUNIT
/// ahead of the history log.
fn write_metadata(fits: &mut FitsFile, hdu: &FitsHdu, header: &Header) -> Result<()> {
    let mut meta = header.without_structural();
    meta.set("BUNIT", PIXEL_UNIT);
    raw::write_header(fits, hdu, &meta)
}

/// Create the image in a temporary file beside `path`, fill it, then rename
/// it over `path`. An existing destination keeps its permission bits; a new
/// file gets the usual `0666 & !umask` since cfitsio creates it.
fn write_atomic<F>(path: &Path, description: &ImageDescription, fill: F) -> Result<()>
where
    F: FnOnce(&mut FitsFile, &FitsHdu) -> Result<()>,
{
    let output_err = |source| CalibrationError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = tempfile::Builder::new()
        .prefix(".ccdred-")
        .suffix(".fits")
        .make_in(dir, |p| {
            FitsFile::create(p)
                .with_custom_primary(description)
                .open()
                .map_err(|e| io::Error::other(e.to_string()))
        })
        .map_err(output_err)?;
    let (mut fits, tmp_path) = tmp.into_parts();

    let filled = fits
        .primary_hdu()
        .map_err(CalibrationError::from)
        .and_then(|hdu| fill(&mut fits, &hdu))
        .and_then(|()| raw::flush(&mut fits));
    // Closing the handle writes the final block.
    drop(fits);
    filled.map_err(|e| output_err(io::Error::other(e.to_string())))?;

    if let Ok(existing) = std::fs::metadata(path) {
        std::fs::set_permissions(&tmp_path, existing.permissions()).map_err(output_err)?;
    }
    tmp_path.persist(path).map_err(|e| output_err(e.error))?;
    debug!(path = %path.display(), "Wrote FITS file");
    Ok(())
}
