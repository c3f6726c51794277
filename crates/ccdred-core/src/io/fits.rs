use std::fs::File;
use std::path::Path;

use fitsio::hdu::{FitsHdu, HduInfo};
use fitsio::FitsFile;
use ndarray::Array2;
use tracing::debug;

use crate::error::{CalibrationError, Result};
use crate::frame::Frame;
use crate::io::header::Header;
use crate::io::raw;

/// Where the pixels of a FITS file live.
#[derive(Clone, Debug)]
pub struct ImageLayout {
    /// Zero-based HDU index; 0 is the primary array.
    pub hdu_index: usize,
    pub bitpix: i64,
    /// NAXISn values, fastest-varying axis first.
    pub axes: Vec<usize>,
}

impl ImageLayout {
    fn read(fits: &mut FitsFile, hdu: &FitsHdu, hdu_index: usize) -> Result<Self> {
        let bitpix = hdu.read_key::<i64>(fits, "BITPIX")?;
        let naxis = hdu.read_key::<i64>(fits, "NAXIS")?;
        let axes = (1..=naxis)
            .map(|n| hdu.read_key::<i64>(fits, &format!("NAXIS{n}")))
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .map(|n| n.max(0) as usize)
            .collect();
        Ok(Self {
            hdu_index,
            bitpix,
            axes,
        })
    }

    /// Image shape as (rows, cols). Axes beyond the second must be degenerate.
    pub fn shape(&self) -> Result<(usize, usize)> {
        if self.axes.len() < 2 {
            return Err(CalibrationError::InvalidFits(format!(
                "expected a 2-D image, found NAXIS = {}",
                self.axes.len()
            )));
        }
        if self.axes[2..].iter().any(|&n| n != 1) {
            return Err(CalibrationError::InvalidFits(format!(
                "expected a 2-D image, found axes {:?}",
                self.axes
            )));
        }
        Ok((self.axes[1], self.axes[0]))
    }
}

/// FITS file opened through cfitsio.
pub struct FitsReader {
    fits: FitsFile,
    hdu_count: usize,
    primary: Header,
    image: Option<ImageLayout>,
}

impl FitsReader {
    /// Open a FITS file, read its primary header and locate the image data.
    pub fn open(path: &Path) -> Result<Self> {
        let mut fits = FitsFile::open(path)?;
        let hdu_count = fits.iter().count();

        fits.primary_hdu()?;
        let primary = raw::read_header(&mut fits)?;

        let mut image = None;
        for i in 0..hdu_count {
            let hdu = fits.hdu(i)?;
            if let HduInfo::ImageInfo { ref shape, .. } = hdu.info {
                if !shape.is_empty() && shape.iter().product::<usize>() > 0 {
                    image = Some(ImageLayout::read(&mut fits, &hdu, i)?);
                    break;
                }
            }
        }

        debug!(path = %path.display(), hdus = hdu_count, "Opened FITS file");
        Ok(Self {
            fits,
            hdu_count,
            primary,
            image,
        })
    }

    pub fn hdu_count(&self) -> usize {
        self.hdu_count
    }

    /// Every card of the primary header, structural keywords included.
    pub fn primary_header(&self) -> &Header {
        &self.primary
    }

    /// First image HDU that carries pixel data.
    pub fn image(&self) -> Result<&ImageLayout> {
        self.image
            .as_ref()
            .ok_or_else(|| CalibrationError::InvalidFits("no image data found".into()))
    }

    /// Every card of the HDU at `index`.
    pub fn header(&mut self, index: usize) -> Result<Header> {
        self.fits.hdu(index)?;
        raw::read_header(&mut self.fits)
    }

    /// Read the image into a frame. Metadata comes from the primary header.
    pub fn read_frame(&mut self) -> Result<Frame> {
        let layout = self.image()?.clone();
        let (rows, cols) = layout.shape()?;

        let hdu = self.fits.hdu(layout.hdu_index)?;
        // cfitsio applies BSCALE and BZERO on the way out.
        let mut pixels: Vec<f64> = hdu.read_image(&mut self.fits)?;
        if pixels.len() != rows * cols {
            return Err(CalibrationError::InvalidFits(format!(
                "expected {} pixels, read {}",
                rows * cols,
                pixels.len()
            )));
        }

        if let Some(blank) = scaled_blank(&mut self.fits, &hdu, layout.bitpix) {
            for v in pixels.iter_mut().filter(|v| **v == blank) {
                *v = f64::NAN;
            }
        }

        let data = Array2::from_shape_vec((rows, cols), pixels)
            .map_err(|e| CalibrationError::InvalidFits(e.to_string()))?;
        debug!(rows, cols, bitpix = layout.bitpix, "Decoded FITS image");
        Ok(Frame::with_header(data, self.primary.without_structural()))
    }
}

/// BLANK as it appears after scaling. Only integer images carry one.
fn scaled_blank(fits: &mut FitsFile, hdu: &FitsHdu, bitpix: i64) -> Option<f64> {
    if bitpix < 0 {
        return None;
    }
    let blank = hdu.read_key::<i64>(fits, "BLANK").ok()?;
    let bscale = hdu.read_key::<f64>(fits, "BSCALE").unwrap_or(1.0);
    let bzero = hdu.read_key::<f64>(fits, "BZERO").unwrap_or(0.0);
    Some(blank as f64 * bscale + bzero)
}

/// Load a FITS image from disk.
///
/// Missing or unreadable paths are reported as `InputNotFound`; directories
/// are rejected.
pub fn load_frame(path: &Path) -> Result<Frame> {
    let not_found = || CalibrationError::InputNotFound {
        path: path.to_path_buf(),
    };
    let meta = std::fs::metadata(path).map_err(|_| not_found())?;
    if meta.is_dir() {
        return Err(CalibrationError::InputIsDirectory {
            path: path.to_path_buf(),
        });
    }
    File::open(path).map_err(|_| not_found())?;

    FitsReader::open(path)?.read_frame()
}
