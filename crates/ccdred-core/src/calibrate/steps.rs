use ndarray::Zip;
use tracing::debug;

use crate::consts::{HISTORY_BIAS, HISTORY_DARK, HISTORY_FLAT};
use crate::error::{CalibrationError, Result};
use crate::frame::Frame;

use super::config::FlatConfig;

pub(crate) const IMAGE_LABEL: &str = "image";
pub(crate) const BIAS_LABEL: &str = "master bias";
pub(crate) const DARK_LABEL: &str = "master dark";
pub(crate) const FLAT_LABEL: &str = "master flat";

/// Fail unless `master` has the same pixel grid as `frame`.
pub fn check_dimensions(frame: &Frame, master: &Frame, label: &str) -> Result<()> {
    if frame.dim() != master.dim() {
        return Err(CalibrationError::DimensionMismatch {
            frame: label.to_string(),
            expected: frame.dim(),
            found: master.dim(),
        });
    }
    Ok(())
}

/// Subtract the master bias pixel-wise.
pub fn subtract_bias(frame: &mut Frame, bias: &Frame) -> Result<()> {
    check_dimensions(frame, bias, BIAS_LABEL)?;
    frame.data -= &bias.data;
    frame.header.add_history(HISTORY_BIAS);
    Ok(())
}

/// Ratio of the image exposure to the dark exposure.
pub fn dark_scale(frame: &Frame, dark: &Frame) -> Result<f64> {
    let image_exp = frame
        .exposure_time()
        .ok_or_else(|| CalibrationError::MissingExposure {
            frame: IMAGE_LABEL.to_string(),
        })?;
    let dark_exp = dark
        .exposure_time()
        .ok_or_else(|| CalibrationError::MissingExposure {
            frame: DARK_LABEL.to_string(),
        })?;

    if !image_exp.is_finite() || image_exp < 0.0 {
        return Err(CalibrationError::InvalidExposure {
            frame: IMAGE_LABEL.to_string(),
            value: image_exp,
        });
    }
    if !dark_exp.is_finite() || dark_exp <= 0.0 {
        return Err(CalibrationError::InvalidExposure {
            frame: DARK_LABEL.to_string(),
            value: dark_exp,
        });
    }
    Ok(image_exp / dark_exp)
}

/// Subtract the master dark scaled by the exposure ratio. Returns the scale.
pub fn subtract_dark(frame: &mut Frame, dark: &Frame) -> Result<f64> {
    check_dimensions(frame, dark, DARK_LABEL)?;
    let scale = dark_scale(frame, dark)?;
    debug!(scale, "Dark scale factor");

    Zip::from(&mut frame.data)
        .and(&dark.data)
        .for_each(|p, &d| *p -= d * scale);
    frame.header.add_history(HISTORY_DARK);
    Ok(scale)
}

/// Divide by the master flat after raising every flat pixel to at least
/// `options.floor`.
pub fn flat_correct(frame: &mut Frame, flat: &Frame, options: &FlatConfig) -> Result<()> {
    check_dimensions(frame, flat, FLAT_LABEL)?;

    let floor = options.floor;
    // f64::max maps NaN flat pixels to the floor as well.
    let mut divisor = flat.data.mapv(|v| v.max(floor));
    if options.normalize {
        if let Some(mean) = divisor.mean().filter(|m| *m > 0.0) {
            debug!(mean, "Normalizing flat by its mean");
            divisor /= mean;
        }
    }

    frame.data /= &divisor;
    frame.header.add_history(HISTORY_FLAT);
    Ok(())
}
