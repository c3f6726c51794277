use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::frame::{Frame, QuantizedFrame};
use crate::io::fits::load_frame;
use crate::io::fits_writer::write_quantized;

use super::config::CalibrationConfig;
use super::masters::MasterFrames;
use super::output::{output_path, prepare_output_dir};
use super::quantize::quantize;
use super::steps::{flat_correct, subtract_bias, subtract_dark};
use super::types::{CalibrationReporter, CalibrationStep, NoOpReporter};

/// Applies bias, dark and flat corrections to raw images.
pub struct Calibrator {
    masters: MasterFrames,
    config: CalibrationConfig,
    reporter: Arc<dyn CalibrationReporter>,
}

impl Calibrator {
    pub fn new(
        masters: MasterFrames,
        config: CalibrationConfig,
        reporter: Arc<dyn CalibrationReporter>,
    ) -> Self {
        Self {
            masters,
            config,
            reporter,
        }
    }

    /// Calibrator that reports nothing.
    pub fn silent(masters: MasterFrames, config: CalibrationConfig) -> Self {
        Self::new(masters, config, Arc::new(NoOpReporter))
    }

    pub fn masters(&self) -> &MasterFrames {
        &self.masters
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Run the correction steps for every master present, then quantize.
    pub fn calibrate(&self, mut frame: Frame) -> Result<QuantizedFrame> {
        self.masters.check_dimensions(&frame)?;

        if let Some(ref bias) = self.masters.bias {
            self.reporter.begin_step(CalibrationStep::BiasSubtraction);
            subtract_bias(&mut frame, bias)?;
            self.reporter.finish_step();
        }

        if let Some(ref dark) = self.masters.dark {
            self.reporter.begin_step(CalibrationStep::DarkSubtraction);
            let scale = subtract_dark(&mut frame, dark)?;
            self.reporter
                .note(&format!("Dark scaled by exposure ratio {scale:.4}"));
            self.reporter.finish_step();
        }

        if let Some(ref flat) = self.masters.flat {
            self.reporter.begin_step(CalibrationStep::FlatCorrection);
            flat_correct(&mut frame, flat, &self.config.flat)?;
            self.reporter.finish_step();
        }

        self.reporter.begin_step(CalibrationStep::Quantization);
        let quantized = quantize(frame, self.config.quantize.overflow);
        self.reporter.finish_step();

        Ok(quantized)
    }

    /// Calibrate the image at `input` and write it next to it. Returns the
    /// path of the written file.
    pub fn reduce(&self, input: &Path) -> Result<PathBuf> {
        self.reporter.begin_step(CalibrationStep::Loading);
        let frame = load_frame(input)?;
        info!(
            input = %input.display(),
            width = frame.width(),
            height = frame.height(),
            "Loaded image"
        );
        self.reporter.finish_step();

        let output = output_path(input, &self.config.output)?;
        let calibrated = self.calibrate(frame)?;

        self.reporter.begin_step(CalibrationStep::Writing);
        prepare_output_dir(&output)?;
        write_quantized(&output, &calibrated)?;
        self.reporter.finish_step();

        info!(
            output = %output.display(),
            history = ?calibrated.history(),
            "Calibrated image saved"
        );
        Ok(output)
    }
}

/// Load the configured masters and reduce a single image.
pub fn reduce_file(
    input: &Path,
    config: &CalibrationConfig,
    reporter: Arc<dyn CalibrationReporter>,
) -> Result<PathBuf> {
    let masters = MasterFrames::load(&config.masters)?;
    Calibrator::new(masters, config.clone(), reporter).reduce(input)
}
