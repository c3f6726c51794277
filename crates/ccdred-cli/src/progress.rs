use ccdred_core::calibrate::{CalibrationReporter, CalibrationStep};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// Drives an indicatif bar from calibration steps.
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new(total_steps: u64, hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(total_steps)
        };
        if let Ok(style) = ProgressStyle::default_bar().template("{msg:20} [{bar:40}] {pos}/{len}") {
            bar.set_style(style.progress_chars("=> "));
        }
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Done");
    }
}

impl CalibrationReporter for BarReporter {
    fn begin_step(&self, step: CalibrationStep) {
        self.bar.set_message(step.to_string());
    }

    fn finish_step(&self) {
        self.bar.inc(1);
    }

    fn note(&self, message: &str) {
        debug!("{message}");
    }
}
