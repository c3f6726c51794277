use tracing::info;

/// Calibration step, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationStep {
    Loading,
    BiasSubtraction,
    DarkSubtraction,
    FlatCorrection,
    Quantization,
    Writing,
}

impl std::fmt::Display for CalibrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading image"),
            Self::BiasSubtraction => write!(f, "Subtracting bias"),
            Self::DarkSubtraction => write!(f, "Subtracting dark"),
            Self::FlatCorrection => write!(f, "Flat fielding"),
            Self::Quantization => write!(f, "Quantizing"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Receives calibration progress. Handed to the `Calibrator` explicitly.
///
/// All methods have default no-op implementations.
pub trait CalibrationReporter: Send + Sync {
    /// A new step has started.
    fn begin_step(&self, _step: CalibrationStep) {}

    /// The current step is finished.
    fn finish_step(&self) {}

    /// Free-form detail about the current step.
    fn note(&self, _message: &str) {}
}

/// Reporter that discards everything.
pub struct NoOpReporter;
impl CalibrationReporter for NoOpReporter {}

/// Reporter that emits `tracing` events.
pub struct TracingReporter;

impl CalibrationReporter for TracingReporter {
    fn begin_step(&self, step: CalibrationStep) {
        info!(step = %step, "Calibration step started");
    }

    fn note(&self, message: &str) {
        info!("{message}");
    }
}
