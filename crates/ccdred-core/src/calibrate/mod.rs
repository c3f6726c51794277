pub mod config;
mod calibrator;
mod masters;
mod output;
pub mod quantize;
pub mod steps;
mod types;

pub use calibrator::{reduce_file, Calibrator};
pub use masters::MasterFrames;
pub use output::{output_path, prepare_output_dir};
pub use quantize::{quantize, round_half_even};
pub use steps::{flat_correct, subtract_bias, subtract_dark};
pub use types::{CalibrationReporter, CalibrationStep, NoOpReporter, TracingReporter};
