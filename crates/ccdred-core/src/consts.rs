/// Maximum text length of a single HISTORY/COMMENT card.
pub const FITS_COMMENTARY_LEN: usize = 72;

/// Header keyword holding the exposure time.
pub const EXPTIME_KEY: &str = "EXPTIME";

/// Physical unit of pixel intensities throughout a reduction.
pub const PIXEL_UNIT: &str = "adu";

/// Flat pixels below this value are raised to it before division.
pub const DEFAULT_FLAT_FLOOR: f64 = 0.01;

/// Subdirectory (next to the input) that receives calibrated files.
pub const DEFAULT_OUTPUT_DIR: &str = "pipeline_out";

/// Suffix appended to the input's base name for the output file.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_out";

/// Extension of written files.
pub const OUTPUT_EXTENSION: &str = "fits";

/// Master dark used when none is given on the command line.
pub const DEFAULT_MASTER_DARK: &str = "master_dark.fits";

/// Master bias used when none is given on the command line.
pub const DEFAULT_MASTER_BIAS: &str = "master_bias.fits";

pub const HISTORY_BIAS: &str = "Bias corrected";
pub const HISTORY_DARK: &str = "Dark corrected";
pub const HISTORY_FLAT: &str = "Flat corrected";
