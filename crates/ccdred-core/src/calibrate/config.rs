use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_FLAT_FLOOR, DEFAULT_MASTER_BIAS, DEFAULT_MASTER_DARK, DEFAULT_OUTPUT_DIR,
    DEFAULT_OUTPUT_SUFFIX,
};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CalibrationConfig {
    #[serde(default)]
    pub masters: MasterPaths,
    #[serde(default)]
    pub flat: FlatConfig,
    #[serde(default)]
    pub quantize: QuantizeConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Master frame locations. A step runs only when its master is set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MasterPaths {
    pub bias: Option<PathBuf>,
    pub dark: Option<PathBuf>,
    pub flat: Option<PathBuf>,
}

impl MasterPaths {
    /// Bias and dark at their conventional file names, no flat.
    pub fn conventional() -> Self {
        Self {
            bias: Some(PathBuf::from(DEFAULT_MASTER_BIAS)),
            dark: Some(PathBuf::from(DEFAULT_MASTER_DARK)),
            flat: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bias.is_none() && self.dark.is_none() && self.flat.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlatConfig {
    /// Flat pixels below this value are raised to it before dividing.
    pub floor: f64,
    /// Divide the floored flat by its mean before correcting.
    pub normalize: bool,
}

impl Default for FlatConfig {
    fn default() -> Self {
        Self {
            floor: DEFAULT_FLAT_FLOOR,
            normalize: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantizeConfig {
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

/// How rounded values outside [0, 65535] become u16.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Saturate at 0 and 65535.
    #[default]
    Clamp,
    /// Keep the low 16 bits of the rounded integer.
    Wrap,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clamp => write!(f, "Clamp"),
            Self::Wrap => write!(f, "Wrap"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Subdirectory of the input's parent that receives results.
    pub dir_name: String,
    /// Appended to the input's base name.
    pub suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir_name: DEFAULT_OUTPUT_DIR.to_string(),
            suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
        }
    }
}
