use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::frame::Frame;
use crate::io::fits::load_frame;

use super::config::MasterPaths;
use super::steps::{check_dimensions, BIAS_LABEL, DARK_LABEL, FLAT_LABEL};

/// Reference frames for one reduction. Read-only once loaded.
#[derive(Clone, Debug, Default)]
pub struct MasterFrames {
    pub bias: Option<Frame>,
    pub dark: Option<Frame>,
    pub flat: Option<Frame>,
}

impl MasterFrames {
    /// Load every master whose path is set, bias first, then dark, then flat.
    pub fn load(paths: &MasterPaths) -> Result<Self> {
        Ok(Self {
            bias: load_master(paths.bias.as_deref(), BIAS_LABEL)?,
            dark: load_master(paths.dark.as_deref(), DARK_LABEL)?,
            flat: load_master(paths.flat.as_deref(), FLAT_LABEL)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.bias.is_none() && self.dark.is_none() && self.flat.is_none()
    }

    /// Fail if any loaded master has a different pixel grid than `frame`.
    pub fn check_dimensions(&self, frame: &Frame) -> Result<()> {
        for (master, label) in [
            (&self.bias, BIAS_LABEL),
            (&self.dark, DARK_LABEL),
            (&self.flat, FLAT_LABEL),
        ] {
            if let Some(m) = master {
                check_dimensions(frame, m, label)?;
            }
        }
        Ok(())
    }
}

fn load_master(path: Option<&Path>, label: &str) -> Result<Option<Frame>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let frame = load_frame(path)?;
    info!(
        master = label,
        path = %path.display(),
        width = frame.width(),
        height = frame.height(),
        "Loaded master frame"
    );
    Ok(Some(frame))
}
