use std::path::{Path, PathBuf};

use crate::consts::OUTPUT_EXTENSION;
use crate::error::{CalibrationError, Result};

use super::config::OutputConfig;

/// `<parent>/<dir_name>/<stem><suffix>.fits` for an input at `<parent>/<stem>.<ext>`.
pub fn output_path(input: &Path, config: &OutputConfig) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .ok_or_else(|| CalibrationError::InputNotFound {
            path: input.to_path_buf(),
        })?;
    let parent = input.parent().unwrap_or_else(|| Path::new(""));

    let mut name = stem.to_os_string();
    name.push(&config.suffix);
    name.push(".");
    name.push(OUTPUT_EXTENSION);

    Ok(parent.join(&config.dir_name).join(name))
}

/// Create the directory that will hold `output`, if missing.
pub fn prepare_output_dir(output: &Path) -> Result<()> {
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| CalibrationError::OutputWrite {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
