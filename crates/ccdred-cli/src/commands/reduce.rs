use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use ccdred_core::calibrate::config::{
    CalibrationConfig, FlatConfig, MasterPaths, OverflowPolicy, QuantizeConfig,
};
use ccdred_core::calibrate::reduce_file;
use ccdred_core::consts::{DEFAULT_FLAT_FLOOR, DEFAULT_MASTER_BIAS, DEFAULT_MASTER_DARK};

use crate::progress::BarReporter;
use crate::summary::print_reduce_summary;

#[derive(Clone, Copy, ValueEnum)]
pub enum OverflowArg {
    Clamp,
    Wrap,
}

impl From<OverflowArg> for OverflowPolicy {
    fn from(arg: OverflowArg) -> Self {
        match arg {
            OverflowArg::Clamp => OverflowPolicy::Clamp,
            OverflowArg::Wrap => OverflowPolicy::Wrap,
        }
    }
}

#[derive(Args)]
pub struct ReduceArgs {
    /// Raw FITS image to calibrate
    #[arg(required_unless_present = "dir", conflicts_with = "dir")]
    pub file: Option<PathBuf>,

    /// Raw FITS image to calibrate, given as an option
    #[arg(short = 'd', long = "dir", value_name = "FILE")]
    pub dir: Option<PathBuf>,

    /// Calibration config file (TOML); replaces the master and flat options
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Master dark frame
    #[arg(long, visible_aliases = ["md", "master_dark"], default_value = DEFAULT_MASTER_DARK)]
    pub master_dark: PathBuf,

    /// Skip dark subtraction
    #[arg(long)]
    pub no_dark: bool,

    /// Master bias frame
    #[arg(long, visible_aliases = ["mb", "master_bias"], default_value = DEFAULT_MASTER_BIAS)]
    pub master_bias: PathBuf,

    /// Skip bias subtraction
    #[arg(long)]
    pub no_bias: bool,

    /// Master flat frame (no flat correction when omitted)
    #[arg(long, visible_aliases = ["mf", "master_flat"])]
    pub master_flat: Option<PathBuf>,

    /// Flat pixels below this value are raised to it
    #[arg(long, default_value_t = DEFAULT_FLAT_FLOOR)]
    pub flat_floor: f64,

    /// Divide the flat by its mean before correcting
    #[arg(long)]
    pub normalize_flat: bool,

    /// Handling of values outside the 16-bit range
    #[arg(long, value_enum, default_value = "clamp")]
    pub overflow: OverflowArg,

    /// Do not print the summary
    #[arg(short, long)]
    pub quiet: bool,
}

impl ReduceArgs {
    /// Input image, given positionally or with `--dir`.
    pub fn input(&self) -> Result<&Path> {
        self.file
            .as_deref()
            .or(self.dir.as_deref())
            .context("No input file given")
    }
}

pub fn run(args: &ReduceArgs) -> Result<()> {
    let input = args.input()?;
    let config = if let Some(ref config_path) = args.config {
        load_config(config_path)?
    } else {
        build_config_from_args(args)
    };

    if !args.quiet {
        print_reduce_summary(input, &config);
    }

    let reporter = Arc::new(BarReporter::new(step_count(&config.masters), args.quiet));
    let output = reduce_file(input, &config, reporter.clone())
        .with_context(|| format!("Failed to calibrate {}", input.display()))?;
    reporter.finish();

    if !args.quiet {
        println!("\nOutput saved to {}", output.display());
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<CalibrationConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&contents).context("Invalid calibration config")
}

fn build_config_from_args(args: &ReduceArgs) -> CalibrationConfig {
    CalibrationConfig {
        masters: MasterPaths {
            bias: (!args.no_bias).then(|| args.master_bias.clone()),
            dark: (!args.no_dark).then(|| args.master_dark.clone()),
            flat: args.master_flat.clone(),
        },
        flat: FlatConfig {
            floor: args.flat_floor,
            normalize: args.normalize_flat,
        },
        quantize: QuantizeConfig {
            overflow: args.overflow.into(),
        },
        ..Default::default()
    }
}

/// Loading, one step per master, quantization and writing.
fn step_count(masters: &MasterPaths) -> u64 {
    let present = [&masters.bias, &masters.dark, &masters.flat]
        .iter()
        .filter(|m| m.is_some())
        .count();
    3 + present as u64
}
