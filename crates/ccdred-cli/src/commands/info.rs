use std::path::PathBuf;

use anyhow::{Context, Result};
use ccdred_core::consts::EXPTIME_KEY;
use ccdred_core::io::FitsReader;
use clap::Args;

#[derive(Args)]
pub struct InfoArgs {
    /// Input FITS file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let reader = FitsReader::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let image = reader.image()?;
    let (rows, cols) = image.shape()?;
    let header = reader.primary_header();

    println!("File:        {}", args.file.display());
    println!("HDUs:        {}", reader.hdu_count());
    if image.hdu_index > 0 {
        println!("Image HDU:   {}", image.hdu_index);
    }
    println!("Dimensions:  {}x{}", cols, rows);
    println!("BITPIX:      {}", image.bitpix);

    match header.get_f64(EXPTIME_KEY) {
        Some(exp) => println!("Exposure:    {} s", exp),
        None => println!("Exposure:    unknown"),
    }
    for (label, key) in [
        ("Object:", "OBJECT"),
        ("Telescope:", "TELESCOP"),
        ("Instrument:", "INSTRUME"),
        ("Type:", "IMAGETYP"),
    ] {
        if let Some(v) = header.get_str(key) {
            println!("{:<13}{}", label, v);
        }
    }

    let history = header.history();
    if !history.is_empty() {
        println!("History:");
        for entry in history {
            println!("  {}", entry);
        }
    }

    Ok(())
}
