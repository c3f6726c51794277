use std::path::Path;

use ccdred_core::calibrate::config::CalibrationConfig;
use console::Style;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_reduce_summary(input: &Path, config: &CalibrationConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("CCD Calibration"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(15)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(input.display())
    );
    println!();

    // Masters
    println!("  {}", s.header.apply_to("Masters"));
    for (label, path) in [
        ("Bias", &config.masters.bias),
        ("Dark", &config.masters.dark),
        ("Flat", &config.masters.flat),
    ] {
        match path {
            Some(p) => println!(
                "    {:<12}{}",
                s.label.apply_to(label),
                s.path.apply_to(p.display())
            ),
            None => println!(
                "    {:<12}{}",
                s.label.apply_to(label),
                s.disabled.apply_to("skipped")
            ),
        }
    }
    println!();

    // Flat / quantization
    if config.masters.flat.is_some() {
        println!("  {}", s.header.apply_to("Flat"));
        println!(
            "    {:<12}{}",
            s.label.apply_to("Floor"),
            s.value.apply_to(config.flat.floor)
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Normalize"),
            s.value.apply_to(if config.flat.normalize { "mean" } else { "off" })
        );
        println!();
    }

    println!("  {}", s.header.apply_to("Output"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Pixels"),
        s.value.apply_to("uint16")
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Overflow"),
        s.value.apply_to(config.quantize.overflow)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Directory"),
        s.path.apply_to(&config.output.dir_name)
    );
    println!();
}
