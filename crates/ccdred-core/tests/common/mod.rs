#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ndarray::Array2;

use ccdred_core::error::Result;
use ccdred_core::frame::Frame;
use ccdred_core::io::header::Header;
use ccdred_core::io::{load_frame, write_frame, FitsReader};

const BLOCK: usize = 2880;

/// Pad a header record to 80 bytes.
pub fn card(text: &str) -> Vec<u8> {
    assert!(text.len() <= 80, "card too long: {text}");
    let mut rec = text.as_bytes().to_vec();
    rec.resize(80, b' ');
    rec
}

/// `KEY     =                value` with the value right-justified to column 30.
pub fn value_card(key: &str, value: &str) -> Vec<u8> {
    card(&format!("{key:<8}= {value:>20}"))
}

/// Build a single-HDU FITS file around big-endian sample bytes.
///
/// `extra` cards are placed after the NAXISn keywords.
pub fn build_fits(bitpix: i64, width: usize, height: usize, data: &[u8], extra: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend(value_card("SIMPLE", "T"));
    buf.extend(value_card("BITPIX", &bitpix.to_string()));
    buf.extend(value_card("NAXIS", "2"));
    buf.extend(value_card("NAXIS1", &width.to_string()));
    buf.extend(value_card("NAXIS2", &height.to_string()));
    for c in extra {
        buf.extend_from_slice(c);
    }
    buf.extend(card("END"));
    pad(&mut buf, b' ');

    buf.extend_from_slice(data);
    pad(&mut buf, 0);
    buf
}

/// Build a BITPIX=16 file from signed samples.
pub fn build_fits_i16(width: usize, height: usize, samples: &[i16], extra: &[Vec<u8>]) -> Vec<u8> {
    assert_eq!(samples.len(), width * height);
    let data: Vec<u8> = samples.iter().flat_map(|v| v.to_be_bytes()).collect();
    build_fits(16, width, height, &data, extra)
}

/// Build a BITPIX=-32 file from float samples.
pub fn build_fits_f32(width: usize, height: usize, samples: &[f32], extra: &[Vec<u8>]) -> Vec<u8> {
    assert_eq!(samples.len(), width * height);
    let data: Vec<u8> = samples.iter().flat_map(|v| v.to_be_bytes()).collect();
    build_fits(-32, width, height, &data, extra)
}

fn pad(buf: &mut Vec<u8>, fill: u8) {
    let rem = buf.len() % BLOCK;
    if rem != 0 {
        buf.resize(buf.len() + BLOCK - rem, fill);
    }
}

pub fn write_bytes(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write FITS fixture");
    path
}

/// Write `bytes` to a scratch file and load it as a frame.
pub fn load_bytes(bytes: &[u8]) -> Result<Frame> {
    let dir = tempfile::tempdir().expect("create scratch dir");
    let path = write_bytes(dir.path(), "fixture.fits", bytes);
    load_frame(&path)
}

/// Primary header of a FITS stream, layout keywords included.
pub fn primary_header(bytes: &[u8]) -> Result<Header> {
    let dir = tempfile::tempdir().expect("create scratch dir");
    let path = write_bytes(dir.path(), "fixture.fits", bytes);
    Ok(FitsReader::open(&path)?.primary_header().clone())
}

/// Uniform frame with an optional EXPTIME.
pub fn uniform_frame(height: usize, width: usize, value: f64, exptime: Option<f64>) -> Frame {
    let mut frame = Frame::new(Array2::from_elem((height, width), value));
    if let Some(exp) = exptime {
        frame.header.set("EXPTIME", exp);
    }
    frame
}

/// Write `frame` as a BITPIX=-64 FITS file under `dir`.
pub fn write_frame_file(dir: &Path, name: &str, frame: &Frame) -> PathBuf {
    let path = dir.join(name);
    write_frame(&path, frame).expect("write frame fixture");
    path
}
