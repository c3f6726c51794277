mod common;

use ndarray::{array, Array2};

use ccdred_core::error::CalibrationError;
use ccdred_core::frame::QuantizedFrame;
use ccdred_core::io::fits::{load_frame, FitsReader};
use ccdred_core::io::header::Header;
use ccdred_core::io::write_quantized;

use common::{
    build_fits, build_fits_f32, build_fits_i16, card, load_bytes, uniform_frame, value_card,
    write_bytes, write_frame_file,
};

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

#[test]
fn test_read_unsigned_16bit_via_bzero() {
    // Stored = physical - 32768
    let samples: [i16; 4] = [-32768, -32668, 0, 32767];
    let bytes = build_fits_i16(2, 2, &samples, &[value_card("BZERO", "32768")]);

    let frame = load_bytes(&bytes).unwrap();
    assert_eq!(frame.dim(), (2, 2));
    assert_eq!(frame.data, array![[0.0, 100.0], [32768.0, 65535.0]]);
}

#[test]
fn test_read_row_major_layout() {
    // NAXIS1 = 3 columns, NAXIS2 = 2 rows
    let samples: [i16; 6] = [1, 2, 3, 4, 5, 6];
    let bytes = build_fits_i16(3, 2, &samples, &[]);

    let frame = load_bytes(&bytes).unwrap();
    assert_eq!(frame.width(), 3);
    assert_eq!(frame.height(), 2);
    assert_eq!(frame.data[[0, 2]], 3.0);
    assert_eq!(frame.data[[1, 0]], 4.0);
}

#[test]
fn test_read_bscale() {
    let samples: [i16; 2] = [10, -4];
    let bytes = build_fits_i16(
        2,
        1,
        &samples,
        &[value_card("BSCALE", "0.5"), value_card("BZERO", "100.0")],
    );
    let frame = load_bytes(&bytes).unwrap();
    assert_eq!(frame.data, array![[105.0, 98.0]]);
}

#[test]
fn test_read_blank_becomes_nan() {
    let samples: [i16; 2] = [-1, 7];
    let bytes = build_fits_i16(2, 1, &samples, &[value_card("BLANK", "-1")]);
    let frame = load_bytes(&bytes).unwrap();
    assert!(frame.data[[0, 0]].is_nan());
    assert_eq!(frame.data[[0, 1]], 7.0);
}

#[test]
fn test_read_float_preserves_metadata() {
    let bytes = build_fits_f32(
        2,
        2,
        &[1.5, 2.5, 3.5, 4.5],
        &[
            value_card("EXPTIME", "30.0"),
            card("OBJECT  = 'NGC 7000'"),
            card("HISTORY Acquired with test camera"),
        ],
    );
    let frame = load_bytes(&bytes).unwrap();

    assert_eq!(frame.data, array![[1.5, 2.5], [3.5, 4.5]]);
    assert_eq!(frame.exposure_time(), Some(30.0));
    assert_eq!(frame.header.get_str("OBJECT"), Some("NGC 7000"));
    assert_eq!(frame.history(), vec!["Acquired with test camera"]);
    assert!(!frame.header.contains("BITPIX"));
    assert!(!frame.header.contains("NAXIS1"));
}

#[test]
fn test_read_degenerate_third_axis() {
    let data: Vec<u8> = [1i16, 2, 3, 4].iter().flat_map(|v| v.to_be_bytes()).collect();
    let mut bytes = Vec::new();
    for c in [
        value_card("SIMPLE", "T"),
        value_card("BITPIX", "16"),
        value_card("NAXIS", "3"),
        value_card("NAXIS1", "2"),
        value_card("NAXIS2", "2"),
        value_card("NAXIS3", "1"),
        card("END"),
    ] {
        bytes.extend(c);
    }
    bytes.resize(2880, b' ');
    bytes.extend(data);
    bytes.resize(5760, 0);

    let frame = load_bytes(&bytes).unwrap();
    assert_eq!(frame.data, array![[1.0, 2.0], [3.0, 4.0]]);
}

#[test]
fn test_read_rejects_cube() {
    let mut bytes = Vec::new();
    for c in [
        value_card("SIMPLE", "T"),
        value_card("BITPIX", "8"),
        value_card("NAXIS", "3"),
        value_card("NAXIS1", "2"),
        value_card("NAXIS2", "2"),
        value_card("NAXIS3", "3"),
        card("END"),
    ] {
        bytes.extend(c);
    }
    bytes.resize(2880, b' ');
    bytes.resize(5760, 0);

    let err = load_bytes(&bytes).unwrap_err();
    assert!(matches!(err, CalibrationError::InvalidFits(_)));
}

#[test]
fn test_read_image_extension_when_primary_empty() {
    let mut bytes = Vec::new();
    for c in [
        value_card("SIMPLE", "T"),
        value_card("BITPIX", "8"),
        value_card("NAXIS", "0"),
        value_card("EXTEND", "T"),
        value_card("EXPTIME", "15"),
        card("END"),
    ] {
        bytes.extend(c);
    }
    bytes.resize(2880, b' ');
    for c in [
        card("XTENSION= 'IMAGE   '"),
        value_card("BITPIX", "-32"),
        value_card("NAXIS", "2"),
        value_card("NAXIS1", "2"),
        value_card("NAXIS2", "1"),
        value_card("PCOUNT", "0"),
        value_card("GCOUNT", "1"),
        card("END"),
    ] {
        bytes.extend(c);
    }
    bytes.resize(5760, b' ');
    for v in [7.0f32, 9.0] {
        bytes.extend(v.to_be_bytes());
    }
    bytes.resize(8640, 0);

    let dir = tempfile::tempdir().unwrap();
    let path = write_bytes(dir.path(), "ext.fits", &bytes);
    let mut reader = FitsReader::open(&path).unwrap();
    assert_eq!(reader.hdu_count(), 2);
    assert_eq!(reader.image().unwrap().hdu_index, 1);
    assert_eq!(reader.image().unwrap().bitpix, -32);
    assert_eq!(reader.header(1).unwrap().get_str("XTENSION"), Some("IMAGE"));

    let frame = reader.read_frame().unwrap();
    assert_eq!(frame.data, array![[7.0, 9.0]]);
    // Metadata comes from the primary header.
    assert_eq!(frame.exposure_time(), Some(15.0));
}

#[test]
fn test_read_rejects_missing_simple() {
    let mut bytes = build_fits_i16(1, 1, &[0], &[]);
    bytes[..6].copy_from_slice(b"XIMPLE");
    assert!(matches!(
        load_bytes(&bytes),
        Err(CalibrationError::InvalidFits(_))
    ));
}

#[test]
fn test_read_rejects_truncated_data() {
    let mut bytes = build_fits_i16(40, 40, &vec![0i16; 1600], &[]);
    bytes.truncate(2880 + 100);
    assert!(matches!(
        load_bytes(&bytes),
        Err(CalibrationError::InvalidFits(_))
    ));
}

#[test]
fn test_read_rejects_unsupported_bitpix() {
    let bytes = build_fits(24, 1, 1, &[0, 0, 0], &[]);
    assert!(matches!(
        load_bytes(&bytes),
        Err(CalibrationError::InvalidFits(_))
    ));
}

#[test]
fn test_read_bitpix_32_and_8() {
    let data: Vec<u8> = [-7i32, 70000].iter().flat_map(|v| v.to_be_bytes()).collect();
    let frame = load_bytes(&build_fits(32, 2, 1, &data, &[])).unwrap();
    assert_eq!(frame.data, array![[-7.0, 70000.0]]);

    let frame = load_bytes(&build_fits(8, 2, 1, &[0, 255], &[])).unwrap();
    assert_eq!(frame.data, array![[0.0, 255.0]]);
}

#[test]
fn test_load_missing_file_is_input_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_frame(&dir.path().join("nope.fits")).unwrap_err();
    assert!(matches!(err, CalibrationError::InputNotFound { .. }));
}

#[test]
fn test_load_directory_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_frame(dir.path()).unwrap_err();
    assert!(matches!(err, CalibrationError::InputIsDirectory { .. }));
}

#[test]
fn test_reader_exposes_hdu_layout() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = build_fits_i16(3, 2, &[0; 6], &[value_card("EXPTIME", "2.0")]);
    let path = write_bytes(dir.path(), "raw.fits", &bytes);

    let reader = FitsReader::open(&path).unwrap();
    let image = reader.image().unwrap();
    assert_eq!(image.hdu_index, 0);
    assert_eq!(image.bitpix, 16);
    assert_eq!(image.shape().unwrap(), (2, 3));
    assert_eq!(reader.hdu_count(), 1);
    assert_eq!(reader.primary_header().get_f64("EXPTIME"), Some(2.0));
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

#[test]
fn test_write_quantized_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.fits");

    let mut header = Header::new();
    header.set("EXPTIME", 30.0);
    header.add_history("Bias corrected");
    let frame = QuantizedFrame {
        data: array![[0u16, 1], [32768, 65535]],
        header,
    };
    write_quantized(&path, &frame).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len() % 2880, 0);

    let mut reader = FitsReader::open(&path).unwrap();
    assert_eq!(reader.image().unwrap().bitpix, 16);
    let header = reader.primary_header();
    assert_eq!(header.get_f64("BZERO"), Some(32768.0));
    assert_eq!(header.get_str("BUNIT"), Some("adu"));
    assert_eq!(header.get_f64("EXPTIME"), Some(30.0));

    let back = reader.read_frame().unwrap();
    assert_eq!(back.data, array![[0.0, 1.0], [32768.0, 65535.0]]);
    assert_eq!(back.history(), vec!["Bias corrected"]);
}

#[test]
fn test_write_overwrites_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.fits");
    std::fs::write(&path, b"stale").unwrap();

    let frame = QuantizedFrame {
        data: Array2::from_elem((2, 2), 7u16),
        header: Header::new(),
    };
    write_quantized(&path, &frame).unwrap();

    let back = load_frame(&path).unwrap();
    assert!(back.data.iter().all(|&v| v == 7.0));
}

#[test]
fn test_write_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.fits");
    let frame = QuantizedFrame {
        data: Array2::zeros((1, 1)),
        header: Header::new(),
    };
    let err = write_quantized(&path, &frame).unwrap_err();
    assert!(matches!(err, CalibrationError::OutputWrite { .. }));
    assert!(!path.exists());
}

#[test]
fn test_float_frame_file_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let mut frame = uniform_frame(3, 4, 0.25, Some(12.0));
    frame.data[[2, 3]] = -1.75;
    frame.header.set("OBJECT", "flat field");
    let path = write_frame_file(dir.path(), "flat.fits", &frame);

    let back = load_frame(&path).unwrap();
    assert_eq!(back.data, frame.data);
    assert_eq!(back.exposure_time(), Some(12.0));
    assert_eq!(back.header.get_str("OBJECT"), Some("flat field"));
    assert_eq!(back.header.get_str("BUNIT"), Some("adu"));
}

#[test]
fn test_write_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let frame = QuantizedFrame {
        data: array![[1u16, 2], [3, 4]],
        header: Header::new(),
    };
    let a = dir.path().join("a.fits");
    let b = dir.path().join("b.fits");
    write_quantized(&a, &frame).unwrap();
    write_quantized(&b, &frame).unwrap();
    assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
}

#[test]
fn test_write_leaves_no_scratch_files() {
    let dir = tempfile::tempdir().unwrap();
    let frame = QuantizedFrame {
        data: Array2::zeros((2, 2)),
        header: Header::new(),
    };
    write_quantized(&dir.path().join("out.fits"), &frame).unwrap();

    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("out.fits")]);
}

#[cfg(unix)]
#[test]
fn test_new_output_gets_default_file_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    // Any freshly created file shows what the umask allows.
    let plain = dir.path().join("plain.txt");
    std::fs::write(&plain, b"x").unwrap();
    let expected = std::fs::metadata(&plain).unwrap().permissions().mode() & 0o777;

    let path = dir.path().join("out.fits");
    let frame = QuantizedFrame {
        data: Array2::zeros((1, 1)),
        header: Header::new(),
    };
    write_quantized(&path, &frame).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, expected);
}

#[cfg(unix)]
#[test]
fn test_overwrite_keeps_destination_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.fits");
    std::fs::write(&path, b"stale").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

    let frame = QuantizedFrame {
        data: Array2::zeros((1, 1)),
        header: Header::new(),
    };
    write_quantized(&path, &frame).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
}
