//! Header record access that the safe `fitsio` API does not expose: walking
//! every card of an HDU in order and appending logical, undefined and
//! commentary cards.

use std::ffi::CString;
use std::os::raw::{c_char, c_int};

use fitsio::hdu::FitsHdu;
use fitsio::FitsFile;
use tracing::warn;

use crate::error::{CalibrationError, Result};
use crate::io::header::{printable_ascii, Card, Header, Value};

/// `fitsio::sys` plus cfitsio value parsers that are exported by the linked
/// library (declared in `fitsio2.h`) but not bound by `fitsio-sys`.
mod sys {
    pub use fitsio::sys::*;
    use std::os::raw::{c_char, c_int};

    extern "C" {
        pub fn ffc2s(instr: *const c_char, outstr: *mut c_char, status: *mut c_int) -> c_int;
        pub fn ffc2l(cval: *const c_char, lval: *mut c_int, status: *mut c_int) -> c_int;
        pub fn ffc2d(cval: *const c_char, dval: *mut f64, status: *mut c_int) -> c_int;
    }
}

const FLEN_CARD: usize = 81;
const FLEN_KEYWORD: usize = 75;
const FLEN_VALUE: usize = 71;
const FLEN_COMMENT: usize = 73;
const FLEN_ERRMSG: usize = 81;

const CARD_WIDTH: usize = 80;

/// Read every card of the current HDU, in file order.
///
/// Bytes outside printable ASCII are replaced with `?` so headers written by
/// careless software still load.
pub(crate) fn read_header(fits: &mut FitsFile) -> Result<Header> {
    let mut nexist: c_int = 0;
    let mut nmore: c_int = 0;
    let mut status: c_int = 0;
    unsafe { sys::ffghsp(fits.as_raw(), &mut nexist, &mut nmore, &mut status) };
    check(status)?;

    let mut header = Header::new();
    for n in 1..=nexist {
        let mut buf = [0 as c_char; FLEN_CARD];
        unsafe { sys::ffgrec(fits.as_raw(), n, buf.as_mut_ptr(), &mut status) };
        check(status)?;

        let (record, replaced) = sanitize_record(&buf);
        if replaced {
            warn!(card = n, record = %record.trim_end(), "Replaced non-ASCII bytes in header card");
        }
        if let Some(card) = parse_card(&record)? {
            header.push(card);
        }
    }
    Ok(header)
}

/// Append `header` to the current HDU.
///
/// Cards read from a file go back verbatim. Values set in memory are
/// formatted by cfitsio, with text reduced to printable ASCII.
pub(crate) fn write_header(fits: &mut FitsFile, hdu: &FitsHdu, header: &Header) -> Result<()> {
    for card in header.cards() {
        match card {
            Card::Keyed {
                record: Some(record),
                ..
            } => write_record(fits, record)?,
            Card::Keyed { keyword, value, .. } => write_value(fits, hdu, keyword, value)?,
            Card::Commentary { keyword, text } => {
                let text = c_string(&printable_ascii(text))?;
                let mut status: c_int = 0;
                match keyword.as_str() {
                    "HISTORY" => unsafe {
                        sys::ffphis(fits.as_raw(), text.as_ptr() as *mut c_char, &mut status)
                    },
                    "COMMENT" => unsafe {
                        sys::ffpcom(fits.as_raw(), text.as_ptr() as *mut c_char, &mut status)
                    },
                    _ => {
                        let record = format!("{keyword:<8}{}", text.to_string_lossy());
                        return write_record(fits, &record);
                    }
                };
                check(status)?;
            }
        }
    }
    Ok(())
}

/// Flush buffered writes so errors surface before the file is closed.
pub(crate) fn flush(fits: &mut FitsFile) -> Result<()> {
    let mut status: c_int = 0;
    unsafe { sys::ffflus(fits.as_raw(), &mut status) };
    check(status)
}

fn write_value(fits: &mut FitsFile, hdu: &FitsHdu, keyword: &str, value: &Value) -> Result<()> {
    match value {
        Value::Integer(i) => hdu.write_key(fits, keyword, *i)?,
        Value::Float(f) => hdu.write_key(fits, keyword, *f)?,
        Value::Text(s) => hdu.write_key(fits, keyword, printable_ascii(s).into_owned())?,
        Value::Logical(b) => {
            let name = c_string(keyword)?;
            let comment = c_string("")?;
            let mut status: c_int = 0;
            unsafe {
                sys::ffpkyl(
                    fits.as_raw(),
                    name.as_ptr() as *mut c_char,
                    c_int::from(*b),
                    comment.as_ptr() as *mut c_char,
                    &mut status,
                )
            };
            check(status)?;
        }
        Value::Undefined => {
            let name = c_string(keyword)?;
            let comment = c_string("")?;
            let mut status: c_int = 0;
            unsafe {
                sys::ffpkyu(
                    fits.as_raw(),
                    name.as_ptr() as *mut c_char,
                    comment.as_ptr() as *mut c_char,
                    &mut status,
                )
            };
            check(status)?;
        }
    }
    Ok(())
}

fn write_record(fits: &mut FitsFile, record: &str) -> Result<()> {
    let record = c_string(&printable_ascii(record))?;
    let mut status: c_int = 0;
    unsafe { sys::ffprec(fits.as_raw(), record.as_ptr() as *mut c_char, &mut status) };
    check(status)
}

/// Split one record into a card. Returns `None` for `END`.
fn parse_card(record: &str) -> Result<Option<Card>> {
    let keyword = keyword_name(record)?;
    if keyword == "END" {
        return Ok(None);
    }

    let has_value = record.get(8..10) == Some("= ") || keyword.starts_with("HIERARCH");
    if !has_value || matches!(keyword.as_str(), "" | "HISTORY" | "COMMENT") {
        let text = record.get(8..).unwrap_or("").trim_end().to_string();
        return Ok(Some(Card::Commentary { keyword, text }));
    }

    let (raw_value, comment) = split_value(record)?;
    let value = parse_value(&raw_value)?;
    let comment = comment.trim();
    Ok(Some(Card::Keyed {
        keyword,
        value,
        comment: (!comment.is_empty()).then(|| comment.to_string()),
        record: Some(record.to_string()),
    }))
}

fn keyword_name(record: &str) -> Result<String> {
    let card = c_string(record)?;
    let mut name = [0 as c_char; FLEN_KEYWORD];
    let mut length: c_int = 0;
    let mut status: c_int = 0;
    unsafe {
        sys::ffgknm(
            card.as_ptr() as *mut c_char,
            name.as_mut_ptr(),
            &mut length,
            &mut status,
        )
    };
    check(status)?;
    Ok(buf_to_string(&name).trim().to_ascii_uppercase())
}

/// Raw value field and comment of a keyed record.
fn split_value(record: &str) -> Result<(String, String)> {
    let card = c_string(record)?;
    let mut value = [0 as c_char; FLEN_VALUE];
    let mut comment = [0 as c_char; FLEN_COMMENT];
    let mut status: c_int = 0;
    unsafe {
        sys::ffpsvc(
            card.as_ptr() as *mut c_char,
            value.as_mut_ptr(),
            comment.as_mut_ptr(),
            &mut status,
        )
    };
    check(status)?;
    Ok((buf_to_string(&value), buf_to_string(&comment)))
}

fn parse_value(raw: &str) -> Result<Value> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Value::Undefined);
    }
    let owned = c_string(raw)?;
    let cval = owned.as_ptr() as *mut c_char;

    let mut dtype: c_char = 0;
    let mut status: c_int = 0;
    unsafe { sys::ffdtyp(cval, &mut dtype, &mut status) };
    check(status)?;

    let value = match dtype as u8 {
        b'C' => {
            let mut text = [0 as c_char; FLEN_VALUE];
            unsafe { sys::ffc2s(cval, text.as_mut_ptr(), &mut status) };
            check(status)?;
            Value::Text(buf_to_string(&text).trim_end().to_string())
        }
        b'L' => {
            let mut logical: c_int = 0;
            unsafe { sys::ffc2l(cval, &mut logical, &mut status) };
            check(status)?;
            Value::Logical(logical != 0)
        }
        b'I' => match raw.trim_start_matches('+').parse::<i64>() {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Float(float_value(cval)?),
        },
        b'F' => Value::Float(float_value(cval)?),
        // Complex and other exotic values stay as their literal text.
        _ => Value::Text(raw.to_string()),
    };
    Ok(value)
}

fn float_value(cval: *mut c_char) -> Result<f64> {
    let mut value = 0.0f64;
    let mut status: c_int = 0;
    unsafe { sys::ffc2d(cval, &mut value, &mut status) };
    check(status)?;
    Ok(value)
}

/// Record text padded to a full card, and whether any byte was replaced.
fn sanitize_record(buf: &[c_char]) -> (String, bool) {
    let mut replaced = false;
    let record: String = buf
        .iter()
        .map(|&c| c as u8)
        .take_while(|&b| b != 0)
        .map(|b| {
            if (0x20..=0x7e).contains(&b) {
                b as char
            } else {
                replaced = true;
                '?'
            }
        })
        .collect();
    (format!("{record:<width$}", width = CARD_WIDTH), replaced)
}

fn buf_to_string(buf: &[c_char]) -> String {
    let bytes: Vec<u8> = buf.iter().map(|&c| c as u8).take_while(|&b| b != 0).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn c_string(text: &str) -> Result<CString> {
    CString::new(text)
        .map_err(|_| CalibrationError::InvalidFits(format!("NUL byte in header text {text:?}")))
}

fn check(status: c_int) -> Result<()> {
    if status == 0 {
        return Ok(());
    }
    let mut message = [0 as c_char; FLEN_ERRMSG];
    unsafe { sys::ffgerr(status, message.as_mut_ptr()) };
    Err(CalibrationError::InvalidFits(format!(
        "cfitsio status {status}: {}",
        buf_to_string(&message)
    )))
}
