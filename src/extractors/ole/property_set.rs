//! Reader for the OLE property-set stream carrying document authorship
//! fields (the `SummaryInformation` layout).
//!
//! The stream is a little-endian table of (property id, offset) pairs over
//! typed values. All access is bounds-checked; truncated or corrupt data
//! surfaces as a format mismatch, never a panic.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::types::errors::{ScanError, ScanResult};

// Property ids of the summary information set.
const PID_AUTHOR: u32 = 4;
const PID_TEMPLATE: u32 = 7;
const PID_LAST_AUTHOR: u32 = 8;
const PID_EDIT_TIME: u32 = 10;
const PID_LAST_PRINTED: u32 = 11;
const PID_CREATE_DTM: u32 = 12;
const PID_LAST_SAVE_DTM: u32 = 13;
const PID_PAGE_COUNT: u32 = 14;

// Variant types actually used by that set.
const VT_I2: u32 = 2;
const VT_I4: u32 = 3;
const VT_LPSTR: u32 = 30;
const VT_FILETIME: u32 = 64;

/// 100-nanosecond units per second in a FILETIME value.
const FILETIME_TICKS_PER_SECOND: u64 = 10_000_000;

/// Raw fields of the summary information property set. String properties
/// stay as bytes: their code page is unknown at this layer and recovery is
/// the filename decoder's job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryInformation {
    pub author: Option<Vec<u8>>,
    pub last_saved_by: Option<Vec<u8>>,
    pub template: Option<Vec<u8>>,
    pub create_time: Option<NaiveDateTime>,
    pub last_saved_time: Option<NaiveDateTime>,
    pub last_printed: Option<NaiveDateTime>,
    pub total_edit_secs: Option<u64>,
    pub page_count: Option<i32>,
}

/// Parse a complete property-set stream.
pub fn parse(data: &[u8]) -> ScanResult<SummaryInformation> {
    let byte_order = read_u16(data, 0)
        .ok_or_else(|| ScanError::FormatMismatch("truncated property set header".into()))?;
    if byte_order != 0xFFFE {
        return Err(ScanError::FormatMismatch(format!(
            "unexpected property set byte order marker {byte_order:#06x}"
        )));
    }

    let set_count = read_u32(data, 24)
        .ok_or_else(|| ScanError::FormatMismatch("truncated property set header".into()))?;
    if set_count == 0 {
        return Err(ScanError::FormatMismatch("property set stream has no sections".into()));
    }

    // First format id spans bytes 28..44; its section offset follows.
    let section_start = read_u32(data, 44)
        .ok_or_else(|| ScanError::FormatMismatch("truncated section table".into()))?
        as usize;
    let property_count = read_u32(data, section_start + 4)
        .ok_or_else(|| ScanError::FormatMismatch("truncated section header".into()))?
        as usize;

    let mut info = SummaryInformation::default();
    for index in 0..property_count {
        let entry = section_start + 8 + index * 8;
        let (Some(pid), Some(offset)) = (read_u32(data, entry), read_u32(data, entry + 4)) else {
            return Err(ScanError::FormatMismatch("truncated property table".into()));
        };
        let value_at = section_start + offset as usize;
        match pid {
            PID_AUTHOR => info.author = read_lpstr(data, value_at),
            PID_LAST_AUTHOR => info.last_saved_by = read_lpstr(data, value_at),
            PID_TEMPLATE => info.template = read_lpstr(data, value_at),
            PID_EDIT_TIME => {
                info.total_edit_secs =
                    read_filetime_raw(data, value_at).map(|ticks| ticks / FILETIME_TICKS_PER_SECOND)
            }
            PID_CREATE_DTM => {
                info.create_time = read_filetime_raw(data, value_at).and_then(filetime_to_datetime)
            }
            PID_LAST_SAVE_DTM => {
                info.last_saved_time =
                    read_filetime_raw(data, value_at).and_then(filetime_to_datetime)
            }
            PID_LAST_PRINTED => {
                info.last_printed = read_filetime_raw(data, value_at).and_then(filetime_to_datetime)
            }
            PID_PAGE_COUNT => info.page_count = read_integer(data, value_at),
            _ => {}
        }
    }
    Ok(info)
}

/// Convert a FILETIME instant (100 ns ticks since 1601-01-01) to a naive
/// timestamp. Zero is the conventional "not set" value.
pub fn filetime_to_datetime(filetime: u64) -> Option<NaiveDateTime> {
    if filetime == 0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1601, 1, 1)?.and_hms_opt(0, 0, 0)?;
    epoch.checked_add_signed(Duration::microseconds((filetime / 10) as i64))
}

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_le_bytes(bytes.try_into().ok()?))
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

fn read_u64(data: &[u8], offset: usize) -> Option<u64> {
    let bytes = data.get(offset..offset + 8)?;
    Some(u64::from_le_bytes(bytes.try_into().ok()?))
}

/// Code-page string value: length-prefixed bytes, usually NUL-terminated.
/// Returned raw; decoding is deferred to the caller.
fn read_lpstr(data: &[u8], at: usize) -> Option<Vec<u8>> {
    if read_u32(data, at)? != VT_LPSTR {
        return None;
    }
    let length = read_u32(data, at + 4)? as usize;
    let bytes = data.get(at + 8..at + 8 + length)?;
    let trimmed: &[u8] = match bytes.iter().position(|&b| b == 0) {
        Some(nul) => &bytes[..nul],
        None => bytes,
    };
    Some(trimmed.to_vec())
}

fn read_filetime_raw(data: &[u8], at: usize) -> Option<u64> {
    if read_u32(data, at)? != VT_FILETIME {
        return None;
    }
    read_u64(data, at + 4)
}

fn read_integer(data: &[u8], at: usize) -> Option<i32> {
    match read_u32(data, at)? {
        VT_I4 => {
            let bytes = data.get(at + 4..at + 8)?;
            Some(i32::from_le_bytes(bytes.try_into().ok()?))
        }
        VT_I2 => {
            let bytes = data.get(at + 4..at + 6)?;
            Some(i32::from(i16::from_le_bytes(bytes.try_into().ok()?)))
        }
        _ => None,
    }
}
