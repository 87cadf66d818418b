//! Byte-oriented run-length coding of 8-bit plane rows.
//!
//! Each run starts with a length byte:
//!
//! | Length byte | Meaning                                   |
//! |-------------|-------------------------------------------|
//! | `0x01-0x7F` | repeat the following byte `len` times     |
//! | `0x81-0xFF` | copy the following `len - 0x80` raw bytes |
//! | `0x00`      | invalid                                   |
//! | `0x80`      | invalid (a zero-length raw run)           |
//!
//! Runs never cross a row boundary.

use crate::error::{MscError, Result};
use msc_core::frame::{Plane, PlaneView};
use tracing::trace;

/// Longest run either kind of run can describe.
pub const MAX_RUN: usize = 0x7F;

/// Flag added to the length byte of a raw run.
pub const RAW_FLAG: u8 = 0x80;

/// Length of the run at the start of `row`.
///
/// With `same` set this counts identical leading bytes. Otherwise it counts
/// bytes worth sending raw: it stops before a pair of equal bytes, unless
/// the pair is isolated (`a b b c`), in which case it is cheaper to keep
/// the pair inside the raw run.
fn count_run(row: &[u8], same: bool) -> usize {
    let limit = row.len().min(MAX_RUN);
    let mut count = 1;
    while count < limit {
        if same != (row[count - 1] == row[count]) {
            if !same {
                if count + 1 < limit && row[count] != row[count + 1] {
                    count += 1;
                    continue;
                }
                count -= 1;
            }
            break;
        }
        count += 1;
    }
    count
}

/// Append the run-length coding of `row` to `out`.
///
/// Returns the number of bytes appended.
pub fn encode_row(row: &[u8], out: &mut Vec<u8>) -> usize {
    let start = out.len();
    let mut x = 0;
    while x < row.len() {
        let rest = &row[x..];
        let mut count = count_run(rest, true);
        if count > 1 {
            out.push(count as u8);
            out.push(rest[0]);
        } else {
            count = count_run(rest, false);
            out.push(RAW_FLAG + count as u8);
            out.extend_from_slice(&rest[..count]);
        }
        x += count;
    }
    out.len() - start
}

/// Decode runs from `src[pos..]` until `row` is full; returns the new `pos`.
fn decode_row_at(src: &[u8], mut pos: usize, row: &mut [u8]) -> Result<usize> {
    let mut x = 0;
    while x < row.len() {
        let run_offset = pos;
        let run = *src.get(pos).ok_or(MscError::TruncatedPacket {
            needed: pos + 1,
            available: src.len(),
        })?;
        pos += 1;

        let (len, raw) = match run {
            0x00 | RAW_FLAG => {
                return Err(MscError::InvalidRun {
                    run,
                    offset: run_offset,
                })
            }
            r if r > RAW_FLAG => ((r - RAW_FLAG) as usize, true),
            r => (r as usize, false),
        };
        if len > row.len() - x {
            return Err(MscError::InvalidRun {
                run,
                offset: run_offset,
            });
        }

        let needed = pos + if raw { len } else { 1 };
        if needed > src.len() {
            return Err(MscError::TruncatedPacket {
                needed,
                available: src.len(),
            });
        }
        if raw {
            row[x..x + len].copy_from_slice(&src[pos..needed]);
        } else {
            row[x..x + len].fill(src[pos]);
        }
        pos = needed;
        x += len;
    }
    Ok(pos)
}

/// Decode one row from the start of `src`.
///
/// Returns the number of bytes consumed.
pub fn decode_row(src: &[u8], row: &mut [u8]) -> Result<usize> {
    decode_row_at(src, 0, row)
}

/// Append every row of `plane` to `out`; returns the bytes appended.
pub fn encode_plane(plane: &PlaneView<'_>, out: &mut Vec<u8>) -> usize {
    let start = out.len();
    for y in 0..plane.height() as usize {
        encode_row(plane.row(y), out);
    }
    let written = out.len() - start;
    trace!(
        width = plane.width(),
        height = plane.height(),
        bytes = written,
        "RLE plane encoded"
    );
    written
}

/// Fill `plane` from `src[pos..]`; returns the position after the plane.
///
/// Error offsets are relative to the start of `src`.
pub fn decode_plane(src: &[u8], pos: usize, plane: &mut Plane) -> Result<usize> {
    let start = pos;
    let mut pos = pos;
    for y in 0..plane.height() as usize {
        pos = decode_row_at(src, pos, plane.row_mut(y))?;
    }
    trace!(
        width = plane.width(),
        height = plane.height(),
        bytes = pos - start,
        "RLE plane decoded"
    );
    Ok(pos)
}
