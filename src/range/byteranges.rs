//! `multipart/byteranges` bodies.

use std::io::Write;

use crate::range::Range;

const BOUNDARY_LEN: usize = 24;

/// A random part boundary.
pub fn boundary() -> String {
    std::iter::repeat_with(fastrand::alphanumeric)
        .take(BOUNDARY_LEN)
        .collect()
}

/// Serialise the selected slices of `body` as one multipart body.
///
/// `ranges` must already be collapsed against `body.len()`.
pub fn write_multipart(
    body: &[u8],
    ranges: &[Range],
    content_type: Option<&str>,
    boundary: &str,
) -> Vec<u8> {
    let len = body.len() as u64;
    let mut out = Vec::with_capacity(body.len() + ranges.len() * 96);
    for range in ranges {
        let first = range.first_byte(len) as usize;
        let last = range.last_byte(len) as usize;

        // Writes to a Vec cannot fail.
        let _ = write!(out, "\r\n--{boundary}\r\n");
        if let Some(content_type) = content_type {
            let _ = write!(out, "Content-Type: {content_type}\r\n");
        }
        let _ = write!(out, "Content-Range: {}\r\n\r\n", range.content_range(len));
        out.extend_from_slice(&body[first..=last]);
    }
    let _ = write!(out, "\r\n--{boundary}--\r\n");
    out
}
