/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, BufRead};

pub trait LimitedBufReadExt: BufRead {
    /// Read until `delimiter` (included) or until `max_len` bytes have been read.
    ///
    /// Returns whether the delimiter was found and the number of bytes read.
    /// A `(false, n)` result with `n < max_len` means the reader hit EOF.
    fn limited_read_until(
        &mut self,
        delimiter: u8,
        max_len: usize,
        buf: &mut Vec<u8>,
    ) -> io::Result<(bool, usize)> {
        let mut nr = 0usize;
        loop {
            let available = match self.fill_buf() {
                Ok(b) => b,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                return Ok((false, nr));
            }

            let left = max_len - nr;
            let check = &available[..available.len().min(left)];
            match memchr::memchr(delimiter, check) {
                Some(p) => {
                    buf.extend_from_slice(&check[..=p]);
                    self.consume(p + 1);
                    return Ok((true, nr + p + 1));
                }
                None => {
                    let len = check.len();
                    buf.extend_from_slice(check);
                    self.consume(len);
                    nr += len;
                    if nr >= max_len {
                        return Ok((false, nr));
                    }
                }
            }
        }
    }
}

impl<R: BufRead + ?Sized> LimitedBufReadExt for R {}

/// Strip the line terminator together with any trailing space or control characters.
pub fn trim_line_end(buf: &[u8]) -> &[u8] {
    let mut end = buf.len();
    while end > 0 {
        let b = buf[end - 1];
        if b == b' ' || b.is_ascii_control() {
            end -= 1;
        } else {
            break;
        }
    }
    &buf[..end]
}
