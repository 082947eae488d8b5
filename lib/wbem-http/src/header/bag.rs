/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::BufRead;

use bytes::BufMut;
use indexmap::IndexMap;
use thiserror::Error;

use crate::{HttpHeaderLine, LimitedBufReadExt};

#[derive(Debug, Error)]
pub enum HttpHeaderReadError {
    #[error("closed before the end of header")]
    UnexpectedEof,
    #[error("too large header, should be less than {0}")]
    TooLargeHeader(usize),
    #[error("io failed: {0:?}")]
    IoFailed(#[from] std::io::Error),
}

/// Case-insensitive header map with a single value per name.
///
/// A later insert replaces the earlier value, but the position and the
/// original name case of the first insert are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderBag {
    inner: IndexMap<String, (String, String)>,
}

impl HeaderBag {
    pub fn new() -> Self {
        HeaderBag::default()
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        let key = name.to_ascii_lowercase();
        match self.inner.get_mut(&key) {
            Some((_, v)) => *v = value.to_string(),
            None => {
                self.inner.insert(key, (name.to_string(), value.to_string()));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(&name.to_ascii_lowercase())
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(&name.to_ascii_lowercase())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.inner
            .shift_remove(&name.to_ascii_lowercase())
            .map(|(_, v)| v)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over (original name, value) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Append every header line, without the terminating empty line
    pub fn write_to_buf(&self, buf: &mut Vec<u8>) {
        for (name, value) in self.iter() {
            buf.put_slice(name.as_bytes());
            buf.put_slice(b": ");
            buf.put_slice(value.as_bytes());
            buf.put_slice(b"\r\n");
        }
    }

    /// Serialize as a complete header block ended by an empty line
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.len() * 32 + 2);
        self.write_to_buf(&mut buf);
        buf.put_slice(b"\r\n");
        buf
    }

    /// Read header lines until the empty line.
    ///
    /// Lines that can not be parsed are skipped. `header_size` holds the
    /// size already consumed by the head and is updated on return.
    pub fn read_from<R>(
        reader: &mut R,
        max_header_size: usize,
        header_size: &mut usize,
    ) -> Result<HeaderBag, HttpHeaderReadError>
    where
        R: BufRead,
    {
        let mut bag = HeaderBag::new();
        let mut line_buf = Vec::<u8>::with_capacity(256);
        loop {
            if *header_size >= max_header_size {
                return Err(HttpHeaderReadError::TooLargeHeader(max_header_size));
            }
            line_buf.clear();
            let max_len = max_header_size - *header_size;
            let (found, nr) = reader.limited_read_until(b'\n', max_len, &mut line_buf)?;
            if !found {
                return if nr < max_len {
                    Err(HttpHeaderReadError::UnexpectedEof)
                } else {
                    Err(HttpHeaderReadError::TooLargeHeader(max_header_size))
                };
            }
            *header_size += nr;
            if (line_buf.len() == 1 && line_buf[0] == b'\n')
                || (line_buf.len() == 2 && line_buf[0] == b'\r' && line_buf[1] == b'\n')
            {
                // header end line
                break;
            }

            // obsolete line folding is not supported, such lines are skipped too
            if let Ok(header) = HttpHeaderLine::parse(&line_buf) {
                bag.insert(header.name, header.value);
            }
        }
        Ok(bag)
    }
}
