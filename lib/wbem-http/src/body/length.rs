/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Read};

pub struct ContentLengthReader<R> {
    reader: R,
    left: u64,
}

impl<R> ContentLengthReader<R> {
    pub fn new(reader: R, content_length: u64) -> Self {
        ContentLengthReader {
            reader,
            left: content_length,
        }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.left == 0
    }

    #[inline]
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Read for ContentLengthReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.left == 0 || buf.is_empty() {
            return Ok(0);
        }

        let to_read = usize::try_from(self.left)
            .unwrap_or(usize::MAX)
            .min(buf.len());
        let nr = self.reader.read(&mut buf[..to_read])?;
        if nr == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("reader closed with {} bytes left", self.left),
            ));
        }
        self.left -= nr as u64;
        Ok(nr)
    }
}
