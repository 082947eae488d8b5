/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Write};

/// Encode everything written into chunks, one chunk per write call.
///
/// `finish` must be called to write the last chunk.
pub struct ChunkedEncodeWriter<W: Write> {
    writer: W,
    header: Vec<u8>,
}

impl<W: Write> ChunkedEncodeWriter<W> {
    pub fn new(writer: W) -> Self {
        ChunkedEncodeWriter {
            writer,
            header: Vec::with_capacity(16),
        }
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.writer.write_all(b"0\r\n\r\n")?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> Write for ChunkedEncodeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.header.clear();
        let _ = write!(self.header, "{:x}\r\n", buf.len());
        self.writer.write_all(&self.header)?;
        self.writer.write_all(buf)?;
        self.writer.write_all(b"\r\n")?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
