/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, BufRead, Read};

use crate::parse::HttpChunkedLine;
use crate::{LimitedBufReadExt, trim_line_end};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DecodeState {
    ChunkSize,
    ChunkData,
    ChunkEnd,
    Trailer,
    Finished,
}

/// Decode a chunked body, the trailer fields are read and dropped.
pub struct ChunkedDecodeReader<R> {
    reader: R,
    body_line_max_size: usize,
    line_buf: Vec<u8>,
    left_chunk_size: u64,
    state: DecodeState,
}

impl<R> ChunkedDecodeReader<R> {
    pub fn new(reader: R, body_line_max_size: usize) -> Self {
        ChunkedDecodeReader {
            reader,
            body_line_max_size,
            line_buf: Vec::with_capacity(32),
            left_chunk_size: 0,
            state: DecodeState::ChunkSize,
        }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state == DecodeState::Finished
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

impl<R: BufRead> ChunkedDecodeReader<R> {
    fn read_line(&mut self, what: &str) -> io::Result<()> {
        self.line_buf.clear();
        let (found, nr) =
            self.reader
                .limited_read_until(b'\n', self.body_line_max_size, &mut self.line_buf)?;
        if found {
            Ok(())
        } else if nr < self.body_line_max_size {
            Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("reader closed while reading {what}"),
            ))
        } else {
            Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{what} too long (> {})", self.body_line_max_size),
            ))
        }
    }
}

impl<R: BufRead> Read for ChunkedDecodeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.state {
                DecodeState::Finished => return Ok(0),
                DecodeState::ChunkSize => {
                    self.read_line("chunk size line")?;
                    let chunk_line = HttpChunkedLine::parse(&self.line_buf)
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                    self.left_chunk_size = chunk_line.chunk_size;
                    self.state = if chunk_line.chunk_size == 0 {
                        DecodeState::Trailer
                    } else {
                        DecodeState::ChunkData
                    };
                }
                DecodeState::ChunkData => {
                    if buf.is_empty() {
                        return Ok(0);
                    }
                    let to_read = usize::try_from(self.left_chunk_size)
                        .unwrap_or(usize::MAX)
                        .min(buf.len());
                    let nr = self.reader.read(&mut buf[..to_read])?;
                    if nr == 0 {
                        return Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "reader closed while reading chunk data",
                        ));
                    }
                    self.left_chunk_size -= nr as u64;
                    if self.left_chunk_size == 0 {
                        self.state = DecodeState::ChunkEnd;
                    }
                    return Ok(nr);
                }
                DecodeState::ChunkEnd => {
                    self.read_line("chunk data end")?;
                    if !trim_line_end(&self.line_buf).is_empty() {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidData,
                            "no CRLF found after chunk data",
                        ));
                    }
                    self.state = DecodeState::ChunkSize;
                }
                DecodeState::Trailer => {
                    self.read_line("trailer")?;
                    if trim_line_end(&self.line_buf).is_empty() {
                        self.state = DecodeState::Finished;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    fn decode(data: &[u8]) -> io::Result<Vec<u8>> {
        let mut reader = ChunkedDecodeReader::new(BufReader::with_capacity(3, data), 64);
        let mut out = Vec::new();
        reader.read_to_end(&mut out)?;
        assert!(reader.is_finished());
        Ok(out)
    }

    #[test]
    fn single() {
        assert_eq!(decode(b"b\r\nhello world\r\n0\r\n\r\n").unwrap(), b"hello world");
    }

    #[test]
    fn multiple_with_extension() {
        let data = b"3;ext=1\r\n<CI\r\n4\r\nM/>x\r\n0\r\n\r\n";
        assert_eq!(decode(data).unwrap(), b"<CIM/>x");
    }

    #[test]
    fn with_trailer() {
        let data = b"2\r\nok\r\n0\r\nCIMStatusCode: 0\r\n\r\n";
        assert_eq!(decode(data).unwrap(), b"ok");
    }

    #[test]
    fn lf_only() {
        assert_eq!(decode(b"2\nok\n0\n\n").unwrap(), b"ok");
    }

    #[test]
    fn empty_body() {
        assert!(decode(b"0\r\n\r\n").unwrap().is_empty());
    }

    #[test]
    fn leave_next_message() {
        let mut cursor = Cursor::new(b"1\r\na\r\n0\r\n\r\nHTTP/1.1".to_vec());
        let mut reader = ChunkedDecodeReader::new(&mut cursor, 64);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"a");
        assert_eq!(cursor.position(), 11);
    }

    #[test]
    fn truncated() {
        let e = decode(b"5\r\nhel").unwrap_err();
        assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof);
        let e = decode(b"5\r\nhello\r\n").unwrap_err();
        assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn invalid() {
        let e = decode(b"zz\r\nhello\r\n0\r\n\r\n").unwrap_err();
        assert_eq!(e.kind(), io::ErrorKind::InvalidData);
        let e = decode(b"2\r\nokay\r\n0\r\n\r\n").unwrap_err();
        assert_eq!(e.kind(), io::ErrorKind::InvalidData);
    }
}
