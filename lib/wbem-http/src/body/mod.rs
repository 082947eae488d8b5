/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, BufRead, Read};

mod chunked_decoder;
pub use chunked_decoder::ChunkedDecodeReader;

mod chunked_encoder;
pub use chunked_encoder::ChunkedEncodeWriter;

mod length;
pub use length::ContentLengthReader;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpBodyType {
    ContentLength(u64),
    Chunked,
    ReadUntilEnd,
}

/// A body stream selected by the framing of a message head.
///
/// The inner reader can be taken back once the body has been read to the end.
pub enum HttpBodyReader<R> {
    Empty(R),
    ContentLength(ContentLengthReader<R>),
    Chunked(ChunkedDecodeReader<R>),
    UntilEnd { reader: R, finished: bool },
}

impl<R: BufRead> HttpBodyReader<R> {
    pub fn new(reader: R, body_type: Option<HttpBodyType>, body_line_max_size: usize) -> Self {
        match body_type {
            None | Some(HttpBodyType::ContentLength(0)) => HttpBodyReader::Empty(reader),
            Some(HttpBodyType::ContentLength(size)) => {
                HttpBodyReader::ContentLength(ContentLengthReader::new(reader, size))
            }
            Some(HttpBodyType::Chunked) => {
                HttpBodyReader::Chunked(ChunkedDecodeReader::new(reader, body_line_max_size))
            }
            Some(HttpBodyType::ReadUntilEnd) => HttpBodyReader::UntilEnd {
                reader,
                finished: false,
            },
        }
    }
}

impl<R> HttpBodyReader<R> {
    pub fn is_finished(&self) -> bool {
        match self {
            HttpBodyReader::Empty(_) => true,
            HttpBodyReader::ContentLength(r) => r.is_finished(),
            HttpBodyReader::Chunked(r) => r.is_finished(),
            HttpBodyReader::UntilEnd { finished, .. } => *finished,
        }
    }

    pub fn get_ref(&self) -> &R {
        match self {
            HttpBodyReader::Empty(r) => r,
            HttpBodyReader::ContentLength(r) => r.get_ref(),
            HttpBodyReader::Chunked(r) => r.get_ref(),
            HttpBodyReader::UntilEnd { reader, .. } => reader,
        }
    }

    pub fn get_mut(&mut self) -> &mut R {
        match self {
            HttpBodyReader::Empty(r) => r,
            HttpBodyReader::ContentLength(r) => r.get_mut(),
            HttpBodyReader::Chunked(r) => r.get_mut(),
            HttpBodyReader::UntilEnd { reader, .. } => reader,
        }
    }

    pub fn into_inner(self) -> R {
        match self {
            HttpBodyReader::Empty(r) => r,
            HttpBodyReader::ContentLength(r) => r.into_inner(),
            HttpBodyReader::Chunked(r) => r.into_inner(),
            HttpBodyReader::UntilEnd { reader, .. } => reader,
        }
    }
}

impl<R: BufRead> Read for HttpBodyReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            HttpBodyReader::Empty(_) => Ok(0),
            HttpBodyReader::ContentLength(r) => r.read(buf),
            HttpBodyReader::Chunked(r) => r.read(buf),
            HttpBodyReader::UntilEnd { reader, finished } => {
                if *finished || buf.is_empty() {
                    return Ok(0);
                }
                let nr = reader.read(buf)?;
                if nr == 0 {
                    *finished = true;
                }
                Ok(nr)
            }
        }
    }
}
