/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod parse;
pub use parse::{HttpChunkedLine, HttpHeaderLine, HttpLineParseError, HttpMethodLine, HttpStatusLine};

mod line;
pub use line::{LimitedBufReadExt, trim_line_end};

pub mod header;
pub use header::{HeaderBag, HttpHeaderReadError};

mod body;
pub use body::{
    ChunkedDecodeReader, ChunkedEncodeWriter, ContentLengthReader, HttpBodyReader, HttpBodyType,
};

pub mod client;
pub mod server;
