/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod error;
pub use error::HttpLineParseError;

mod header_line;
pub use header_line::HttpHeaderLine;

mod status_line;
pub use status_line::HttpStatusLine;

mod method_line;
pub use method_line::HttpMethodLine;

mod chunked_line;
pub use chunked_line::HttpChunkedLine;

use http::Version;

/// Parse `HTTP/major.minor`, only 1.x is accepted.
fn parse_version(buf: &[u8]) -> Result<Version, HttpLineParseError> {
    match buf {
        b"HTTP/1.0" => Ok(Version::HTTP_10),
        [b'H', b'T', b'T', b'P', b'/', b'1', b'.', minor] if minor.is_ascii_digit() => {
            Ok(Version::HTTP_11)
        }
        _ => Err(HttpLineParseError::InvalidVersion),
    }
}
