/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

/// Whether chunked is the final transfer coding
pub fn is_chunked_transfer(value: &str) -> bool {
    value
        .rsplit(',')
        .next()
        .map(|v| v.trim().eq_ignore_ascii_case("chunked"))
        .unwrap_or(false)
}

/// Whether a TE request header allows a chunked response
pub fn te_accepts_chunked(value: &str) -> bool {
    value.split(',').any(|v| {
        let v = v.split(';').next().unwrap_or_default().trim();
        v.eq_ignore_ascii_case("trailers") || v.eq_ignore_ascii_case("chunked")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunked() {
        assert!(is_chunked_transfer("chunked"));
        assert!(is_chunked_transfer("gzip, Chunked"));
        assert!(!is_chunked_transfer("chunked, gzip"));
        assert!(!is_chunked_transfer("identity"));
    }

    #[test]
    fn te() {
        assert!(te_accepts_chunked("trailers"));
        assert!(te_accepts_chunked("deflate;q=0.5, chunked"));
        assert!(!te_accepts_chunked("gzip"));
    }
}
