/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Read};
use std::sync::Arc;

use wbem_http::{HttpBodyReader, HttpBodyType};

use crate::{ConnectionPool, HttpConnection};

/// The body of a response, read from the connection it came on.
///
/// Once read to the end the connection goes back to the pool. If dropped
/// before that, or after a read error, the connection is closed.
pub struct ResponseBody {
    reader: Option<HttpBodyReader<HttpConnection>>,
    pool: Arc<ConnectionPool>,
}

impl ResponseBody {
    pub(crate) fn new(
        conn: HttpConnection,
        body_type: Option<HttpBodyType>,
        body_line_max_size: usize,
        pool: Arc<ConnectionPool>,
    ) -> Self {
        let reader = HttpBodyReader::new(conn, body_type, body_line_max_size);
        let mut body = ResponseBody {
            reader: Some(reader),
            pool,
        };
        if body.reader.as_ref().is_some_and(|r| r.is_finished()) {
            body.finish();
        }
        body
    }

    /// Whether the body has been read to the end
    pub fn is_finished(&self) -> bool {
        self.reader.is_none()
    }

    fn finish(&mut self) {
        if let Some(reader) = self.reader.take() {
            let mut conn = reader.into_inner();
            if !conn.keep_alive() {
                conn.disconnect();
            }
            self.pool.release(conn);
        }
    }

    fn abort(&mut self) {
        if let Some(reader) = self.reader.take() {
            self.pool.discard(reader.into_inner());
        }
    }

    /// Drop the rest of the body and close the connection
    pub fn discard(mut self) {
        self.abort();
    }

    pub fn read_to_vec(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl Read for ResponseBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(0);
        };
        match reader.read(buf) {
            Ok(n) => {
                if reader.is_finished() {
                    self.finish();
                }
                Ok(n)
            }
            Err(e) => {
                self.abort();
                Err(e)
            }
        }
    }
}

impl Drop for ResponseBody {
    fn drop(&mut self) {
        if self.reader.is_some() {
            log::debug!("response body dropped before the end");
            self.abort();
        }
    }
}
