/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod error;
pub use error::HttpResponseParseError;

mod request;
pub use request::HttpClientRequest;

mod response;
pub use response::HttpClientResponse;
