// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for element and feature operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading element records
///
/// Normalization itself never fails: malformed feature data is defaulted.
/// These variants only cover the outer surface (decoding whole records).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid element record: {0}")]
    InvalidElement(String),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),
}
