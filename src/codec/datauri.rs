//! Base64 data-URI payload decoding.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;

use crate::error::{Result, UnpackageError};

/// Marker separating the URI metadata from its base64 payload.
const BASE64_MARKER: &str = ";base64,";

/// Decode a data URI of the form `<meta>;base64,<payload>` into raw bytes.
///
/// The metadata prefix (media type and parameters) is ignored; only the
/// payload matters for recovery.
///
/// # Errors
///
/// Fails with [`UnpackageError::DataUriNotBase64`] when the `;base64,`
/// marker is absent, or with a base64 error when the payload is malformed.
pub fn decode(uri: &str) -> Result<Vec<u8>> {
    let (_, payload) = uri
        .split_once(BASE64_MARKER)
        .ok_or(UnpackageError::DataUriNotBase64)?;
    Ok(BASE64_STANDARD.decode(payload)?)
}
