use base64::{Engine as _, engine::general_purpose};
use rand::{TryRngCore, rngs::OsRng};

use crate::error::{AppError, Result};

/// Returns `len` bytes drawn from the OS entropy source.
///
/// An entropy failure is surfaced as [`AppError::RandomSource`]; there is
/// deliberately no fallback to a weaker generator.
pub fn secure_bytes(len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| AppError::RandomSource(e.to_string()))?;
    Ok(buf)
}

/// Returns an opaque URL-safe token built from `len` bytes of entropy.
///
/// The token is base64url without padding, so `len` bytes render as
/// `len * 4 / 3` characters (rounded up).
pub fn url_safe_token(len: usize) -> Result<String> {
    Ok(general_purpose::URL_SAFE_NO_PAD.encode(secure_bytes(len)?))
}
