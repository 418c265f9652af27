//! PKCS#7 padding over whole buffers.
//!
//! Always appends between 1 and `BLOCK_SIZE` bytes, so aligned and empty
//! inputs unpad unambiguously.

use cbc::cipher::block_padding::{Pkcs7, RawPadding};

use crate::errors::{FilecryptError, Result};
use crate::types::BLOCK_SIZE;

/// Owned copy of `data` extended to the next block boundary.
pub fn pad(data: &[u8]) -> Vec<u8> {
    let tail = data.len() % BLOCK_SIZE;
    let padded_len = data.len() - tail + BLOCK_SIZE;
    let mut out = Vec::with_capacity(padded_len);
    out.extend_from_slice(data);
    out.resize(padded_len, 0);
    Pkcs7::raw_pad(&mut out[padded_len - BLOCK_SIZE..], tail);
    out
}

/// Owned copy of `padded` with the padding removed.
///
/// Any inconsistency in the trailing bytes, including a length that is not
/// block aligned, is reported as [`FilecryptError::PaddingValidation`].
pub fn unpad(padded: &[u8]) -> Result<Vec<u8>> {
    if padded.is_empty() || padded.len() % BLOCK_SIZE != 0 {
        return Err(FilecryptError::PaddingValidation);
    }
    let last = padded.len() - BLOCK_SIZE;
    let kept = Pkcs7::raw_unpad(&padded[last..]).map_err(|_| FilecryptError::PaddingValidation)?;
    let mut out = Vec::with_capacity(last + kept.len());
    out.extend_from_slice(&padded[..last]);
    out.extend_from_slice(kept);
    Ok(out)
}
