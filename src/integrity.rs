//! Byte-exact comparison of original and round-tripped data.

use std::path::Path;

use log::info;
use subtle::ConstantTimeEq;

use crate::errors::Result;
use crate::files::read_file;

/// True iff both buffers have the same length and content.
pub fn compare(original: &[u8], reconstructed: &[u8]) -> bool {
    original.len() == reconstructed.len() && bool::from(original.ct_eq(reconstructed))
}

/// Read both files and [`compare`] them.
pub fn compare_files(original: &Path, reconstructed: &Path) -> Result<bool> {
    info!("Verifying file integrity");
    let a = read_file(original)?;
    let b = read_file(reconstructed)?;
    Ok(compare(&a, &b))
}
