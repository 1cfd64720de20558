//! Random identifier generation.
//!
//! Identifiers are drawn from a 64-symbol URL-safe alphabet using the
//! operating system CSPRNG. Each call reads its own bytes; nothing is shared
//! between calls, so concurrent callers need no synchronization.

use std::num::NonZeroUsize;

use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::error::GenerateError;

/// Symbols an identifier may contain. Exactly 64 entries, so `byte & 63`
/// selects one uniformly.
pub const ALPHABET: &[u8; 64] =
    b"_-0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const MASK: u8 = (ALPHABET.len() - 1) as u8;

/// Generate an identifier of exactly `length` characters.
pub fn try_generate(length: NonZeroUsize) -> Result<String, GenerateError> {
    let mut bytes = vec![0u8; length.get()];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| GenerateError::Entropy(e.to_string()))?;

    Ok(bytes
        .into_iter()
        .map(|b| ALPHABET[(b & MASK) as usize] as char)
        .collect())
}

/// Generate an identifier of exactly `length` characters.
///
/// # Panics
///
/// Panics if the operating system cannot supply secure randomness. There is
/// no degraded mode: without a secure source no request can be labelled.
pub fn generate(length: NonZeroUsize) -> String {
    match try_generate(length) {
        Ok(id) => id,
        Err(e) => panic!("{e}"),
    }
}
