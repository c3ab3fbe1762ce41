//! Random assertion identifiers.
//!
//! Each client assertion carries a `jti` claim that the authorization server
//! may use to reject replays. The identifier is drawn from a secure random
//! source and rendered as fixed-width lowercase hex, so leading zero bytes
//! are kept and every identifier has the same length.

use rand::RngCore as _;
use snafu::prelude::*;

/// Number of hex characters in an assertion ID.
pub const ASSERTION_ID_LEN: usize = 36;

/// A source of cryptographically secure random bytes.
pub trait EntropySource: Send + Sync {
    /// The error returned when the source cannot supply bytes.
    type Error: crate::Error + 'static;

    /// Fills `dest` entirely with random bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the source could not supply enough bytes.
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), Self::Error>;
}

/// The operating system random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

#[derive(Debug, Snafu)]
#[snafu(display("Operating system random source failed"))]
pub struct OsEntropyError {
    source: rand::Error,
}

impl crate::Error for OsEntropyError {
    fn is_retryable(&self) -> bool {
        false
    }
}

impl EntropySource for OsEntropy {
    type Error = OsEntropyError;

    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), Self::Error> {
        rand::rngs::OsRng.try_fill_bytes(dest).context(OsEntropySnafu)
    }
}

#[derive(Debug, Snafu)]
pub enum AssertionIdError<E: crate::Error + 'static> {
    #[snafu(display("Secure random source could not supply {len} bytes"))]
    EntropyUnavailable { len: usize, source: E },
}

impl<E: crate::Error + 'static> crate::Error for AssertionIdError<E> {
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Generates a new assertion ID of [`ASSERTION_ID_LEN`] lowercase hex characters.
///
/// # Errors
///
/// Returns [`AssertionIdError::EntropyUnavailable`] if the source fails.
pub fn random_assertion_id<R: EntropySource + ?Sized>(
    entropy: &R,
) -> Result<String, AssertionIdError<R::Error>> {
    let mut bytes = [0u8; ASSERTION_ID_LEN / 2];
    entropy
        .fill_bytes(&mut bytes)
        .context(EntropyUnavailableSnafu {
            len: ASSERTION_ID_LEN / 2,
        })?;

    Ok(hex::encode(bytes))
}
