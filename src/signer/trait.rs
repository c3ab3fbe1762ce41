//! Cryptographic signing traits.

use bytes::Bytes;
use snafu::prelude::*;

use crate::Error;
use crate::signer::error::{JwsSignerError, MismatchedAlgorithmSnafu, UnderlyingSnafu};

/// Trait for signers that produce RFC 7515 (JWS) / RFC 7518 (JWA) compatible signatures.
pub trait JwsSigner: Send + Sync {
    /// The error type returned by this signer's operations.
    type Error: Error + 'static;

    /// Returns the JWS algorithm identifier.
    ///
    /// This is specifically for use in the JWT `alg` header parameter.
    fn jws_algorithm(&self) -> &str;

    /// Signs the given input data and returns the signature.
    ///
    /// This should not be called directly, as it does not verify that the
    /// algorithm matches the one named in the header being signed.
    ///
    /// # Errors
    ///
    /// Returns an error if the signing operation fails.
    fn sign_unchecked(&self, input: &[u8]) -> Result<Bytes, Self::Error>;

    /// Signs the given input data for a header naming `jws_algorithm`.
    ///
    /// # Errors
    ///
    /// Returns an error if the algorithm is mismatched, or the signing operation fails.
    fn sign(&self, input: &[u8], jws_algorithm: &str) -> Result<Bytes, JwsSignerError<Self::Error>> {
        ensure!(
            self.jws_algorithm() == jws_algorithm,
            MismatchedAlgorithmSnafu {
                expected: jws_algorithm,
                actual: self.jws_algorithm(),
            }
        );

        self.sign_unchecked(input).context(UnderlyingSnafu)
    }
}

/// Turns raw private key material into a signer.
///
/// Implementations decide which encodings they accept. The material is
/// borrowed for the duration of the call only.
pub trait KeyParser: Send + Sync {
    /// The signer produced from the key material.
    type Key: JwsSigner;
    /// The error returned for malformed or unsupported key material.
    type Error: Error + 'static;

    /// Parses the key material.
    ///
    /// # Errors
    ///
    /// Returns an error if the material is malformed or unsupported.
    fn parse_key(&self, material: &[u8]) -> Result<Self::Key, Self::Error>;
}
