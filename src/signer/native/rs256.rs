use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use rsa::pkcs1::DecodeRsaPrivateKey as _;
use rsa::pkcs1v15::{SigningKey, VerifyingKey};
use rsa::pkcs8::DecodePrivateKey as _;
use rsa::sha2::Sha256;
use rsa::signature::{Keypair as _, SignatureEncoding as _, Signer as _};
use snafu::prelude::*;

use crate::signer::{JwsSigner, KeyParser};

const ALGORITHM: &str = "RS256";
const PEM_PREFIX: &[u8] = b"-----BEGIN";

/// An RSA private key signing with RSASSA-PKCS1-v1_5 and SHA-256.
#[derive(Clone)]
pub struct Rs256PrivateKey {
    inner: Arc<SigningKey<Sha256>>,
}

impl fmt::Debug for Rs256PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rs256PrivateKey").finish_non_exhaustive()
    }
}

impl From<rsa::RsaPrivateKey> for Rs256PrivateKey {
    fn from(value: rsa::RsaPrivateKey) -> Self {
        Self {
            inner: Arc::new(SigningKey::<Sha256>::new(value)),
        }
    }
}

impl Rs256PrivateKey {
    /// Returns the key that verifies signatures made by this key.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey<Sha256> {
        self.inner.verifying_key()
    }
}

#[derive(Debug, Snafu)]
#[snafu(display("RSA signing failed"))]
pub struct RsaSignError {
    source: rsa::signature::Error,
}

impl crate::Error for RsaSignError {
    fn is_retryable(&self) -> bool {
        false
    }
}

impl JwsSigner for Rs256PrivateKey {
    type Error = RsaSignError;

    fn jws_algorithm(&self) -> &str {
        ALGORITHM
    }

    fn sign_unchecked(&self, input: &[u8]) -> Result<Bytes, Self::Error> {
        let signature = self.inner.try_sign(input).context(RsaSignSnafu)?;
        Ok(signature.to_vec().into())
    }
}

#[derive(Debug, Snafu)]
pub enum RsaKeyParseError {
    #[snafu(display("PEM-encoded key is not valid UTF-8"))]
    PemEncoding { source: std::str::Utf8Error },
    #[snafu(display("Key is neither a PKCS#8 ({pkcs8}) nor a PKCS#1 ({pkcs1}) RSA private key"))]
    KeyDecode {
        pkcs8: rsa::pkcs8::Error,
        pkcs1: rsa::pkcs1::Error,
    },
}

impl crate::Error for RsaKeyParseError {
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Parses RSA private keys into [`Rs256PrivateKey`] signers.
///
/// Accepts PEM or raw DER. PKCS#8 is tried first, then PKCS#1. Keys for
/// other algorithms are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsaKeyParser;

impl KeyParser for RsaKeyParser {
    type Key = Rs256PrivateKey;
    type Error = RsaKeyParseError;

    fn parse_key(&self, material: &[u8]) -> Result<Self::Key, Self::Error> {
        let key = if material.trim_ascii_start().starts_with(PEM_PREFIX) {
            let pem = std::str::from_utf8(material).context(PemEncodingSnafu)?;
            decode_pem(pem.trim())?
        } else {
            decode_der(material)?
        };

        Ok(key.into())
    }
}

fn decode_pem(pem: &str) -> Result<rsa::RsaPrivateKey, RsaKeyParseError> {
    rsa::RsaPrivateKey::from_pkcs8_pem(pem).or_else(|pkcs8| {
        rsa::RsaPrivateKey::from_pkcs1_pem(pem)
            .map_err(|pkcs1| RsaKeyParseError::KeyDecode { pkcs8, pkcs1 })
    })
}

fn decode_der(der: &[u8]) -> Result<rsa::RsaPrivateKey, RsaKeyParseError> {
    rsa::RsaPrivateKey::from_pkcs8_der(der).or_else(|pkcs8| {
        rsa::RsaPrivateKey::from_pkcs1_der(der)
            .map_err(|pkcs1| RsaKeyParseError::KeyDecode { pkcs8, pkcs1 })
    })
}
