//! Shared fixtures for unit tests.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bytes::Bytes;
use snafu::Snafu;

use crate::entropy::EntropySource;
use crate::signer::{JwsSigner, KeyParser};

#[cfg(feature = "crypto-native")]
pub(crate) static RSA_KEY: std::sync::LazyLock<rsa::RsaPrivateKey> =
    std::sync::LazyLock::new(|| {
        rsa::RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("key generation")
    });

/// Decodes one base64url segment of a compact JWS as JSON.
pub(crate) fn decode_segment(token: &str, index: usize) -> serde_json::Value {
    let segment = token.split('.').nth(index).expect("segment present");
    let json = URL_SAFE_NO_PAD.decode(segment).expect("base64url segment");
    serde_json::from_slice(&json).expect("JSON segment")
}

#[derive(Debug, Snafu)]
pub(crate) enum FixtureError {
    #[snafu(display("entropy device exhausted"))]
    Exhausted,
    #[snafu(display("key material rejected"))]
    Rejected,
    #[snafu(display("signing device unavailable"))]
    SignerUnavailable,
}

impl crate::Error for FixtureError {
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Repeats a fixed byte pattern.
#[derive(Debug, Clone)]
pub(crate) struct FixedEntropy(pub Vec<u8>);

impl EntropySource for FixedEntropy {
    type Error = Infallible;

    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), Self::Error> {
        for (dst, src) in dest.iter_mut().zip(self.0.iter().cycle()) {
            *dst = *src;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ExhaustedEntropy;

impl EntropySource for ExhaustedEntropy {
    type Error = FixtureError;

    fn fill_bytes(&self, _dest: &mut [u8]) -> Result<(), Self::Error> {
        ExhaustedSnafu.fail()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct MockSigner {
    algorithm: String,
    fail: bool,
}

impl MockSigner {
    pub(crate) fn new(algorithm: &str) -> Self {
        Self {
            algorithm: algorithm.to_owned(),
            fail: false,
        }
    }

    pub(crate) fn failing(algorithm: &str) -> Self {
        Self {
            algorithm: algorithm.to_owned(),
            fail: true,
        }
    }
}

impl JwsSigner for MockSigner {
    type Error = FixtureError;

    fn jws_algorithm(&self) -> &str {
        &self.algorithm
    }

    fn sign_unchecked(&self, _input: &[u8]) -> Result<Bytes, Self::Error> {
        if self.fail {
            SignerUnavailableSnafu.fail()
        } else {
            Ok(Bytes::from_static(b"signature"))
        }
    }
}

/// Hands out [`MockSigner`]s and records the material it was given.
#[derive(Debug, Clone)]
pub(crate) struct MockKeyParser {
    signer: MockSigner,
    reject: bool,
    last_material: Arc<Mutex<Option<Vec<u8>>>>,
}

impl Default for MockKeyParser {
    fn default() -> Self {
        Self::with_algorithm("RS256")
    }
}

impl MockKeyParser {
    pub(crate) fn with_algorithm(algorithm: &str) -> Self {
        Self {
            signer: MockSigner::new(algorithm),
            reject: false,
            last_material: Arc::default(),
        }
    }

    pub(crate) fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_signer() -> Self {
        Self {
            signer: MockSigner::failing("RS256"),
            ..Self::default()
        }
    }

    pub(crate) fn last_material(&self) -> Option<Vec<u8>> {
        self.last_material.lock().expect("not poisoned").clone()
    }
}

impl KeyParser for MockKeyParser {
    type Key = MockSigner;
    type Error = FixtureError;

    fn parse_key(&self, material: &[u8]) -> Result<Self::Key, Self::Error> {
        *self.last_material.lock().expect("not poisoned") = Some(material.to_vec());

        if self.reject {
            RejectedSnafu.fail()
        } else {
            Ok(self.signer.clone())
        }
    }
}
