//! JWS compact serialization of the client assertion.
//!
//! Only the header and claim set used for client authentication are
//! produced here. Incoming tokens are never parsed or validated.

use std::borrow::Cow;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bon::Builder;
use serde::Serialize;
use snafu::prelude::*;

use crate::signer::{JwsSigner, JwsSignerError};

/// The only signing algorithm used for client assertions.
pub const RS256: &str = "RS256";

/// The `typ` header value.
pub const JWT_TYPE: &str = "JWT";

/// The JOSE header of the assertion.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize)]
pub struct Header {
    #[serde(rename = "alg")]
    #[builder(into)]
    pub algorithm: Cow<'static, str>,
    #[serde(rename = "typ")]
    #[builder(into, default = Cow::Borrowed(JWT_TYPE))]
    pub token_type: Cow<'static, str>,
    /// Selects the verification key when the client has registered several.
    #[serde(rename = "kid", skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub key_id: Option<String>,
}

/// The assertion claim set (RFC 7523 §3).
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize)]
pub struct ClaimSet {
    #[serde(rename = "iss")]
    #[builder(into)]
    pub issuer: String,
    #[serde(rename = "sub")]
    #[builder(into)]
    pub subject: String,
    #[serde(rename = "aud")]
    #[builder(into)]
    pub audience: String,
    #[serde(rename = "jti")]
    #[builder(into)]
    pub jwt_id: String,
    /// Unix seconds.
    #[serde(rename = "exp")]
    pub expires_at: i64,
    /// Unix seconds.
    #[serde(rename = "iat", skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
}

#[derive(Debug, Snafu)]
pub enum JwsSerializationError<E: crate::Error + 'static> {
    #[snafu(display("Failed to serialize the JWS {part}"))]
    Json {
        part: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("Expiry {expires_at} must be later than issued-at {issued_at}"))]
    InvalidExpiry { expires_at: i64, issued_at: i64 },
    #[snafu(display("Failed to sign the JWS"))]
    Sign { source: JwsSignerError<E> },
}

impl<E: crate::Error + 'static> crate::Error for JwsSerializationError<E> {
    fn is_retryable(&self) -> bool {
        match self {
            JwsSerializationError::Json { .. } | JwsSerializationError::InvalidExpiry { .. } => {
                false
            }
            JwsSerializationError::Sign { source } => source.is_retryable(),
        }
    }
}

/// Encodes and signs `claims` under `header`, returning the compact serialization.
///
/// # Errors
///
/// Fails if the claims expire before they are issued, if the key does not
/// sign with the header's algorithm, or if signing fails.
pub fn to_jws_compact<K: JwsSigner + ?Sized>(
    header: &Header,
    claims: &ClaimSet,
    key: &K,
) -> Result<String, JwsSerializationError<K::Error>> {
    if let Some(issued_at) = claims.issued_at {
        ensure!(
            claims.expires_at > issued_at,
            InvalidExpirySnafu {
                expires_at: claims.expires_at,
                issued_at,
            }
        );
    }

    let header_json = serde_json::to_vec(header).context(JsonSnafu { part: "header" })?;
    let claims_json = serde_json::to_vec(claims).context(JsonSnafu { part: "claims" })?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );

    let signature = key
        .sign(signing_input.as_bytes(), &header.algorithm)
        .context(SignSnafu)?;

    Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
}

#[cfg(test)]
mod tests {
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::{ClaimSet, Header, JwsSerializationError, RS256, to_jws_compact};
    use crate::signer::JwsSignerError;
    use crate::test_support::{MockSigner, decode_segment};

    fn claims() -> ClaimSet {
        ClaimSet::builder()
            .issuer("client")
            .subject("client")
            .audience("https://as.example.com/token")
            .jwt_id("abc")
            .expires_at(1_700_003_600)
            .issued_at(1_699_999_990)
            .build()
    }

    #[test]
    fn test_compact_serialization() {
        let header = Header::builder().algorithm(RS256).build();
        let token = to_jws_compact(&header, &claims(), &MockSigner::new(RS256)).expect("signed");

        let parts = token.split('.').collect::<Vec<_>>();
        assert_eq!(parts.len(), 3);
        assert_eq!(
            URL_SAFE_NO_PAD.decode(parts[0]).expect("base64"),
            br#"{"alg":"RS256","typ":"JWT"}"#
        );
        assert_eq!(
            URL_SAFE_NO_PAD.decode(parts[1]).expect("base64"),
            br#"{"iss":"client","sub":"client","aud":"https://as.example.com/token","jti":"abc","exp":1700003600,"iat":1699999990}"#
        );
        assert_eq!(parts[2], URL_SAFE_NO_PAD.encode(b"signature"));
    }

    #[test]
    fn test_key_id_in_header() {
        let header = Header::builder().algorithm(RS256).key_id("key-1").build();
        let token = to_jws_compact(&header, &claims(), &MockSigner::new(RS256)).expect("signed");

        let header = decode_segment(&token, 0);
        assert_eq!(header["kid"], "key-1");
        assert_eq!(header["typ"], "JWT");
    }

    #[test]
    fn test_expiry_before_issue_fails() {
        let header = Header::builder().algorithm(RS256).build();
        let mut claims = claims();
        claims.expires_at = 1_699_999_990;

        let result = to_jws_compact(&header, &claims, &MockSigner::new(RS256));
        assert!(matches!(
            result,
            Err(JwsSerializationError::InvalidExpiry { .. })
        ));
    }

    #[test]
    fn test_algorithm_mismatch_fails() {
        let header = Header::builder().algorithm(RS256).build();

        let result = to_jws_compact(&header, &claims(), &MockSigner::new("ES256"));
        assert!(matches!(
            result,
            Err(JwsSerializationError::Sign {
                source: JwsSignerError::MismatchedAlgorithm { .. }
            })
        ));
    }
}
