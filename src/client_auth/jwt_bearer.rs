use std::{borrow::Cow, sync::Arc, time::Duration};

use bon::Builder;
use secrecy::{ExposeSecret as _, SecretBox, SecretString};
use snafu::prelude::*;
use tracing::{debug, warn};

use crate::{
    clock::{Clock, SystemClock, unix_seconds},
    entropy::{AssertionIdError, EntropySource, OsEntropy, random_assertion_id},
    jwt::{self, ClaimSet, Header, JwsSerializationError, RS256},
    signer::{JwsSigner, KeyParser},
};

use super::TokenRequestParams;

/// The `grant_type` of the token request.
pub const GRANT_TYPE: &str = "client_credentials";

/// The `client_assertion_type` for JWT bearer assertions (RFC 7523 §2.2).
pub const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// The lifetime of an assertion when none is configured.
pub const DEFAULT_EXPIRES_AFTER: Duration = Duration::from_secs(3600);

/// How far `iat` is set in the past, for servers whose clocks run behind.
const ISSUED_AT_SKEW: Duration = Duration::from_secs(10);

/// Client configuration for JWT bearer authentication.
///
/// ```
/// use std::time::Duration;
/// use jwt_bearer_assertion::client_auth::AssertionConfig;
///
/// let config = AssertionConfig::builder()
///     .client_id("svc-1")
///     .token_endpoint("https://auth.example.com/token")
///     .private_key(std::fs::read("key.pem").unwrap_or_default())
///     .key_id("2024-01")
///     .expires_after(Duration::from_secs(120))
///     .build();
///
/// assert_eq!(config.expires_after(), Duration::from_secs(120));
/// ```
#[derive(Debug, Clone, Builder)]
pub struct AssertionConfig {
    /// The `OAuth2` client ID, used as both `iss` and `sub`.
    #[builder(into)]
    client_id: Cow<'static, str>,
    /// The token endpoint URL, used verbatim as `aud`.
    #[builder(into)]
    token_endpoint: Cow<'static, str>,
    /// The private key material, handed to the key parser on every build.
    #[builder(with = |material: impl Into<Vec<u8>>| {
        Arc::new(SecretBox::new(material.into().into_boxed_slice()))
    })]
    private_key: Arc<SecretBox<[u8]>>,
    /// If set, the `kid` header is set to this value.
    #[builder(into)]
    key_id: Option<String>,
    /// The lifetime of the assertion. Zero falls back to the default.
    expires_after: Option<Duration>,
}

impl AssertionConfig {
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// The effective assertion lifetime.
    #[must_use]
    pub fn expires_after(&self) -> Duration {
        self.expires_after
            .filter(|lifetime| !lifetime.is_zero())
            .unwrap_or(DEFAULT_EXPIRES_AFTER)
    }
}

#[derive(Debug, Snafu)]
pub enum AssertionError<
    KeyErr: crate::Error + 'static,
    IdErr: crate::Error + 'static,
    SignErr: crate::Error + 'static,
> {
    #[snafu(display("Failed to parse the client signing key"))]
    KeyParse { source: KeyErr },
    #[snafu(display("Failed to generate the assertion ID"))]
    AssertionId { source: AssertionIdError<IdErr> },
    #[snafu(display("Failed to sign the client assertion"))]
    Signing {
        source: JwsSerializationError<SignErr>,
    },
}

impl<KeyErr, IdErr, SignErr> crate::Error for AssertionError<KeyErr, IdErr, SignErr>
where
    KeyErr: crate::Error + 'static,
    IdErr: crate::Error + 'static,
    SignErr: crate::Error + 'static,
{
    fn is_retryable(&self) -> bool {
        match self {
            Self::KeyParse { source } => source.is_retryable(),
            Self::AssertionId { source } => source.is_retryable(),
            Self::Signing { source } => source.is_retryable(),
        }
    }
}

/// The error returned by [`AssertionBuilder::token_request_params`].
pub type BuildError<P, R> = AssertionError<
    <P as KeyParser>::Error,
    <R as EntropySource>::Error,
    <<P as KeyParser>::Key as JwsSigner>::Error,
>;

/// JWT Authentication (RFC 7521 / 7523) for the client credentials grant.
///
/// With this method, the client authenticates using a JWT signed with its
/// RSA private key (RS256). Every call to
/// [`token_request_params`](Self::token_request_params) produces a new
/// assertion with these claims:
///  - iss (client ID)
///  - sub (client ID)
///  - aud (the token endpoint, verbatim)
///  - jti (random ID for replay protection)
///  - exp (expiry time, one hour by default)
///  - iat (current time, less a small skew allowance)
///
/// Nothing is cached and no network I/O is performed. The entropy source
/// and clock default to the operating system's; both can be replaced.
#[derive(Debug, Clone)]
pub struct AssertionBuilder<P, R = OsEntropy, C = SystemClock> {
    config: AssertionConfig,
    key_parser: P,
    entropy: R,
    clock: C,
}

impl<P: KeyParser> AssertionBuilder<P> {
    /// Creates a builder using the OS random source and the system clock.
    pub fn new(config: AssertionConfig, key_parser: P) -> Self {
        Self {
            config,
            key_parser,
            entropy: OsEntropy,
            clock: SystemClock,
        }
    }
}

impl<P, R, C> AssertionBuilder<P, R, C> {
    /// Replaces the source of assertion IDs.
    pub fn with_entropy<R2: EntropySource>(self, entropy: R2) -> AssertionBuilder<P, R2, C> {
        AssertionBuilder {
            config: self.config,
            key_parser: self.key_parser,
            entropy,
            clock: self.clock,
        }
    }

    /// Replaces the time source used for `exp` and `iat`.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> AssertionBuilder<P, R, C2> {
        AssertionBuilder {
            config: self.config,
            key_parser: self.key_parser,
            entropy: self.entropy,
            clock,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AssertionConfig {
        &self.config
    }
}

impl<P: KeyParser, R: EntropySource, C: Clock> AssertionBuilder<P, R, C> {
    /// Builds the form parameters for a client credentials token request.
    ///
    /// On success the parameters hold exactly `grant_type`,
    /// `client_assertion` and `client_assertion_type`.
    ///
    /// # Errors
    ///
    /// Fails if the key cannot be parsed, the random source fails, or
    /// signing fails. No parameters are returned in that case.
    pub fn token_request_params(&self) -> Result<TokenRequestParams, BuildError<P, R>> {
        let mut params = TokenRequestParams::new();
        params.insert("grant_type", GRANT_TYPE);

        let key = self
            .key_parser
            .parse_key(self.config.private_key.expose_secret())
            .inspect_err(|err| {
                warn!(client_id = self.config.client_id(), error = %err, "Client key could not be parsed");
            })
            .context(KeyParseSnafu)?;

        let jwt_id = random_assertion_id(&self.entropy)
            .inspect_err(|err| warn!(error = %err, "Assertion ID could not be generated"))
            .context(AssertionIdSnafu)?;

        let claims = self.claim_set(jwt_id);
        let header = Header::builder()
            .algorithm(RS256)
            .maybe_key_id(
                self.config
                    .key_id()
                    .filter(|kid| !kid.is_empty())
                    .map(str::to_owned),
            )
            .build();

        let assertion = jwt::to_jws_compact(&header, &claims, &key)
            .inspect_err(|err| {
                warn!(client_id = self.config.client_id(), error = %err, "Client assertion could not be signed");
            })
            .context(SigningSnafu)?;

        debug!(
            client_id = %claims.issuer,
            key_id = header.key_id.as_deref(),
            jti = %claims.jwt_id,
            exp = claims.expires_at,
            "Built client assertion"
        );

        params.insert("client_assertion", SecretString::from(assertion));
        params.insert("client_assertion_type", CLIENT_ASSERTION_TYPE);

        Ok(params)
    }

    fn claim_set(&self, jwt_id: String) -> ClaimSet {
        let now = unix_seconds(self.clock.now());
        let expires_after = self.config.expires_after();
        let lifetime = expires_after
            .as_secs()
            .saturating_add(u64::from(expires_after.subsec_nanos() > 0));
        let lifetime = i64::try_from(lifetime).unwrap_or(i64::MAX);
        let skew = i64::try_from(ISSUED_AT_SKEW.as_secs()).unwrap_or_default();

        ClaimSet::builder()
            .issuer(self.config.client_id())
            .subject(self.config.client_id())
            .audience(self.config.token_endpoint())
            .jwt_id(jwt_id)
            .expires_at(now.saturating_add(lifetime))
            .issued_at(now.saturating_sub(skew))
            .build()
    }
}
