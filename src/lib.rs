/*!
jwt-bearer-assertion builds the signed JWT that an `OAuth2` client presents when it
authenticates to a token endpoint with the JWT bearer client assertion profile
(RFC 7521 / RFC 7523), for the client credentials grant.

The output is the set of form parameters for the token request, ready to be
extended with scopes and posted by whichever HTTP client the caller uses:

```text
grant_type=client_credentials
client_assertion=<compact JWS, RS256>
client_assertion_type=urn:ietf:params:oauth:client-assertion-type:jwt-bearer
```

The design stands on a few central ideas:

 - Every collaborator sits behind a trait: key parsing ([`signer::KeyParser`]),
   signing ([`signer::JwsSigner`]), randomness ([`entropy::EntropySource`]) and
   time ([`clock::Clock`])
 - Every call builds a new assertion; nothing is cached and nothing touches the network
 - Secrets stay wrapped in `secrecy` types until they are serialized

```no_run
use jwt_bearer_assertion::client_auth::{AssertionBuilder, AssertionConfig};
use jwt_bearer_assertion::signer::native::RsaKeyParser;

# fn main() -> Result<(), Box<dyn std::error::Error>> {
let config = AssertionConfig::builder()
    .client_id("svc-1")
    .token_endpoint("https://auth.example.com/token")
    .private_key(std::fs::read("client-key.pem")?)
    .build();

let params = AssertionBuilder::new(config, RsaKeyParser)
    .token_request_params()?
    .with_scopes(["read"]);

println!("{}", params.to_form_urlencoded());
# Ok(())
# }
```
*/
#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]

pub mod client_auth;
pub mod clock;
pub mod entropy;
mod error;
pub mod jwt;
pub mod signer;
#[cfg(test)]
mod test_support;

pub use error::Error;

/// Documentation
pub mod _documentation {
    #[doc = include_str!("../README.md")]
    mod readme {}
}

/// Re-export of parts of the `secrecy` crate.
pub mod secrecy {
    pub use ::secrecy::{ExposeSecret, SecretBox, SecretString};
}
