use std::time::Duration;

use jwt_bearer_assertion::client_auth::{AssertionBuilder, AssertionConfig};
use jwt_bearer_assertion::signer::native::RsaKeyParser;
use tracing_subscriber::EnvFilter;

pub fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AssertionConfig::builder()
        .client_id(std::env::var("CLIENT_ID").unwrap())
        .token_endpoint(std::env::var("TOKEN_ENDPOINT").unwrap())
        .private_key(std::fs::read(std::env::var("CLIENT_KEY_PATH").unwrap()).unwrap())
        .maybe_key_id(std::env::var("CLIENT_KEY_ID").ok())
        .expires_after(Duration::from_secs(300))
        .build();

    let params = AssertionBuilder::new(config, RsaKeyParser)
        .token_request_params()
        .unwrap()
        .with_scopes(std::env::var("SCOPES").unwrap_or_default().split(' ').map(str::to_owned));

    println!("POST {}", std::env::var("TOKEN_ENDPOINT").unwrap());
    println!("Content-Type: application/x-www-form-urlencoded");
    println!();
    println!("{}", params.to_form_urlencoded());
}
