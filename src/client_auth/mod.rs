//! `OAuth2` client authentication with JWT client assertions.
//!
//! [`AssertionBuilder`] produces the form parameters of a client credentials
//! token request in which the client authenticates with a signed JWT
//! (RFC 7523 §2.2). The parameters are returned as [`TokenRequestParams`],
//! which the caller may extend (for example with scopes) before sending.

mod jwt_bearer;

use std::borrow::Cow;
use std::collections::BTreeMap;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::ser::SerializeMap as _;

pub use jwt_bearer::{
    AssertionBuilder, AssertionConfig, AssertionConfigBuilder, AssertionError, BuildError,
    CLIENT_ASSERTION_TYPE, DEFAULT_EXPIRES_AFTER, GRANT_TYPE,
};

#[derive(Debug, Clone)]
pub enum FormValue {
    NonSensitive(Cow<'static, str>),
    Sensitive(SecretString),
}

impl FormValue {
    /// Returns the raw value, exposing it if it is sensitive.
    #[must_use]
    pub fn expose(&self) -> &str {
        match self {
            FormValue::NonSensitive(cow) => cow.as_ref(),
            FormValue::Sensitive(secret) => secret.expose_secret(),
        }
    }

    #[must_use]
    pub fn is_sensitive(&self) -> bool {
        matches!(self, FormValue::Sensitive(_))
    }
}

impl From<&'static str> for FormValue {
    fn from(value: &'static str) -> Self {
        Self::NonSensitive(Cow::Borrowed(value))
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        Self::NonSensitive(Cow::Owned(value))
    }
}

impl From<Cow<'static, str>> for FormValue {
    fn from(value: Cow<'static, str>) -> Self {
        Self::NonSensitive(value)
    }
}

impl From<SecretString> for FormValue {
    fn from(value: SecretString) -> Self {
        Self::Sensitive(value)
    }
}

impl Serialize for FormValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.expose().serialize(serializer)
    }
}

fn mk_scopes(scopes: impl IntoIterator<Item = String>, separator: &str) -> Option<String> {
    let maybe_scopes = scopes
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>();

    if maybe_scopes.is_empty() {
        None
    } else {
        Some(maybe_scopes.join(separator))
    }
}

/// Form parameters of a token request.
///
/// Each name appears at most once; inserting an existing name replaces its
/// value. Sensitive values are redacted in `Debug` output and only exposed
/// when serialized.
#[derive(Debug, Clone, Default)]
pub struct TokenRequestParams {
    fields: BTreeMap<Cow<'static, str>, FormValue>,
}

impl TokenRequestParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, returning the previous value if any.
    pub fn insert(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        value: impl Into<FormValue>,
    ) -> Option<FormValue> {
        self.fields.insert(name.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.fields.iter().map(|(name, value)| (name.as_ref(), value))
    }

    /// Adds a space-separated `scope` parameter.
    ///
    /// Blank scopes are dropped. If no scopes remain, the parameters are unchanged.
    #[must_use]
    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        if let Some(scope) = mk_scopes(scopes.into_iter().map(Into::into), " ") {
            self.insert("scope", scope);
        }
        self
    }

    /// Encodes the parameters as an `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn to_form_urlencoded(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter().map(|(name, value)| (name, value.expose())))
            .finish()
    }
}

impl Serialize for TokenRequestParams {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
