use serde::{Deserialize, Serialize};

/// `aud` claim, a single string or a list per RFC 7519
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Audience {
    /// One audience
    Single(String),
    /// Several audiences
    Many(Vec<String>),
}

impl Audience {
    /// Returns true if `audience` is listed
    #[must_use]
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Self::Single(value) => value == audience,
            Self::Many(values) => values.iter().any(|value| value == audience),
        }
    }
}

/// Claims of a user access token
///
/// Identity providers put many more claims into their tokens (email, role,
/// session id); those are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Intended audience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    /// Expiry as a Unix timestamp in seconds
    pub exp: i64,
    /// Issue time as a Unix timestamp in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Start of validity as a Unix timestamp in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
}
