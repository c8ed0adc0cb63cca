//! Identity provider seam: resolves a caller's session to a user id

/// Resolves access tokens to user ids
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// User id owning `access_token`, `None` when the session is invalid
    async fn resolve_user_id(&self, access_token: &str) -> Option<String>;
}

#[cfg(any(test, feature = "test-utils"))]
/// Test doubles for identity resolution
pub mod mock {
    use std::collections::HashMap;

    use super::IdentityProvider;

    /// Identity provider backed by a fixed token table
    #[derive(Debug, Default, Clone)]
    pub struct StaticIdentityProvider {
        sessions: HashMap<String, String>,
    }

    impl StaticIdentityProvider {
        /// Creates a provider knowing no sessions
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Registers `access_token` as a session of `user_id`
        #[must_use]
        pub fn with_session(mut self, access_token: &str, user_id: &str) -> Self {
            self.sessions
                .insert(access_token.to_string(), user_id.to_string());
            self
        }
    }

    #[async_trait::async_trait]
    impl IdentityProvider for StaticIdentityProvider {
        async fn resolve_user_id(&self, access_token: &str) -> Option<String> {
            self.sessions.get(access_token).cloned()
        }
    }
}
