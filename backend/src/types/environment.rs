//! Environment configuration for different deployment stages

use std::env;

use aws_config::{retry::RetryConfig, BehaviorVersion};
use strum::Display;

/// Secret shared with the local identity provider in development
const DEVELOPMENT_JWT_SECRET: &str = "development-jwt-secret-change-me";

/// Audience the identity provider stamps on user access tokens
const DEFAULT_JWT_AUDIENCE: &str = "authenticated";

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development {
        /// Skip token verification and use the bearer token as the user id
        disable_auth: bool,
    },
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => {
                let disable_auth = env::var("DISABLE_AUTH")
                    .map(|val| matches!(val.trim(), "1" | "true"))
                    .unwrap_or(false);

                Self::Development { disable_auth }
            }
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the S3 bucket name holding uploaded images
    ///
    /// # Panics
    ///
    /// Panics if the `S3_BUCKET_NAME` environment variable is not set outside development
    #[must_use]
    pub fn s3_bucket(&self) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var("S3_BUCKET_NAME").expect("S3_BUCKET_NAME environment variable is not set")
            }
            Self::Development { .. } => {
                env::var("S3_BUCKET_NAME").unwrap_or_else(|_| "images".to_string())
            }
        }
    }

    /// Base URL under which stored objects are publicly reachable
    ///
    /// # Panics
    ///
    /// Panics if `PUBLIC_ASSET_BASE_URL` is not set outside development
    #[must_use]
    pub fn public_asset_base_url(&self) -> String {
        match self {
            Self::Production | Self::Staging => env::var("PUBLIC_ASSET_BASE_URL")
                .expect("PUBLIC_ASSET_BASE_URL environment variable is not set"),
            Self::Development { .. } => env::var("PUBLIC_ASSET_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:4566/{}", self.s3_bucket())),
        }
    }

    /// HS256 secret the identity provider signs access tokens with
    ///
    /// # Panics
    ///
    /// Panics if `AUTH_JWT_SECRET` is not set outside development
    #[must_use]
    pub fn jwt_secret(&self) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var("AUTH_JWT_SECRET").expect("AUTH_JWT_SECRET environment variable is not set")
            }
            Self::Development { .. } => {
                env::var("AUTH_JWT_SECRET").unwrap_or_else(|_| DEVELOPMENT_JWT_SECRET.to_string())
            }
        }
    }

    /// Expected `aud` claim of access tokens
    #[must_use]
    pub fn jwt_audience(&self) -> String {
        env::var("AUTH_JWT_AUDIENCE").unwrap_or_else(|_| DEFAULT_JWT_AUDIENCE.to_string())
    }

    /// Whether token verification is skipped (development only)
    #[must_use]
    pub const fn disable_auth(&self) -> bool {
        matches!(self, Self::Development { disable_auth: true })
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development { .. } | Self::Staging)
    }

    /// Whether logs are emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development { .. } => Some("http://localhost:4566"),
        }
    }

    /// AWS configuration with retries disabled and the SDK's default timeouts
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(RetryConfig::disabled());

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // Override "force path style" to true for compatibility with LocalStack
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development { .. }) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_app_env_selects_stage() {
        env::remove_var("DISABLE_AUTH");
        let cases = [
            (None, Environment::Development { disable_auth: false }),
            (Some(" Development "), Environment::Development { disable_auth: false }),
            (Some("STAGING"), Environment::Staging),
            (Some("production"), Environment::Production),
        ];

        for (app_env, expected) in cases {
            match app_env {
                Some(value) => env::set_var("APP_ENV", value),
                None => env::remove_var("APP_ENV"),
            }
            assert_eq!(Environment::from_env(), expected, "APP_ENV={app_env:?}");
        }

        env::remove_var("APP_ENV");
    }

    #[test]
    #[serial]
    #[should_panic(expected = "Invalid environment: invalid")]
    fn test_unknown_stage_panics() {
        env::set_var("APP_ENV", "invalid");
        let _ = Environment::from_env();
    }

    #[test]
    #[serial]
    fn test_disable_auth_only_in_development() {
        env::set_var("APP_ENV", "development");
        env::set_var("DISABLE_AUTH", "true");
        let env = Environment::from_env();
        assert!(env.disable_auth());

        env::set_var("DISABLE_AUTH", "nope");
        assert!(!Environment::from_env().disable_auth());

        env::set_var("APP_ENV", "production");
        env::set_var("DISABLE_AUTH", "true");
        assert!(!Environment::from_env().disable_auth());

        env::remove_var("APP_ENV");
        env::remove_var("DISABLE_AUTH");
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Environment::Production.to_string(), "production");
        assert_eq!(Environment::Staging.to_string(), "staging");
        assert_eq!(
            Environment::Development { disable_auth: true }.to_string(),
            "development"
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_aws_config_keeps_sdk_timeouts_without_retries() {
        env::set_var("AWS_REGION", "us-east-1");

        let config = Environment::Development {
            disable_auth: false,
        }
        .aws_config()
        .await;

        assert_eq!(config.retry_config().map(RetryConfig::max_attempts), Some(1));
        assert_eq!(
            config
                .timeout_config()
                .and_then(aws_config::timeout::TimeoutConfig::operation_timeout),
            None
        );
        assert_eq!(
            config.endpoint_url(),
            Some("http://localhost:4566")
        );

        env::remove_var("AWS_REGION");
    }

    #[test]
    #[serial]
    fn test_development_defaults() {
        env::remove_var("S3_BUCKET_NAME");
        env::remove_var("PUBLIC_ASSET_BASE_URL");
        env::remove_var("AUTH_JWT_AUDIENCE");

        let env = Environment::Development {
            disable_auth: false,
        };
        assert_eq!(env.s3_bucket(), "images");
        assert_eq!(env.public_asset_base_url(), "http://localhost:4566/images");
        assert_eq!(env.jwt_audience(), "authenticated");
        assert!(env.show_api_docs());
        assert!(!Environment::Production.show_api_docs());
    }
}
