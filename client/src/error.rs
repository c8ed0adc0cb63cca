use thiserror::Error;

/// Errors returned by the Bot Studio client
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be sent or its body not read
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("API request failed with status {status}: {}", message.as_deref().unwrap_or("no error message"))]
    Api {
        /// HTTP status code
        status: u16,
        /// Human-readable error reported by the server, when the body carried one
        message: Option<String>,
    },

    /// The response body is not the expected JSON
    #[error("failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A form input name that maps to no configuration field
    #[error("unknown configuration field: {0}")]
    UnknownField(String),
}

impl ClientError {
    /// Error message reported by the server, if any
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_only_from_api_errors() {
        let api = ClientError::Api {
            status: 400,
            message: Some("No file provided".to_string()),
        };
        assert_eq!(api.server_message(), Some("No file provided"));
        assert_eq!(
            api.to_string(),
            "API request failed with status 400: No file provided"
        );

        let decode = ClientError::from(serde_json::from_str::<u8>("nope").unwrap_err());
        assert_eq!(decode.server_message(), None);
    }
}
