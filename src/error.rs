use std::path::PathBuf;
use thiserror::Error;

/// Startup failures. All of these are fatal: the UI never starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("🚨 Missing API Key. Please set OPENROUTER_API_KEY in your .env file or config file.")]
    MissingApiKey,

    #[error("Failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unknown model '{0}'. Run 'multichat models' to see available models.")]
    UnknownModel(String),
}

/// Failures of a single completion call.
///
/// These never reach the user as faults: `CompletionClient::complete` turns
/// them into their `Display` text and that text becomes the assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// No complete HTTP response arrived: DNS, connect or TLS failure, or the
    /// connection dropped while the body was being read.
    #[error("❌ API Error: no response received for url: {url}\nDetails: {details}")]
    NoResponse { url: String, details: String },

    #[error("❌ API Error: {status} {reason} for url: {url}\nDetails: {body}")]
    Status {
        status: u16,
        reason: String,
        url: String,
        body: String,
    },

    #[error("❌ Error: Could not parse API response or unexpected format.")]
    ResponseFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("A reply is still pending; wait for it before sending another message")]
    Busy,

    #[error("Unknown model '{0}'")]
    UnknownModel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_code_reason_url_and_body() {
        let err = CompletionError::Status {
            status: 500,
            reason: "Internal Server Error".to_string(),
            url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            body: "{\"error\":\"boom\"}".to_string(),
        };
        let text = err.to_string();
        assert!(text.starts_with("❌ API Error: 500 Internal Server Error"));
        assert!(text.contains("for url: https://openrouter.ai/api/v1/chat/completions"));
        assert!(text.ends_with("Details: {\"error\":\"boom\"}"));
    }

    #[test]
    fn response_format_error_is_fixed_text() {
        assert_eq!(
            CompletionError::ResponseFormat.to_string(),
            "❌ Error: Could not parse API response or unexpected format."
        );
    }
}
