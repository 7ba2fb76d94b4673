// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Relaya SMS dispatch core.

use thiserror::Error;

/// The primary error type used across all Relaya crates.
///
/// Ordinary send failures (carrier rejected the message, transport timed
/// out) are NOT errors -- they come back as
/// [`SendOutcome::Rejected`](crate::types::SendOutcome) values so the
/// dispatch worker can turn them into retry-or-terminal decisions. Only
/// configuration problems and infrastructure failures travel this channel.
#[derive(Debug, Error)]
pub enum RelayaError {
    /// Configuration errors (invalid TOML, missing required credential
    /// fields, unparseable values). Terminal: never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// The resolved sender is neither an explicit `from` nor a configured
    /// default sender for the provider. Terminal.
    #[error("no sender configured for provider {provider}")]
    NoSenderConfigured { provider: String },

    /// Routing found no provider able to take the message. Terminal.
    #[error("no active provider available")]
    NoProviderAvailable,

    /// The resolved provider exists but is flagged inactive. Terminal.
    #[error("provider {provider} is inactive")]
    ProviderInactive { provider: String },

    /// A provider row names a carrier no adapter is registered for.
    #[error("unknown carrier: {name}")]
    UnknownCarrier { name: String },

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// HTTP server errors (bind failure, serve failure).
    #[error("http server error: {message}")]
    Server {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Webhook signature verification failed. The request is rejected and
    /// no record is created.
    #[error("invalid webhook signature from {carrier}")]
    SignatureInvalid { carrier: String },

    /// Webhook payload is missing required fields. Acknowledged to the
    /// carrier but no record is created.
    #[error("malformed callback: {0}")]
    MalformedCallback(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_provider() {
        let err = RelayaError::NoSenderConfigured {
            provider: "telnyx".into(),
        };
        assert_eq!(err.to_string(), "no sender configured for provider telnyx");

        let err = RelayaError::ProviderInactive {
            provider: "twilio".into(),
        };
        assert!(err.to_string().contains("twilio"));
    }

    #[test]
    fn storage_error_wraps_source() {
        let err = RelayaError::Storage {
            source: Box::new(std::io::Error::other("disk gone")),
        };
        assert!(err.to_string().contains("disk gone"));
    }
}
