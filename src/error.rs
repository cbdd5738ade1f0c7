//! Error types for the Zendesk transport.
//!
//! This module defines `ZendeskError`, the unified error type used throughout
//! the crate. Every failure of a send is surfaced as a distinct variant; the
//! transport never retries or recovers internally.
//!
//! # Security
//!
//! The API token must never appear in error messages or logs. Variants carry
//! status codes and response bodies, never credentials.

use thiserror::Error;

/// Unified error type for all Zendesk transport operations.
///
/// Each variant provides specific context about the failure so callers can
/// distinguish caller errors (wrong message or options type) from network
/// failures and remote rejections.
#[derive(Error, Debug)]
pub enum ZendeskError {
    /// Configuration error - missing or invalid environment variables,
    /// or a malformed DSN.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The message is not a chat message.
    ///
    /// The Zendesk transport only knows how to turn chat messages into
    /// tickets; other message kinds must be routed elsewhere.
    #[error("the Zendesk transport only supports chat messages, got {kind}")]
    UnsupportedMessage {
        /// Human-readable name of the rejected message kind.
        kind: &'static str,
    },

    /// The message carries options of a type other than `ZendeskOptions`.
    #[error("the Zendesk transport only supports ZendeskOptions for message options")]
    UnsupportedOptions,

    /// The HTTP round trip could not be completed (connection, TLS or
    /// protocol failure before a status code was obtained).
    #[error("could not reach the remote Zendesk server")]
    Unreachable(#[source] reqwest::Error),

    /// A status code was obtained but the response body was not valid JSON
    /// (or a 201 body was missing the assigned id).
    #[error("unable to create Zendesk request: Invalid response (HTTP {status})")]
    InvalidResponse {
        /// The HTTP status code that accompanied the unparseable body.
        status: u16,
        /// The underlying parse failure, if any.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Zendesk rejected the submission with a non-201 status.
    #[error("unable to create Zendesk request: \"{description}\" (HTTP {status})")]
    Rejected {
        /// The HTTP status code returned.
        status: u16,
        /// The `description` field from the response body if present,
        /// otherwise the raw body text.
        description: String,
    },
}

impl ZendeskError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        ZendeskError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error with a custom message.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        ZendeskError::Config(message.into())
    }

    /// Returns the HTTP status code attached to this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ZendeskError::InvalidResponse { status, .. } => Some(*status),
            ZendeskError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the failure originates from the caller (wrong message
    /// or options type) rather than from the network or the remote service.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ZendeskError::UnsupportedMessage { .. } | ZendeskError::UnsupportedOptions
        )
    }
}
