//! HTTP transport that creates Zendesk tickets and requests.
//!
//! `ZendeskTransport` owns the tenant credentials, resolves the endpoint and
//! auth identity per message, performs a single POST and interprets the
//! response into a [`SentMessage`] receipt or a typed [`ZendeskError`].
//!
//! There are no retries: every failure is surfaced to the caller immediately,
//! and no state is carried across calls.
//!
//! # Security
//!
//! The API token is never logged. The canonical `Display` form deliberately
//! embeds it for debug identity purposes; do not write it to logs.

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::ZendeskError;
use crate::message::{Message, SentMessage};
use crate::options::ZendeskOptions;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Parent domain of every Zendesk tenant.
const ZENDESK_HOST: &str = "zendesk.com";

/// Endpoint for tickets created by an authenticated agent.
const TICKETS_ENDPOINT: &str = "/api/v2/tickets.json";

/// Endpoint for requests created on behalf of an end user.
const REQUESTS_ENDPOINT: &str = "/api/v2/requests.json";

/// Suffix appended to the auth username for token-based authentication.
const TOKEN_AUTH_SUFFIX: &str = "/token";

/// Transport that turns chat messages into Zendesk tickets or requests.
///
/// Identity fields are set at construction and never mutated, so one
/// transport instance can serve concurrent sends.
///
/// # Example
///
/// ```ignore
/// let config = Config::from_env()?;
/// let transport = ZendeskTransport::new(&config)?;
///
/// let sent = transport.send(ChatMessage::new("My message").into()).await?;
/// println!("created ticket {}", sent.message_id());
/// ```
#[derive(Clone)]
pub struct ZendeskTransport {
    /// The underlying HTTP client (cloning is cheap).
    http: Client,

    /// Base URL of the tenant (e.g. `https://foo.zendesk.com`).
    base_url: String,

    /// Tenant hostname (e.g. `foo.zendesk.com`), used for the canonical form.
    host: String,

    /// Default email address used for authentication.
    username: String,

    /// API token for authentication.
    /// SECURITY: Never log this value!
    token: String,
}

impl ZendeskTransport {
    /// Creates a new transport from configuration, building its own HTTP
    /// client with a default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ZendeskError::HttpClient` if the HTTP client fails to
    /// initialize.
    pub fn new(config: &Config) -> Result<Self, ZendeskError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ZendeskError::HttpClient)?;

        Ok(Self::with_client(config, http))
    }

    /// Creates a new transport with an injected HTTP client.
    ///
    /// The client is assumed to manage its own pooling and timeouts; the
    /// transport adds no timeout policy of its own.
    pub fn with_client(config: &Config, http: Client) -> Self {
        let host = format!("{}.{}", config.subdomain, ZENDESK_HOST);
        Self {
            http,
            base_url: format!("https://{}", host),
            host,
            username: config.username.clone(),
            token: config.token().to_string(),
        }
    }

    /// Sends a chat message, creating a ticket or request in Zendesk.
    ///
    /// Options resolution: options attached to the message win; otherwise
    /// options are derived from the attached notification if present, else
    /// from the message subject alone.
    ///
    /// # Errors
    ///
    /// - `UnsupportedMessage` if the message is not a chat message.
    /// - `UnsupportedOptions` if attached options are not [`ZendeskOptions`].
    /// - `Unreachable` if the HTTP round trip could not be completed.
    /// - `InvalidResponse` if the response body is not valid JSON.
    /// - `Rejected` if Zendesk answered with a status other than 201.
    pub async fn send(&self, message: Message) -> Result<SentMessage, ZendeskError> {
        let chat = match &message {
            Message::Chat(chat) => chat,
            other => {
                return Err(ZendeskError::UnsupportedMessage {
                    kind: other.kind(),
                })
            }
        };

        let options = match chat.options() {
            Some(options) => options
                .as_any()
                .downcast_ref::<ZendeskOptions>()
                .cloned()
                .ok_or(ZendeskError::UnsupportedOptions)?,
            None => match chat.notification() {
                Some(notification) => ZendeskOptions::from_notification(notification),
                None => ZendeskOptions::from_message(chat),
            },
        };

        let endpoint = if options.is_request() {
            REQUESTS_ENDPOINT
        } else {
            TICKETS_ENDPOINT
        };
        let url = format!("{}{}", self.base_url, endpoint);

        let auth_user = format!(
            "{}{}",
            options.auth_email().unwrap_or(&self.username),
            TOKEN_AUTH_SUFFIX
        );

        let fields = options.to_fields();
        let body = if options.is_request() {
            json!({ "request": fields })
        } else {
            json!({ "ticket": fields })
        };

        tracing::debug!(
            endpoint = endpoint,
            as_request = options.is_request(),
            "Submitting to Zendesk"
        );

        let response = self
            .http
            .post(&url)
            .basic_auth(&auth_user, Some(&self.token))
            .json(&body)
            .send()
            .await
            .map_err(ZendeskError::Unreachable)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(ZendeskError::Unreachable)?;

        let parsed: Value = serde_json::from_str(&text).map_err(|e| {
            ZendeskError::InvalidResponse {
                status,
                source: Some(e),
            }
        })?;

        if status != 201 {
            let description = parsed
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(text);
            tracing::warn!(status = status, "Zendesk rejected the submission");
            return Err(ZendeskError::Rejected {
                status,
                description,
            });
        }

        // Both tickets and requests come back wrapped as "request".
        let message_id = match parsed.get("request").and_then(|r| r.get("id")) {
            Some(Value::Number(id)) => id.to_string(),
            Some(Value::String(id)) => id.clone(),
            _ => {
                return Err(ZendeskError::InvalidResponse {
                    status,
                    source: None,
                })
            }
        };

        tracing::debug!(message_id = %message_id, "Zendesk accepted the submission");

        Ok(SentMessage::new(message, message_id, self.to_string()))
    }

    /// Returns true if this transport can send the given message: it must be
    /// a chat message carrying either no options or [`ZendeskOptions`].
    pub fn supports(&self, message: &Message) -> bool {
        match message {
            Message::Chat(chat) => match chat.options() {
                None => true,
                Some(options) => options.as_any().is::<ZendeskOptions>(),
            },
            _ => false,
        }
    }
}

/// Canonical form `zendesk://<username>:<token>@<subdomain>.zendesk.com`.
///
/// This is a debug identity string: it embeds the API token and must not be
/// logged or used to reconnect.
impl fmt::Display for ZendeskTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zendesk://{}:{}@{}", self.username, self.token, self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ChatMessage, Importance, MessageOptions, Notification, SmsMessage};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{basic_auth, body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Creates a transport pointed at a mock server, bypassing Config.
    fn test_transport(base_url: &str) -> ZendeskTransport {
        ZendeskTransport {
            http: Client::new(),
            base_url: base_url.to_string(),
            host: "subdomain.zendesk.com".to_string(),
            username: "foo@local.host".to_string(),
            token: "abc123".to_string(),
        }
    }

    fn created_response() -> ResponseTemplate {
        ResponseTemplate::new(201).set_body_string(
            r#"{"request":{"description":"","id":33,"status":"new","subject":"My message"}}"#,
        )
    }

    #[derive(Debug)]
    struct ForeignOptions;

    impl MessageOptions for ForeignOptions {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[tokio::test]
    async fn test_creates_ticket_from_bare_chat_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/tickets.json"))
            .and(basic_auth("foo@local.host/token", "abc123"))
            .and(body_json(json!({ "ticket": { "subject": "My message" } })))
            .respond_with(created_response())
            .expect(1)
            .mount(&server)
            .await;

        let transport = test_transport(&server.uri());
        let sent = transport
            .send(ChatMessage::new("My message").into())
            .await
            .unwrap();

        assert_eq!(sent.message_id(), "33");
        assert_eq!(
            sent.transport(),
            "zendesk://foo@local.host:abc123@subdomain.zendesk.com"
        );
    }

    #[tokio::test]
    async fn test_creates_ticket_from_notification() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/tickets.json"))
            .and(body_json(json!({
                "ticket": { "subject": "My message", "priority": "high" }
            })))
            .respond_with(created_response())
            .expect(1)
            .mount(&server)
            .await;

        let transport = test_transport(&server.uri());
        let message = ChatMessage::from_notification(Notification::new("My message"));
        let sent = transport.send(message.into()).await.unwrap();

        assert_eq!(sent.message_id(), "33");
    }

    #[tokio::test]
    async fn test_creates_ticket_with_explicit_options() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/tickets.json"))
            .and(body_json(json!({
                "ticket": {
                    "subject": "My message",
                    "comment": { "body": "My description" },
                    "priority": "low"
                }
            })))
            .respond_with(created_response())
            .expect(1)
            .mount(&server)
            .await;

        let options = ZendeskOptions::new()
            .subject("My message")
            .text("My description")
            .priority("low");

        let transport = test_transport(&server.uri());
        let message = ChatMessage::new("").with_options(options);
        let sent = transport.send(message.into()).await.unwrap();

        assert_eq!(sent.message_id(), "33");
    }

    #[tokio::test]
    async fn test_creates_request_with_requester_and_auth_override() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/requests.json"))
            .and(basic_auth("bar@local.host/token", "abc123"))
            .and(body_json(json!({
                "request": {
                    "subject": "My message",
                    "requester": { "name": "foo", "email": "foo@local.host" }
                }
            })))
            .respond_with(created_response())
            .expect(1)
            .mount(&server)
            .await;

        let options = ZendeskOptions::new()
            .subject("My message")
            .as_request(true)
            .email_address("bar@local.host")
            .requester("foo@local.host", None);

        let transport = test_transport(&server.uri());
        let message = ChatMessage::new("").with_options(options);
        let sent = transport.send(message.into()).await.unwrap();

        assert_eq!(sent.message_id(), "33");
    }

    #[tokio::test]
    async fn test_unparseable_body_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("foo"))
            .mount(&server)
            .await;

        let transport = test_transport(&server.uri());
        let err = transport
            .send(ChatMessage::new("My message").into())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ZendeskError::InvalidResponse { status: 500, .. }
        ));
        assert!(err.to_string().contains("Invalid response"));
    }

    #[tokio::test]
    async fn test_rejection_carries_description() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500).set_body_string(r#"{"description":"foo"}"#),
            )
            .mount(&server)
            .await;

        let transport = test_transport(&server.uri());
        let err = transport
            .send(ChatMessage::new("My message").into())
            .await
            .unwrap_err();

        match err {
            ZendeskError::Rejected {
                status,
                description,
            } => {
                assert_eq!(status, 500);
                assert_eq!(description, "foo");
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejection_falls_back_to_raw_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(422).set_body_string(r#"{"error":"RecordInvalid"}"#),
            )
            .mount(&server)
            .await;

        let transport = test_transport(&server.uri());
        let err = transport
            .send(ChatMessage::new("My message").into())
            .await
            .unwrap_err();

        match err {
            ZendeskError::Rejected {
                status,
                description,
            } => {
                assert_eq!(status, 422);
                assert_eq!(description, r#"{"error":"RecordInvalid"}"#);
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_id_on_created_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"request":{}}"#))
            .mount(&server)
            .await;

        let transport = test_transport(&server.uri());
        let err = transport
            .send(ChatMessage::new("My message").into())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ZendeskError::InvalidResponse { status: 201, .. }
        ));
    }

    #[tokio::test]
    async fn test_connection_failure_is_unreachable() {
        // Nothing listens on port 1.
        let transport = test_transport("http://127.0.0.1:1");
        let err = transport
            .send(ChatMessage::new("My message").into())
            .await
            .unwrap_err();

        assert!(matches!(err, ZendeskError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_rejects_sms_messages() {
        let transport = test_transport("http://unused.invalid");
        let err = transport
            .send(SmsMessage::new("1234567", "My message").into())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ZendeskError::UnsupportedMessage { kind: "sms" }
        ));
    }

    #[tokio::test]
    async fn test_rejects_foreign_options() {
        let transport = test_transport("http://unused.invalid");
        let message = ChatMessage::new("My message").with_options(ForeignOptions);
        let err = transport.send(message.into()).await.unwrap_err();

        assert!(matches!(err, ZendeskError::UnsupportedOptions));
    }

    #[test]
    fn test_supports() {
        let transport = test_transport("http://unused.invalid");

        assert!(transport.supports(&ChatMessage::new("My message").into()));
        assert!(transport.supports(
            &ChatMessage::new("My message")
                .with_options(ZendeskOptions::new().priority("low"))
                .into()
        ));
        assert!(!transport
            .supports(&ChatMessage::new("My message").with_options(ForeignOptions).into()));
        assert!(!transport.supports(&SmsMessage::new("1234567", "My message").into()));
    }

    #[test]
    fn test_canonical_form() {
        let config = Config::new("subdomain", "foo@local.host", "abc123");
        let transport = ZendeskTransport::with_client(&config, Client::new());
        assert_eq!(
            transport.to_string(),
            "zendesk://foo@local.host:abc123@subdomain.zendesk.com"
        );
    }

    #[tokio::test]
    async fn test_importance_mapping_reaches_the_wire() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_json(json!({
                "ticket": { "subject": "My message", "priority": "normal" }
            })))
            .respond_with(created_response())
            .expect(1)
            .mount(&server)
            .await;

        let notification = Notification::new("My message").importance(Importance::Medium);
        let transport = test_transport(&server.uri());
        transport
            .send(ChatMessage::from_notification(notification).into())
            .await
            .unwrap();
    }
}
