//! Ticket option accumulation for the Zendesk transport.
//!
//! `ZendeskOptions` is a fluent builder for the fields of a ticket or
//! request. It performs no validation (Zendesk validates server-side) and
//! cannot fail; it only accumulates values and snapshots them into a typed
//! [`TicketFields`] for serialization.

use serde::Serialize;

use crate::message::{ChatMessage, Importance, MessageOptions, Notification};

/// The requester of an anonymous request submission.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Requester {
    /// Display name of the requester.
    pub name: String,
    /// Email address of the requester.
    pub email: String,
}

/// The comment block nested inside a ticket payload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Comment {
    /// Longer description text of the ticket.
    pub body: String,
}

/// Serialized field set of one ticket or request submission.
///
/// Absent and empty values are never serialized, matching Zendesk's
/// expectation that unset fields are simply omitted from the payload.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct TicketFields {
    /// Ticket subject line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Longer ticket description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,

    /// Ticket priority: "low", "normal", "high" or "urgent".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    /// Tags attached to the ticket, in insertion order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Requester identity for anonymous requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<Requester>,
}

/// Fluent accumulator of ticket/request fields.
///
/// Build options explicitly, or derive them from a notification or message
/// via [`ZendeskOptions::from_notification`] / [`ZendeskOptions::from_message`].
///
/// # Example
///
/// ```
/// use zenpost::options::ZendeskOptions;
///
/// let options = ZendeskOptions::new()
///     .subject("Printer on fire")
///     .text("It is actually on fire.")
///     .priority("urgent")
///     .tag("hardware");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ZendeskOptions {
    subject: Option<String>,
    body: Option<String>,
    priority: Option<String>,
    tags: Vec<String>,
    requester: Option<Requester>,
    as_request: bool,
    email_address: Option<String>,
}

impl ZendeskOptions {
    /// Creates an empty options set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives options from a notification.
    ///
    /// The subject is taken from the notification. The ticket text is the
    /// notification content followed, if an exception trace is attached, by
    /// the trace wrapped in a code fence. The notification importance maps
    /// onto Zendesk's priority vocabulary ("medium" becomes "normal").
    pub fn from_notification(notification: &Notification) -> Self {
        let mut options = Self::new().subject(notification.subject_text());

        let mut text = String::new();
        if let Some(content) = notification.content_text() {
            text.push_str(content);
        }
        if let Some(exception) = notification.exception_as_string() {
            text.push_str("\r\n```");
            text.push_str(exception);
            text.push_str("```");
        }

        options = match notification.importance_level() {
            Importance::Low => options.priority("low"),
            Importance::Medium => options.priority("normal"),
            Importance::High => options.priority("high"),
            Importance::Urgent => options.priority("urgent"),
        };

        if !text.is_empty() {
            options = options.text(text);
        }

        options
    }

    /// Derives options from a bare chat message: subject only.
    pub fn from_message(message: &ChatMessage) -> Self {
        Self::new().subject(message.subject_text())
    }

    /// Sets the ticket subject line.
    pub fn subject(mut self, text: impl Into<String>) -> Self {
        self.subject = Some(text.into());
        self
    }

    /// Sets the longer ticket description.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.body = Some(text.into());
        self
    }

    /// Sets the ticket priority.
    ///
    /// Valid values are "low", "normal", "high" and "urgent"; the value is
    /// not validated here, Zendesk rejects unknown priorities server-side.
    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Adds a tag to the ticket.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Sets requester information for anonymous requests.
    ///
    /// When `name` is omitted it is derived from the part of the email
    /// address before the first `@`.
    pub fn requester(mut self, email: impl Into<String>, name: Option<&str>) -> Self {
        let email = email.into();
        let name = match name {
            Some(name) => name.to_string(),
            None => email.split('@').next().unwrap_or_default().to_string(),
        };
        self.requester = Some(Requester { name, email });
        self
    }

    /// By default the transport creates a ticket. Pass `true` to create a
    /// request instead. See the Zendesk documentation on tickets vs requests.
    pub fn as_request(mut self, as_request: bool) -> Self {
        self.as_request = as_request;
        self
    }

    /// Changes the username used for authentication.
    ///
    /// Use this to create tickets or requests on behalf of an existing
    /// Zendesk user. Only affects the auth header, not the payload.
    pub fn email_address(mut self, email: impl Into<String>) -> Self {
        self.email_address = Some(email.into());
        self
    }

    /// Returns true if a request should be created instead of a ticket.
    pub fn is_request(&self) -> bool {
        self.as_request
    }

    /// Returns the authentication email override, if set.
    pub fn auth_email(&self) -> Option<&str> {
        self.email_address.as_deref()
    }

    /// Snapshots the accumulated fields for serialization.
    ///
    /// The returned value is owned and detached from the builder; empty
    /// strings are dropped so they never reach the wire.
    pub fn to_fields(&self) -> TicketFields {
        TicketFields {
            subject: self.subject.clone().filter(|s| !s.is_empty()),
            comment: self
                .body
                .clone()
                .filter(|s| !s.is_empty())
                .map(|body| Comment { body }),
            priority: self.priority.clone().filter(|s| !s.is_empty()),
            tags: self.tags.clone(),
            requester: self.requester.clone(),
        }
    }
}

impl MessageOptions for ZendeskOptions {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
