//! Generic notifier message types.
//!
//! These are the channel-agnostic inputs a transport consumes: a [`Message`]
//! (chat or SMS), the optional [`Notification`] context it was derived from,
//! and the [`SentMessage`] receipt produced on success.
//!
//! Options are attached to a message as a `Box<dyn MessageOptions>` so a
//! transport can detect, via downcasting, whether it was handed options meant
//! for a different channel.

use std::any::Any;
use std::fmt;

/// Importance level carried by a generic notification.
///
/// Transports map this onto their own priority vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Importance {
    /// Informational, no urgency.
    Low,
    /// Routine importance.
    Medium,
    /// Needs attention soon. The default for a fresh notification.
    #[default]
    High,
    /// Needs attention immediately.
    Urgent,
}

/// A channel-agnostic notification: the event a message is built from.
#[derive(Debug, Clone)]
pub struct Notification {
    subject: String,
    content: Option<String>,
    exception: Option<String>,
    importance: Importance,
}

impl Notification {
    /// Creates a notification with the given subject and default importance.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            content: None,
            exception: None,
            importance: Importance::default(),
        }
    }

    /// Sets the longer body content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Attaches a pre-formatted exception trace.
    pub fn exception(mut self, exception: impl Into<String>) -> Self {
        self.exception = Some(exception.into());
        self
    }

    /// Sets the importance level.
    pub fn importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    /// Returns the subject line.
    pub fn subject_text(&self) -> &str {
        &self.subject
    }

    /// Returns the body content, if any.
    pub fn content_text(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Returns the formatted exception trace, if any.
    pub fn exception_as_string(&self) -> Option<&str> {
        self.exception.as_deref()
    }

    /// Returns the importance level.
    pub fn importance_level(&self) -> Importance {
        self.importance
    }
}

/// Channel-specific options attached to a message.
///
/// Implemented by each channel's option builder (e.g.
/// [`ZendeskOptions`](crate::options::ZendeskOptions)). The `as_any` hook
/// lets a transport check that the options it received are its own.
pub trait MessageOptions: fmt::Debug + Send + Sync {
    /// Returns self as `Any` for downcasting by the owning transport.
    fn as_any(&self) -> &dyn Any;
}

/// A chat-style message: the kind the Zendesk transport supports.
#[derive(Debug)]
pub struct ChatMessage {
    subject: String,
    notification: Option<Notification>,
    options: Option<Box<dyn MessageOptions>>,
}

impl ChatMessage {
    /// Creates a chat message with the given subject.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            notification: None,
            options: None,
        }
    }

    /// Creates a chat message from a notification, keeping the notification
    /// attached so transports can derive channel options from it.
    pub fn from_notification(notification: Notification) -> Self {
        Self {
            subject: notification.subject_text().to_string(),
            notification: Some(notification),
            options: None,
        }
    }

    /// Attaches channel-specific options.
    pub fn with_options(mut self, options: impl MessageOptions + 'static) -> Self {
        self.options = Some(Box::new(options));
        self
    }

    /// Returns the subject line.
    pub fn subject_text(&self) -> &str {
        &self.subject
    }

    /// Returns the attached notification, if any.
    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Returns the attached options, if any.
    pub fn options(&self) -> Option<&dyn MessageOptions> {
        self.options.as_deref()
    }
}

/// An SMS message. Not supported by the Zendesk transport; exists so callers
/// can route mixed message streams and transports can refuse foreign kinds.
#[derive(Debug, Clone)]
pub struct SmsMessage {
    phone: String,
    subject: String,
}

impl SmsMessage {
    /// Creates an SMS message for the given phone number.
    pub fn new(phone: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            subject: subject.into(),
        }
    }

    /// Returns the recipient phone number.
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Returns the message text.
    pub fn subject_text(&self) -> &str {
        &self.subject
    }
}

/// A message handed to a transport for sending.
#[derive(Debug)]
pub enum Message {
    /// A chat-style message.
    Chat(ChatMessage),
    /// An SMS message.
    Sms(SmsMessage),
}

impl Message {
    /// Human-readable name of the message kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Chat(_) => "chat",
            Message::Sms(_) => "sms",
        }
    }
}

impl From<ChatMessage> for Message {
    fn from(message: ChatMessage) -> Self {
        Message::Chat(message)
    }
}

impl From<SmsMessage> for Message {
    fn from(message: SmsMessage) -> Self {
        Message::Sms(message)
    }
}

/// Receipt for a successfully sent message.
///
/// Wraps the original message, the identifier assigned by the remote service
/// and the canonical string of the transport that sent it.
#[derive(Debug)]
pub struct SentMessage {
    message: Message,
    message_id: String,
    transport: String,
}

impl SentMessage {
    /// Creates a receipt binding a message to the transport that sent it.
    pub fn new(message: Message, message_id: String, transport: String) -> Self {
        Self {
            message,
            message_id,
            transport,
        }
    }

    /// Returns the original message.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Returns the identifier assigned by the remote service.
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// Returns the canonical string of the sending transport.
    pub fn transport(&self) -> &str {
        &self.transport
    }
}
