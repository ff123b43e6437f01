//! Contact form submission
//!
//! A submission is validated, then turned into two emails: a notification
//! to the site owner and an acknowledgement to the sender. Delivery goes
//! through an [`EmailTransport`], so any transactional email API can sit
//! behind it. Callers only ever see `{"success": true}` or a generic
//! retryable failure.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown to a submitter for any failure
pub const GENERIC_FAILURE: &str = "Failed to send message. Please try again.";

/// Error type for contact submissions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Email transport error: {0}")]
    Transport(String),
}

impl ContactError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Text safe to show to the submitter
    pub fn user_message(&self) -> &'static str {
        GENERIC_FAILURE
    }
}

/// Kind of project the sender is enquiring about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    Website,
    Prototype,
    Mvp,
    FullApp,
}

impl ProjectType {
    /// Wire name of the project type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Prototype => "prototype",
            Self::Mvp => "mvp",
            Self::FullApp => "full-app",
        }
    }
}

/// Submission payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub project_type: ProjectType,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
}

impl ContactRequest {
    /// Check field lengths and the email shape, on trimmed values
    pub fn validate(&self) -> Result<(), ContactError> {
        let name = self.name.trim().chars().count();
        if !(2..=100).contains(&name) {
            return Err(ContactError::invalid("name", "must be 2 to 100 characters"));
        }

        let email = self.email.trim();
        if email.len() > 255 || !looks_like_email(email) {
            return Err(ContactError::invalid("email", "must be a valid address"));
        }

        let message = self.message.trim().chars().count();
        if !(10..=1000).contains(&message) {
            return Err(ContactError::invalid(
                "message",
                "must be 10 to 1000 characters",
            ));
        }
        Ok(())
    }
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Success payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
}

/// An outbound email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Delivery channel for outbound email
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Send one message
    async fn send(&self, message: &EmailMessage) -> Result<(), ContactError>;
}

/// Addresses used when composing emails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSettings {
    /// Where notifications go
    pub owner_address: String,
    /// Display name of the site owner, used to sign acknowledgements
    pub owner_name: String,
    /// Sender for both emails
    pub from_address: String,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            owner_address: "design@suminwalker.com".to_string(),
            owner_name: "Sumin Walker".to_string(),
            from_address: "onboarding@resend.dev".to_string(),
        }
    }
}

/// HTTP-shaped reply for a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactReply {
    pub status: u16,
    pub body: String,
}

impl ContactReply {
    fn ok() -> Self {
        Self {
            status: 200,
            body: serde_json::json!({ "success": true }).to_string(),
        }
    }

    fn error(message: &str) -> Self {
        Self {
            status: 500,
            body: serde_json::json!({ "error": message }).to_string(),
        }
    }
}

/// Validates submissions and sends both emails
pub struct ContactDispatcher<T: EmailTransport> {
    transport: T,
    settings: ContactSettings,
}

impl<T: EmailTransport> ContactDispatcher<T> {
    /// Create a dispatcher
    pub fn new(transport: T, settings: ContactSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Get a reference to the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Owner notification for `request`
    pub fn notification(&self, request: &ContactRequest) -> EmailMessage {
        let name = escape_html(request.name.trim());
        EmailMessage {
            from: format!("Contact Form <{}>", self.settings.from_address),
            to: vec![self.settings.owner_address.clone()],
            subject: format!("New Contact Form Submission from {}", request.name.trim()),
            html: format!(
                "<h1>New Contact Form Submission</h1>\
                 <p><strong>Name:</strong> {name}</p>\
                 <p><strong>Email:</strong> {}</p>\
                 <p><strong>Project Type:</strong> {}</p>\
                 <p><strong>Message:</strong></p>\
                 <p>{}</p>",
                escape_html(request.email.trim()),
                request.project_type.as_str(),
                escape_html(request.message.trim()),
            ),
        }
    }

    /// Sender acknowledgement for `request`
    pub fn acknowledgement(&self, request: &ContactRequest) -> EmailMessage {
        let owner = escape_html(&self.settings.owner_name);
        EmailMessage {
            from: format!("{} <{}>", self.settings.owner_name, self.settings.from_address),
            to: vec![request.email.trim().to_string()],
            subject: "Thank you for reaching out!".to_string(),
            html: format!(
                "<h1>Thank you for contacting me, {}!</h1>\
                 <p>I have received your message and will get back to you as soon as possible.</p>\
                 <p>Best regards,<br>{owner}</p>",
                escape_html(request.name.trim()),
            ),
        }
    }

    /// Validate and deliver a submission
    pub async fn submit(&self, request: &ContactRequest) -> Result<ContactResponse, ContactError> {
        request.validate()?;
        log::info!(
            "Contact submission from {} ({})",
            request.email.trim(),
            request.project_type.as_str()
        );

        self.transport.send(&self.notification(request)).await?;
        self.transport.send(&self.acknowledgement(request)).await?;
        Ok(ContactResponse { success: true })
    }

    /// Handle a raw JSON body and produce the HTTP reply
    pub async fn handle(&self, body: &[u8]) -> ContactReply {
        match self.process(body).await {
            Ok(_) => ContactReply::ok(),
            Err(err) => {
                log::error!("Contact submission failed: {err}");
                ContactReply::error(&err.to_string())
            }
        }
    }

    async fn process(&self, body: &[u8]) -> crate::Result<ContactResponse> {
        let request: ContactRequest = serde_json::from_slice(body)?;
        Ok(self.submit(&request).await?)
    }
}

/// Transport that records messages instead of sending them
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<EmailMessage>>,
    fail_with: Mutex<Option<String>>,
}

impl RecordingTransport {
    /// Create a transport that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later send fail with `reason`
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.fail_with.lock() = Some(reason.into());
    }

    /// Messages accepted so far
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl EmailTransport for RecordingTransport {
    async fn send(&self, message: &EmailMessage) -> Result<(), ContactError> {
        if let Some(reason) = self.fail_with.lock().clone() {
            return Err(ContactError::Transport(reason));
        }
        self.sent.lock().push(message.clone());
        Ok(())
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ContactRequest {
        ContactRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            project_type: ProjectType::Mvp,
            message: "I would like to build an MVP.".into(),
            timeline: None,
            budget: None,
        }
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::json!({
            "name": "Ada",
            "email": "ada@example.com",
            "projectType": "full-app",
            "message": "Hello there, friend.",
        });
        let parsed: ContactRequest = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.project_type, ProjectType::FullApp);
        assert_eq!(parsed.timeline, None);
    }

    #[test]
    fn test_validation_rules() {
        assert!(request().validate().is_ok());

        let mut short_name = request();
        short_name.name = " A ".into();
        assert!(matches!(
            short_name.validate(),
            Err(ContactError::Validation { field: "name", .. })
        ));

        for bad in ["ada", "ada@", "@example.com", "ada@example", "a da@example.com"] {
            let mut r = request();
            r.email = bad.into();
            assert!(r.validate().is_err(), "{bad} should be rejected");
        }

        let mut short_message = request();
        short_message.message = "hi".into();
        assert!(short_message.validate().is_err());
    }

    #[test]
    fn test_html_is_escaped() {
        let dispatcher =
            ContactDispatcher::new(RecordingTransport::new(), ContactSettings::default());
        let mut r = request();
        r.message = "<script>alert(1)</script> please".into();
        let html = dispatcher.notification(&r).html;
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_replies_are_json() {
        let ok: serde_json::Value = serde_json::from_str(&ContactReply::ok().body).unwrap();
        assert_eq!(ok, serde_json::json!({ "success": true }));

        let failed = ContactReply::error(GENERIC_FAILURE);
        assert_eq!(failed.status, 500);
        let body: serde_json::Value = serde_json::from_str(&failed.body).unwrap();
        assert_eq!(body["error"], GENERIC_FAILURE);
    }

    #[test]
    fn test_user_message_is_generic() {
        let err = ContactError::Transport("401 from provider".into());
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }
}
