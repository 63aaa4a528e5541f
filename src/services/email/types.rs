// Shared types for the email module

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Failed to send email: {0}")]
    SendError(String),

    #[error("Template rendering error: {0}")]
    TemplateError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Service unavailable")]
    ServiceUnavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
    pub reply_to: Option<String>,
}

impl EmailMessage {
    pub fn new(from: String, to: Vec<String>, subject: String, html: String) -> Self {
        Self {
            from,
            to,
            subject,
            html,
            text: None,
            reply_to: None,
        }
    }

    pub fn with_text(mut self, text: String) -> Self {
        self.text = Some(text);
        self
    }

    pub fn with_reply_to(mut self, reply_to: String) -> Self {
        self.reply_to = Some(reply_to);
        self
    }
}

pub trait EmailBuilder {
    fn build(&self) -> Result<EmailMessage, EmailError>;
}

#[derive(Serialize)]
pub struct VerificationEmailData {
    pub verify_url: String,
    pub user_name: String,
    pub user_email: String,
    pub app_name: String,
    pub support_email: String,
    pub expiry_hours: i64,
}

#[derive(Serialize)]
pub struct VerificationResultEmailData {
    pub user_name: String,
    pub company_name: String,
    pub approved: bool,
    pub reason: Option<String>,
    pub app_name: String,
    pub app_url: String,
    pub support_email: String,
}

/// Payload accepted by the HTTP email API. Optional fields are omitted
/// rather than sent as null.
#[derive(Debug, Serialize)]
pub struct EmailApiPayload {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

impl From<EmailMessage> for EmailApiPayload {
    fn from(message: EmailMessage) -> Self {
        Self {
            from: message.from,
            to: message.to,
            subject: message.subject,
            html: message.html,
            text: message.text,
            reply_to: message.reply_to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_omits_empty_optionals() {
        let message = EmailMessage::new(
            "Marketplace <noreply@example.com>".to_string(),
            vec!["brand@example.com".to_string()],
            "Subject".to_string(),
            "<p>Hi</p>".to_string(),
        );

        let json = serde_json::to_value(EmailApiPayload::from(message)).unwrap();
        assert!(json.get("text").is_none());
        assert!(json.get("reply_to").is_none());
        assert_eq!(json["to"][0], "brand@example.com");
    }

    #[test]
    fn test_payload_keeps_text_and_reply_to() {
        let message = EmailMessage::new(
            "from@example.com".to_string(),
            vec!["to@example.com".to_string()],
            "Subject".to_string(),
            "<p>Hi</p>".to_string(),
        )
        .with_text("Hi".to_string())
        .with_reply_to("support@example.com".to_string());

        let payload = EmailApiPayload::from(message);
        assert_eq!(payload.text.as_deref(), Some("Hi"));
        assert_eq!(payload.reply_to.as_deref(), Some("support@example.com"));
    }
}
