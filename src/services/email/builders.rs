// One builder per email kind; each renders its template and a plain-text twin

use super::types::{
    EmailBuilder, EmailError, EmailMessage, VerificationEmailData, VerificationResultEmailData,
};
use crate::app_config::EmailConfig;
use handlebars::Handlebars;
use tracing::instrument;

/// Link to the email verification endpoint of the frontend
pub fn verification_url(frontend_url: &str, token: &str) -> String {
    format!("{}/verify-email?token={}", frontend_url, token)
}

pub struct VerificationEmailBuilder<'a> {
    to_email: &'a str,
    user_name: &'a str,
    token: &'a str,
    config: &'a EmailConfig,
    templates: &'a Handlebars<'a>,
}

impl<'a> VerificationEmailBuilder<'a> {
    pub fn new(
        to_email: &'a str,
        user_name: &'a str,
        token: &'a str,
        config: &'a EmailConfig,
        templates: &'a Handlebars<'a>,
    ) -> Self {
        Self {
            to_email,
            user_name,
            token,
            config,
            templates,
        }
    }
}

impl<'a> EmailBuilder for VerificationEmailBuilder<'a> {
    #[instrument(skip(self), fields(to = %self.to_email))]
    fn build(&self) -> Result<EmailMessage, EmailError> {
        let verify_url = verification_url(&self.config.frontend_url, self.token);

        let data = VerificationEmailData {
            verify_url: verify_url.clone(),
            user_name: self.user_name.to_string(),
            user_email: self.to_email.to_string(),
            app_name: self.config.from_name.clone(),
            support_email: self.config.support_email.clone(),
            expiry_hours: self.config.verification_ttl_hours,
        };

        let html = self
            .templates
            .render("verification", &data)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        let text = format!(
            "Hi {},\n\n\
            Please confirm your email address by opening the link below:\n\n\
            {}\n\n\
            This link expires in {} hours.\n\n\
            If you did not create an account, you can ignore this email.\n\n\
            The {} Team",
            self.user_name, verify_url, data.expiry_hours, self.config.from_name
        );

        Ok(EmailMessage::new(
            format!("{} <{}>", self.config.from_name, self.config.from_email),
            vec![self.to_email.to_string()],
            format!("Verify your {} email address", self.config.from_name),
            html,
        )
        .with_text(text))
    }
}

/// Company verification decision sent to the company owner
pub struct VerificationResultEmailBuilder<'a> {
    to_email: &'a str,
    company_name: &'a str,
    approved: bool,
    reason: Option<&'a str>,
    config: &'a EmailConfig,
    templates: &'a Handlebars<'a>,
}

impl<'a> VerificationResultEmailBuilder<'a> {
    pub fn new(
        to_email: &'a str,
        company_name: &'a str,
        approved: bool,
        reason: Option<&'a str>,
        config: &'a EmailConfig,
        templates: &'a Handlebars<'a>,
    ) -> Self {
        Self {
            to_email,
            company_name,
            approved,
            reason,
            config,
            templates,
        }
    }
}

impl<'a> EmailBuilder for VerificationResultEmailBuilder<'a> {
    #[instrument(skip(self), fields(to = %self.to_email, approved = self.approved))]
    fn build(&self) -> Result<EmailMessage, EmailError> {
        let data = VerificationResultEmailData {
            user_name: self.company_name.to_string(),
            company_name: self.company_name.to_string(),
            approved: self.approved,
            reason: self.reason.map(str::to_string),
            app_name: self.config.from_name.clone(),
            app_url: self.config.frontend_url.clone(),
            support_email: self.config.support_email.clone(),
        };

        let html = self
            .templates
            .render("verification_result", &data)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        let (subject, text) = if self.approved {
            (
                format!("{} is verified", self.company_name),
                format!(
                    "Hi,\n\n{} has been verified on {}. You can now scout influencers.\n\n\
                    The {} Team",
                    self.company_name, self.config.from_name, self.config.from_name
                ),
            )
        } else {
            (
                format!("Action needed: verification of {}", self.company_name),
                format!(
                    "Hi,\n\nWe could not verify {}.\nReason: {}\n\n\
                    Please upload corrected documents to try again.\n\n\
                    The {} Team",
                    self.company_name,
                    self.reason.unwrap_or("not specified"),
                    self.config.from_name
                ),
            )
        };

        Ok(EmailMessage::new(
            format!("{} <{}>", self.config.from_name, self.config.from_email),
            vec![self.to_email.to_string()],
            subject,
            html,
        )
        .with_text(text)
        .with_reply_to(self.config.support_email.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfig;
    use crate::services::email::EmailService;

    #[test]
    fn test_verification_email_contains_link_and_expiry() {
        let config = AppConfig::for_test().email;
        let templates = EmailService::build_templates().unwrap();

        let message = VerificationEmailBuilder::new(
            "creator@example.com",
            "Creator",
            "abc123",
            &config,
            &templates,
        )
        .build()
        .unwrap();

        assert_eq!(message.to, vec!["creator@example.com"]);
        assert!(message
            .html
            .contains("http://localhost:3000/verify-email?token=abc123"));
        assert!(message.html.contains("24 hours"));
        assert!(message.text.unwrap().contains("abc123"));
    }

    #[test]
    fn test_rejection_email_carries_reason() {
        let config = AppConfig::for_test().email;
        let templates = EmailService::build_templates().unwrap();

        let message = VerificationResultEmailBuilder::new(
            "owner@acme.test",
            "Acme",
            false,
            Some("Registration number is unreadable"),
            &config,
            &templates,
        )
        .build()
        .unwrap();

        assert!(message.subject.contains("Action needed"));
        assert!(message.html.contains("Registration number is unreadable"));
        assert_eq!(message.reply_to.as_deref(), Some("support@test.local"));
    }
}
