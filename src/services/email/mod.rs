// Email service: coordinates template builders and the sender

pub mod builders;
pub mod sender;
pub mod types;

use self::types::EmailBuilder;
use crate::app_config::EmailConfig;
use anyhow::Result;
use builders::{VerificationEmailBuilder, VerificationResultEmailBuilder};
use handlebars::Handlebars;
use sender::EmailSender;
use std::sync::Arc;
use tracing::{info, instrument};

pub use types::{EmailError, EmailMessage};

#[derive(Clone)]
pub struct EmailService {
    sender: EmailSender,
    config: EmailConfig,
    templates: Arc<Handlebars<'static>>,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Result<Self> {
        let templates = Self::build_templates()?;

        let sender = EmailSender::new(config.api_url.clone(), config.api_key.clone())
            .with_max_retries(3)
            .with_retry_delay(std::time::Duration::from_secs(1));

        if sender.is_dry_run() {
            info!("EMAIL_API_KEY is empty; emails will be logged, not delivered");
        }

        Ok(Self {
            sender,
            config,
            templates: Arc::new(templates),
        })
    }

    pub(crate) fn build_templates() -> Result<Handlebars<'static>, EmailError> {
        let mut templates = Handlebars::new();

        templates
            .register_template_string(
                "verification",
                include_str!("../../templates/email/verification.html"),
            )
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        templates
            .register_template_string(
                "verification_result",
                include_str!("../../templates/email/verification_result.html"),
            )
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        Ok(templates)
    }

    pub fn is_dry_run(&self) -> bool {
        self.sender.is_dry_run()
    }

    #[instrument(skip(self, token))]
    pub async fn send_verification_email(
        &self,
        to_email: &str,
        user_name: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        info!("Sending verification email to {}", to_email);

        let message =
            VerificationEmailBuilder::new(to_email, user_name, token, &self.config, &self.templates)
                .build()?;

        self.sender.send_with_retry(message).await
    }

    #[instrument(skip(self))]
    pub async fn send_company_verification_result(
        &self,
        to_email: &str,
        company_name: &str,
        approved: bool,
        reason: Option<&str>,
    ) -> Result<(), EmailError> {
        info!(
            "Sending company verification result ({}) to {}",
            if approved { "approved" } else { "rejected" },
            to_email
        );

        let message = VerificationResultEmailBuilder::new(
            to_email,
            company_name,
            approved,
            reason,
            &self.config,
            &self.templates,
        )
        .build()?;

        self.sender.send_with_retry(message).await
    }
}
