// Delivery through the HTTP email API, or a logging dry-run when no API key
// is configured

use super::types::{EmailApiPayload, EmailError, EmailMessage};
use rand::Rng;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct EmailSender {
    client: Arc<Client>,
    api_key: String,
    api_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl EmailSender {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Arc::new(Client::new()),
            api_key,
            api_url,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.api_key.trim().is_empty()
    }

    #[instrument(skip(self, message), fields(to = ?message.to, subject = %message.subject))]
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.is_dry_run() {
            info!(
                body = message.text.as_deref().unwrap_or(""),
                "Email API key not configured, logging email instead of sending"
            );
            return Ok(());
        }

        let payload: EmailApiPayload = message.into();

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(res) if res.status().is_success() => {
                info!("Email sent successfully");
                Ok(())
            },
            Ok(res) => {
                let status = res.status();
                let error_text = res
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());

                error!(
                    "Failed to send email. Status: {}, Error: {}",
                    status, error_text
                );

                if status.as_u16() == 429 {
                    Err(EmailError::RateLimitExceeded)
                } else if status.is_server_error() {
                    Err(EmailError::ServiceUnavailable)
                } else {
                    Err(EmailError::SendError(format!(
                        "Email send failed with status {}: {}",
                        status, error_text
                    )))
                }
            },
            Err(e) => {
                error!("Network error while sending email: {:?}", e);
                Err(EmailError::SendError(format!("Network error: {}", e)))
            },
        }
    }

    /// Retries transient failures with exponential backoff and jitter.
    /// Rate limiting is never retried.
    #[instrument(skip(self, message), fields(to = ?message.to, subject = %message.subject))]
    pub async fn send_with_retry(&self, message: EmailMessage) -> Result<(), EmailError> {
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self.send(message.clone()).await {
                Ok(()) => return Ok(()),
                Err(EmailError::RateLimitExceeded) => {
                    warn!("Rate limit hit, not retrying");
                    return Err(EmailError::RateLimitExceeded);
                },
                Err(e) => {
                    warn!("Email send attempt {} failed: {:?}", attempt, e);
                    last_error = Some(e);

                    if attempt < self.max_retries {
                        let base_delay = self.backoff_delay(attempt);
                        let jitter_millis =
                            rand::thread_rng().gen_range(0..=(base_delay.as_millis() / 4) as u64);
                        let delay = base_delay + Duration::from_millis(jitter_millis);

                        info!("Retrying in {:?} (with jitter)", delay);
                        tokio::time::sleep(delay).await;
                    }
                },
            }
        }

        Err(last_error.unwrap_or_else(|| {
            EmailError::SendError("Failed after maximum retry attempts".to_string())
        }))
    }

    /// `retry_delay * 2^(attempt-1)`, capped at one minute and safe against
    /// overflow
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = 2_u32
            .checked_pow(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.retry_delay
            .checked_mul(exp)
            .unwrap_or(MAX_RETRY_DELAY)
            .min(MAX_RETRY_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> EmailSender {
        EmailSender::new(
            "http://127.0.0.1:9/emails".to_string(),
            "test_key".to_string(),
        )
    }

    #[test]
    fn test_exponential_backoff() {
        let sender = sender().with_retry_delay(Duration::from_secs(2));

        assert_eq!(sender.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(sender.backoff_delay(2), Duration::from_secs(4));
        assert_eq!(sender.backoff_delay(3), Duration::from_secs(8));
        assert_eq!(sender.backoff_delay(50), MAX_RETRY_DELAY);
    }

    #[test]
    fn test_backoff_multiplication_overflow_is_capped() {
        let sender = sender().with_retry_delay(Duration::from_secs(u32::MAX as u64));
        assert_eq!(sender.backoff_delay(2), MAX_RETRY_DELAY);
    }

    #[tokio::test]
    async fn test_dry_run_never_touches_the_network() {
        let sender = EmailSender::new("http://127.0.0.1:9/emails".to_string(), String::new());
        assert!(sender.is_dry_run());

        let message = EmailMessage::new(
            "from@example.com".to_string(),
            vec!["to@example.com".to_string()],
            "Subject".to_string(),
            "<p>Body</p>".to_string(),
        );
        assert!(sender.send_with_retry(message).await.is_ok());
    }
}
