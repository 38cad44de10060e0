//! Twilio SMS implementation of Notifier.

use async_trait::async_trait;
use core_config::twilio::TwilioConfig;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::error::{TodoError, TodoResult};
use crate::notifier::Notifier;

/// SMS notifier backed by the Twilio Messages API
pub struct TwilioNotifier {
    config: TwilioConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    message: Option<String>,
}

impl TwilioNotifier {
    /// Create a new TwilioNotifier with the request timeout from config
    pub fn new(config: TwilioConfig) -> TodoResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TodoError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn send(&self, contact: &str, message: &str) -> TodoResult<()> {
        debug!(to = %contact, "Sending SMS via Twilio");

        let response = self
            .client
            .post(self.config.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("From", self.config.sender_number.as_str()),
                ("To", contact),
                ("Body", message),
            ])
            .send()
            .await
            .map_err(|e| TodoError::Delivery(format!("Twilio request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            info!(to = %contact, "SMS sent successfully via Twilio");
            Ok(())
        } else {
            let error_body = response.text().await.unwrap_or_default();
            error!(
                to = %contact,
                status = %status,
                error = %error_body,
                "Failed to send SMS via Twilio"
            );

            // Try to parse the error response
            let error_message = serde_json::from_str::<TwilioErrorBody>(&error_body)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or(error_body);

            Err(TodoError::Delivery(format!(
                "Twilio error ({}): {}",
                status, error_message
            )))
        }
    }
}
