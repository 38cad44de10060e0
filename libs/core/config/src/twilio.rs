use crate::{env_or_default, env_required, ConfigError, FromEnv};

/// Twilio SMS gateway configuration
#[derive(Clone, Debug)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Number the SMS messages are sent from, in E.164 format
    pub sender_number: String,
    pub api_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl TwilioConfig {
    /// Full URL of the Messages endpoint for this account
    pub fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.api_url.trim_end_matches('/'),
            self.account_sid
        )
    }
}

impl FromEnv for TwilioConfig {
    /// Reads from environment variables:
    /// - TWILIO_ACCOUNT_SID: required
    /// - TWILIO_AUTH_TOKEN: required
    /// - TWILIO_SENDER_NUMBER: required
    /// - TWILIO_API_URL: defaults to the public Twilio REST API
    /// - TWILIO_TIMEOUT_SECS: defaults to 10
    fn from_env() -> Result<Self, ConfigError> {
        let account_sid = env_required("TWILIO_ACCOUNT_SID")?;
        let auth_token = env_required("TWILIO_AUTH_TOKEN")?;
        let sender_number = env_required("TWILIO_SENDER_NUMBER")?;
        let api_url = env_or_default("TWILIO_API_URL", "https://api.twilio.com/2010-04-01");
        let request_timeout_secs = env_or_default("TWILIO_TIMEOUT_SECS", "10")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "TWILIO_TIMEOUT_SECS".to_string(),
                details: format!("{}", e),
            })?;

        Ok(Self {
            account_sid,
            auth_token,
            sender_number,
            api_url,
            request_timeout_secs,
        })
    }
}
