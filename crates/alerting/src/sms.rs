//! SMS Gateway Integration

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::AlertError;

/// Default Twilio REST endpoint
pub const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// SMS gateway credentials and recipients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub from_number: Option<String>,
    pub to_number: Option<String>,
    /// Override for the REST endpoint
    pub api_base: Option<String>,
}

impl SmsConfig {
    /// All credentials and both numbers present and non-empty
    pub fn is_complete(&self) -> bool {
        [
            &self.account_sid,
            &self.auth_token,
            &self.from_number,
            &self.to_number,
        ]
        .iter()
        .all(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

/// Outbound SMS channel
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Whether the gateway can deliver messages
    fn is_configured(&self) -> bool;

    /// Send `body` to the configured recipient, returning the provider message id
    async fn send(&self, body: &str) -> Result<String, AlertError>;
}

/// Gateway used when no credentials are configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGateway;

#[async_trait]
impl SmsGateway for DisabledGateway {
    fn is_configured(&self) -> bool {
        false
    }

    async fn send(&self, _body: &str) -> Result<String, AlertError> {
        Err(AlertError::NotConfigured)
    }
}

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
}

/// Twilio Messages API sender
#[derive(Debug, Clone)]
pub struct TwilioGateway {
    account_sid: String,
    auth_token: String,
    from_number: String,
    to_number: String,
    api_base: String,
    client: Client,
}

impl TwilioGateway {
    /// Build a gateway from complete credentials, `None` otherwise
    pub fn from_config(config: &SmsConfig) -> Option<Self> {
        if !config.is_complete() {
            return None;
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Some(Self {
            account_sid: config.account_sid.clone()?,
            auth_token: config.auth_token.clone()?,
            from_number: config.from_number.clone()?,
            to_number: config.to_number.clone()?,
            api_base: config
                .api_base
                .clone()
                .unwrap_or_else(|| TWILIO_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            client,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        )
    }
}

#[async_trait]
impl SmsGateway for TwilioGateway {
    fn is_configured(&self) -> bool {
        true
    }

    async fn send(&self, body: &str) -> Result<String, AlertError> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("From", self.from_number.as_str()),
                ("To", self.to_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(|e| AlertError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Twilio rejected SMS ({}): {}", status, body);
            return Err(AlertError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let message: TwilioMessage = response
            .json()
            .await
            .map_err(|e| AlertError::Transport(format!("Failed to parse Twilio response: {}", e)))?;

        info!("SMS sent to {} (sid: {})", self.to_number, message.sid);
        Ok(message.sid)
    }
}

/// Pick the Twilio gateway when credentials are complete, else the disabled one
pub fn gateway_from_config(config: &SmsConfig) -> Arc<dyn SmsGateway> {
    match TwilioGateway::from_config(config) {
        Some(gateway) => Arc::new(gateway),
        None => {
            info!("SMS credentials incomplete, SMS alerts disabled");
            Arc::new(DisabledGateway)
        }
    }
}
