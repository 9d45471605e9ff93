// src/alert/twilio.rs

use std::time::Duration;

use tracing::{debug, info};

use crate::alert::{AlertError, AlertFuture, AlertSink};
use crate::config::TwilioCredentials;

/// Sends alerts as SMS through the Twilio Messages API.
///
/// `POST {api_base}/2010-04-01/Accounts/{sid}/Messages.json` with basic
/// auth and the form fields `To`, `From`, `Body`. Any non-2xx answer is a
/// delivery failure; nothing is retried here.
pub struct TwilioAlertSink {
    creds: TwilioCredentials,
    client: reqwest::Client,
}

impl TwilioAlertSink {
    pub fn new(creds: TwilioCredentials) -> Result<Self, AlertError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AlertError::Unavailable(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { creds, client })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.creds.api_base, self.creds.account_sid
        )
    }

    async fn send_sms(&self, message: &str) -> Result<(), AlertError> {
        let url = self.messages_url();
        debug!(url = %url, to = %self.creds.to, "sending SMS alert");

        let form = [
            ("To", self.creds.to.as_str()),
            ("From", self.creds.from.as_str()),
            ("Body", message),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.creds.account_sid, Some(&self.creds.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| AlertError::DeliveryFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AlertError::DeliveryFailed(format!(
                "twilio answered {status}: {}",
                body.trim()
            )));
        }

        info!(to = %self.creds.to, "SMS alert sent");
        Ok(())
    }
}

impl AlertSink for TwilioAlertSink {
    fn send<'a>(&'a self, message: &'a str) -> AlertFuture<'a> {
        Box::pin(self.send_sms(message))
    }
}
