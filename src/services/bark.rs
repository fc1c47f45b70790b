// src/services/bark.rs

//! Bark push delivery.
//!
//! The notification is serialized to JSON, encrypted with the configured
//! [`SecureChannel`] and posted as `?ciphertext=...&iv=...` to
//! `{BARK_BASE_URL}{DEVICE_KEY}`. Exactly one attempt is made.

use reqwest::Client;

use crate::crypto::SecureChannel;
use crate::error::{AppError, Result};
use crate::models::{DeliveryResult, NotificationConfig, NotificationPayload};
use crate::pipeline::DeltaReport;

/// Client for one Bark device.
#[derive(Debug, Clone)]
pub struct BarkClient {
    client: Client,
    endpoint: String,
    icon: String,
    notification: NotificationConfig,
    channel: SecureChannel,
}

impl BarkClient {
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        icon: impl Into<String>,
        notification: NotificationConfig,
        channel: SecureChannel,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            icon: icon.into(),
            notification,
            channel,
        }
    }

    /// Payload that [`send`](Self::send) would push for `report`.
    pub fn build_payload(&self, report: &DeltaReport) -> NotificationPayload {
        NotificationPayload::new(report.render(), &self.icon, &self.notification)
    }

    /// Encrypt and push the report.
    ///
    /// A non-200 answer is returned as an unsuccessful [`DeliveryResult`];
    /// only encoding and transport problems are errors.
    pub async fn send(&self, report: &DeltaReport) -> Result<DeliveryResult> {
        let payload = self.build_payload(report);
        let plaintext = payload.to_json().map_err(AppError::encoding)?;
        let envelope = self.channel.seal(&plaintext)?;

        log::debug!(
            "POST {} ({} bytes of ciphertext)",
            self.endpoint,
            envelope.ciphertext.len()
        );
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("ciphertext", envelope.ciphertext.as_str()),
                ("iv", envelope.iv.as_str()),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = body_text(response.text().await);
        Ok(DeliveryResult::from_response(status, body))
    }
}

/// Response body, or a marker naming the read error.
fn body_text(read: reqwest::Result<String>) -> String {
    read.unwrap_or_else(|e| {
        log::debug!("Failed to read Bark response body: {}", e);
        format!("<unreadable response body: {e}>")
    })
}
