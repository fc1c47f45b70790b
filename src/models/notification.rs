//! Bark notification payload and delivery outcome.

use serde::{Deserialize, Serialize};

use crate::models::NotificationConfig;

/// JSON document encrypted and pushed to Bark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationPayload {
    pub body: String,
    pub title: String,
    pub icon: String,
    pub group: String,

    /// Bark expects `"1"` to keep the message in its history
    #[serde(rename = "isArchive", skip_serializing_if = "Option::is_none")]
    pub is_archive: Option<String>,
}

impl NotificationPayload {
    /// Build a payload from a rendered body and the static notification fields.
    pub fn new(
        body: impl Into<String>,
        icon: impl Into<String>,
        config: &NotificationConfig,
    ) -> Self {
        Self {
            body: body.into(),
            title: config.title.clone(),
            icon: icon.into(),
            group: config.group.clone(),
            is_archive: config.archive.then(|| "1".to_string()),
        }
    }

    /// Compact JSON form used as the plaintext.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Result of a single push attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    pub success: bool,
    pub status_code: u16,
    /// Response text, kept for diagnostics when the push was rejected
    pub body: Option<String>,
}

impl DeliveryResult {
    /// Only HTTP 200 counts as delivered.
    pub fn from_response(status_code: u16, body: String) -> Self {
        let success = status_code == 200;
        Self {
            success,
            status_code,
            body: if success { None } else { Some(body) },
        }
    }
}
