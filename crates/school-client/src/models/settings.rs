use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralSettings {
    #[serde(default)]
    pub school_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub email_notifications: bool,
    #[serde(default)]
    pub sms_notifications: bool,
    #[serde(default)]
    pub payment_reminders: bool,
    #[serde(default)]
    pub class_reminders: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemSettings {
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub currency: String,
}

/// School-wide settings edited on the admin settings screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchoolSettings {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub notification: NotificationSettings,
    #[serde(default)]
    pub system: SystemSettings,
}

/// Sparse update addressed by `section.field`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsPatch(serde_json::Map<String, serde_json::Value>);

impl SettingsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one field, e.g. `general.phone` or `notification.sms_notifications`.
    ///
    /// Unknown sections or fields are rejected so typos never reach the backend.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<()> {
        let (section, field) = key
            .split_once('.')
            .ok_or_else(|| ClientError::InvalidInput(format!("Expected section.field, got '{}'", key)))?;

        let template = serde_json::to_value(SchoolSettings::default())?;
        let current = template
            .get(section)
            .and_then(|s| s.get(field))
            .ok_or_else(|| ClientError::InvalidInput(format!("Unknown setting '{}'", key)))?;

        let value = match current {
            serde_json::Value::Bool(_) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => serde_json::Value::Bool(true),
                "false" | "no" | "off" | "0" => serde_json::Value::Bool(false),
                other => {
                    return Err(ClientError::InvalidInput(format!(
                        "Setting '{}' expects true or false, got '{}'",
                        key, other
                    )))
                }
            },
            _ => serde_json::Value::String(raw.to_string()),
        };

        let entry = self
            .0
            .entry(section.to_string())
            .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
        if let serde_json::Value::Object(map) = entry {
            map.insert(field.to_string(), value);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
