use crate::error::{ClientError, Result};
use crate::http::ApiClient;
use crate::models::{SchoolSettings, SettingsPatch};

#[derive(Debug, Clone, Copy)]
pub struct SettingsApi<'a> {
    api: &'a ApiClient,
}

impl<'a> SettingsApi<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn get(&self) -> Result<SchoolSettings> {
        self.api.get("/settings/").await
    }

    pub async fn update(&self, patch: &SettingsPatch) -> Result<SchoolSettings> {
        if patch.is_empty() {
            return Err(ClientError::InvalidInput("Nothing to update".to_string()));
        }
        let settings: SchoolSettings = self.api.patch("/settings/", patch).await?;
        tracing::info!("School settings saved");
        Ok(settings)
    }
}
