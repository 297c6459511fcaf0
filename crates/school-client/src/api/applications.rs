use validator::Validate;

use crate::error::Result;
use crate::http::ApiClient;
use crate::models::{Application, ApplicationForm, ApplicationStatus, ApplicationStatusUpdate, ListQuery, Page};

/// Enrolment requests: submitted publicly, worked through by admins.
#[derive(Debug, Clone, Copy)]
pub struct ApplicationsApi<'a> {
    api: &'a ApiClient,
}

impl<'a> ApplicationsApi<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Page<Application>> {
        self.api.get_with_query("/applications/", query).await
    }

    pub async fn submit(&self, form: &ApplicationForm) -> Result<Application> {
        form.validate()?;
        let application: Application = self.api.post("/applications/", form).await?;
        tracing::info!(application_id = application.id, "Application submitted");
        Ok(application)
    }

    pub async fn set_status(&self, id: i64, status: ApplicationStatus) -> Result<Application> {
        let body = ApplicationStatusUpdate { status };
        self.api.patch(&format!("/applications/{}/", id), &body).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.api.delete(&format!("/applications/{}/", id)).await
    }
}
