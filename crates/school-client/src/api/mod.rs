//! Typed calls for the feature screens.
//!
//! Each resource gets a borrowed handle off [`ApiClient`], e.g.
//! `api.courses().list(&query)`. Forms are validated locally before any
//! request is sent.

mod applications;
mod content;
mod courses;
mod settings;
mod users;

pub use applications::ApplicationsApi;
pub use content::{BlogApi, ReviewsApi};
pub use courses::CoursesApi;
pub use settings::SettingsApi;
pub use users::UsersApi;

use crate::http::ApiClient;

impl ApiClient {
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    pub fn courses(&self) -> CoursesApi<'_> {
        CoursesApi::new(self)
    }

    pub fn applications(&self) -> ApplicationsApi<'_> {
        ApplicationsApi::new(self)
    }

    pub fn reviews(&self) -> ReviewsApi<'_> {
        ReviewsApi::new(self)
    }

    pub fn blog(&self) -> BlogApi<'_> {
        BlogApi::new(self)
    }

    pub fn settings(&self) -> SettingsApi<'_> {
        SettingsApi::new(self)
    }
}
