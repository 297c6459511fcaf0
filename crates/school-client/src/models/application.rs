use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Where an enrolment request stands in the admin pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    New,
    Contacted,
    Registered,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::New => "new",
            ApplicationStatus::Contacted => "contacted",
            ApplicationStatus::Registered => "registered",
        }
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(ApplicationStatus::New),
            "contacted" => Ok(ApplicationStatus::Contacted),
            "registered" => Ok(ApplicationStatus::Registered),
            other => Err(format!(
                "Unknown application status '{}'. Use: new, contacted, or registered",
                other
            )),
        }
    }
}

/// Enrolment request left on the public site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub name: String,
    pub phone: String,
    #[serde(default, rename = "class")]
    pub student_class: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub comment: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Public request form.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ApplicationForm {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 5, message = "Phone number is required"))]
    pub phone: String,
    #[serde(rename = "class", skip_serializing_if = "String::is_empty")]
    pub student_class: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subject: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusUpdate {
    pub status: ApplicationStatus,
}
