use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Testimonial shown on the landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub author: String,
    pub text: String,
    #[serde(default, alias = "scoreInfo")]
    pub score_info: String,
}

impl Review {
    /// Author line is "Name, context"; cards show only the name.
    pub fn author_name(&self) -> &str {
        self.author.split(',').next().unwrap_or("").trim()
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct ReviewForm {
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "Review text is required"))]
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub score_info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default)]
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogCategory {
    pub id: i64,
    pub name: String,
    pub slug: String,
}
