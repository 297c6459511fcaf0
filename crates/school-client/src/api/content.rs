use validator::Validate;

use crate::error::Result;
use crate::http::ApiClient;
use crate::models::{BlogCategory, BlogPost, ListQuery, Page, Review, ReviewForm};

/// Landing-page testimonials.
#[derive(Debug, Clone, Copy)]
pub struct ReviewsApi<'a> {
    api: &'a ApiClient,
}

impl<'a> ReviewsApi<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Review>> {
        self.api.get("/reviews/").await
    }

    pub async fn create(&self, form: &ReviewForm) -> Result<Review> {
        form.validate()?;
        self.api.post("/reviews/", form).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.api.delete(&format!("/reviews/{}/", id)).await
    }
}

/// Read-only blog.
#[derive(Debug, Clone, Copy)]
pub struct BlogApi<'a> {
    api: &'a ApiClient,
}

impl<'a> BlogApi<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn posts(&self, query: &ListQuery) -> Result<Page<BlogPost>> {
        self.api.get_with_query("/blog/posts/", query).await
    }

    pub async fn post(&self, id: i64) -> Result<BlogPost> {
        self.api.get(&format!("/blog/posts/{}/", id)).await
    }

    pub async fn categories(&self) -> Result<Vec<BlogCategory>> {
        self.api.get("/blog/categories/").await
    }
}
