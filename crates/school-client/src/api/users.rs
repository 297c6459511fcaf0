use validator::Validate;

use crate::error::{ClientError, Result};
use crate::http::ApiClient;
use crate::models::{Enrollment, ListQuery, NewUser, Page, PublicTeacher, Role, User, UserPatch};

/// Account administration plus the public teacher directory.
#[derive(Debug, Clone, Copy)]
pub struct UsersApi<'a> {
    api: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Page<User>> {
        self.api.get_with_query("/users/all/", query).await
    }

    /// Users with the student role.
    pub async fn students(&self, query: &ListQuery) -> Result<Page<User>> {
        let query = query.clone().role(Role::Student);
        self.list(&query).await
    }

    pub async fn get(&self, id: i64) -> Result<User> {
        self.api.get(&format!("/users/all/{}/", id)).await
    }

    pub async fn create(&self, user: &NewUser) -> Result<User> {
        user.validate()?;
        let created: User = self.api.post("/users/all/", user).await?;
        tracing::info!(user_id = created.id, role = %created.role, "User created");
        Ok(created)
    }

    pub async fn update(&self, id: i64, patch: &UserPatch) -> Result<User> {
        if patch.is_empty() {
            return Err(ClientError::InvalidInput("Nothing to update".to_string()));
        }
        patch.validate()?;
        self.api.patch(&format!("/users/all/{}/", id), patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.api.delete(&format!("/users/all/{}/", id)).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    /// Enrol a student in one or more courses.
    pub async fn enroll(&self, student_id: i64, course_ids: &[i64]) -> Result<()> {
        if course_ids.is_empty() {
            return Err(ClientError::InvalidInput(
                "Select at least one course".to_string(),
            ));
        }
        let body = Enrollment {
            course_ids: course_ids.to_vec(),
        };
        let _: serde_json::Value = self
            .api
            .post(&format!("/users/students/{}/enroll/", student_id), &body)
            .await?;
        tracing::info!(student_id, courses = course_ids.len(), "Student enrolled");
        Ok(())
    }

    pub async fn public_teachers(&self) -> Result<Vec<PublicTeacher>> {
        self.api.get("/users/public-teachers/").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client_with_token;
    use crate::testing::StubBackend;

    #[tokio::test]
    async fn test_list_filters_by_role_and_search() {
        let backend = StubBackend::start().await;
        let api = client_with_token(&backend, Some(StubBackend::ADMIN_ACCESS));

        let all = api.users().list(&ListQuery::new()).await.unwrap();
        assert_eq!(all.total(), 3);

        let students = api.users().students(&ListQuery::new()).await.unwrap();
        assert!(students.items().iter().all(|u| u.role == Role::Student));

        let found = api
            .users()
            .list(&ListQuery::new().search("ospanova").page(1, 10))
            .await
            .unwrap();
        assert_eq!(found.total(), 1);
        assert_eq!(found.items()[0].username, "teacher");
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let backend = StubBackend::start().await;
        let api = client_with_token(&backend, Some(StubBackend::STUDENT_ACCESS));
        let err = api.users().list(&ListQuery::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_create_validates_before_sending() {
        let backend = StubBackend::start().await;
        let api = client_with_token(&backend, Some(StubBackend::ADMIN_ACCESS));

        let invalid = NewUser {
            username: "newbie".into(),
            email: "newbie@school.kz".into(),
            password: "short".into(),
            first_name: String::new(),
            last_name: String::new(),
            role: Role::Student,
        };
        let err = api.users().create(&invalid).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(ref m) if m.contains("8 characters")));
        assert_eq!(backend.last_authorization(), None);

        let valid = NewUser {
            password: "long-enough".into(),
            ..invalid
        };
        let created = api.users().create(&valid).await.unwrap();
        assert_eq!(created.username, "newbie");
        assert_eq!(api.users().get(created.id).await.unwrap().email, "newbie@school.kz");
    }

    #[tokio::test]
    async fn test_duplicate_username_is_a_validation_error() {
        let backend = StubBackend::start().await;
        let api = client_with_token(&backend, Some(StubBackend::ADMIN_ACCESS));
        let duplicate = NewUser {
            username: "student".into(),
            email: "other@school.kz".into(),
            password: "long-enough".into(),
            first_name: String::new(),
            last_name: String::new(),
            role: Role::Student,
        };
        match api.users().create(&duplicate).await.unwrap_err() {
            ClientError::Validation { fields, .. } => assert!(fields.contains_key("username")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_delete_and_enroll() {
        let backend = StubBackend::start().await;
        let api = client_with_token(&backend, Some(StubBackend::ADMIN_ACCESS));

        let patch = UserPatch {
            is_active: Some(false),
            ..UserPatch::default()
        };
        let user = api.users().update(2, &patch).await.unwrap();
        assert_eq!(user.is_active, Some(false));

        api.users().enroll(2, &[10, 11]).await.unwrap();
        assert!(matches!(
            api.users().enroll(2, &[]).await,
            Err(ClientError::InvalidInput(_))
        ));

        api.users().delete(2).await.unwrap();
        assert!(matches!(
            api.users().get(2).await,
            Err(ClientError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_public_teachers_need_no_session() {
        let backend = StubBackend::start().await;
        let api = client_with_token(&backend, None);
        let teachers = api.users().public_teachers().await.unwrap();
        assert_eq!(teachers.len(), 1);
        assert_eq!(teachers[0].subjects(), vec!["Math", "Physics"]);
    }
}
