use validator::Validate;

use crate::error::{ClientError, Result};
use crate::http::ApiClient;
use crate::models::{Course, CourseForm, CoursePatch, Lesson, LessonForm, ListQuery, Page, UpcomingLesson};

/// Courses and their lessons.
#[derive(Debug, Clone, Copy)]
pub struct CoursesApi<'a> {
    api: &'a ApiClient,
}

impl<'a> CoursesApi<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Page<Course>> {
        self.api.get_with_query("/courses/", query).await
    }

    /// Courses of the signed-in student.
    pub async fn mine(&self) -> Result<Vec<Course>> {
        self.api.get("/courses/my/").await
    }

    pub async fn get(&self, id: i64) -> Result<Course> {
        self.api.get(&format!("/courses/{}/", id)).await
    }

    pub async fn create(&self, form: &CourseForm) -> Result<Course> {
        form.validate()?;
        let course: Course = self.api.post("/courses/", form).await?;
        tracing::info!(course_id = course.id, name = %course.name, "Course created");
        Ok(course)
    }

    pub async fn update(&self, id: i64, patch: &CoursePatch) -> Result<Course> {
        if patch.is_empty() {
            return Err(ClientError::InvalidInput("Nothing to update".to_string()));
        }
        patch.validate()?;
        self.api.patch(&format!("/courses/{}/", id), patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.api.delete(&format!("/courses/{}/", id)).await?;
        tracing::info!(course_id = id, "Course deleted");
        Ok(())
    }

    pub async fn lessons(&self, course_id: i64) -> Result<Vec<Lesson>> {
        self.api.get(&format!("/courses/{}/lessons/", course_id)).await
    }

    pub async fn create_lesson(&self, course_id: i64, form: &LessonForm) -> Result<Lesson> {
        form.validate()?;
        self.api
            .post(&format!("/courses/{}/lessons/", course_id), form)
            .await
    }

    pub async fn update_lesson(&self, course_id: i64, lesson_id: i64, form: &LessonForm) -> Result<Lesson> {
        form.validate()?;
        self.api
            .patch(&format!("/courses/{}/lessons/{}/", course_id, lesson_id), form)
            .await
    }

    pub async fn delete_lesson(&self, course_id: i64, lesson_id: i64) -> Result<()> {
        self.api
            .delete(&format!("/courses/{}/lessons/{}/", course_id, lesson_id))
            .await
    }

    /// Next lessons across the caller's courses, soonest first.
    pub async fn upcoming_lessons(&self) -> Result<Vec<UpcomingLesson>> {
        self.api.get("/courses/upcoming-lessons/").await
    }
}
