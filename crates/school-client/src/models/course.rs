use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user::User;

/// Course as listed by `/courses/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub teacher: Option<TeacherRef>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub student_count: Option<u32>,
    #[serde(default)]
    pub subject: Option<i64>,
    #[serde(default)]
    pub price: Option<f64>,
}

/// The backend nests the teacher on detail views and sends a bare id elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TeacherRef {
    Id(i64),
    User(Box<User>),
}

impl TeacherRef {
    pub fn id(&self) -> i64 {
        match self {
            TeacherRef::Id(id) => *id,
            TeacherRef::User(user) => user.id,
        }
    }
}

impl Course {
    pub fn teacher_name(&self) -> String {
        match &self.teacher {
            Some(TeacherRef::User(user)) => user.full_name(),
            Some(TeacherRef::Id(id)) => format!("#{}", id),
            None => "-".to_string(),
        }
    }
}

/// Course form. The backend takes the teacher as an id.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CourseForm {
    #[validate(length(min = 1, message = "Course name is required"))]
    pub name: String,
    #[serde(rename = "teacher")]
    #[validate(range(min = 1, message = "Teacher is required"))]
    pub teacher_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
}

/// Partial course update.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct CoursePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Course name cannot be empty"))]
    pub name: Option<String>,
    #[serde(rename = "teacher", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Teacher id must be positive"))]
    pub teacher_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
}

impl CoursePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.teacher_id.is_none()
            && self.description.is_none()
            && self.subject.is_none()
            && self.price.is_none()
    }
}

/// Lesson state. The backend stores the Russian labels verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LessonStatus {
    #[serde(rename = "пройден")]
    Completed,
    #[serde(rename = "предстоит")]
    Upcoming,
}

impl LessonStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LessonStatus::Completed => "completed",
            LessonStatus::Upcoming => "upcoming",
        }
    }
}

impl std::str::FromStr for LessonStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "completed" | "пройден" => Ok(LessonStatus::Completed),
            "upcoming" | "предстоит" => Ok(LessonStatus::Upcoming),
            other => Err(format!("Unknown lesson status '{}'. Use: completed or upcoming", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub title: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: Option<String>,
    pub status: LessonStatus,
    #[serde(default)]
    pub recording_url: Option<String>,
    #[serde(default)]
    pub homework_url: Option<String>,
    #[serde(default)]
    pub homework_text: Option<String>,
}

/// Lesson form used for both create and update.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LessonForm {
    #[validate(length(min = 1, message = "Lesson title cannot be empty"))]
    pub title: String,
    pub date: NaiveDate,
    pub status: LessonStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Recording link must be a URL"))]
    pub recording_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Homework link must be a URL"))]
    pub homework_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homework_text: Option<String>,
}

/// Entry of `/courses/upcoming-lessons/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingLesson {
    pub id: i64,
    #[serde(alias = "courseName")]
    pub course_name: String,
    #[serde(alias = "teacherName", default)]
    pub teacher_name: String,
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(alias = "zoomLink", default)]
    pub zoom_link: Option<String>,
}

/// `POST /users/students/{id}/enroll/` body.
#[derive(Debug, Clone, Serialize)]
pub struct Enrollment {
    pub course_ids: Vec<i64>,
}
