//! Records exchanged with the REST backend.

pub mod application;
pub mod content;
pub mod course;
pub mod page;
pub mod settings;
pub mod user;

pub use application::{Application, ApplicationForm, ApplicationStatus, ApplicationStatusUpdate};
pub use content::{BlogCategory, BlogPost, Review, ReviewForm};
pub use course::{
    Course, CourseForm, CoursePatch, Enrollment, Lesson, LessonForm, LessonStatus, TeacherRef,
    UpcomingLesson,
};
pub use page::{ListQuery, Page};
pub use settings::{SchoolSettings, SettingsPatch};
pub use user::{
    Credentials, NewUser, PasswordChange, Profile, PublicTeacher, RefreshedToken, Role, TokenPair,
    User, UserPatch,
};
