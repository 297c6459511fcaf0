//! Record commands: users, students, teachers, courses, lessons,
//! applications, reviews, blog and settings.

use anyhow::{Context as AnyhowContext, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use school_client::listing::{self, Searchable};
use school_client::models::{
    ApplicationForm, ApplicationStatus, Course, CourseForm, CoursePatch, LessonForm, LessonStatus,
    ListQuery, NewUser, Page, ReviewForm, Role, SettingsPatch, User, UserPatch,
};

use crate::output::{self, call, page_footer, Failed};
use crate::Session;

/// Search and paging flags shared by the list commands.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Case-insensitive search text
    #[arg(short, long)]
    search: Option<String>,
    /// Page number, starting at 1
    #[arg(long)]
    page: Option<u32>,
    /// Rows per page
    #[arg(long, default_value_t = 10)]
    per_page: u32,
}

impl ListArgs {
    fn query(&self) -> ListQuery {
        let mut query = ListQuery::new();
        if let Some(term) = &self.search {
            query = query.search(term.clone());
        }
        if let Some(page) = self.page {
            query = query.page(page, self.per_page);
        }
        query
    }
}

/// Endpoints that ignore `search`/`page` answer with every row; narrow those
/// down locally so the flags behave the same everywhere.
fn narrow<T: Searchable + Clone>(page: Page<T>, args: &ListArgs) -> Page<T> {
    let rows = match page {
        Page::All(rows) => rows,
        paginated => return paginated,
    };
    let found: Vec<T> = listing::search(&rows, args.search.as_deref().unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();
    match args.page {
        Some(page) => {
            let slice = listing::paginate(&found, page as usize, args.per_page as usize);
            Page::Paginated {
                count: slice.total as u64,
                next: slice.has_next().then(|| format!("?page={}", slice.page + 1)),
                previous: slice.has_previous().then(|| format!("?page={}", slice.page - 1)),
                results: slice.items.to_vec(),
            }
        }
        None => Page::All(found),
    }
}

fn print_users(page: &Page<User>) {
    println!("{:<6} {:<16} {:<26} {:<28} {:<8}", "ID", "USERNAME", "NAME", "EMAIL", "ROLE");
    for user in page.items() {
        println!(
            "{:<6} {:<16} {:<26} {:<28} {:<8}",
            user.id,
            user.username,
            user.full_name(),
            output::or_dash(Some(user.email.as_str())),
            user.role
        );
    }
    println!("{}", page_footer(page));
}

fn print_courses(page: &Page<Course>) {
    println!("{:<6} {:<28} {:<24} {:<9}", "ID", "NAME", "TEACHER", "STUDENTS");
    for course in page.items() {
        println!(
            "{:<6} {:<28} {:<24} {:<9}",
            course.id,
            course.name,
            course.teacher_name(),
            course.student_count.map(|n| n.to_string()).unwrap_or_else(|| "-".into())
        );
    }
    println!("{}", page_footer(page));
}

#[derive(Subcommand)]
pub enum UsersCommand {
    List {
        #[command(flatten)]
        list: ListArgs,
        /// Only this role: student, teacher or admin
        #[arg(long)]
        role: Option<Role>,
    },
    Get {
        id: i64,
    },
    /// Create an account
    /// Example:
    ///     munificent users create --username dana --email dana@school.kz --role teacher
    #[command(verbatim_doc_comment)]
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "student")]
        role: Role,
    },
    Update {
        id: i64,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        role: Option<Role>,
        /// Activate (true) or deactivate (false) the account
        #[arg(long)]
        active: Option<bool>,
    },
    Delete {
        id: i64,
    },
}

pub async fn users(session: &Session, command: UsersCommand) -> Result<()> {
    let api = session.api();
    match command {
        UsersCommand::List { list, role } => {
            let mut query = list.query();
            if let Some(role) = role {
                query = query.role(role);
            }
            let page = call(&session.scope, "Could not load users", api.users().list(&query)).await?;
            let page = narrow(page, &list);
            session.out.data(&page, print_users)?;
        }
        UsersCommand::Get { id } => {
            let user = call(&session.scope, "Could not load user", api.users().get(id)).await?;
            session.out.data(&user, |user| {
                println!("{} ({})", user.full_name(), user.role);
                println!("  Username: {}", user.username);
                println!("  Email:    {}", output::or_dash(Some(user.email.as_str())));
                println!("  Phone:    {}", output::or_dash(user.contact_phone()));
                println!("  Active:   {}", user.is_active.map(|a| a.to_string()).unwrap_or_else(|| "-".into()));
            })?;
        }
        UsersCommand::Create {
            username,
            email,
            password,
            first_name,
            last_name,
            role,
        } => {
            let password = match password {
                Some(password) => password,
                None => rpassword::prompt_password_stderr("Password for the new user: ")
                    .context("Failed to read password")?,
            };
            let form = NewUser {
                username,
                email,
                password,
                first_name,
                last_name,
                role,
            };
            let user = call(&session.scope, "User not created", api.users().create(&form)).await?;
            session.out.data(&user, |user| {
                session.out.success("User created", format!("{} (#{}, {})", user.username, user.id, user.role));
            })?;
        }
        UsersCommand::Update {
            id,
            first_name,
            last_name,
            email,
            phone,
            role,
            active,
        } => {
            let patch = UserPatch {
                first_name,
                last_name,
                email,
                phone,
                role,
                is_active: active,
            };
            let user = call(&session.scope, "User not updated", api.users().update(id, &patch)).await?;
            session.out.data(&user, |user| {
                session.out.success("User updated", user.full_name());
            })?;
        }
        UsersCommand::Delete { id } => {
            call(&session.scope, "User not deleted", api.users().delete(id)).await?;
            session.out.success("User deleted", format!("#{}", id));
        }
    }
    Ok(())
}

#[derive(Subcommand)]
pub enum StudentsCommand {
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Enrol a student in courses
    /// Example:
    ///     munificent students enroll 12 --course 3 --course 5
    #[command(verbatim_doc_comment)]
    Enroll {
        student_id: i64,
        #[arg(long = "course", required = true)]
        courses: Vec<i64>,
    },
}

pub async fn students(session: &Session, command: StudentsCommand) -> Result<()> {
    let api = session.api();
    match command {
        StudentsCommand::List { list } => {
            let page = call(&session.scope, "Could not load students", api.users().students(&list.query())).await?;
            let page = narrow(page, &list);
            session.out.data(&page, print_users)?;
        }
        StudentsCommand::Enroll { student_id, courses } => {
            call(
                &session.scope,
                "Student not enrolled",
                api.users().enroll(student_id, &courses),
            )
            .await?;
            session.out.success(
                "Student enrolled",
                format!("#{} added to {} course(s)", student_id, courses.len()),
            );
        }
    }
    Ok(())
}

#[derive(Subcommand)]
pub enum TeachersCommand {
    List,
}

pub async fn teachers(session: &Session, command: TeachersCommand) -> Result<()> {
    match command {
        TeachersCommand::List => {
            let teachers = call(
                &session.scope,
                "Could not load teachers",
                session.api().users().public_teachers(),
            )
            .await?;
            session.out.data(&teachers, |teachers| {
                println!("{:<6} {:<28} {}", "ID", "NAME", "SUBJECTS");
                for teacher in teachers {
                    println!("{:<6} {:<28} {}", teacher.id, teacher.name, teacher.subjects().join(", "));
                }
            })?;
        }
    }
    Ok(())
}

#[derive(Args, Debug)]
pub struct CourseFields {
    #[arg(long)]
    name: Option<String>,
    /// Teacher user id
    #[arg(long)]
    teacher: Option<i64>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    subject: Option<i64>,
    #[arg(long)]
    price: Option<f64>,
}

#[derive(Subcommand)]
pub enum CoursesCommand {
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Courses of the signed-in student
    Mine,
    Get {
        id: i64,
    },
    Create {
        #[command(flatten)]
        fields: CourseFields,
    },
    Update {
        id: i64,
        #[command(flatten)]
        fields: CourseFields,
    },
    Delete {
        id: i64,
    },
}

pub async fn courses(session: &Session, command: CoursesCommand) -> Result<()> {
    let api = session.api();
    match command {
        CoursesCommand::List { list } => {
            let page = call(&session.scope, "Could not load courses", api.courses().list(&list.query())).await?;
            let page = narrow(page, &list);
            session.out.data(&page, print_courses)?;
        }
        CoursesCommand::Mine => {
            let courses = call(&session.scope, "Could not load your courses", api.courses().mine()).await?;
            session.out.data(&Page::All(courses), print_courses)?;
        }
        CoursesCommand::Get { id } => {
            let course = call(&session.scope, "Could not load course", api.courses().get(id)).await?;
            session.out.data(&course, |course| {
                println!("{} (#{})", course.name, course.id);
                println!("  Teacher:     {}", course.teacher_name());
                println!("  Description: {}", output::or_dash(course.description.as_deref()));
                if let Some(price) = course.price {
                    println!("  Price:       {:.0} KZT", price);
                }
                if let Some(progress) = course.progress {
                    println!("  Progress:    {:.0}%", progress);
                }
            })?;
        }
        CoursesCommand::Create { fields } => {
            let form = CourseForm {
                name: fields.name.unwrap_or_default(),
                teacher_id: fields.teacher.unwrap_or_default(),
                description: fields.description,
                subject: fields.subject,
                price: fields.price,
            };
            let course = call(&session.scope, "Course not created", api.courses().create(&form)).await?;
            session.out.data(&course, |course| {
                session.out.success("Course created", format!("{} (#{})", course.name, course.id));
            })?;
        }
        CoursesCommand::Update { id, fields } => {
            let patch = CoursePatch {
                name: fields.name,
                teacher_id: fields.teacher,
                description: fields.description,
                subject: fields.subject,
                price: fields.price,
            };
            let course = call(&session.scope, "Course not updated", api.courses().update(id, &patch)).await?;
            session.out.data(&course, |course| {
                session.out.success("Course updated", course.name.clone());
            })?;
        }
        CoursesCommand::Delete { id } => {
            call(&session.scope, "Course not deleted", api.courses().delete(id)).await?;
            session.out.success("Course deleted", format!("#{}", id));
        }
    }
    Ok(())
}

#[derive(Args, Debug)]
pub struct LessonFields {
    #[arg(long)]
    title: String,
    /// Lesson date, YYYY-MM-DD
    #[arg(long)]
    date: NaiveDate,
    /// completed or upcoming
    #[arg(long, default_value = "upcoming")]
    status: LessonStatus,
    #[arg(long)]
    recording_url: Option<String>,
    #[arg(long)]
    homework_url: Option<String>,
    #[arg(long)]
    homework_text: Option<String>,
}

impl From<LessonFields> for LessonForm {
    fn from(fields: LessonFields) -> Self {
        LessonForm {
            title: fields.title,
            date: fields.date,
            status: fields.status,
            recording_url: fields.recording_url,
            homework_url: fields.homework_url,
            homework_text: fields.homework_text,
        }
    }
}

#[derive(Subcommand)]
pub enum LessonsCommand {
    List {
        course_id: i64,
    },
    /// Your next lessons across all courses
    Upcoming,
    Create {
        course_id: i64,
        #[command(flatten)]
        fields: LessonFields,
    },
    Update {
        course_id: i64,
        lesson_id: i64,
        #[command(flatten)]
        fields: LessonFields,
    },
    Delete {
        course_id: i64,
        lesson_id: i64,
    },
}

pub async fn lessons(session: &Session, command: LessonsCommand) -> Result<()> {
    let api = session.api();
    match command {
        LessonsCommand::List { course_id } => {
            let lessons = call(&session.scope, "Could not load lessons", api.courses().lessons(course_id)).await?;
            session.out.data(&lessons, |lessons| {
                println!("{:<6} {:<12} {:<10} {:<32} {}", "ID", "DATE", "STATUS", "TITLE", "RECORDING");
                for lesson in lessons {
                    println!(
                        "{:<6} {:<12} {:<10} {:<32} {}",
                        lesson.id,
                        lesson.date,
                        lesson.status.label(),
                        lesson.title,
                        output::or_dash(lesson.recording_url.as_deref())
                    );
                }
            })?;
        }
        LessonsCommand::Upcoming => {
            let lessons = call(
                &session.scope,
                "Could not load upcoming lessons",
                api.courses().upcoming_lessons(),
            )
            .await?;
            session.out.data(&lessons, |lessons| {
                for lesson in lessons {
                    println!(
                        "{} {:<6} {:<24} {:<22} {}",
                        lesson.date,
                        lesson.time,
                        lesson.course_name,
                        lesson.teacher_name,
                        output::or_dash(lesson.zoom_link.as_deref())
                    );
                }
            })?;
        }
        LessonsCommand::Create { course_id, fields } => {
            let form = LessonForm::from(fields);
            let lesson = call(&session.scope, "Lesson not created", api.courses().create_lesson(course_id, &form)).await?;
            session.out.data(&lesson, |lesson| {
                session.out.success("Lesson created", format!("{} on {}", lesson.title, lesson.date));
            })?;
        }
        LessonsCommand::Update {
            course_id,
            lesson_id,
            fields,
        } => {
            let form = LessonForm::from(fields);
            let lesson = call(
                &session.scope,
                "Lesson not updated",
                api.courses().update_lesson(course_id, lesson_id, &form),
            )
            .await?;
            session.out.data(&lesson, |lesson| {
                session.out.success("Lesson updated", lesson.title.clone());
            })?;
        }
        LessonsCommand::Delete { course_id, lesson_id } => {
            call(
                &session.scope,
                "Lesson not deleted",
                api.courses().delete_lesson(course_id, lesson_id),
            )
            .await?;
            session.out.success("Lesson deleted", format!("#{}", lesson_id));
        }
    }
    Ok(())
}

#[derive(Subcommand)]
pub enum ApplicationsCommand {
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Leave an enrolment request, as the public site does
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long = "class", default_value = "")]
        student_class: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Move a request to new, contacted or registered
    SetStatus {
        id: i64,
        status: ApplicationStatus,
    },
    Delete {
        id: i64,
    },
}

pub async fn applications(session: &Session, command: ApplicationsCommand) -> Result<()> {
    let api = session.api();
    match command {
        ApplicationsCommand::List { list } => {
            let page = call(
                &session.scope,
                "Could not load applications",
                api.applications().list(&list.query()),
            )
            .await?;
            let page = narrow(page, &list);
            session.out.data(&page, |page| {
                println!("{:<6} {:<24} {:<20} {:<6} {:<12} {}", "ID", "NAME", "PHONE", "CLASS", "SUBJECT", "STATUS");
                for app in page.items() {
                    println!(
                        "{:<6} {:<24} {:<20} {:<6} {:<12} {}",
                        app.id,
                        app.name,
                        app.phone,
                        output::or_dash(Some(app.student_class.as_str())),
                        output::or_dash(Some(app.subject.as_str())),
                        app.status.as_str()
                    );
                }
                println!("{}", page_footer(page));
            })?;
        }
        ApplicationsCommand::Submit {
            name,
            phone,
            student_class,
            subject,
            comment,
        } => {
            let form = ApplicationForm {
                name,
                phone,
                student_class,
                subject,
                comment,
            };
            let application = call(&session.scope, "Request not sent", api.applications().submit(&form)).await?;
            session.out.data(&application, |application| {
                session.out.success(
                    "Request sent",
                    format!("We will call {} at {}", application.name, application.phone),
                );
            })?;
        }
        ApplicationsCommand::SetStatus { id, status } => {
            let application = call(
                &session.scope,
                "Status not changed",
                api.applications().set_status(id, status),
            )
            .await?;
            session.out.data(&application, |application| {
                session.out.success("Status changed", format!("#{} is now {}", application.id, application.status.as_str()));
            })?;
        }
        ApplicationsCommand::Delete { id } => {
            call(&session.scope, "Request not deleted", api.applications().delete(id)).await?;
            session.out.success("Request deleted", format!("#{}", id));
        }
    }
    Ok(())
}

#[derive(Subcommand)]
pub enum ReviewsCommand {
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    Create {
        #[arg(long)]
        author: String,
        #[arg(long)]
        text: String,
        /// e.g. "UNT 130"
        #[arg(long, default_value = "")]
        score_info: String,
    },
    Delete {
        id: i64,
    },
}

pub async fn reviews(session: &Session, command: ReviewsCommand) -> Result<()> {
    let api = session.api();
    match command {
        ReviewsCommand::List { list } => {
            let reviews = call(&session.scope, "Could not load reviews", api.reviews().list()).await?;
            let page = narrow(Page::All(reviews), &list);
            session.out.data(&page, |page| {
                for review in page.items() {
                    println!("#{} {} ({})", review.id, review.author_name(), output::or_dash(Some(review.score_info.as_str())));
                    println!("    {}", review.text);
                }
                println!("{}", page_footer(page));
            })?;
        }
        ReviewsCommand::Create {
            author,
            text,
            score_info,
        } => {
            let form = ReviewForm {
                author,
                text,
                score_info,
            };
            let review = call(&session.scope, "Review not added", api.reviews().create(&form)).await?;
            session.out.data(&review, |review| {
                session.out.success("Review added", format!("#{} by {}", review.id, review.author_name()));
            })?;
        }
        ReviewsCommand::Delete { id } => {
            call(&session.scope, "Review not deleted", api.reviews().delete(id)).await?;
            session.out.success("Review deleted", format!("#{}", id));
        }
    }
    Ok(())
}

#[derive(Subcommand)]
pub enum BlogCommand {
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    Get {
        id: i64,
    },
    Categories,
}

pub async fn blog(session: &Session, command: BlogCommand) -> Result<()> {
    let api = session.api();
    match command {
        BlogCommand::List { list } => {
            let page = call(&session.scope, "Could not load posts", api.blog().posts(&list.query())).await?;
            let page = narrow(page, &list);
            session.out.data(&page, |page| {
                for post in page.items() {
                    println!(
                        "#{:<4} {} [{}] {}",
                        post.id,
                        post.created_at.format("%Y-%m-%d"),
                        output::or_dash(post.category_name.as_deref()),
                        post.title
                    );
                }
                println!("{}", page_footer(page));
            })?;
        }
        BlogCommand::Get { id } => {
            let post = call(&session.scope, "Could not load post", api.blog().post(id)).await?;
            session.out.data(&post, |post| {
                println!("{}", post.title);
                println!("{} · {}", post.author_name, post.created_at.format("%Y-%m-%d"));
                println!();
                println!("{}", post.content);
            })?;
        }
        BlogCommand::Categories => {
            let categories = call(&session.scope, "Could not load categories", api.blog().categories()).await?;
            session.out.data(&categories, |categories| {
                for category in categories {
                    println!("{:<4} {:<20} {}", category.id, category.name, category.slug);
                }
            })?;
        }
    }
    Ok(())
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    Get,
    /// Change settings by section.field
    /// Example:
    ///     munificent settings set general.phone="+7 777 123 45 67" notification.sms_notifications=false
    #[command(verbatim_doc_comment)]
    Set {
        #[arg(value_name = "KEY=VALUE", required = true)]
        pairs: Vec<String>,
    },
}

fn parse_settings(pairs: &[String]) -> Result<SettingsPatch> {
    let mut patch = SettingsPatch::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| Failed::new("Settings not saved", &format!("Expected KEY=VALUE, got '{}'", pair)))?;
        patch
            .set(key.trim(), value)
            .map_err(|e| Failed::from_error("Settings not saved", &e))?;
    }
    Ok(patch)
}

pub async fn settings(session: &Session, command: SettingsCommand) -> Result<()> {
    let api = session.api();
    match command {
        SettingsCommand::Get => {
            let settings = call(&session.scope, "Could not load settings", api.settings().get()).await?;
            session.out.data(&settings, |settings| {
                println!("General");
                println!("  school_name: {}", settings.general.school_name);
                println!("  address:     {}", settings.general.address);
                println!("  phone:       {}", settings.general.phone);
                println!("  email:       {}", settings.general.email);
                println!("Notification");
                println!("  email_notifications: {}", settings.notification.email_notifications);
                println!("  sms_notifications:   {}", settings.notification.sms_notifications);
                println!("  payment_reminders:   {}", settings.notification.payment_reminders);
                println!("  class_reminders:     {}", settings.notification.class_reminders);
                println!("System");
                println!("  timezone: {}", settings.system.timezone);
                println!("  language: {}", settings.system.language);
                println!("  currency: {}", settings.system.currency);
            })?;
        }
        SettingsCommand::Set { pairs } => {
            let patch = parse_settings(&pairs)?;
            call(&session.scope, "Settings not saved", api.settings().update(&patch)).await?;
            session.out.success("Settings saved", format!("{} value(s) updated", pairs.len()));
        }
    }
    Ok(())
}
