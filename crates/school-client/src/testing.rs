//! In-process stand-in for the REST backend, used by the unit tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};

type Reply = (StatusCode, Json<Value>);

#[derive(Default)]
struct StubState {
    last_authorization: Option<String>,
    me_requests: usize,
    users: Vec<Value>,
    courses: Vec<Value>,
    lessons: HashMap<i64, Vec<Value>>,
    applications: Vec<Value>,
    reviews: Vec<Value>,
    settings: Value,
    next_id: i64,
}

impl StubState {
    fn seeded() -> Self {
        let users = vec![
            json!({"id": 1, "username": "admin", "email": "admin@school.kz", "first_name": "Aliya", "last_name": "Admin", "role": "admin"}),
            json!({"id": 2, "username": "student", "email": "student@school.kz", "first_name": "Arman", "last_name": "Kasymov", "role": "student"}),
            json!({"id": 3, "username": "teacher", "email": "teacher@school.kz", "first_name": "Dana", "last_name": "Ospanova", "role": "teacher",
                   "profile": {"photo_url": null, "public_description": "Math olympiad coach", "public_subjects": "Math, Physics"}}),
        ];
        let courses = vec![
            json!({"id": 10, "name": "Algebra", "teacher": 3, "description": "UNT algebra", "student_count": 1}),
            json!({"id": 11, "name": "Physics", "teacher": 3, "description": "Mechanics"}),
        ];
        let mut lessons = HashMap::new();
        lessons.insert(
            10,
            vec![json!({"id": 100, "title": "Linear equations", "date": "2024-09-02", "status": "пройден"})],
        );
        Self {
            users,
            courses,
            lessons,
            applications: vec![
                json!({"id": 20, "name": "Aidana Serikova", "phone": "+7 (777) 123-45-67", "class": "9", "subject": "Math", "status": "new"}),
            ],
            reviews: vec![json!({"id": 30, "author": "Dana, parent", "text": "Great", "scoreInfo": "UNT 130"})],
            settings: json!({
                "general": {"school_name": "Munificent School", "address": "Almaty", "phone": "+7 (777) 123-45-67", "email": "info@munificentschool.kz"},
                "notification": {"email_notifications": true, "sms_notifications": true, "payment_reminders": true, "class_reminders": true},
                "system": {"timezone": "Asia/Almaty", "language": "ru", "currency": "KZT"}
            }),
            next_id: 1000,
            ..Default::default()
        }
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

type Shared = Arc<Mutex<StubState>>;

/// Backend bound to an ephemeral local port for the lifetime of the test.
pub struct StubBackend {
    addr: SocketAddr,
    state: Shared,
}

impl StubBackend {
    pub const ADMIN_ACCESS: &'static str = "admin-access";
    pub const ADMIN_REFRESH: &'static str = "admin-refresh";
    pub const STUDENT_ACCESS: &'static str = "student-access";
    pub const TEACHER_ACCESS: &'static str = "teacher-access";
    /// Accepted by nothing: the profile endpoint answers 401.
    pub const STALE_ACCESS: &'static str = "stale-access";
    /// Issued for the `flaky` account whose profile endpoint answers 500.
    pub const FLAKY_ACCESS: &'static str = "flaky-access";
    /// Issued for the `slow` account whose profile endpoint stalls for seconds.
    pub const SLOW_ACCESS: &'static str = "slow-access";

    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(StubState::seeded()));
        let app = Router::new()
            .route("/api/token/", post(token))
            .route("/api/token/refresh/", post(token_refresh))
            .route("/api/users/me/", get(me).patch(update_me))
            .route("/api/users/change-password/", post(change_password))
            .route("/api/users/all/", get(list_users).post(create_user))
            .route(
                "/api/users/all/{id}/",
                get(get_user).patch(update_user).delete(delete_user),
            )
            .route("/api/users/students/{id}/enroll/", post(enroll))
            .route("/api/users/public-teachers/", get(public_teachers))
            .route("/api/courses/", get(list_courses).post(create_course))
            .route("/api/courses/my/", get(my_courses))
            .route("/api/courses/upcoming-lessons/", get(upcoming_lessons))
            .route(
                "/api/courses/{id}/",
                get(get_course).patch(update_course).delete(delete_course),
            )
            .route("/api/courses/{id}/lessons/", get(list_lessons).post(create_lesson))
            .route(
                "/api/courses/{id}/lessons/{lesson}/",
                patch(update_lesson).delete(delete_lesson),
            )
            .route("/api/applications/", get(list_applications).post(create_application))
            .route(
                "/api/applications/{id}/",
                patch(update_application).delete(delete_application),
            )
            .route("/api/reviews/", get(list_reviews).post(create_review))
            .route("/api/reviews/{id}/", axum::routing::delete(delete_review))
            .route("/api/blog/posts/", get(blog_posts))
            .route("/api/blog/posts/{id}/", get(blog_post))
            .route("/api/blog/categories/", get(blog_categories))
            .route("/api/settings/", get(get_settings).patch(update_settings))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub backend address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub backend");
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.state.lock().unwrap().last_authorization.clone()
    }

    pub fn me_requests(&self) -> usize {
        self.state.lock().unwrap().me_requests
    }
}

fn error(status: StatusCode, detail: &str) -> Reply {
    (status, Json(json!({"detail": detail})))
}

fn ok(value: Value) -> Reply {
    (StatusCode::OK, Json(value))
}

/// Resolve the caller from the bearer header, recording what was sent.
fn caller(state: &Shared, headers: &HeaderMap) -> Result<Value, Reply> {
    let mut guard = state.lock().unwrap();
    let header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    guard.last_authorization = header.clone();

    let username = match header.as_deref().and_then(|h| h.strip_prefix("Bearer ")) {
        Some(StubBackend::ADMIN_ACCESS) | Some("admin-access-2") => "admin",
        Some(StubBackend::STUDENT_ACCESS) => "student",
        Some(StubBackend::TEACHER_ACCESS) => "teacher",
        Some(StubBackend::FLAKY_ACCESS) => {
            return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "profile service down"))
        }
        Some(_) => {
            return Err(error(
                StatusCode::UNAUTHORIZED,
                "Given token not valid for any token type",
            ))
        }
        None => {
            return Err(error(
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided.",
            ))
        }
    };

    guard
        .users
        .iter()
        .find(|u| u["username"] == username)
        .cloned()
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "User not found"))
}

fn admin(state: &Shared, headers: &HeaderMap) -> Result<Value, Reply> {
    let user = caller(state, headers)?;
    if user["role"] == "admin" {
        Ok(user)
    } else {
        Err(error(
            StatusCode::FORBIDDEN,
            "You do not have permission to perform this action.",
        ))
    }
}

fn merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                merge(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

fn matches_search(row: &Value, query: &HashMap<String, String>) -> bool {
    let Some(term) = query.get("search") else {
        return true;
    };
    let term = term.to_lowercase();
    row.as_object()
        .map(|map| {
            map.values()
                .filter_map(Value::as_str)
                .any(|v| v.to_lowercase().contains(&term))
        })
        .unwrap_or(false)
}

fn paginate(rows: Vec<Value>, query: &HashMap<String, String>) -> Value {
    let Some(page) = query.get("page").and_then(|p| p.parse::<usize>().ok()) else {
        return Value::Array(rows);
    };
    let size = query
        .get("page_size")
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(10);
    let count = rows.len();
    let results: Vec<Value> = rows.into_iter().skip(page.saturating_sub(1) * size).take(size).collect();
    let next = (page * size < count).then(|| format!("?page={}", page + 1));
    json!({"count": count, "next": next, "previous": Value::Null, "results": results})
}

async fn token(Json(body): Json<Value>) -> Reply {
    let pair = match (body["username"].as_str(), body["password"].as_str()) {
        (Some("admin"), Some("adminpass")) => (StubBackend::ADMIN_ACCESS, StubBackend::ADMIN_REFRESH),
        (Some("student"), Some("studentpass")) => (StubBackend::STUDENT_ACCESS, "student-refresh"),
        (Some("teacher"), Some("teacherpass")) => (StubBackend::TEACHER_ACCESS, "teacher-refresh"),
        (Some("flaky"), Some("flakypass")) => (StubBackend::FLAKY_ACCESS, "flaky-refresh"),
        (Some("slow"), Some("slowpass")) => (StubBackend::SLOW_ACCESS, "slow-refresh"),
        _ => {
            return error(
                StatusCode::UNAUTHORIZED,
                "No active account found with the given credentials",
            )
        }
    };
    ok(json!({"access": pair.0, "refresh": pair.1}))
}

async fn token_refresh(Json(body): Json<Value>) -> Reply {
    match body["refresh"].as_str() {
        Some(StubBackend::ADMIN_REFRESH) => ok(json!({"access": "admin-access-2"})),
        _ => error(StatusCode::UNAUTHORIZED, "Token is invalid or expired"),
    }
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Result<Reply, Reply> {
    state.lock().unwrap().me_requests += 1;
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));
    if bearer == Some(StubBackend::SLOW_ACCESS) {
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
    }
    Ok(ok(caller(&state, &headers)?))
}

async fn update_me(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Reply, Reply> {
    let user = caller(&state, &headers)?;
    let mut guard = state.lock().unwrap();
    let row = guard
        .users
        .iter_mut()
        .find(|u| u["id"] == user["id"])
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Not found."))?;
    merge(row, &body);
    Ok(ok(row.clone()))
}

async fn change_password(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Reply, Reply> {
    caller(&state, &headers)?;
    if body["old_password"] != "adminpass" {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"old_password": ["Wrong password."]})),
        ));
    }
    Ok(ok(json!({"status": "password set"})))
}

async fn list_users(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Reply, Reply> {
    admin(&state, &headers)?;
    let guard = state.lock().unwrap();
    let rows: Vec<Value> = guard
        .users
        .iter()
        .filter(|u| query.get("role").map_or(true, |r| u["role"] == r.as_str()))
        .filter(|u| matches_search(u, &query))
        .cloned()
        .collect();
    Ok(ok(paginate(rows, &query)))
}

async fn create_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<Reply, Reply> {
    admin(&state, &headers)?;
    let mut guard = state.lock().unwrap();
    if guard.users.iter().any(|u| u["username"] == body["username"]) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"username": ["A user with that username already exists."]})),
        ));
    }
    let id = guard.allocate_id();
    if let Some(map) = body.as_object_mut() {
        map.remove("password");
        map.insert("id".into(), json!(id));
    }
    guard.users.push(body.clone());
    Ok((StatusCode::CREATED, Json(body)))
}

async fn get_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Reply, Reply> {
    admin(&state, &headers)?;
    let guard = state.lock().unwrap();
    guard
        .users
        .iter()
        .find(|u| u["id"] == id)
        .cloned()
        .map(ok)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Not found."))
}

async fn update_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<Reply, Reply> {
    admin(&state, &headers)?;
    let mut guard = state.lock().unwrap();
    let row = guard
        .users
        .iter_mut()
        .find(|u| u["id"] == id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Not found."))?;
    merge(row, &body);
    Ok(ok(row.clone()))
}

async fn delete_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, Reply> {
    admin(&state, &headers)?;
    let mut guard = state.lock().unwrap();
    let before = guard.users.len();
    guard.users.retain(|u| u["id"] != id);
    if guard.users.len() == before {
        return Err(error(StatusCode::NOT_FOUND, "Not found."));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn enroll(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<Reply, Reply> {
    admin(&state, &headers)?;
    let guard = state.lock().unwrap();
    let student = guard
        .users
        .iter()
        .find(|u| u["id"] == id && u["role"] == "student")
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Student not found."))?;
    Ok(ok(json!({"student": student["id"], "course_ids": body["course_ids"]})))
}

async fn public_teachers(State(state): State<Shared>) -> Reply {
    let guard = state.lock().unwrap();
    let rows: Vec<Value> = guard
        .users
        .iter()
        .filter(|u| u["role"] == "teacher")
        .map(|u| {
            json!({
                "id": u["id"],
                "name": format!("{} {}", u["first_name"].as_str().unwrap_or(""), u["last_name"].as_str().unwrap_or("")),
                "profile": u["profile"],
            })
        })
        .collect();
    ok(Value::Array(rows))
}

async fn list_courses(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    let guard = state.lock().unwrap();
    let rows: Vec<Value> = guard
        .courses
        .iter()
        .filter(|c| matches_search(c, &query))
        .cloned()
        .collect();
    ok(paginate(rows, &query))
}

async fn create_course(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<Reply, Reply> {
    admin(&state, &headers)?;
    let mut guard = state.lock().unwrap();
    let id = guard.allocate_id();
    body["id"] = json!(id);
    guard.courses.push(body.clone());
    Ok((StatusCode::CREATED, Json(body)))
}

async fn my_courses(State(state): State<Shared>, headers: HeaderMap) -> Result<Reply, Reply> {
    let user = caller(&state, &headers)?;
    let guard = state.lock().unwrap();
    let rows: Vec<Value> = if user["role"] == "student" {
        guard.courses.iter().take(1).cloned().collect()
    } else {
        Vec::new()
    };
    Ok(ok(Value::Array(rows)))
}

async fn get_course(State(state): State<Shared>, Path(id): Path<i64>) -> Result<Reply, Reply> {
    let guard = state.lock().unwrap();
    guard
        .courses
        .iter()
        .find(|c| c["id"] == id)
        .cloned()
        .map(ok)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Not found."))
}

async fn update_course(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<Reply, Reply> {
    admin(&state, &headers)?;
    let mut guard = state.lock().unwrap();
    let row = guard
        .courses
        .iter_mut()
        .find(|c| c["id"] == id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Not found."))?;
    merge(row, &body);
    Ok(ok(row.clone()))
}

async fn delete_course(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, Reply> {
    admin(&state, &headers)?;
    let mut guard = state.lock().unwrap();
    guard.courses.retain(|c| c["id"] != id);
    guard.lessons.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

async fn list_lessons(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Reply, Reply> {
    caller(&state, &headers)?;
    let guard = state.lock().unwrap();
    Ok(ok(Value::Array(guard.lessons.get(&id).cloned().unwrap_or_default())))
}

async fn create_lesson(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Result<Reply, Reply> {
    admin(&state, &headers)?;
    let mut guard = state.lock().unwrap();
    let lesson_id = guard.allocate_id();
    body["id"] = json!(lesson_id);
    guard.lessons.entry(id).or_default().push(body.clone());
    Ok((StatusCode::CREATED, Json(body)))
}

async fn update_lesson(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((course, lesson)): Path<(i64, i64)>,
    Json(body): Json<Value>,
) -> Result<Reply, Reply> {
    admin(&state, &headers)?;
    let mut guard = state.lock().unwrap();
    let row = guard
        .lessons
        .get_mut(&course)
        .and_then(|rows| rows.iter_mut().find(|l| l["id"] == lesson))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Not found."))?;
    merge(row, &body);
    Ok(ok(row.clone()))
}

async fn delete_lesson(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((course, lesson)): Path<(i64, i64)>,
) -> Result<StatusCode, Reply> {
    admin(&state, &headers)?;
    let mut guard = state.lock().unwrap();
    if let Some(rows) = guard.lessons.get_mut(&course) {
        rows.retain(|l| l["id"] != lesson);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn upcoming_lessons(State(state): State<Shared>, headers: HeaderMap) -> Result<Reply, Reply> {
    caller(&state, &headers)?;
    Ok(ok(json!([
        {"id": 1, "courseName": "Algebra", "teacherName": "Dana Ospanova", "date": "2024-09-20", "time": "16:00", "zoomLink": "https://zoom.example/j/1"}
    ])))
}

async fn list_applications(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Reply, Reply> {
    admin(&state, &headers)?;
    let guard = state.lock().unwrap();
    let rows: Vec<Value> = guard
        .applications
        .iter()
        .filter(|a| matches_search(a, &query))
        .cloned()
        .collect();
    Ok(ok(paginate(rows, &query)))
}

async fn create_application(State(state): State<Shared>, Json(mut body): Json<Value>) -> Reply {
    let mut guard = state.lock().unwrap();
    let id = guard.allocate_id();
    body["id"] = json!(id);
    body["status"] = json!("new");
    guard.applications.push(body.clone());
    (StatusCode::CREATED, Json(body))
}

async fn update_application(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<Reply, Reply> {
    admin(&state, &headers)?;
    let mut guard = state.lock().unwrap();
    let row = guard
        .applications
        .iter_mut()
        .find(|a| a["id"] == id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Not found."))?;
    merge(row, &body);
    Ok(ok(row.clone()))
}

async fn delete_application(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, Reply> {
    admin(&state, &headers)?;
    state.lock().unwrap().applications.retain(|a| a["id"] != id);
    Ok(StatusCode::NO_CONTENT)
}

async fn list_reviews(State(state): State<Shared>) -> Reply {
    ok(Value::Array(state.lock().unwrap().reviews.clone()))
}

async fn create_review(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<Reply, Reply> {
    admin(&state, &headers)?;
    let mut guard = state.lock().unwrap();
    let id = guard.allocate_id();
    body["id"] = json!(id);
    guard.reviews.push(body.clone());
    Ok((StatusCode::CREATED, Json(body)))
}

async fn delete_review(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, Reply> {
    admin(&state, &headers)?;
    state.lock().unwrap().reviews.retain(|r| r["id"] != id);
    Ok(StatusCode::NO_CONTENT)
}

fn blog_rows() -> Vec<Value> {
    vec![
        json!({"id": 1, "title": "How to prepare for UNT", "excerpt": "Five tips", "content": "Start early.",
               "author_name": "Admin", "created_at": "2024-05-01T10:00:00Z", "image_url": null, "category": 1, "category_name": "Exams"}),
        json!({"id": 2, "title": "Summer camp", "excerpt": "Registration open", "content": "Join us.",
               "author_name": "Admin", "created_at": "2024-06-01T10:00:00Z", "image_url": null, "category": 2, "category_name": "News"}),
    ]
}

async fn blog_posts(Query(query): Query<HashMap<String, String>>) -> Reply {
    let rows: Vec<Value> = blog_rows()
        .into_iter()
        .filter(|p| matches_search(p, &query))
        .collect();
    ok(paginate(rows, &query))
}

async fn blog_post(Path(id): Path<i64>) -> Result<Reply, Reply> {
    blog_rows()
        .into_iter()
        .find(|p| p["id"] == id)
        .map(ok)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Not found."))
}

async fn blog_categories() -> Reply {
    ok(json!([
        {"id": 1, "name": "Exams", "slug": "exams"},
        {"id": 2, "name": "News", "slug": "news"}
    ]))
}

async fn get_settings(State(state): State<Shared>, headers: HeaderMap) -> Result<Reply, Reply> {
    admin(&state, &headers)?;
    Ok(ok(state.lock().unwrap().settings.clone()))
}

async fn update_settings(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Reply, Reply> {
    admin(&state, &headers)?;
    let mut guard = state.lock().unwrap();
    merge(&mut guard.settings, &body);
    Ok(ok(guard.settings.clone()))
}
