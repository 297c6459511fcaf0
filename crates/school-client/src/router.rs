//! Role-based routing.
//!
//! [`resolve`] maps the session state and a requested path to what should be
//! shown. It is a pure function over a fixed route table; every role is
//! matched exhaustively so a new role cannot silently inherit another's
//! screens.

use crate::auth::AuthState;
use crate::models::Role;

pub const LOGIN_PATH: &str = "/login";
/// Prefix of every screen that requires a session.
pub const APP_PREFIX: &str = "/app";

/// A screen the front end can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Login,
    AboutUs,
    CourseCatalog,
    Blog,
    BlogPost(i64),
    Profile,
    StudentDashboard,
    MyCourses,
    MyCourse(i64),
    TestSimulator,
    TeacherDashboard,
    TeacherStudents,
    AdminDashboard,
    Users,
    AdminCourses,
    AdminStudents,
    Requests,
    Settings,
}

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Visitors only; a signed-in user is sent to their home screen.
    GuestOnly,
    /// Any signed-in role.
    Authenticated,
    Only(Role),
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Fixed(Screen),
    WithId(fn(i64) -> Screen),
}

#[derive(Debug, Clone, Copy)]
struct Route {
    pattern: &'static str,
    access: Access,
    target: Target,
}

const fn route(pattern: &'static str, access: Access, screen: Screen) -> Route {
    Route {
        pattern,
        access,
        target: Target::Fixed(screen),
    }
}

const ROUTES: &[Route] = &[
    route("/", Access::GuestOnly, Screen::Landing),
    route("/login", Access::GuestOnly, Screen::Login),
    route("/about-us", Access::Public, Screen::AboutUs),
    route("/courses", Access::Public, Screen::CourseCatalog),
    route("/blog", Access::Public, Screen::Blog),
    Route {
        pattern: "/blog/:id",
        access: Access::Public,
        target: Target::WithId(Screen::BlogPost),
    },
    route("/app/profile", Access::Authenticated, Screen::Profile),
    route("/app/dashboard", Access::Only(Role::Student), Screen::StudentDashboard),
    route("/app/my-courses", Access::Only(Role::Student), Screen::MyCourses),
    Route {
        pattern: "/app/my-courses/:id",
        access: Access::Only(Role::Student),
        target: Target::WithId(Screen::MyCourse),
    },
    route("/app/test-simulator", Access::Only(Role::Student), Screen::TestSimulator),
    route("/app/teacher", Access::Only(Role::Teacher), Screen::TeacherDashboard),
    route("/app/students", Access::Only(Role::Teacher), Screen::TeacherStudents),
    route("/app/admin", Access::Only(Role::Admin), Screen::AdminDashboard),
    route("/app/users", Access::Only(Role::Admin), Screen::Users),
    route("/app/admin/courses", Access::Only(Role::Admin), Screen::AdminCourses),
    route("/app/admin/students", Access::Only(Role::Admin), Screen::AdminStudents),
    route("/app/requests", Access::Only(Role::Admin), Screen::Requests),
    route("/app/settings", Access::Only(Role::Admin), Screen::Settings),
];

/// Outcome of routing one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Session still bootstrapping; show a spinner and do not navigate.
    Loading,
    Render(Screen),
    Redirect(String),
    NotFound,
}

impl Role {
    /// Screen a role lands on after login or when opening the app root.
    pub fn default_path(&self) -> &'static str {
        match self {
            Role::Admin => "/app/admin",
            Role::Student => "/app/dashboard",
            Role::Teacher => "/app/teacher",
        }
    }
}

/// Strip query and fragment, collapse slashes, drop the trailing slash.
pub fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

fn is_app_path(path: &str) -> bool {
    path == APP_PREFIX || path.starts_with("/app/")
}

fn match_route(path: &str) -> Option<(&'static Route, Screen)> {
    let segments: Vec<&str> = path.split('/').skip(1).filter(|s| !s.is_empty()).collect();

    ROUTES.iter().find_map(|route| {
        let pattern: Vec<&str> = route.pattern.split('/').skip(1).filter(|s| !s.is_empty()).collect();
        if pattern.len() != segments.len() {
            return None;
        }

        let mut id = None;
        for (expected, actual) in pattern.iter().zip(&segments) {
            if *expected == ":id" {
                id = Some(actual.parse::<i64>().ok()?);
            } else if expected != actual {
                return None;
            }
        }

        let screen = match (route.target, id) {
            (Target::Fixed(screen), _) => screen,
            (Target::WithId(build), Some(id)) => build(id),
            (Target::WithId(_), None) => return None,
        };
        Some((route, screen))
    })
}

/// Decide what to show for `path` given the session.
pub fn resolve(state: &AuthState, path: &str) -> Resolution {
    if state.is_loading() {
        return Resolution::Loading;
    }

    let path = normalize(path);
    let role = state.role();

    if path == APP_PREFIX {
        return Resolution::Redirect(
            role.map_or(LOGIN_PATH, |r| r.default_path()).to_string(),
        );
    }

    let Some((route, screen)) = match_route(&path) else {
        if role.is_none() && is_app_path(&path) {
            return Resolution::Redirect(LOGIN_PATH.to_string());
        }
        return Resolution::NotFound;
    };

    match (route.access, role) {
        (Access::Public, _) | (Access::GuestOnly, None) => Resolution::Render(screen),
        (Access::GuestOnly, Some(role)) => Resolution::Redirect(role.default_path().to_string()),
        (Access::Authenticated, Some(_)) => Resolution::Render(screen),
        (Access::Only(required), Some(role)) if required == role => Resolution::Render(screen),
        (Access::Only(_), Some(role)) => Resolution::Redirect(role.default_path().to_string()),
        (Access::Authenticated, None) | (Access::Only(_), None) => {
            Resolution::Redirect(LOGIN_PATH.to_string())
        }
    }
}

/// Sidebar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
}

const fn nav(label: &'static str, path: &'static str) -> NavItem {
    NavItem { label, path }
}

const STUDENT_NAV: &[NavItem] = &[
    nav("Home", "/app/dashboard"),
    nav("My courses", "/app/my-courses"),
    nav("UNT tests", "/app/test-simulator"),
    nav("Profile", "/app/profile"),
];

const TEACHER_NAV: &[NavItem] = &[
    nav("Home", "/app/teacher"),
    nav("Students", "/app/students"),
    nav("Profile", "/app/profile"),
];

const ADMIN_NAV: &[NavItem] = &[
    nav("Home", "/app/admin"),
    nav("Users", "/app/users"),
    nav("Courses", "/app/admin/courses"),
    nav("Students", "/app/admin/students"),
    nav("Requests", "/app/requests"),
    nav("Settings", "/app/settings"),
    nav("Profile", "/app/profile"),
];

/// Sidebar for a role: home first, profile last.
pub fn navigation(role: Role) -> &'static [NavItem] {
    match role {
        Role::Student => STUDENT_NAV,
        Role::Teacher => TEACHER_NAV,
        Role::Admin => ADMIN_NAV,
    }
}
