//! Printing results: a notification, a JSON document, or a plain table.

use std::future::Future;

use serde::Serialize;
use thiserror::Error;

use school_client::models::Page;
use school_client::{ClientError, Notification, Scope};

/// A command failed; the notification says why. Exits non-zero.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct Failed(pub Notification);

impl Failed {
    pub fn new(title: &str, description: &str) -> anyhow::Error {
        Failed(Notification::danger(title, description)).into()
    }

    pub fn from_error(title: &str, error: &ClientError) -> anyhow::Error {
        tracing::debug!(error = %error, "{}", title);
        Failed(Notification::from_error(title, error)).into()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    pub fn notify(&self, note: &Notification) {
        if self.json {
            println!("{}", serde_json::to_string(note).unwrap_or_default());
        } else {
            println!("{}", note);
        }
    }

    pub fn success(&self, title: &str, description: impl Into<String>) {
        self.notify(&Notification::success(title, description));
    }

    /// Print `value` as JSON, or hand it to `render` for the human view.
    pub fn data<T: Serialize + ?Sized>(&self, value: &T, render: impl FnOnce(&T)) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            render(value);
        }
        Ok(())
    }

    pub fn failure(&self, note: &Notification) {
        if self.json {
            eprintln!("{}", serde_json::to_string(note).unwrap_or_default());
        } else {
            eprintln!("{}", note);
        }
    }
}

/// Run one request inside `scope`, turning a failure into a notification.
pub async fn call<T, F>(scope: &Scope, title: &str, fut: F) -> anyhow::Result<T>
where
    F: Future<Output = school_client::Result<T>>,
{
    scope
        .run(fut)
        .await
        .map_err(|e| Failed::from_error(title, &e))
}

/// Footer line under a list.
pub fn page_footer<T>(page: &Page<T>) -> String {
    let shown = page.items().len();
    let total = page.total();
    if page.has_next() {
        format!("{} of {} shown, more pages available", shown, total)
    } else {
        format!("{} of {} shown", shown, total)
    }
}

pub fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "-",
    }
}
