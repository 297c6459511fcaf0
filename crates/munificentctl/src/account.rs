//! Session commands: login, logout, whoami, refresh, password, profile, route, nav.

use std::io::{self, BufRead, Write};

use anyhow::{Context as AnyhowContext, Result};
use clap::Subcommand;

use school_client::models::{PasswordChange, User, UserPatch};
use school_client::router::{self, Resolution};
use school_client::AuthState;

use crate::output::{self, call, Failed};
use crate::Session;

#[derive(Subcommand)]
pub enum PasswordCommand {
    /// Change your password; prompts for anything not given
    Change {
        #[arg(long)]
        old: Option<String>,
        #[arg(long)]
        new: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Update your own name, email or phone
    /// Example:
    ///     munificent profile update --first-name Aliya --phone "+7 777 123 45 67"
    #[command(verbatim_doc_comment)]
    Update {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
}

fn prompt_line(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(value) => eprint!("{} [{}]: ", label, value),
        None => eprint!("{}: ", label),
    }
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    let line = line.trim();
    Ok(match (line.is_empty(), default) {
        (true, Some(value)) => value.to_string(),
        _ => line.to_string(),
    })
}

fn prompt_secret(label: &str) -> Result<String> {
    rpassword::prompt_password_stderr(&format!("{}: ", label)).context("Failed to read password")
}

fn print_user(user: &User) {
    println!("{} ({})", user.full_name(), user.role);
    println!("  ID:       {}", user.id);
    println!("  Username: {}", user.username);
    println!("  Email:    {}", output::or_dash(Some(user.email.as_str())));
    println!("  Phone:    {}", output::or_dash(user.contact_phone()));
    if let Some(last_login) = user.last_login {
        println!("  Last login: {}", last_login.format("%Y-%m-%d %H:%M UTC"));
    }
}

/// Restore the stored session, failing when there is none.
async fn signed_in_user(session: &Session) -> Result<User> {
    let state = session.scope.run(async { Ok(session.auth.bootstrap().await) }).await;
    match state {
        Ok(AuthState::Authenticated(user)) => Ok(user),
        Ok(_) => Err(Failed::new(
            "Not signed in",
            &format!("Run `munificent --context {} login` first.", session.context),
        )),
        Err(e) => Err(Failed::from_error("Session check failed", &e)),
    }
}

pub async fn login(session: &Session, username: Option<String>, password: Option<String>) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => prompt_line("Username", session.username_hint.as_deref())?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt_secret("Password")?,
    };

    let outcome = session
        .scope
        .run(async { Ok(session.auth.login(&username, &password).await) })
        .await
        .map_err(|e| Failed::from_error("Login failed", &e))?;

    match outcome {
        Some(user) => {
            let home = user.role.default_path();
            session.out.data(&user, |user| {
                session.out.success(
                    "Signed in",
                    format!("Welcome, {} ({}). Home screen: {}", user.full_name(), user.role, home),
                );
            })
        }
        None => Err(Failed::new(
            "Login failed",
            "Check your username and password and try again.",
        )),
    }
}

pub fn logout(session: &Session) -> Result<()> {
    session
        .auth
        .logout()
        .map_err(|e| Failed::from_error("Logout failed", &e))?;
    session.out.success("Signed out", format!("Session for '{}' removed.", session.context));
    Ok(())
}

pub async fn whoami(session: &Session) -> Result<()> {
    let user = signed_in_user(session).await?;
    session.out.data(&user, print_user)
}

pub async fn refresh(session: &Session) -> Result<()> {
    call(&session.scope, "Token refresh failed", session.auth.refresh_access_token()).await?;
    session.out.success("Access token refreshed", "");
    Ok(())
}

pub async fn password(session: &Session, command: PasswordCommand) -> Result<()> {
    match command {
        PasswordCommand::Change { old, new } => {
            let old_password = match old {
                Some(value) => value,
                None => prompt_secret("Current password")?,
            };
            let new_password = match new {
                Some(value) => value,
                None => {
                    let first = prompt_secret("New password")?;
                    let again = prompt_secret("Repeat new password")?;
                    if first != again {
                        return Err(Failed::new("Password not changed", "The new passwords do not match."));
                    }
                    first
                }
            };
            let change = PasswordChange {
                old_password,
                new_password,
            };
            call(&session.scope, "Password not changed", session.auth.change_password(&change)).await?;
            session.out.success("Password changed", "");
        }
    }
    Ok(())
}

pub async fn profile(session: &Session, command: ProfileCommand) -> Result<()> {
    match command {
        ProfileCommand::Update {
            first_name,
            last_name,
            email,
            phone,
        } => {
            let patch = UserPatch {
                first_name,
                last_name,
                email,
                phone,
                ..UserPatch::default()
            };
            signed_in_user(session).await?;
            let user = call(&session.scope, "Profile not updated", session.auth.update_profile(&patch)).await?;
            session.out.data(&user, |user| {
                session.out.success("Profile updated", user.full_name());
            })?;
        }
    }
    Ok(())
}

pub async fn route(session: &Session, path: &str) -> Result<()> {
    let state = session
        .scope
        .run(async { Ok(session.auth.bootstrap().await) })
        .await
        .map_err(|e| Failed::from_error("Session check failed", &e))?;

    let resolution = router::resolve(&state, path);
    let report = serde_json::json!({
        "path": router::normalize(path),
        "session": state.name(),
        "role": state.role(),
        "resolution": describe(&resolution),
    });
    session.out.data(&report, |_| {
        println!("{} ({}): {}", router::normalize(path), state.name(), describe(&resolution));
    })
}

fn describe(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Loading => "loading".to_string(),
        Resolution::Render(screen) => format!("render {:?}", screen),
        Resolution::Redirect(to) => format!("redirect to {}", to),
        Resolution::NotFound => "not found".to_string(),
    }
}

pub async fn nav(session: &Session) -> Result<()> {
    let user = signed_in_user(session).await?;
    let items: Vec<serde_json::Value> = router::navigation(user.role)
        .iter()
        .map(|item| serde_json::json!({ "label": item.label, "path": item.path }))
        .collect();
    session.out.data(&items, |_| {
        println!("{} ({})", user.full_name(), user.role);
        for item in router::navigation(user.role) {
            println!("  {:<14} {}", item.label, item.path);
        }
    })
}
