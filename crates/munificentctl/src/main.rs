mod account;
mod config;
mod output;
mod resources;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{Config, Context, DEFAULT_CONTEXT};
use output::{Failed, Output};
use school_client::{ApiClient, AuthController, ClientConfig, FileSessionStore, Scope};

#[derive(Parser)]
#[command(name = "munificent")]
#[command(version, about = "Munificent School command line client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend API URL (overrides the context and MUNIFICENT_API_BASE_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Context to use instead of the current one
    #[arg(long, global = true)]
    context: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage named backends
    #[command(subcommand)]
    Context(ContextCommand),

    #[command(flatten)]
    Backend(BackendCommand),
}

/// Commands that talk to a backend.
#[derive(Subcommand)]
enum BackendCommand {
    /// Sign in and store the session for the context
    /// Examples:
    ///     munificent login --username admin
    ///     munificent --context prod login
    #[command(verbatim_doc_comment)]
    Login {
        #[arg(short, long)]
        username: Option<String>,
        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Exchange the refresh token for a new access token
    Refresh,

    /// Password management
    #[command(subcommand)]
    Password(account::PasswordCommand),

    /// Edit your own profile
    #[command(subcommand)]
    Profile(account::ProfileCommand),

    /// Show which screen a path resolves to for the current session
    /// Examples:
    ///     munificent route /app
    ///     munificent route /app/settings
    #[command(verbatim_doc_comment)]
    Route {
        path: String,
    },

    /// Show the sidebar for the signed-in role
    Nav,

    /// User accounts (admin)
    #[command(subcommand)]
    Users(resources::UsersCommand),

    /// Students (admin)
    #[command(subcommand)]
    Students(resources::StudentsCommand),

    /// Public teacher directory
    #[command(subcommand)]
    Teachers(resources::TeachersCommand),

    #[command(subcommand)]
    Courses(resources::CoursesCommand),

    #[command(subcommand)]
    Lessons(resources::LessonsCommand),

    /// Enrolment requests
    #[command(subcommand)]
    Applications(resources::ApplicationsCommand),

    #[command(subcommand)]
    Reviews(resources::ReviewsCommand),

    #[command(subcommand)]
    Blog(resources::BlogCommand),

    /// School settings (admin)
    #[command(subcommand)]
    Settings(resources::SettingsCommand),
}

#[derive(Subcommand)]
enum ContextCommand {
    /// Add a context
    /// Examples:
    ///     munificent context add local --url=http://localhost:8000/api
    ///     munificent context add prod --url=https://munificentschool.kz/api --set-current
    #[command(verbatim_doc_comment)]
    Add {
        name: String,
        /// Backend API URL
        #[arg(long)]
        url: String,
        /// Username suggested by `login`
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        set_current: bool,
    },
    /// List contexts
    List,
    /// Switch the current context
    Use { name: String },
    /// Delete a context and its stored session
    Delete { name: String },
    /// Show the current context
    Current,
}

/// Everything a command needs once the backend is known.
pub struct Session {
    pub auth: AuthController,
    pub scope: Scope,
    pub out: Output,
    pub context: String,
    pub username_hint: Option<String>,
}

impl Session {
    pub fn api(&self) -> &ApiClient {
        self.auth.api()
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,school_client=info,munificent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let out = Output { json: cli.json };

    if let Err(e) = run(cli, out).await {
        match e.downcast_ref::<Failed>() {
            Some(Failed(note)) => out.failure(note),
            None => out.failure(&school_client::Notification::danger("Error", format!("{:#}", e))),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, out: Output) -> Result<()> {
    let mut config = Config::load()?;

    let command = match cli.command {
        Commands::Context(command) => return handle_context_command(&mut config, command, out),
        Commands::Backend(command) => command,
    };

    let selected = config.select(cli.context.as_deref())?;
    let context_name = selected
        .as_ref()
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| DEFAULT_CONTEXT.to_string());

    let client_config = backend_config(
        ClientConfig::from_env()?,
        selected.as_ref().map(|(_, ctx)| ctx),
        cli.api_url,
    )?;
    tracing::debug!(context = %context_name, api_url = %client_config.api_base_url, "Using backend");

    let store = Arc::new(FileSessionStore::new(Config::session_path(&context_name)?));
    let api = ApiClient::new(&client_config, store)?;
    let session = Session {
        auth: AuthController::new(api),
        scope: Scope::new(context_name.clone()),
        out,
        username_hint: selected.and_then(|(_, ctx)| ctx.username),
        context: context_name,
    };

    let cancel = session.scope.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted");
            cancel.cancel();
        }
    });

    match command {
        BackendCommand::Login { username, password } => account::login(&session, username, password).await,
        BackendCommand::Logout => account::logout(&session),
        BackendCommand::Whoami => account::whoami(&session).await,
        BackendCommand::Refresh => account::refresh(&session).await,
        BackendCommand::Password(command) => account::password(&session, command).await,
        BackendCommand::Profile(command) => account::profile(&session, command).await,
        BackendCommand::Route { path } => account::route(&session, &path).await,
        BackendCommand::Nav => account::nav(&session).await,
        BackendCommand::Users(command) => resources::users(&session, command).await,
        BackendCommand::Students(command) => resources::students(&session, command).await,
        BackendCommand::Teachers(command) => resources::teachers(&session, command).await,
        BackendCommand::Courses(command) => resources::courses(&session, command).await,
        BackendCommand::Lessons(command) => resources::lessons(&session, command).await,
        BackendCommand::Applications(command) => resources::applications(&session, command).await,
        BackendCommand::Reviews(command) => resources::reviews(&session, command).await,
        BackendCommand::Blog(command) => resources::blog(&session, command).await,
        BackendCommand::Settings(command) => resources::settings(&session, command).await,
    }
}

/// Environment first, then the context, then `--api-url`.
fn backend_config(from_env: ClientConfig, context: Option<&Context>, api_url: Option<String>) -> Result<ClientConfig> {
    let mut config = from_env;
    if let Some(ctx) = context {
        config = ClientConfig::new(ctx.api_url.as_str()).with_timeout(config.timeout());
    }
    if let Some(url) = api_url {
        config = ClientConfig::new(url).with_timeout(config.timeout());
    }
    config.validate()?;
    Ok(config)
}

fn handle_context_command(config: &mut Config, command: ContextCommand, out: Output) -> Result<()> {
    match command {
        ContextCommand::Add {
            name,
            url,
            username,
            set_current,
        } => {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Failed::new(
                    "Context not added",
                    &format!("API URL must start with http:// or https://, got '{}'", url),
                ));
            }
            config.add(&name, Context::new(url).with_username(username), set_current);
            config.save()?;
            let description = if config.current_context.as_deref() == Some(name.as_str()) {
                format!("'{}' is now the current context.", name)
            } else {
                String::new()
            };
            out.success(&format!("Context '{}' added", name), description);
        }
        ContextCommand::List => {
            out.data(&*config, |config| {
                println!("  {:<15} {:<40} {:<12}", "NAME", "API URL", "USERNAME");
                for (name, ctx) in &config.contexts {
                    let current_mark = if config.current_context.as_ref() == Some(name) {
                        "*"
                    } else {
                        " "
                    };
                    println!(
                        "{} {:<15} {:<40} {:<12}",
                        current_mark,
                        name,
                        ctx.api_url,
                        output::or_dash(ctx.username.as_deref())
                    );
                }
            })?;
        }
        ContextCommand::Use { name } => {
            if !config.contexts.contains_key(&name) {
                return Err(Failed::new("Context not switched", &format!("Context '{}' not found.", name)));
            }
            config.current_context = Some(name.clone());
            config.save()?;
            out.success(&format!("Switched to context '{}'", name), "");
        }
        ContextCommand::Delete { name } => {
            if !config.remove(&name) {
                return Err(Failed::new("Context not deleted", &format!("Context '{}' not found.", name)));
            }
            config.save()?;
            let session_file = Config::session_path(&name)?;
            if session_file.exists() {
                std::fs::remove_file(&session_file)?;
            }
            out.success(&format!("Context '{}' deleted", name), "");
        }
        ContextCommand::Current => match config.get_current_context() {
            Some((name, ctx)) => {
                let current = serde_json::json!({ "name": name, "api_url": ctx.api_url, "username": ctx.username });
                out.data(&current, |_| {
                    println!("Current context: {}", name);
                    println!("  API URL:  {}", ctx.api_url);
                    println!("  Username: {}", output::or_dash(ctx.username.as_deref()));
                })?;
            }
            None => out.success("No current context set", "Using MUNIFICENT_API_BASE_URL or the built-in default."),
        },
    }
    Ok(())
}
