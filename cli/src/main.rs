use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use peer_review::actions::{self, ReviewForm};
use peer_review::auth::{self, Authenticator, LoginError, LoginForm, MockAuthenticator, RegisterError, RegisterForm};
use peer_review::config::{ClientConfig, ConfigError};
use peer_review::gate::Denial;
use peer_review::net::api::{ApiClient, ApiError};
use peer_review::notice::Notice;
use peer_review::routes::{self, NavItem, Navigation, Route, RouteError};
use peer_review::scope::ViewScope;
use peer_review::storage::{FileStorage, StorageError};
use peer_review::{Role, Session, SessionStore};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("api error: {0}")]
    Api(#[from] ApiError),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error("{}", .0.inline_message())]
    Login(#[from] LoginError),
    #[error("{}", .0.inline_message())]
    Register(#[from] RegisterError),
    #[error("access denied ({reason:?}); log in at {to}")]
    Denied { to: Route, reason: Denial },
    #[error("{0}")]
    Failed(Notice),
    #[error("failed to read {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("registration is not available in mock mode; log in with a built-in account (user/userpass, admin/adminpass)")]
    MockRegistration,
    #[error("interrupted")]
    Interrupted,
    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "peer-review", about = "Peer review platform client")]
struct Cli {
    /// Backend base URL.
    #[arg(long, env = "PEER_REVIEW_API_URL")]
    api_url: Option<String>,

    /// Session file.
    #[arg(long, env = "PEER_REVIEW_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Authenticate against the built-in demo accounts instead of the backend.
    /// `PEER_REVIEW_MOCK_AUTH` enables the same.
    #[arg(long, default_value_t = false)]
    mock: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        username: String,
        #[arg(long, env = "PEER_REVIEW_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value_t = false)]
        remember_me: bool,
    },
    Register {
        username: String,
        #[arg(long, env = "PEER_REVIEW_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "STUDENT")]
        role: Role,
    },
    Logout,
    Whoami,
    /// Resolve a view path for the current session.
    Open {
        path: String,
    },
    Nav,
    Message {
        text: String,
    },
    Upload {
        file: PathBuf,
    },
    Reviews {
        assignment_id: String,
    },
    Review {
        #[arg(long)]
        assignment_id: String,
        #[arg(long)]
        review_id: String,
        #[arg(long)]
        feedback: String,
        #[arg(long)]
        rating: u8,
    },
}

struct CliContext {
    config: ClientConfig,
    session: Arc<SessionStore>,
    api: ApiClient,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api_base_url = api_url.trim_end_matches('/').to_owned();
    }
    if let Some(session_file) = cli.session_file {
        config.session_file = session_file;
    }
    config.mock_auth |= cli.mock;

    let session = Arc::new(SessionStore::open(FileStorage::new(&config.session_file))?);
    let api = ApiClient::from_config(&config, Arc::clone(&session))?;
    tracing::debug!(api = %api.base_url(), session_file = %config.session_file.display(), mock = config.mock_auth, "client ready");
    let ctx = CliContext { config, session, api };

    match cli.command {
        Command::Login { username, password, remember_me } => {
            run_login(&ctx, LoginForm { username, password, remember_me }).await
        }
        Command::Register { username, password, role } => {
            run_register(&ctx, RegisterForm { username, password, role }).await
        }
        Command::Logout => {
            let next = auth::sign_out(&ctx.session)?;
            eprintln!("{}", Notice::success("Logged out."));
            print_json(&json!({ "next": next.path() }))
        }
        Command::Whoami => {
            let remembered = ctx.session.remembered_username().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "remembered username unavailable");
                None
            });
            print_json(&whoami_json(&ctx.session.snapshot(), remembered))
        }
        Command::Open { path } => {
            let navigation = routes::navigate(&path, &ctx.session.snapshot())?;
            print_json(&navigation_json(navigation))
        }
        Command::Nav => print_json(&nav_json(&routes::nav_items(&ctx.session.snapshot()))),
        Command::Message { text } => {
            require_view(&ctx.session, Route::Collaboration)?;
            let api = ctx.api.clone();
            let notice = run_in_view(Route::Collaboration, async move { Ok(actions::send_message(&api, &text).await) }).await?;
            match notice {
                Some(notice) => report(notice),
                None => Ok(()),
            }
        }
        Command::Upload { file } => {
            require_view(&ctx.session, Route::Collaboration)?;
            let contents = std::fs::read(&file).map_err(|source| CliError::ReadFile { path: file.clone(), source })?;
            let file_name = file_name_of(&file);
            let api = ctx.api.clone();
            let notice =
                run_in_view(Route::Collaboration, async move { Ok(actions::upload_file(&api, &file_name, contents).await) })
                    .await?;
            report(notice)
        }
        Command::Reviews { assignment_id } => {
            require_view(&ctx.session, Route::ReviewFeedback)?;
            let api = ctx.api.clone();
            let reviews = run_in_view(Route::ReviewFeedback, async move {
                actions::fetch_reviews(&api, &assignment_id).await.map_err(CliError::Failed)
            })
            .await?;
            print_json(&serde_json::to_value(reviews)?)
        }
        Command::Review { assignment_id, review_id, feedback, rating } => {
            require_view(&ctx.session, Route::ReviewFeedback)?;
            let form = ReviewForm { assignment_id, review_id, feedback, rating };
            let api = ctx.api.clone();
            let notice = run_in_view(Route::ReviewFeedback, async move { Ok(actions::submit_review(&api, &form).await) }).await?;
            report(notice)
        }
    }
}

async fn run_login(ctx: &CliContext, form: LoginForm) -> Result<(), CliError> {
    let authenticator = authenticator(ctx);
    match auth::submit_login(&ctx.session, authenticator.as_ref(), &form).await {
        Ok(outcome) => {
            eprintln!("{}", outcome.notice);
            print_json(&json!({ "role": outcome.role, "landing": outcome.landing.path() }))
        }
        Err(error) => {
            if let Some(notice) = error.notice() {
                eprintln!("{notice}");
            }
            Err(error.into())
        }
    }
}

async fn run_register(ctx: &CliContext, form: RegisterForm) -> Result<(), CliError> {
    ensure_registration_persists(ctx.config.mock_auth)?;
    let authenticator = authenticator(ctx);
    match auth::submit_registration(authenticator.as_ref(), &form).await {
        Ok(outcome) => {
            eprintln!("{}", outcome.notice);
            print_json(&json!({ "next": outcome.next.path() }))
        }
        Err(error) => {
            if let Some(notice) = error.notice() {
                eprintln!("{notice}");
            }
            Err(error.into())
        }
    }
}

fn authenticator(ctx: &CliContext) -> Arc<dyn Authenticator> {
    if ctx.config.mock_auth {
        Arc::new(MockAuthenticator::new())
    } else {
        Arc::new(ctx.api.clone())
    }
}

/// Mock accounts live only as long as the process, so a mock registration
/// could never be used to log in.
fn ensure_registration_persists(mock_auth: bool) -> Result<(), CliError> {
    if mock_auth {
        return Err(CliError::MockRegistration);
    }
    Ok(())
}

/// Refuse a command whose view the current session may not enter.
fn require_view(session: &SessionStore, view: Route) -> Result<(), CliError> {
    match routes::resolve(view, &session.snapshot()) {
        Navigation::Render(_) => Ok(()),
        Navigation::Redirect { to, reason } => Err(CliError::Denied { to, reason }),
    }
}

/// Run `work` as the body of `view`. Ctrl-C tears the view down and aborts it.
async fn run_in_view<F, T>(view: Route, work: F) -> Result<T, CliError>
where
    F: Future<Output = Result<T, CliError>> + Send + 'static,
    T: Send + 'static,
{
    let mut scope = ViewScope::new(view);
    let handle = scope.spawn(work);
    tokio::select! {
        joined = handle => joined?,
        _ = tokio::signal::ctrl_c() => {
            scope.teardown();
            Err(CliError::Interrupted)
        }
    }
}

fn report(notice: Notice) -> Result<(), CliError> {
    if notice.is_success() {
        eprintln!("{notice}");
        Ok(())
    } else {
        Err(CliError::Failed(notice))
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name().map_or_else(|| "upload".to_owned(), |name| name.to_string_lossy().into_owned())
}

fn whoami_json(session: &Session, remembered: Option<String>) -> Value {
    json!({
        "authenticated": session.is_authenticated(),
        "role": session.role(),
        "remembered_username": remembered,
    })
}

fn navigation_json(navigation: Navigation) -> Value {
    match navigation {
        Navigation::Render(route) => json!({ "render": route.path() }),
        Navigation::Redirect { to, reason } => json!({ "redirect": to.path(), "reason": format!("{reason:?}") }),
    }
}

fn nav_json(items: &[NavItem]) -> Value {
    Value::Array(
        items
            .iter()
            .map(|item| match item {
                NavItem::Link { label, route } => json!({ "label": label, "path": route.path() }),
                NavItem::Logout => json!({ "label": "Logout" }),
            })
            .collect(),
    )
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
