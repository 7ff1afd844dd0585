mod render;

use std::process::ExitCode;

use attendance::config::{ClientConfig, ConfigError, normalize_api_url};
use attendance::net::api::{self, ApiError, DateRange, ReportFilter, SearchFilter};
use attendance::net::types::{AttendanceStatus, Credentials};
use attendance::router::{NavigationError, RolePolicy, Route};
use attendance::{App, AppError};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error("{}", .0.display_message())]
    Api(ApiError),
    #[error("session expired, please log in again")]
    SessionExpired,
    #[error("unknown status '{0}' (expected one of: {statuses})", statuses = status_list())]
    InvalidStatus(String),
}

impl From<ApiError> for CliError {
    fn from(error: ApiError) -> Self {
        if error.is_unauthenticated() { Self::SessionExpired } else { Self::Api(error) }
    }
}

fn status_list() -> String {
    AttendanceStatus::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
}

#[derive(Parser, Debug)]
#[command(name = "attendance-cli", about = "Attendance tracking client")]
struct Cli {
    /// API base URL, including the `/api` prefix.
    #[arg(long)]
    api_url: Option<String>,

    /// Session storage file.
    #[arg(long)]
    storage: Option<std::path::PathBuf>,

    /// Keep users on pages meant for their role.
    #[arg(long, default_value_t = false)]
    enforce_roles: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "ATTENDANCE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Whoami,
    /// Open a page by path, e.g. `/report`.
    Open {
        path: String,
    },
    Attendance(AttendanceCommand),
    Search(SearchArgs),
    Report(ReportCommand),
}

#[derive(Args, Debug)]
struct AttendanceCommand {
    #[command(subcommand)]
    command: AttendanceSubcommand,
}

#[derive(Subcommand, Debug)]
enum AttendanceSubcommand {
    Today,
    CheckIn,
    CheckOut,
}

#[derive(Args, Debug)]
struct RangeArgs {
    /// First day, `YYYY-MM-DD`.
    #[arg(long)]
    from: Option<String>,
    /// Last day, `YYYY-MM-DD`.
    #[arg(long)]
    to: Option<String>,
    #[arg(long)]
    status: Option<String>,
}

#[derive(Args, Debug)]
struct SearchArgs {
    #[command(flatten)]
    range: RangeArgs,
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    per_page: Option<u32>,
}

#[derive(Args, Debug)]
struct ReportCommand {
    #[command(subcommand)]
    command: ReportSubcommand,
}

#[derive(Subcommand, Debug)]
enum ReportSubcommand {
    List(ReportArgs),
    Export(ReportArgs),
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[command(flatten)]
    range: RangeArgs,
    #[arg(long)]
    student_id: Option<String>,
    #[arg(long)]
    student_name: Option<String>,
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    per_page: Option<u32>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config.api_url = normalize_api_url(url)?;
    }
    if let Some(path) = cli.storage {
        config.storage_path = path;
    }
    if cli.enforce_roles {
        config.role_policy = RolePolicy::Enforce;
    }
    tracing::debug!(api_url = %config.api_url, policy = ?config.role_policy, "starting");
    let app = App::from_config(&config)?;

    match cli.command {
        Command::Login { username, password } => run_login(&app, Credentials { username, password }).await,
        Command::Logout => {
            app.logout().await?;
            println!("Logged out.");
            Ok(())
        }
        Command::Whoami => {
            match app.store().initialize().await.user() {
                Some(user) => println!("{}", render::user(user)),
                None => println!("Not logged in."),
            }
            Ok(())
        }
        Command::Open { path } => run_open(&app, &path).await,
        Command::Attendance(cmd) => run_attendance(&app, cmd).await,
        Command::Search(args) => run_search(&app, args).await,
        Command::Report(cmd) => run_report(&app, cmd).await,
    }
}

/// Open `route` as a page load. Returns `false` when the guard sent us elsewhere.
async fn open_page(app: &App, route: &Route) -> Result<bool, CliError> {
    let nav = app.navigate(route.path()).await?;
    if !nav.redirected() {
        return Ok(true);
    }
    if nav.landed.route == Route::Login {
        println!("Please log in first: attendance-cli login -u <username>");
    } else {
        println!("Redirected to {}", nav.landed.route);
    }
    Ok(false)
}

async fn run_login(app: &App, credentials: Credentials) -> Result<(), CliError> {
    let nav = app.navigate(Route::Login.path()).await?;
    if nav.redirected() {
        let session = app.session().await;
        let name = session.user().map_or("", |u| u.display_name());
        println!("Already logged in as {name}. Landing page: {}", nav.landed.route);
        return Ok(());
    }

    let nav = app.login(&credentials).await?;
    let session = app.session().await;
    if let Some(user) = session.user() {
        println!("Logged in as {} ({}).", user.display_name(), user.role);
    }
    println!("Opened {}", nav.landed.route);
    Ok(())
}

async fn run_open(app: &App, path: &str) -> Result<(), CliError> {
    let nav = app.navigate(path).await?;
    match &nav.landed.route {
        Route::NotFound(_) => println!("Page not found."),
        landed if nav.redirected() => println!("Redirected from {} to {landed}", nav.requested),
        landed => println!("Opened {landed}"),
    }
    Ok(())
}

async fn run_attendance(app: &App, cmd: AttendanceCommand) -> Result<(), CliError> {
    if !open_page(app, &Route::Attendance).await? {
        return Ok(());
    }
    let student = app.student().await?;
    let out = match cmd.command {
        AttendanceSubcommand::Today => render::today(&api::today(app, &student).await?),
        AttendanceSubcommand::CheckIn => render::check_in(&api::check_in(app, &student).await?),
        AttendanceSubcommand::CheckOut => render::check_out(&api::check_out(app, &student).await?),
    };
    println!("{out}");
    Ok(())
}

fn parse_status(raw: Option<&str>) -> Result<Option<AttendanceStatus>, CliError> {
    raw.map(|s| AttendanceStatus::parse(s).ok_or_else(|| CliError::InvalidStatus(s.to_owned())))
        .transpose()
}

async fn run_search(app: &App, args: SearchArgs) -> Result<(), CliError> {
    if !open_page(app, &Route::Search).await? {
        return Ok(());
    }
    let filter = SearchFilter {
        range: DateRange::from_bounds(args.range.from.as_deref(), args.range.to.as_deref())?,
        status: parse_status(args.range.status.as_deref())?,
        page: args.page,
        per_page: args.per_page,
    };
    let student = app.student().await?;
    println!("{}", render::records(&api::search(app, &student, &filter).await?));
    Ok(())
}

async fn run_report(app: &App, cmd: ReportCommand) -> Result<(), CliError> {
    if !open_page(app, &Route::Report).await? {
        return Ok(());
    }
    let (export, args) = match cmd.command {
        ReportSubcommand::List(args) => (false, args),
        ReportSubcommand::Export(args) => (true, args),
    };
    let filter = ReportFilter {
        range: DateRange::from_bounds(args.range.from.as_deref(), args.range.to.as_deref())?,
        status: parse_status(args.range.status.as_deref())?,
        student_id: args.student_id,
        student_name: args.student_name,
        page: args.page,
        per_page: args.per_page,
    };

    if export {
        let link = api::export(app, &filter).await?;
        println!("Export ready: {}", link.url);
    } else {
        println!("{}", render::report(&api::report(app, &filter).await?));
    }
    Ok(())
}
