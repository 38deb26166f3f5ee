// Entrypoint for the `apos` CLI.
// - Parses arguments and installs logging.
// - Loads the session, builds the API client and hands both to the UI.
// - The only place that decides the exit code.

use anyhow::{Context, Result};
use apos_cli::api::ApiClient;
use apos_cli::config::{default_config_path, FileSessionStore, SessionStore};
use apos_cli::history::DEFAULT_WINDOW_DAYS;
use apos_cli::prompt::TerminalPrompter;
use apos_cli::ui::{self, App, HistoryKind, OrderOptions};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::style::Stylize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "apos")]
#[command(about = "Command Line Interface for 'APOS - Agile Pizza Ordering Service'")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/apos or ~/.config/apos)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use this service URL for this run instead of the configured one
    #[arg(long, global = true, env = "APOS_BASE_URL")]
    base_url: Option<String>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Login to your account and store a token for authentication, do this first!
    Login,
    /// Browse, join or create group orders
    Order {
        /// Lists all active group orders
        #[arg(short, long)]
        list: bool,
        /// Creates a group order
        #[arg(short, long)]
        create: bool,
    },
    /// Show your recent items or groups
    Show {
        #[arg(value_enum)]
        kind: Option<Kind>,
        /// Only entries whose deadline is less than this many days ago
        #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS, value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,
    },
    /// Check that the service is reachable and the token is accepted
    Status,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Items,
    Groups,
}

impl From<Kind> for HistoryKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Items => HistoryKind::Items,
            Kind::Groups => HistoryKind::Groups,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    println!(
        "Welcome to {}\n",
        "APOS the Agile Pizza Ordering Service".yellow()
    );

    if let Err(e) = run(cli) {
        ui::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("APOS_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        println!("Run `apos login` first, then `apos order` to get hungry. See `apos --help`.");
        return Ok(());
    };

    let path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let store = FileSessionStore::new(path);
    let session = store.load()?;
    tracing::debug!(path = %store.path().display(), base_url = %session.base_url, "session loaded");

    let api = match cli.base_url.as_deref() {
        Some(base_url) => ApiClient::new(base_url, session.token.clone()),
        None => ApiClient::from_session(&session),
    }
    .context("Failed to build HTTP client")?;
    tracing::debug!(base_url = api.base_url(), "using service");

    let mut app = App::new(api, store, session, TerminalPrompter);
    match command {
        Command::Login => app.login(),
        Command::Order { list, create } => app.order(OrderOptions { list, create }),
        Command::Show { kind, days } => app.show(kind.map(Into::into), days),
        Command::Status => app.status(),
    }
}
