//! CLI argument structures and dispatch.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;

use crate::login_cmd::{self, GlobalOptions};

/// Log verbosity level for CLI output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors (default)
    #[default]
    Warn,
    /// Show informational messages, warnings, and errors
    Info,
    /// Show debug messages and above
    Debug,
    /// Show all messages including trace-level details
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<LogLevel> {
        match s.trim().to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// Portal - sign in with your phone number.
#[derive(Parser)]
#[command(name = "portal")]
#[command(author, version, about = "Portal - sign in with your phone number", long_about = None)]
pub struct Cli {
    /// Base URL of the Portal API (overrides PORTAL_API_URL and config.toml)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Log verbosity
    #[arg(long = "log-level", value_enum, global = true, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Display language: vi or en
    #[arg(long = "lang", value_name = "LANG", global = true)]
    pub lang: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with phone number and password
    Login(LoginCommand),

    /// Show whether a session token is stored
    Status,

    /// Remove the stored session token
    Logout(LogoutCommand),
}

/// Login command.
#[derive(Args, Debug, Default)]
pub struct LoginCommand {
    /// Phone number to sign in with
    #[arg(long = "phone", value_name = "PHONE")]
    pub phone: Option<String>,

    /// Read the password from stdin (non-interactive)
    #[arg(long = "password-stdin", requires = "phone")]
    pub password_stdin: bool,

    /// Keep the session token in memory only
    #[arg(long = "ephemeral", hide = true)]
    pub ephemeral: bool,
}

/// Logout command.
#[derive(Args, Debug, Default)]
pub struct LogoutCommand {
    /// Skip confirmation prompt and log out immediately.
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

impl Cli {
    fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            api_url: self.api_url.clone(),
            lang: self.lang.clone(),
        }
    }
}

/// Run the selected subcommand.
pub async fn dispatch_command(cli: Cli) -> Result<ExitCode> {
    let options = cli.global_options();
    match cli.command {
        Commands::Login(login) => login_cmd::run_login(&options, login).await,
        Commands::Status => login_cmd::run_status(&options).await,
        Commands::Logout(logout) => login_cmd::run_logout(&options, logout.yes).await,
    }
}
