//! `portal login`, `portal status` and `portal logout`.

use anyhow::{Context, Result, bail};
use secrecy::ExposeSecret;
use std::io::{self, IsTerminal, Read, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use portal_common::{AppDirs, Config, HOME_ENV_VAR};
use portal_login::{
    AuthClient, FallbackTokenStore, Field, Locale, LoginScreen, MemoryTokenStore, Route,
    StackNavigator, SubmitOutcome, TokenStore, User, mask_phone, safe_format_token,
};

use crate::styled_output::{print_error, print_info, print_success, stderr_colors};
use crate::terminal::{
    LineInput, TerminalInput, TerminalNotifier, field_prompt, render_field_errors, render_footer,
    render_header,
};

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub api_url: Option<String>,
    pub lang: Option<String>,
}

/// Resolved application settings.
pub struct AppContext {
    pub dirs: AppDirs,
    pub config: Config,
    pub locale: Locale,
}

impl AppContext {
    /// Resolve the home directory and configuration, applying flag overrides.
    pub fn load(options: &GlobalOptions) -> Result<Self> {
        let dirs = AppDirs::new().with_context(|| {
            format!("Could not determine the home directory. Set {HOME_ENV_VAR} to choose one.")
        })?;
        Self::load_from(dirs, options)
    }

    pub fn load_from(dirs: AppDirs, options: &GlobalOptions) -> Result<Self> {
        let config = Config::load(&dirs)
            .with_context(|| format!("Failed to load {}", dirs.config_file().display()))?
            .with_api_base_url(options.api_url.as_deref())?
            .with_locale(options.lang.as_deref());

        let locale = match config.locale.parse::<Locale>() {
            Ok(locale) => locale,
            Err(e) if options.lang.is_some() => bail!("Invalid --lang: {e}"),
            Err(e) => {
                warn!(error = %e, "Falling back to the default locale");
                Locale::default()
            }
        };

        debug!(
            api_base_url = %config.api_base_url,
            locale = %locale.tag(),
            "Loaded configuration"
        );
        Ok(Self {
            dirs,
            config,
            locale,
        })
    }

    /// Token store for this installation: keychain with file fallback.
    pub fn token_store(&self, ephemeral: bool) -> Result<Arc<dyn TokenStore>> {
        if ephemeral {
            return Ok(Arc::new(MemoryTokenStore::new()));
        }
        self.dirs
            .ensure_dirs()
            .with_context(|| format!("Failed to create {}", self.dirs.home.display()))?;
        Ok(Arc::new(FallbackTokenStore::system(self.dirs.auth_file())))
    }
}

/// How an interactive login session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginResult {
    SignedIn(User),
    /// The user left the prompt (Ctrl+C, Esc or end of input).
    Aborted,
    /// The screen was torn down while a request was in flight.
    Cancelled,
}

/// Run `portal login`.
pub async fn run_login(
    options: &GlobalOptions,
    command: crate::cli::LoginCommand,
) -> Result<ExitCode> {
    let ctx = AppContext::load(options)?;
    let store = ctx.token_store(command.ephemeral)?;
    let api = AuthClient::from_config(&ctx.config).context("Failed to create HTTP client")?;
    let navigator = Arc::new(StackNavigator::new(Route::Login));

    let shutdown = CancellationToken::new();
    let screen = LoginScreen::new(
        Arc::new(api),
        store,
        navigator.clone(),
        Arc::new(TerminalNotifier),
    )
    .with_locale(ctx.locale)
    .with_lifecycle(&shutdown);

    let watcher = tokio::spawn(watch_ctrl_c(shutdown.clone()));

    let result = if command.password_stdin {
        let phone = command.phone.unwrap_or_default();
        let password = read_password_from_stdin()?;
        match submit_once(&screen, &phone, password).await {
            SubmitOutcome::Succeeded(user) => LoginResult::SignedIn(user),
            SubmitOutcome::Blocked(_) => {
                let mut stderr = io::stderr();
                render_field_errors(&mut stderr, &screen.view(), stderr_colors())?;
                LoginResult::Aborted
            }
            SubmitOutcome::Cancelled => LoginResult::Cancelled,
            _ => LoginResult::Aborted,
        }
    } else {
        let mut input = TerminalInput::new();
        let mut stderr = io::stderr();
        drive_login(
            &screen,
            &navigator,
            &mut input,
            &mut stderr,
            stderr_colors(),
            command.phone,
        )
        .await?
    };

    shutdown.cancel();
    let _ = watcher.await;

    Ok(match result {
        LoginResult::SignedIn(user) => {
            print_success(&format!("{} ({})", user.name, mask_phone(&user.phone)));
            ExitCode::SUCCESS
        }
        LoginResult::Aborted => ExitCode::FAILURE,
        LoginResult::Cancelled => {
            print_info("Login cancelled.");
            ExitCode::FAILURE
        }
    })
}

/// Tear the screen down when the process receives Ctrl+C.
async fn watch_ctrl_c(shutdown: CancellationToken) {
    tokio::select! {
        _ = shutdown.cancelled() => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                return;
            }
            debug!("Ctrl+C received; tearing down login screen");
            shutdown.cancel();
        }
    }
}

fn read_password_from_stdin() -> Result<String> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        bail!(
            "The --password-stdin flag expects input from stdin. Try piping it: \
             `printf '%s' \"$PASSWORD\" | portal login --phone <PHONE> --password-stdin`"
        );
    }
    let mut buffer = String::new();
    stdin
        .read_to_string(&mut buffer)
        .context("Failed to read password from stdin")?;
    Ok(buffer.trim_end_matches(['\r', '\n']).to_string())
}

/// Fill both fields and submit once.
pub async fn submit_once(screen: &LoginScreen, phone: &str, password: String) -> SubmitOutcome {
    screen.change(Field::Phone, phone);
    screen.blur(Field::Phone);
    screen.change(Field::Password, password);
    screen.blur(Field::Password);
    screen.submit().await
}

enum PromptAction {
    Value(String),
    Keep,
    Navigate(Route),
    Abort,
}

/// Interpret one answer. Secret answers are taken verbatim and never read
/// as commands.
fn parse_prompt_line(line: Option<String>, secret: bool) -> PromptAction {
    let Some(line) = line else {
        return PromptAction::Abort;
    };
    if secret {
        return if line.is_empty() {
            PromptAction::Keep
        } else {
            PromptAction::Value(line)
        };
    }
    match line.trim() {
        ":forgot" => PromptAction::Navigate(Route::ForgotPassword),
        ":register" => PromptAction::Navigate(Route::Register),
        "" => PromptAction::Keep,
        _ => PromptAction::Value(line.trim().to_string()),
    }
}

/// Drive the login screen from line input until sign-in or abort.
///
/// Blocked and failed submits re-prompt with the previous values kept; an
/// empty answer keeps the current value of a field.
pub async fn drive_login<I, W>(
    screen: &LoginScreen,
    navigator: &StackNavigator,
    input: &mut I,
    out: &mut W,
    colors: bool,
    initial_phone: Option<String>,
) -> Result<LoginResult>
where
    I: LineInput,
    W: Write,
{
    if let Some(phone) = initial_phone {
        screen.change(Field::Phone, phone);
    }
    render_header(out, &screen.view())?;

    loop {
        let view = screen.view();
        render_footer(out, &view)?;

        let prompt = field_prompt(
            view.phone.label,
            view.phone.placeholder,
            Some(view.phone.value.as_str()),
        );
        match parse_prompt_line(input.read(&prompt, false)?, false) {
            PromptAction::Abort => {
                screen.teardown();
                return Ok(LoginResult::Aborted);
            }
            PromptAction::Navigate(route) => {
                open_secondary(screen, navigator, route, out)?;
                continue;
            }
            PromptAction::Keep => {}
            PromptAction::Value(phone) => screen.change(Field::Phone, phone),
        }
        screen.blur(Field::Phone);

        let masked = "*".repeat(view.password.value.chars().count());
        let prompt = field_prompt(
            view.password.label,
            view.password.placeholder,
            Some(masked.as_str()),
        );
        match parse_prompt_line(input.read(&prompt, true)?, true) {
            PromptAction::Abort => {
                screen.teardown();
                return Ok(LoginResult::Aborted);
            }
            PromptAction::Navigate(route) => {
                open_secondary(screen, navigator, route, out)?;
                continue;
            }
            PromptAction::Keep => {}
            PromptAction::Value(password) => screen.change(Field::Password, password),
        }
        screen.blur(Field::Password);

        writeln!(out, "  {}...", view.submit_label)?;
        match screen.submit().await {
            SubmitOutcome::Succeeded(user) => return Ok(LoginResult::SignedIn(user)),
            SubmitOutcome::Blocked(_) => render_field_errors(out, &screen.view(), colors)?,
            SubmitOutcome::Failed(message) => debug!(%message, "Login failed; prompting again"),
            SubmitOutcome::Cancelled | SubmitOutcome::Inactive => {
                return Ok(LoginResult::Cancelled);
            }
            SubmitOutcome::InFlight => {}
        }
    }
}

/// Secondary screens only exist in the mobile app; show the route and return.
fn open_secondary<W: Write>(
    screen: &LoginScreen,
    navigator: &StackNavigator,
    route: Route,
    out: &mut W,
) -> io::Result<()> {
    match route {
        Route::ForgotPassword => screen.forgot_password(),
        Route::Register => screen.register(),
        _ => return Ok(()),
    }
    writeln!(out, "  -> {}", navigator.current())?;
    navigator.go_back();
    Ok(())
}

/// Run `portal status`.
pub async fn run_status(options: &GlobalOptions) -> Result<ExitCode> {
    let ctx = AppContext::load(options)?;
    let store = ctx.token_store(false)?;
    Ok(if report_status(store.as_ref()).await? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Print whether a token is stored. Returns true when logged in.
pub async fn report_status(store: &dyn TokenStore) -> Result<bool> {
    match store.load_auth_token().await {
        Ok(Some(token)) => {
            print_success(&format!(
                "Logged in: {}",
                safe_format_token(token.expose_secret())
            ));
            Ok(true)
        }
        Ok(None) => {
            print_info("Not logged in.");
            Ok(false)
        }
        Err(e) => Err(e).context("Failed to check login status"),
    }
}

/// Run `portal logout`.
pub async fn run_logout(options: &GlobalOptions, skip_confirmation: bool) -> Result<ExitCode> {
    let ctx = AppContext::load(options)?;
    let store = ctx.token_store(false)?;

    match store.load_auth_token().await {
        Ok(Some(_)) => {}
        Ok(None) => {
            print_info("Not logged in.");
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => warn!(error = %e, "Could not read stored token; clearing anyway"),
    }

    if !skip_confirmation && io::stdin().is_terminal() {
        let mut input = TerminalInput::new();
        if !confirm(
            &mut input,
            "Are you sure you want to log out? This will remove your stored session. [y/N]: ",
        )? {
            print_info("Logout cancelled.");
            return Ok(ExitCode::SUCCESS);
        }
    }

    match clear_session(store.as_ref()).await {
        Ok(true) => {
            print_success("Logged out. The stored session has been removed.");
            Ok(ExitCode::SUCCESS)
        }
        Ok(false) => {
            print_info("Not logged in.");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            print_error(&format!("Failed to log out: {e:#}"));
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Ask a yes/no question. Anything but "y"/"yes" is a no.
pub fn confirm<I: LineInput>(input: &mut I, prompt: &str) -> io::Result<bool> {
    Ok(input
        .read(prompt, false)?
        .map(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
        .unwrap_or(false))
}

/// Remove the stored token from every location.
pub async fn clear_session(store: &dyn TokenStore) -> Result<bool> {
    store
        .clear_auth_token()
        .await
        .context("Failed to remove stored session")
}
