//! Login screen controller.
//!
//! Headless state machine behind the login screen:
//!
//! ```text
//! Idle --submit(valid)--> Submitting --ok--> Succeeded
//!   ^                         |
//!   +--------- error ---------+
//! ```
//!
//! The screen owns a cancellation token tied to its lifecycle. Once it is
//! cancelled (via [`LoginScreen::teardown`], a parent token, or drop) a
//! request that resolves later changes nothing: no token is stored, no toast
//! is shown, no navigation happens.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::AuthApi;
use crate::constants::{APP_VERSION, SUPPORT_HOTLINE};
use crate::form::LoginForm;
use crate::i18n::{Locale, Message, support_line, text};
use crate::navigation::{Navigator, Route};
use crate::notify::{Notifier, Toast};
use crate::storage::TokenStore;
use crate::types::{LoginResponse, User};
use crate::utils::mask_phone;
use crate::validation::{Field, FieldErrors};

/// Lifecycle state of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    /// Form editable, submit enabled.
    Idle,
    /// A login request is in flight; submit disabled.
    Submitting,
    /// Token stored and navigation to Home done.
    Succeeded,
    /// The screen is gone; every event is ignored.
    TornDown,
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; no request was made.
    Blocked(FieldErrors),
    /// A request is already in flight; no second request was made.
    InFlight,
    /// The screen already succeeded or was torn down.
    Inactive,
    /// Logged in.
    Succeeded(User),
    /// The request failed; carries the message shown to the user.
    Failed(String),
    /// The screen was torn down before the request resolved.
    Cancelled,
}

/// Render data for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub label: &'static str,
    pub placeholder: &'static str,
    pub value: String,
    /// Error message, only for touched fields.
    pub error: Option<&'static str>,
    /// Input should be masked.
    pub secure: bool,
}

/// Everything needed to draw the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginView {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub phone: FieldView,
    pub password: FieldView,
    pub forgot_password_label: &'static str,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    /// Show a loading indicator in place of the submit label.
    pub show_spinner: bool,
    pub register_prompt: &'static str,
    pub register_label: &'static str,
    pub support_line: String,
    pub version: &'static str,
}

struct Inner {
    form: LoginForm,
    state: LoginState,
}

/// Controller for the login screen.
pub struct LoginScreen {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    locale: Locale,
    lifecycle: CancellationToken,
    inner: Mutex<Inner>,
}

impl LoginScreen {
    pub fn new(
        api: Arc<dyn AuthApi>,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            store,
            navigator,
            notifier,
            locale: Locale::default(),
            lifecycle: CancellationToken::new(),
            inner: Mutex::new(Inner {
                form: LoginForm::new(),
                state: LoginState::Idle,
            }),
        }
    }

    /// Set the display language.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Tie the screen to an externally owned lifecycle token, such as the
    /// application's shutdown token.
    ///
    /// The screen tears down when `token` is cancelled. Tearing down or
    /// dropping the screen never cancels `token` itself.
    pub fn with_lifecycle(mut self, token: &CancellationToken) -> Self {
        self.lifecycle = token.child_token();
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn state(&self) -> LoginState {
        let inner = self.inner.lock();
        self.effective_state(inner.state)
    }

    /// Snapshot of the form.
    pub fn form(&self) -> LoginForm {
        self.inner.lock().form.clone()
    }

    pub fn is_torn_down(&self) -> bool {
        self.lifecycle.is_cancelled()
    }

    fn effective_state(&self, state: LoginState) -> LoginState {
        if self.lifecycle.is_cancelled() {
            LoginState::TornDown
        } else {
            state
        }
    }

    /// Field value changed.
    pub fn change(&self, field: Field, value: impl Into<String>) {
        let mut inner = self.inner.lock();
        if !self.accepts_input(inner.state) {
            debug!(?field, "Ignoring change on inactive login screen");
            return;
        }
        inner.form.change(field, value);
    }

    /// Field lost focus.
    pub fn blur(&self, field: Field) {
        let mut inner = self.inner.lock();
        if !self.accepts_input(inner.state) {
            debug!(?field, "Ignoring blur on inactive login screen");
            return;
        }
        inner.form.blur(field);
    }

    fn accepts_input(&self, state: LoginState) -> bool {
        matches!(
            self.effective_state(state),
            LoginState::Idle | LoginState::Submitting
        )
    }

    /// Validate and, if clean, log in.
    ///
    /// At most one request is in flight per screen; submitting again while
    /// one is pending returns [`SubmitOutcome::InFlight`] without calling the
    /// API.
    pub async fn submit(&self) -> SubmitOutcome {
        let payload = {
            let mut inner = self.inner.lock();
            match self.effective_state(inner.state) {
                LoginState::Submitting => {
                    debug!("Ignoring submit while a login request is in flight");
                    return SubmitOutcome::InFlight;
                }
                LoginState::Succeeded | LoginState::TornDown => return SubmitOutcome::Inactive,
                LoginState::Idle => {}
            }

            inner.form.touch_all();
            let errors = inner.form.validate();
            if !errors.is_empty() {
                debug!(
                    errors = errors.iter().count(),
                    "Login blocked by form validation"
                );
                return SubmitOutcome::Blocked(errors);
            }

            inner.state = LoginState::Submitting;
            inner.form.payload()
        };

        info!(phone = %mask_phone(&payload.phone), "Submitting login");
        let result = tokio::select! {
            biased;
            _ = self.lifecycle.cancelled() => {
                debug!("Login screen torn down while request was in flight; dropping result");
                return SubmitOutcome::Cancelled;
            }
            result = self.api.login(&payload) => result,
        };
        drop(payload);

        match result {
            Ok(response) => self.finish_success(response).await,
            Err(err) => {
                warn!(error = %err, status = ?err.status(), "Login request failed");
                self.finish_failure(err.server_message().map(str::to_string))
            }
        }
    }

    async fn finish_success(&self, response: LoginResponse) -> SubmitOutcome {
        let LoginResponse { token, user } = response;

        if self.lifecycle.is_cancelled() {
            debug!("Login screen torn down before the token was stored; dropping result");
            return SubmitOutcome::Cancelled;
        }

        // Once started, the write is not interrupted by teardown; only UI effects are.
        if let Err(e) = self.store.save_auth_token(token).await {
            warn!(error = %e, "Failed to persist session token");
            return self.finish_failure(None);
        }

        {
            let mut inner = self.inner.lock();
            if self.lifecycle.is_cancelled() {
                debug!("Login screen torn down after token was stored; skipping UI updates");
                return SubmitOutcome::Cancelled;
            }
            inner.state = LoginState::Succeeded;
        }

        info!(user_id = %user.id, "Login succeeded");
        self.notifier
            .show(Toast::success(text(self.locale, Message::LoginSucceeded)));
        self.navigator.replace(Route::Home);
        SubmitOutcome::Succeeded(user)
    }

    fn finish_failure(&self, server_message: Option<String>) -> SubmitOutcome {
        {
            let mut inner = self.inner.lock();
            if self.lifecycle.is_cancelled() {
                return SubmitOutcome::Cancelled;
            }
            inner.state = LoginState::Idle;
        }

        let message = server_message
            .unwrap_or_else(|| text(self.locale, Message::TryAgainLater).to_string());
        self.notifier.show(Toast::error(
            text(self.locale, Message::LoginFailed),
            message.clone(),
        ));
        SubmitOutcome::Failed(message)
    }

    /// Open the password recovery screen.
    pub fn forgot_password(&self) {
        if !self.is_torn_down() {
            self.navigator.navigate(Route::ForgotPassword);
        }
    }

    /// Open the registration screen.
    pub fn register(&self) {
        if !self.is_torn_down() {
            self.navigator.navigate(Route::Register);
        }
    }

    /// End the screen's lifecycle. Pending requests resolve as no-ops.
    pub fn teardown(&self) {
        if !self.lifecycle.is_cancelled() {
            debug!("Tearing down login screen");
            self.lifecycle.cancel();
        }
    }

    /// Current render data.
    pub fn view(&self) -> LoginView {
        let inner = self.inner.lock();
        let state = self.effective_state(inner.state);
        let locale = self.locale;
        let phone = inner.form.field(Field::Phone);
        let password = inner.form.field(Field::Password);

        LoginView {
            title: text(locale, Message::Title),
            subtitle: text(locale, Message::Subtitle),
            phone: FieldView {
                label: text(locale, Message::PhoneLabel),
                placeholder: text(locale, Message::PhonePlaceholder),
                value: phone.value.clone(),
                error: phone.visible_error().map(|e| e.message(locale)),
                secure: false,
            },
            password: FieldView {
                label: text(locale, Message::PasswordLabel),
                placeholder: text(locale, Message::PasswordPlaceholder),
                value: password.value.clone(),
                error: password.visible_error().map(|e| e.message(locale)),
                secure: true,
            },
            forgot_password_label: text(locale, Message::ForgotPassword),
            submit_label: text(locale, Message::SubmitLabel),
            submit_enabled: state == LoginState::Idle,
            show_spinner: state == LoginState::Submitting,
            register_prompt: text(locale, Message::NoAccount),
            register_label: text(locale, Message::RegisterNow),
            support_line: support_line(locale, SUPPORT_HOTLINE),
            version: APP_VERSION,
        }
    }
}

impl Drop for LoginScreen {
    fn drop(&mut self) {
        self.lifecycle.cancel();
    }
}
