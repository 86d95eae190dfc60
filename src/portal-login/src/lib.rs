//! Portal Login - phone-number sign-in for the Portal app.
//!
//! Provides:
//! - Credential validation with localized messages
//! - A client for the `POST /auth/login` endpoint
//! - Session token storage (OS keychain with file fallback)
//! - The login screen controller, with navigation and toast collaborators
//!
//! The controller is headless: it exposes a [`LoginView`] snapshot and takes
//! discrete input events, so any front-end (terminal, GUI, tests) can drive it.

// Core modules
pub mod constants;
pub mod i18n;
pub mod types;
mod utils;
pub mod validation;

// Collaborators
pub mod api;
pub mod navigation;
pub mod notify;
pub mod storage;

// Screen
pub mod form;
pub mod screen;

pub use constants::{APP_VERSION, LOGIN_PATH, SUPPORT_HOTLINE};
pub use i18n::{Locale, Message};
pub use types::{LoginPayload, LoginResponse, User};
pub use validation::{Field, FieldErrors, ValidationError, validate};

pub use api::{ApiError, AuthApi, AuthClient};
pub use navigation::{Navigator, Route, StackNavigator};
pub use notify::{Notifier, RecordingNotifier, Toast, ToastKind};
pub use storage::{
    FallbackTokenStore, FileTokenStore, KeyringTokenStore, MemoryTokenStore, StorageError,
    TokenStore,
};

pub use form::{FieldState, LoginForm};
pub use screen::{FieldView, LoginScreen, LoginState, LoginView, SubmitOutcome};

pub use utils::{mask_phone, safe_format_token};
