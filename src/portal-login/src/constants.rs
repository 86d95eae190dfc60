//! Constants for the portal-login crate.

/// Path of the login endpoint, relative to the API base URL.
pub const LOGIN_PATH: &str = "/auth/login";

/// Service name for keyring storage.
pub const KEYRING_SERVICE: &str = "portal";

/// Account name for keyring storage.
pub const KEYRING_ACCOUNT: &str = "auth_token";

/// Support hotline shown on the login screen.
pub const SUPPORT_HOTLINE: &str = "0977854609";

/// Version string shown in the login screen footer.
pub const APP_VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));
