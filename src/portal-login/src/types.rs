//! Wire types for the authentication endpoint.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Credentials sent to `POST /auth/login`.
///
/// Wiped from memory when dropped.
#[derive(Clone, PartialEq, Eq, Serialize, Zeroize, ZeroizeOnDrop)]
pub struct LoginPayload {
    pub phone: String,
    pub password: String,
}

impl LoginPayload {
    pub fn new(phone: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginPayload")
            .field("phone", &self.phone)
            .field("password", &"***")
            .finish()
    }
}

/// User record returned alongside the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub phone: String,
    pub name: String,
}

/// Successful login result.
///
/// The token is opaque to the client and is handed to the token store as-is.
#[derive(Debug)]
pub struct LoginResponse {
    pub token: SecretString,
    pub user: User,
}

/// JSON shape of a successful login response.
#[derive(Deserialize)]
pub(crate) struct LoginResponseBody {
    pub token: String,
    pub user: User,
}

impl From<LoginResponseBody> for LoginResponse {
    fn from(body: LoginResponseBody) -> Self {
        Self {
            token: SecretString::from(body.token),
            user: body.user,
        }
    }
}
