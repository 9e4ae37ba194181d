//! Stateless wrappers for the backend auth endpoints. These keep paths and
//! error mapping centralized; session bookkeeping lives in
//! [`super::session`], and token attachment in the HTTP layer.

use crate::api::AuthHttp;
use crate::auth::types::{ProfileUpdate, RegisterRequest, TokenResponse, User};
use crate::error::{Error, ValidationErrors};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

/// Exchanges credentials for a bearer token via `POST /auth/login`.
///
/// Sent form-encoded (the backend's OAuth2 password flow) with the refresh
/// policy disabled: a 401 here means the credentials were rejected.
///
/// # Errors
/// Returns [`Error::InvalidCredentials`] on rejection; transport and other
/// HTTP failures pass through unchanged.
pub async fn login(
    http: &AuthHttp,
    email: &str,
    password: &SecretString,
) -> Result<TokenResponse, Error> {
    let form = [("username", email), ("password", password.expose_secret())];
    match http.post_form("/auth/login", &form).await {
        Err(Error::Unauthorized) => Err(Error::InvalidCredentials),
        other => other,
    }
}

/// Fetches the authenticated user from `GET /auth/me`.
///
/// # Errors
/// Returns [`Error::Unauthorized`] when the token is invalid and could not be
/// recovered by the HTTP layer's refresh policy.
pub async fn fetch_current_user(http: &AuthHttp) -> Result<User, Error> {
    http.get_json("/auth/me").await
}

/// Creates an account via `POST /auth/register`.
///
/// # Errors
/// Returns [`Error::Validation`] with field-level messages when the server
/// rejects the input, including the duplicate-email case.
pub async fn register(http: &AuthHttp, request: &RegisterRequest) -> Result<User, Error> {
    match http.post_json("/auth/register", request).await {
        // The backend reports a duplicate email as a plain 400.
        Err(Error::Http {
            status: 400,
            message,
        }) => Err(Error::Validation(ValidationErrors::message(message))),
        other => other,
    }
}

/// Updates a user's profile via `PUT /users/{id}`.
///
/// # Errors
/// Returns [`Error::Validation`] for rejected fields, [`Error::Unauthorized`]
/// for an unrecoverable session.
pub async fn update_profile(
    http: &AuthHttp,
    user_id: Uuid,
    changes: &ProfileUpdate,
) -> Result<User, Error> {
    http.put_json(&format!("/users/{user_id}"), changes).await
}
