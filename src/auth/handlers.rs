use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::ApiError,
    extract::ApiJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let username = payload.username.as_deref().map(str::trim).unwrap_or("");
    let email = payload
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();
    let password = payload.password.as_deref().unwrap_or("");

    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation(
            "username, email y password son obligatorios".into(),
        ));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("Correo electrónico inválido".into()));
    }

    // Pre-checked before insert; a concurrent duplicate still falls to
    // the UNIQUE constraints and surfaces as a 500.
    if User::find_by_username(&state.db, username)
        .await
        .map_err(ApiError::internal)?
        .is_some()
    {
        warn!(username = %username, "username already taken");
        return Err(ApiError::DuplicateUsername);
    }
    if User::find_by_email(&state.db, &email)
        .await
        .map_err(ApiError::internal)?
        .is_some()
    {
        warn!(email = %email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let hash = hash_password(password).map_err(ApiError::internal)?;
    let user = User::create(
        &state.db,
        username,
        &email,
        &hash,
        payload.is_admin.unwrap_or(false),
    )
    .await
    .map_err(ApiError::internal)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = payload
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();
    let password = payload.password.as_deref().unwrap_or("");

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation(
            "email y password son obligatorios".into(),
        ));
    }

    // Unknown email and wrong password are deliberately the same
    // failure, so accounts cannot be enumerated.
    let user = match User::find_by_email(&state.db, &email)
        .await
        .map_err(ApiError::internal)?
    {
        Some(u) => u,
        None => {
            warn!(email = %email, "login with unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(password, &user.password_hash).map_err(ApiError::internal)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(&user).map_err(ApiError::internal)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        user: user.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_ordinary_addresses() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("a.b+c@sub.dominio.mx"));
    }

    #[test]
    fn email_regex_rejects_junk() {
        assert!(!is_valid_email("ana"));
        assert!(!is_valid_email("ana@"));
        assert!(!is_valid_email("ana@sitio"));
        assert!(!is_valid_email("con espacios@sitio.com"));
    }
}
