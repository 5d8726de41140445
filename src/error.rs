use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Every failure the API can return. Converted to a JSON body
/// `{"message": ...}` with the status for that condition; internal
/// errors are logged and rendered with a generic message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("El nombre de usuario ya existe")]
    DuplicateUsername,
    #[error("El correo electrónico ya existe")]
    DuplicateEmail,
    #[error("Credenciales inválidas")]
    InvalidCredentials,
    #[error("Token no proporcionado")]
    Unauthenticated,
    #[error("Token inválido")]
    InvalidToken,
    #[error("Token expirado")]
    TokenExpired,
    #[error("¡Solo administradores!")]
    Forbidden,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Parámetro inválido: {0}")]
    InvalidParameter(String),
    #[error("Error interno del servidor")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn internal<E: Into<anyhow::Error>>(err: E) -> Self {
        Self::Internal(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::DuplicateUsername
            | ApiError::DuplicateEmail
            | ApiError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials
            | ApiError::Unauthenticated
            | ApiError::TokenExpired => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(e) = &self {
            error!(error = %e, "request failed");
        }
        let body = Json(json!({ "message": self.to_string() }));
        (self.status(), body).into_response()
    }
}
