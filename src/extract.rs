use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// axum's Json with its rejection mapped into [`ApiError`], so a
/// malformed body returns the same `{"message"}` JSON shape as every
/// other failure.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path captures with unparseable values (e.g. a non-UUID id)
/// rendered as a 404 in the API error shape, matching a route that
/// simply does not resolve.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::NotFound("Recurso no encontrado")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use uuid::Uuid;

    #[derive(serde::Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        name: String,
    }

    #[tokio::test]
    async fn malformed_json_body_keeps_the_error_shape() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/admin/products")
            .header("content-type", "application/json")
            .body(Body::from("{esto no es json"))
            .expect("request");
        let err = ApiJson::<Payload>::from_request(req, &())
            .await
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_json_content_type_is_a_validation_error() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .body(Body::from(r#"{"email": "ana@example.com"}"#))
            .expect("request");
        let err = ApiJson::<Payload>::from_request(req, &())
            .await
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn unresolvable_path_capture_is_not_found() {
        let mut parts = Request::builder()
            .uri("/api/products/no-es-uuid")
            .body(())
            .expect("request")
            .into_parts()
            .0;
        let err = ApiPath::<Uuid>::from_request_parts(&mut parts, &())
            .await
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
