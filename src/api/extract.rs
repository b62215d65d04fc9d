//! Request extractors
//!
//! `ApiJson` wraps axum's `Json` so malformed or mistyped bodies come back
//! as a `Validation` error with the usual JSON error body.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::GigletError;

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = GigletError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(rejection_to_error(rejection)),
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> GigletError {
    debug!(status = %rejection.status(), "Rejected request body");
    GigletError::Validation(rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Score {
        quality_score: u8,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let ApiJson(score) = ApiJson::<Score>::from_request(json_request(r#"{"quality_score": 88}"#), &())
            .await
            .unwrap();
        assert_eq!(score.quality_score, 88);
    }

    #[tokio::test]
    async fn test_bad_bodies_are_validation_errors() {
        for body in [r#"{"quality_score": 300}"#, "{not json", r#"{"other": 1}"#] {
            let err = ApiJson::<Score>::from_request(json_request(body), &())
                .await
                .unwrap_err();
            assert!(matches!(err, GigletError::Validation(_)), "{body}: {err}");
        }
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let request = Request::builder()
            .method("POST")
            .body(Body::from(r#"{"quality_score": 88}"#))
            .unwrap();
        let err = ApiJson::<Score>::from_request(request, &()).await.unwrap_err();
        assert!(matches!(err, GigletError::Validation(_)));
    }
}
