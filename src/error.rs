use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

use crate::db::store::StoreError;
use crate::services::llm_service::LlmError;

/// Error body returned by every handler.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("AI provider not configured")]
    ProviderNotConfigured,
    #[error("AI provider request failed")]
    Provider(#[from] LlmError),
    #[error("Invalid AI output")]
    InvalidAiOutput { details: String, raw: String },
    #[error("Database operation failed")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    fn body(&self) -> ErrorBody {
        let (details, raw) = match self {
            ApiError::Provider(err) => (Some(err.to_string()), None),
            ApiError::InvalidAiOutput { details, raw } => {
                (Some(details.clone()), Some(raw.clone()))
            }
            ApiError::Store(err) => (Some(err.to_string()), None),
            _ => (None, None),
        };

        ErrorBody {
            error: self.to_string(),
            details,
            raw,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidAiOutput { .. } => StatusCode::BAD_GATEWAY,
            ApiError::ProviderNotConfigured
            | ApiError::Provider(_)
            | ApiError::Store(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_rt::test]
    async fn invalid_ai_output_is_bad_gateway_with_raw_text() {
        let err = ApiError::InvalidAiOutput {
            details: "missing keys: roadmap".to_string(),
            raw: "not json".to_string(),
        };
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let bytes = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Invalid AI output");
        assert_eq!(body["details"], "missing keys: roadmap");
        assert_eq!(body["raw"], "not json");
    }

    #[test]
    fn bad_request_omits_optional_fields() {
        let body = ApiError::bad_request("destinations are required").body();
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "destinations are required" }));
    }
}
