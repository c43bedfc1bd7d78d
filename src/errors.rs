use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::{error, warn};

/// Failure taxonomy for the model-response validation pipeline.
///
/// Structural validation is fail-fast: the first defect encountered in
/// iteration order aborts the whole request. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("no response from the AI service")]
    ModelUnavailable,

    #[error("model response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("model response is missing required field '{0}' or it has the wrong type")]
    MissingField(String),

    #[error("summary element at index {0} is not a string")]
    SummaryElementNotString(usize),

    #[error("item at index {index} is missing required field '{field}' or it has the wrong type")]
    MissingItemField { field: String, index: usize },

    #[error("item at index {0} is not a JSON object")]
    ItemNotObject(usize),

    #[error("item at index {index} has an empty '{field}' field")]
    EmptyField { field: String, index: usize },

    #[error("expected at least {min} quiz questions, got {got}")]
    TooFew { got: usize, min: usize },

    #[error("expected at most {max} quiz questions, got {got}")]
    TooMany { got: usize, max: usize },

    #[error("expected exactly {expected} flashcards, got {got}")]
    WrongCount { got: usize, expected: usize },

    #[error("quiz item at index {index}: 'answer' not in 'options'")]
    AnswerNotInOptions { index: usize },
}

impl GenerationError {
    pub fn missing(field: &str) -> Self {
        GenerationError::MissingField(field.to_string())
    }

    pub fn missing_at(field: &str, index: usize) -> Self {
        GenerationError::MissingItemField {
            field: field.to_string(),
            index,
        }
    }

    pub fn empty_at(field: &str, index: usize) -> Self {
        GenerationError::EmptyField {
            field: field.to_string(),
            index,
        }
    }
}

/// Terminal HTTP error carrying the single human-readable `detail` string
/// that forms the external error contract.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    /// Input-shape rejection, raised before any model call.
    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            detail: detail.into(),
        }
    }

    pub fn service_unavailable(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, detail = %self.detail, "Request failed");
        } else {
            warn!(status = %self.status, detail = %self.detail, "Request rejected");
        }
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_errors_name_their_bounds() {
        let err = GenerationError::TooFew { got: 4, min: 5 };
        assert!(err.to_string().contains("at least 5"));
        assert!(err.to_string().contains("4"));

        let err = GenerationError::TooMany { got: 11, max: 10 };
        assert!(err.to_string().contains("at most 10"));

        let err = GenerationError::WrongCount {
            got: 11,
            expected: 10,
        };
        assert!(err.to_string().contains("10"));
        assert!(err.to_string().contains("11"));
    }

    #[test]
    fn test_field_errors_name_field_and_index() {
        let err = GenerationError::missing("quiz");
        assert!(err.to_string().contains("'quiz'"));

        let err = GenerationError::missing_at("options", 3);
        let message = err.to_string();
        assert!(message.contains("'options'"));
        assert!(message.contains("index 3"));
    }

    #[test]
    fn test_answer_not_in_options_message() {
        let err = GenerationError::AnswerNotInOptions { index: 0 };
        assert!(err.to_string().contains("'answer' not in 'options'"));
    }

    #[test]
    fn test_invalid_json_mentions_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json {{").unwrap_err();
        let err = GenerationError::from(parse_err);
        assert!(err.to_string().contains("JSON"));
    }

    #[test]
    fn test_api_error_status_mapping() {
        assert_eq!(
            ApiError::unprocessable("bad input").status,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::internal("boom").status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::unauthorized("no token").status,
            StatusCode::UNAUTHORIZED
        );
    }
}
