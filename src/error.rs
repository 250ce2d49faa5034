use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::gemini::GeminiError;
use crate::store::StoreError;

/// Every failure the recipe pipeline can surface, tagged with a
/// machine-readable kind so callers can decide between re-upload,
/// re-entry, or a plain retry without parsing message text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidArgument(String),

    /// The model refused on content-safety grounds. `ratings` holds the
    /// classification detail for logging and the response `details` field.
    #[error("the content was blocked for safety reasons")]
    SafetyBlocked { ratings: Value },

    #[error("the model failed to provide a usable response")]
    EmptyResponse,

    #[error("the model returned a response without a JSON object")]
    NoJsonFound,

    /// `body` is the bracket-bounded substring that failed to parse. It is
    /// logged server-side and never echoed to the caller.
    #[error("there was an issue parsing the generated recipe, please try again")]
    MalformedJson { body: String },

    #[error("the generated recipe was incomplete and missed the '{field}' field")]
    IncompleteRecipe { field: &'static str },

    #[error("model request failed: {0}")]
    Upstream(#[from] GeminiError),

    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Wire-level error kind, per the callable contract.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidArgument(_) => "invalid-argument",
            ApiError::SafetyBlocked { .. } => "permission-denied",
            _ => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::SafetyBlocked { .. } => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Diagnostic payload attached to the response. Callers must never need
    /// it for control flow.
    fn details(&self) -> Option<Value> {
        match self {
            ApiError::SafetyBlocked { ratings } => Some(json!({ "safetyRatings": ratings })),
            ApiError::IncompleteRecipe { field } => Some(json!({ "missingField": field })),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut payload = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let Some(details) = self.details() {
            payload["details"] = details;
        }
        (self.status(), Json(payload)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kinds_map_to_the_callable_contract() {
        assert_eq!(
            ApiError::InvalidArgument("missing image".into()).kind(),
            "invalid-argument"
        );
        assert_eq!(
            ApiError::SafetyBlocked { ratings: Value::Null }.kind(),
            "permission-denied"
        );
        assert_eq!(ApiError::EmptyResponse.kind(), "internal");
        assert_eq!(ApiError::NoJsonFound.kind(), "internal");
        assert_eq!(
            ApiError::MalformedJson { body: "{oops".into() }.kind(),
            "internal"
        );
        assert_eq!(
            ApiError::IncompleteRecipe { field: "tags" }.kind(),
            "internal"
        );
    }

    #[test]
    fn statuses_follow_kinds() {
        let bad = ApiError::InvalidArgument("empty".into()).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let blocked = ApiError::SafetyBlocked { ratings: Value::Null }.into_response();
        assert_eq!(blocked.status(), StatusCode::FORBIDDEN);

        let internal = ApiError::EmptyResponse.into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_json_message_never_contains_the_body() {
        let err = ApiError::MalformedJson {
            body: "{\"secret\": \"raw model output\"".into(),
        };
        assert!(!err.to_string().contains("raw model output"));
    }

    #[test]
    fn incomplete_recipe_names_the_field() {
        let err = ApiError::IncompleteRecipe { field: "search_keys" };
        assert!(err.to_string().contains("search_keys"));
    }
}
