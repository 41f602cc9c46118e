use crate::errors::ServerError;
use astra::{Body, Response, ResponseBuilder};
use serde::Serialize;

pub use crate::errors::ResultResp;

/// What a caller sees when their question could not be answered. The real
/// cause only goes to the log.
pub const APOLOGY: &str = "Sorry, an error occurred while processing your question.";

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    detail: String,
}

/// Convert a ServerError into a JSON error response
pub fn error_to_response(err: ServerError) -> Response {
    let detail = match &err {
        ServerError::NotFound => "Not Found".to_string(),
        ServerError::BadRequest(msg) | ServerError::Configuration(msg) => msg.clone(),
        ServerError::AgentFailure(_) => APOLOGY.to_string(),
        ServerError::DbError(_) | ServerError::InternalError => {
            "Internal Server Error".to_string()
        }
    };

    let body = ErrorBody {
        error: err.kind(),
        detail,
    };
    let json = serde_json::to_vec(&body)
        .unwrap_or_else(|_| br#"{"error":"internal"}"#.to_vec());

    ResponseBuilder::new()
        .status(err.status())
        .header("Content-Type", "application/json")
        .body(Body::from(json))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
