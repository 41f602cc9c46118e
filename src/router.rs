use crate::db::restaurants::count_restaurants;
use crate::errors::ServerError;
use crate::responses::{json_response, ResultResp};
use crate::service::AppService;
use astra::Request;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Largest `/ask` body we are willing to read.
const MAX_BODY_BYTES: u64 = 64 * 1024;

#[derive(Deserialize)]
pub struct QuestionRequest {
    pub question: String,
}

#[derive(Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    message: &'static str,
    /// Rows currently loaded; null until the ETL has run.
    restaurants: Option<i64>,
}

pub fn handle(req: Request, svc: &AppService) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();

    match (method.as_str(), path.as_str()) {
        ("GET", "/") => json_response(
            200,
            &StatusResponse {
                status: "ok",
                message: "Restaurant intelligence agent is running",
                restaurants: count_restaurants(svc.database()).ok(),
            },
        ),
        ("POST", "/ask") => ask(req, svc),
        _ => Err(ServerError::NotFound),
    }
}

fn ask(mut req: Request, svc: &AppService) -> ResultResp {
    let mut body = Vec::new();
    req.body_mut()
        .reader()
        .take(MAX_BODY_BYTES + 1)
        .read_to_end(&mut body)
        .map_err(|e| ServerError::BadRequest(format!("Could not read body: {e}")))?;

    if body.len() as u64 > MAX_BODY_BYTES {
        return Err(ServerError::BadRequest("Request body is too large.".to_string()));
    }

    let parsed: QuestionRequest = serde_json::from_slice(&body)
        .map_err(|e| ServerError::BadRequest(format!("Invalid JSON body: {e}")))?;

    let answer = svc.answer(&parsed.question)?;
    json_response(200, &AnswerResponse { answer })
}
