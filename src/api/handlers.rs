// Questionnaire API handlers module

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;

use super::response::json_response;
use super::types::{ErrorResponse, SaveErrorResponse, SaveResponse};
use crate::config::AppState;
use crate::logger;
use crate::questionnaire::Operation;

/// GET /api/questionnaires
pub async fn handle_list(state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let cors = state.config.http.enable_cors;
    match state.store.list().await {
        Ok(entries) => {
            logger::log_debug(&format!("Listed {} questionnaire(s)", entries.len()));
            json_response(StatusCode::OK, &entries, cors)
        }
        Err(e) => {
            logger::log_error(&format!("Failed to list questionnaires: {e}"));
            json_response(
                e.status(Operation::List),
                &ErrorResponse {
                    error: e.to_string(),
                },
                cors,
            )
        }
    }
}

/// POST /api/save_questionnaire
pub async fn handle_save<B>(req: Request<B>, state: &Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let cors = state.config.http.enable_cors;
    let body = match read_body(req, state.config.http.max_body_size).await {
        Ok(body) => body,
        Err(BodyError::TooLarge) => return reject_oversized_save(state),
        Err(BodyError::Read(message)) => {
            logger::log_warning(&format!("Failed to read save request body: {message}"));
            return save_failure(StatusCode::BAD_REQUEST, message, cors);
        }
    };

    match state.store.save(&body).await {
        Ok(file) => json_response(StatusCode::OK, &SaveResponse { ok: true, file: &file }, cors),
        Err(e) => {
            logger::log_warning(&format!("Rejected questionnaire save: {e}"));
            save_failure(e.status(Operation::Save), e.to_string(), cors)
        }
    }
}

/// 413 for a save body over `http.max_body_size`, in the save error shape
pub fn reject_oversized_save(state: &AppState) -> Response<Full<Bytes>> {
    let max_body_size = state.config.http.max_body_size;
    logger::log_warning(&format!(
        "Rejected questionnaire save: body exceeds {max_body_size} bytes"
    ));
    save_failure(
        StatusCode::PAYLOAD_TOO_LARGE,
        format!("request body exceeds {max_body_size} bytes"),
        state.config.http.enable_cors,
    )
}

fn save_failure(status: StatusCode, error: String, cors: bool) -> Response<Full<Bytes>> {
    json_response(status, &SaveErrorResponse { ok: false, error }, cors)
}

enum BodyError {
    TooLarge,
    Read(String),
}

/// Collect a request body, refusing anything over `max_body_size` bytes
async fn read_body<B>(req: Request<B>, max_body_size: u64) -> Result<Bytes, BodyError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(BodyError::TooLarge),
        Err(e) => Err(BodyError::Read(e.to_string())),
    }
}
