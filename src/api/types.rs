// API wire types
// JSON bodies returned by the questionnaire endpoints

use serde::Serialize;

/// Successful save
#[derive(Debug, Serialize)]
pub struct SaveResponse<'a> {
    pub ok: bool,
    pub file: &'a str,
}

/// Failed save
#[derive(Debug, Serialize)]
pub struct SaveErrorResponse {
    pub ok: bool,
    pub error: String,
}

/// Failed listing
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
