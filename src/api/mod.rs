// API module entry
// Questionnaire list/save endpoints

mod handlers;
mod response;
mod types;

use hyper::Method;

pub use handlers::{handle_list, handle_save, reject_oversized_save};

/// Path prefix of the listing endpoint
pub const LIST_PREFIX: &str = "/api/questionnaires";
/// Path prefix of the save endpoint
pub const SAVE_PREFIX: &str = "/api/save_questionnaire";

/// API operation selected by a request line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiRoute {
    List,
    Save,
}

/// Match a request against the API endpoints
///
/// Prefix match on the path only; anything else belongs to static serving.
pub fn match_route(method: &Method, path: &str) -> Option<ApiRoute> {
    if *method == Method::GET && path.starts_with(LIST_PREFIX) {
        Some(ApiRoute::List)
    } else if *method == Method::POST && path.starts_with(SAVE_PREFIX) {
        Some(ApiRoute::Save)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_route() {
        assert_eq!(
            match_route(&Method::GET, "/api/questionnaires"),
            Some(ApiRoute::List)
        );
        assert_eq!(
            match_route(&Method::GET, "/api/questionnaires/extra"),
            Some(ApiRoute::List)
        );
        assert_eq!(
            match_route(&Method::POST, "/api/save_questionnaire"),
            Some(ApiRoute::Save)
        );
        assert_eq!(match_route(&Method::POST, "/api/questionnaires"), None);
        assert_eq!(match_route(&Method::GET, "/api/save_questionnaire"), None);
        assert_eq!(match_route(&Method::HEAD, "/api/questionnaires"), None);
        assert_eq!(match_route(&Method::GET, "/index.html"), None);
        assert_eq!(match_route(&Method::GET, "/"), None);
    }
}
