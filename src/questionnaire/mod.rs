//! Questionnaire domain module
//!
//! Naming rules, title extraction and the filesystem store behind the
//! list/save API endpoints.

mod error;
mod naming;
mod store;
mod title;

pub use error::Operation;
pub use store::QuestionnaireStore;
