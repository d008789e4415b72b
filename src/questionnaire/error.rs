use hyper::StatusCode;
use thiserror::Error;

/// Operations exposed over the API, used to pick the status code of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Save,
}

/// Rejected save request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    BodyNotObject,

    #[error("missing 'file' field")]
    MissingFile,

    #[error("'file' must be a string")]
    FileNotString,

    #[error("file name '{0}' must start with 'question_'")]
    BadPrefix(String),

    #[error("file name '{0}' must end with '.json'")]
    BadSuffix(String),

    #[error("file name '{0}' must not contain path separators")]
    PathSeparator(String),

    #[error("missing 'content' field")]
    MissingContent,

    #[error("'content' must be a JSON object or array, got {0}")]
    ContentNotContainer(&'static str),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// HTTP status reported for this error when raised by `op`
    pub fn status(&self, op: Operation) -> StatusCode {
        match (op, self) {
            (Operation::List, Self::Validation(_) | Self::Parse(_) | Self::Io(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            (Operation::Save, Self::Validation(_) | Self::Parse(_) | Self::Io(_)) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let io = || StoreError::Io(std::io::Error::other("disk"));
        assert_eq!(io().status(Operation::List), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(io().status(Operation::Save), StatusCode::BAD_REQUEST);
        assert_eq!(
            StoreError::from(ValidationError::MissingFile).status(Operation::Save),
            StatusCode::BAD_REQUEST
        );
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            StoreError::from(parse).status(Operation::Save),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            StoreError::from(ValidationError::PathSeparator("question_a/b.json".into()))
                .to_string(),
            "file name 'question_a/b.json' must not contain path separators"
        );
        assert_eq!(
            ValidationError::ContentNotContainer("string").to_string(),
            "'content' must be a JSON object or array, got string"
        );
    }
}
