use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {endpoint}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },

    #[error("Token is not a valid header value")]
    InvalidToken,
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::InvalidToken => None,
        }
    }
}
