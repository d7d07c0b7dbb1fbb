use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Authentication failed")]
    Authentication,

    #[error("Invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Invalid quantity {0}")]
    InvalidQuantity(u32),

    #[error("Bad Request {0}")]
    BadRequest(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Authentication => Some(401),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
