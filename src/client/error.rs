//! Errors raised while fetching catalog pages

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    /// Filter rejected before any request was sent
    #[error("Invalid filter: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response from the endpoint
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    /// Response belonged to a superseded filter; never shown to users
    #[error("Stale response discarded")]
    StaleResponseDiscarded,
}

impl FetchError {
    /// Message stored in the store's error state
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Validation(msg) => msg.clone(),
            FetchError::Network(_) => {
                "Could not reach the catalog. Check your connection and try again.".to_string()
            }
            FetchError::Server { status, message } if message.is_empty() => {
                format!("The catalog returned an error ({})", status)
            }
            FetchError::Server { message, .. } => message.clone(),
            FetchError::Decode(_) => "The catalog sent an unexpected response".to_string(),
            FetchError::StaleResponseDiscarded => String::new(),
        }
    }
}
