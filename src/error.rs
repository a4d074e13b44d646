use thiserror::Error;

pub const GENERIC_FAILURE_MESSAGE: &str = "Prediction failed";
pub const NO_FILE_MESSAGE: &str = "Select an image first!";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictError {
    #[error("no file selected")]
    Validation,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("service error: {0}")]
    Service(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl PredictError {
    /// Text shown to the user. Server-provided text wins over the generic phrase.
    pub fn user_message(&self) -> String {
        match self {
            PredictError::Validation => NO_FILE_MESSAGE.to_string(),
            PredictError::Service(message) if !message.trim().is_empty() => message.clone(),
            PredictError::Service(_) | PredictError::Transport(_) | PredictError::Decode(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        }
    }
}

impl From<reqwest::Error> for PredictError {
    fn from(err: reqwest::Error) -> Self {
        PredictError::Transport(err.to_string())
    }
}
