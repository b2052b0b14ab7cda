use std::fmt;

#[derive(Debug)]
pub enum SessionError {
    /// Microphone denied or absent. Recording stays disabled; never fatal.
    CaptureUnavailable(String),
    /// Landmark detector failed on a frame; degraded to "no hand".
    Detector(String),
    /// Sentiment backend errored; treated as "no new data this cycle".
    Analyzer(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::CaptureUnavailable(msg) => write!(f, "audio capture unavailable: {msg}"),
            SessionError::Detector(msg) => write!(f, "landmark detector error: {msg}"),
            SessionError::Analyzer(msg) => write!(f, "sentiment analyzer error: {msg}"),
        }
    }
}

impl std::error::Error for SessionError {}

pub type Result<T> = std::result::Result<T, SessionError>;
