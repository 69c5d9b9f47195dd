//! Unified Error Model
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrioError {
    #[error("FETCH/{0}")]
    FetchError(String),

    #[error("SCHEDULE/{0}")]
    ScheduleError(String),

    #[error("SETTINGS/{0}")]
    SettingsError(String),

    #[error("PARSE/{0}")]
    ParseError(String),

    #[error("INPUT/{0}")]
    InputError(String),

    #[error("IO/{path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl TrioError {
    /// Short category code, the part before the slash in `Display`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FetchError(_) => "FETCH",
            Self::ScheduleError(_) => "SCHEDULE",
            Self::SettingsError(_) => "SETTINGS",
            Self::ParseError(_) => "PARSE",
            Self::InputError(_) => "INPUT",
            Self::IoError { .. } => "IO",
        }
    }
}

impl From<serde_json::Error> for TrioError {
    fn from(err: serde_json::Error) -> Self {
        TrioError::ParseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrioError>;
