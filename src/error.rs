use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no scenario #{}", .0 + 1)]
    NoSuchScenario(usize),

    #[error("scenario #{} has no variable #{}", .scenario + 1, .variable + 1)]
    NoSuchVariable { scenario: usize, variable: usize },

    #[error("history snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid command: {0}")]
    InvalidCommand(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
