use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum DevtoolsError {
    IoError(std::io::Error),
    FileNotFound(PathBuf),
    LineOutOfRange { line: usize, len: usize },
    MarkerNotFound { line: usize },
    SnippetNotFound(String),
    MalformedLiteral { line: usize },
    InvalidArgument(String),
    ConfigError(String),
    PatternError(String),
    SerializationError(serde_json::Error),
    SpawnError { command: String, reason: String },
    ViewerFailed { command: String, code: Option<i32> },
}

impl fmt::Display for DevtoolsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DevtoolsError::IoError(e) => write!(f, "I/O error: {}", e),
            DevtoolsError::FileNotFound(path) => {
                write!(f, "File not found: {}", path.display())
            }
            DevtoolsError::LineOutOfRange { line, len } => write!(
                f,
                "Line {} is out of range (file has {} lines)",
                line, len
            ),
            DevtoolsError::MarkerNotFound { line } => {
                write!(f, "No test declaration found at or above line {}", line)
            }
            DevtoolsError::SnippetNotFound(test) => {
                write!(f, "No quoted source snippet found in test '{}'", test)
            }
            DevtoolsError::MalformedLiteral { line } => {
                write!(f, "Unterminated string literal on line {}", line)
            }
            DevtoolsError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            DevtoolsError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            DevtoolsError::PatternError(msg) => write!(f, "Bad file pattern: {}", msg),
            DevtoolsError::SerializationError(e) => write!(f, "Serialization error: {}", e),
            DevtoolsError::SpawnError { command, reason } => {
                write!(f, "Failed to spawn '{}': {}", command, reason)
            }
            DevtoolsError::ViewerFailed { command, code } => match code {
                Some(code) => write!(f, "'{}' exited with code {}", command, code),
                None => write!(f, "'{}' was terminated by a signal", command),
            },
        }
    }
}

impl std::error::Error for DevtoolsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DevtoolsError::IoError(e) => Some(e),
            DevtoolsError::SerializationError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DevtoolsError {
    fn from(err: std::io::Error) -> Self {
        DevtoolsError::IoError(err)
    }
}

impl From<serde_json::Error> for DevtoolsError {
    fn from(err: serde_json::Error) -> Self {
        DevtoolsError::SerializationError(err)
    }
}

pub type Result<T> = std::result::Result<T, DevtoolsError>;
