use thiserror::Error;

#[derive(Debug, Error)]
pub enum CueError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Malformed directive on line {line}: {reason}")]
    MalformedDirective { line: usize, reason: &'static str },

    #[error("Invalid MSF format: {0}")]
    MalformedTimecode(String),
}

pub type CueResult<T> = Result<T, CueError>;
