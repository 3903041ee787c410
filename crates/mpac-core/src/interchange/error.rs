use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterchangeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid catalog record on line {line}: {message}")]
    InvalidRecord { line: u64, message: String },
}
