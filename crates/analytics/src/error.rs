use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] core_types::CoreError),

    #[error("Calculation error: {0}")]
    Calculation(String),
}
