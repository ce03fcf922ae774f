use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentSheetError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid event: {0}")]
    InvalidEvent(String),
    #[error("Payment method cannot be edited: {0}")]
    NotEditable(String),
    #[error("Interactor has been closed")]
    InteractorClosed,
}

pub type Result<T> = std::result::Result<T, PaymentSheetError>;

/// Failure reported by a remote remove/update operation.
///
/// These never surface as faults: the edit session converts them into a
/// displayable message on its view state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct OperationError {
    pub message: String,
}

impl OperationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
