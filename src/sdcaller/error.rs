use crate::schema::{NameError, SchemaRejection};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdCallerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid data: {0}")]
    Schema(#[from] SchemaRejection),

    #[error("Invalid name: {0}")]
    InvalidName(#[from] NameError),

    #[error("{0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, SdCallerError>;
