use rusoto_core::{request::TlsError, RusotoError};
use rusoto_dynamodb::PutItemError;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Fatal errors. Any of these stops the run before the first write.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Data file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Error reading data file: {0}")]
    Decode(#[from] DecodeError),

    #[error("Cannot connect to DynamoDB: {0}")]
    Connect(#[source] StoreError),
}

/// Why the data file could not be turned into a record batch.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array of objects at the top level, found {0}")]
    NotAnArray(&'static str),

    #[error("element {index} of the array is {found}, not an object")]
    NotAnObject { index: usize, found: &'static str },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} is not a valid AWS region. Examples: ap-southeast-1, us-west-2, eu-north-1")]
    InvalidRegion(String),

    #[error("cannot create HTTP client: {0}")]
    HttpClient(#[from] TlsError),

    #[error(transparent)]
    PutItem(#[from] RusotoError<PutItemError>),
}
