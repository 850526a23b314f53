//! Conversions from external infrastructure errors into domain errors.

use base64::DecodeError;
use classbatch_domain::ClassBatchError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ClassBatchError);

impl From<InfraError> for ClassBatchError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ClassBatchError> for InfraError {
    fn from(value: ClassBatchError) -> Self {
        InfraError(value)
    }
}

trait IntoClassBatchError {
    fn into_classbatch(self) -> ClassBatchError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ClassBatchError */
/* -------------------------------------------------------------------------- */

impl IntoClassBatchError for HttpError {
    fn into_classbatch(self) -> ClassBatchError {
        if self.is_timeout() {
            return ClassBatchError::Network("HTTP request timed out".into());
        }
        if self.is_connect() {
            return ClassBatchError::Network("HTTP connection failure".into());
        }
        if let Some(status) = self.status() {
            return ClassBatchError::api(status.as_u16(), status.canonical_reason().unwrap_or(""));
        }
        if self.is_decode() {
            return ClassBatchError::InvalidResponse(self.to_string());
        }
        if self.is_builder() {
            return ClassBatchError::Internal(format!("invalid HTTP request: {self}"));
        }
        ClassBatchError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_classbatch())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → ClassBatchError */
/* -------------------------------------------------------------------------- */

impl IntoClassBatchError for std::io::Error {
    fn into_classbatch(self) -> ClassBatchError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => ClassBatchError::InvalidInput(format!("file not found: {self}")),
            ErrorKind::PermissionDenied => {
                ClassBatchError::InvalidInput(format!("permission denied: {self}"))
            }
            ErrorKind::UnexpectedEof | ErrorKind::BrokenPipe => {
                ClassBatchError::Network(format!("stream closed: {self}"))
            }
            _ => ClassBatchError::Internal(format!("I/O error: {self}")),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_classbatch())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → ClassBatchError */
/* -------------------------------------------------------------------------- */

impl IntoClassBatchError for serde_json::Error {
    fn into_classbatch(self) -> ClassBatchError {
        ClassBatchError::InvalidResponse(format!("malformed JSON: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_classbatch())
    }
}

/* -------------------------------------------------------------------------- */
/* base64::DecodeError → ClassBatchError */
/* -------------------------------------------------------------------------- */

impl IntoClassBatchError for DecodeError {
    fn into_classbatch(self) -> ClassBatchError {
        ClassBatchError::InvalidInput(format!("file data is not valid base64: {self}"))
    }
}

impl From<DecodeError> for InfraError {
    fn from(value: DecodeError) -> Self {
        InfraError(value.into_classbatch())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
