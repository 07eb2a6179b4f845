use thiserror::Error;

/// A malformed address or payload met while transcoding. Callers recover by
/// returning their input unchanged; it never reaches page code.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformError {
    #[error("{codec} codec could not decode {input:?}: {reason}")]
    Decode {
        codec: &'static str,
        input: String,
        reason: String,
    },
    #[error("{input:?} is not a valid address: {reason}")]
    InvalidUrl { input: String, reason: String },
}
