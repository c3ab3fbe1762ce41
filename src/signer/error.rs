use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum JwsSignerError<E: crate::Error + 'static> {
    /// The key does not sign with the algorithm named in the JWS header.
    #[snafu(display("Key signs with {actual}, but the header requires {expected}"))]
    MismatchedAlgorithm { expected: String, actual: String },
    #[snafu(display("Signing operation failed"))]
    Underlying { source: E },
}

impl<E: crate::Error + 'static> crate::Error for JwsSignerError<E> {
    fn is_retryable(&self) -> bool {
        match self {
            JwsSignerError::MismatchedAlgorithm { .. } => false,
            JwsSignerError::Underlying { source } => source.is_retryable(),
        }
    }
}
