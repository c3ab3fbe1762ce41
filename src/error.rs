use std::convert::Infallible;

use snafu::AsErrorSource;

/// Errors that may occur in the library.
///
/// Every error returned while building an assertion implements this trait,
/// including the errors of caller-supplied collaborators (key parsers,
/// entropy sources and signers).
pub trait Error: std::error::Error + AsErrorSource + Send + Sync {
    /// If true, this indicates that a failed operation may succeed if retried.
    fn is_retryable(&self) -> bool;
}

impl Error for Infallible {
    fn is_retryable(&self) -> bool {
        false
    }
}
