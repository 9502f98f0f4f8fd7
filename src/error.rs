//! Stable machine-readable error codes shared by services and routes.

/// Implemented by every service error that can reach an HTTP response.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
