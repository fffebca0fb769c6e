use thiserror::Error;

/// Failures surfaced synchronously to callers of the manager.
///
/// Timer expiry and animation completion never produce one of these; they are
/// internal transitions and only log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToastError {
    /// A show request or parsed value was rejected before anything was created.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The parent surface was destroyed; the manager accepts no more work.
    #[error("manager disposed")]
    Disposed,
}

pub type Result<T> = std::result::Result<T, ToastError>;
