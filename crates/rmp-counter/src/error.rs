/// Error returned by [`crate::RmpModel`] across the FFI boundary.
///
/// Raised when the data directory cannot be created, when `counter.db`
/// cannot be opened or read, or when a second listener registers. The
/// wrapped chain carries the path and SQLite cause; foreign callers read it
/// through `message()`.
#[derive(Debug, thiserror::Error, uniffi::Object)]
#[error("{e:?}")]
pub struct CoreError {
    e: anyhow::Error,
}

#[uniffi::export]
impl CoreError {
    fn message(&self) -> String {
        self.to_string()
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(e: anyhow::Error) -> Self {
        Self { e }
    }
}

/// Builds a [`CoreError`] from a message, like `anyhow::anyhow!`.
macro_rules! core_error {
    ($msg:literal $(,)?) => {
        $crate::error::CoreError::from(anyhow::anyhow!($msg))
    };
    ($err:expr $(,)?) => {
        $crate::error::CoreError::from(anyhow::anyhow!($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::CoreError::from(anyhow::anyhow!($fmt, $($arg)*))
    };
}
pub(crate) use core_error;
