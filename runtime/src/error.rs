//! Store errors

use thiserror::Error;

/// Why a store call could not complete
///
/// Reducers cannot fail and effects report nothing back, so these all come
/// from the store's own lifecycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// `send` after `shutdown` began
    #[error("Store is shutting down")]
    ShutdownInProgress,

    /// Effects were still running when the shutdown deadline passed
    #[error("Shutdown timed out with {0} effects still running")]
    ShutdownTimeout(usize),

    /// No matching action arrived before the deadline
    #[error("Timed out waiting for a matching action")]
    Timeout,

    /// Every sender of the action feed is gone
    #[error("Action feed closed")]
    ChannelClosed,
}
