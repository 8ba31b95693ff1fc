//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use magma_core::ResourceError;

/// Errors that can occur while allocating heat buffers.
#[derive(Clone, Debug, PartialEq)]
pub enum ArenaError {
    /// Side is zero or exceeds [`ArenaConfig::MAX_SIDE`](crate::ArenaConfig::MAX_SIDE).
    InvalidSide {
        /// The rejected side.
        side: u32,
    },
    /// The backend cannot hold buffers at the required precision.
    Resource(ResourceError),
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSide { side } => write!(f, "invalid field side: {side}"),
            Self::Resource(e) => write!(f, "{e}"),
        }
    }
}

impl Error for ArenaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Resource(e) => Some(e),
            Self::InvalidSide { .. } => None,
        }
    }
}

impl From<ResourceError> for ArenaError {
    fn from(e: ResourceError) -> Self {
        Self::Resource(e)
    }
}
