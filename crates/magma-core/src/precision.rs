//! Numeric storage formats an execution backend may offer.

use std::fmt;

/// Storage precision for field buffers.
///
/// Heat buffers are stored as `f32`. Cooling relies on subtracting a
/// small constant every step, which half precision cannot resolve near
/// zero, so a backend that cannot store [`Precision::F32`] is rejected
/// at initialisation instead of silently degrading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Precision {
    /// 16-bit half float.
    F16,
    /// 32-bit single float.
    F32,
    /// 64-bit double float.
    F64,
}

impl Precision {
    /// Precision required for heat buffers.
    pub const REQUIRED: Precision = Precision::F32;

    /// Size of one value in bytes.
    pub fn bytes(self) -> usize {
        match self {
            Self::F16 => 2,
            Self::F32 => 4,
            Self::F64 => 8,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F16 => write!(f, "f16"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
        }
    }
}
