//! Error types for the Magma renderer.
//!
//! Two families, split by when they can occur:
//!
//! - [`ConfigError`]: rejected parameters, detected once at load time.
//! - [`ResourceError`]: the execution context failing underneath the
//!   kernels, either recoverably (context loss) or fatally (missing
//!   buffer precision).
//!
//! The kernels themselves are total over their validated inputs and
//! have no error states of their own.

use std::error::Error;
use std::fmt;

use crate::precision::Precision;

/// Out-of-range or inconsistent configuration.
///
/// Always raised during construction or config loading, never while
/// frames are running.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A scalar parameter lies outside its permitted range (or is NaN).
    OutOfRange {
        /// Name of the parameter.
        parameter: &'static str,
        /// The rejected value.
        value: f64,
        /// Human-readable description of the permitted range.
        expected: &'static str,
    },
    /// Field resolution is zero or exceeds the supported maximum.
    InvalidResolution {
        /// The rejected side length.
        side: u32,
    },
    /// Viewport has a zero dimension.
    InvalidViewport {
        /// Rejected width.
        width: u32,
        /// Rejected height.
        height: u32,
    },
    /// The colour ramp has no stops.
    EmptyRamp,
    /// Ramp thresholds are not strictly increasing.
    RampNotIncreasing {
        /// Index of the offending stop.
        index: usize,
        /// Threshold of the preceding stop.
        previous: f32,
        /// Threshold of the offending stop.
        threshold: f32,
    },
    /// A ramp stop is darker than the stop before it.
    RampNotMonotonic {
        /// Index of the offending stop.
        index: usize,
    },
    /// A lighting direction vector has zero (or non-finite) length.
    InvalidLightDirection {
        /// Which direction was rejected (`"light"` or `"view"`).
        which: &'static str,
    },
    /// The configuration text could not be parsed.
    Parse {
        /// Description of the parse failure.
        reason: String,
    },
    /// The configuration could not be written out.
    Serialize {
        /// Description of the serialisation failure.
        reason: String,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::OutOfRange`].
    pub fn out_of_range(parameter: &'static str, value: f64, expected: &'static str) -> Self {
        Self::OutOfRange {
            parameter,
            value,
            expected,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange {
                parameter,
                value,
                expected,
            } => write!(f, "{parameter} must be {expected}, got {value}"),
            Self::InvalidResolution { side } => {
                write!(f, "field resolution {side} is out of range")
            }
            Self::InvalidViewport { width, height } => {
                write!(f, "viewport {width}x{height} has a zero dimension")
            }
            Self::EmptyRamp => write!(f, "colour ramp has no stops"),
            Self::RampNotIncreasing {
                index,
                previous,
                threshold,
            } => write!(
                f,
                "ramp threshold at stop {index} ({threshold}) does not exceed previous ({previous})"
            ),
            Self::RampNotMonotonic { index } => {
                write!(f, "ramp stop {index} is darker than the stop before it")
            }
            Self::InvalidLightDirection { which } => {
                write!(f, "{which} direction must be finite and non-zero")
            }
            Self::Parse { reason } => write!(f, "config parse error: {reason}"),
            Self::Serialize { reason } => write!(f, "config serialisation error: {reason}"),
        }
    }
}

impl Error for ConfigError {}

/// Failure of the underlying execution resources.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResourceError {
    /// The parallel-execution context became unavailable mid-run.
    ///
    /// Recovered by reallocating and zeroing the field buffers; the loop
    /// resumes on the next frame.
    ContextLost {
        /// Description supplied by the backend or collaborator.
        reason: String,
    },
    /// The backend cannot store field buffers at the required precision.
    ///
    /// Fatal at initialisation.
    PrecisionUnavailable {
        /// Precision the field buffers need.
        required: Precision,
        /// Precisions the backend offers.
        supported: Vec<Precision>,
    },
}

impl ResourceError {
    /// `true` for errors the frame loop recovers from by resetting.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ContextLost { .. })
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContextLost { reason } => write!(f, "execution context lost: {reason}"),
            Self::PrecisionUnavailable {
                required,
                supported,
            } => {
                write!(f, "buffer precision {required} unavailable (backend offers")?;
                if supported.is_empty() {
                    write!(f, " none")?;
                }
                for p in supported {
                    write!(f, " {p}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl Error for ResourceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_serialize_failures_are_distinct() {
        let parse = ConfigError::Parse {
            reason: "eof".into(),
        };
        let write = ConfigError::Serialize {
            reason: "eof".into(),
        };
        assert_ne!(parse, write);
        assert_eq!(parse.to_string(), "config parse error: eof");
        assert_eq!(write.to_string(), "config serialisation error: eof");
    }

    #[test]
    fn out_of_range_message_names_parameter() {
        let e = ConfigError::out_of_range("viscosity", 1.5, "within [0, 1]");
        assert_eq!(e.to_string(), "viscosity must be within [0, 1], got 1.5");
    }

    #[test]
    fn precision_message_lists_supported() {
        let e = ResourceError::PrecisionUnavailable {
            required: Precision::F32,
            supported: vec![Precision::F16],
        };
        assert_eq!(
            e.to_string(),
            "buffer precision f32 unavailable (backend offers f16)"
        );
        assert!(!e.is_recoverable());
    }

    #[test]
    fn context_loss_is_recoverable() {
        let e = ResourceError::ContextLost {
            reason: "device reset".into(),
        };
        assert!(e.is_recoverable());
    }
}
