use alloc::string::String;
use core::fmt;

use crate::fft::FftError;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Overlapped copies of the window at this hop do not sum to a constant.
    ColaViolation { window_len: usize, hop: usize },
    /// A configuration value is out of range.
    InvalidConfig(&'static str),
    /// A buffer handed across a stream boundary has the wrong length.
    ContractViolation {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    FrameOutOfRange { index: usize, count: usize },
    /// Failure reported by a mask engine.
    Engine(String),
    Fft(FftError),
}

impl Error {
    /// True for errors that mean the stream could never have been built with
    /// these parameters.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::ColaViolation { .. } | Error::InvalidConfig(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ColaViolation { window_len, hop } => write!(
                f,
                "window of {window_len} samples is not constant overlap-add at hop {hop}"
            ),
            Error::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Error::ContractViolation {
                what,
                expected,
                actual,
            } => write!(f, "{what}: expected length {expected}, got {actual}"),
            Error::FrameOutOfRange { index, count } => {
                write!(f, "frame {index} out of range (stream has {count} frames)")
            }
            Error::Engine(msg) => write!(f, "mask engine failed: {msg}"),
            Error::Fft(e) => write!(f, "fft: {e}"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Error::Fft(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FftError> for Error {
    fn from(e: FftError) -> Self {
        Error::Fft(e)
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
