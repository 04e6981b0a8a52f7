//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and bus operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction (fatal)
//! - [`Error`] - Runtime errors during bus operations
//! - [`EncodeError`](crate::encode::EncodeError) - Pixel pipeline errors
//! - [`TransferError`](crate::dma::TransferError) - Bulk transfer hardware errors
//!
//! No operation retries on its own. A [`Error::BusTimeout`] may be retried
//! once by the caller; after that the controller should be treated as
//! unresponsive.
//!
//! ## Example
//!
//! ```
//! use ssd1963::{Builder, BuilderError, Pins};
//!
//! // Reset shares a pin with the data lane
//! let pins = Pins::contiguous(2, 5);
//! let result = Builder::new().pins(pins).build();
//! assert!(matches!(result, Err(BuilderError::PinConflict { pin: 5 })));
//! ```

use crate::dma::TransferError;
use crate::encode::EncodeError;
use crate::window::InvertedWindow;

/// Errors that can occur when driving the bus
///
/// Generic over the engine host error `E` and the GPIO error `P` to
/// preserve the underlying hardware error types.
#[derive(Debug)]
pub enum Error<E, P> {
    /// Engine host error (program install, queue access)
    Engine(E),
    /// GPIO pin error (reset or backlight line)
    Pin(P),
    /// A bulk transfer did not finish within its poll budget
    ///
    /// The transfer has already been aborted when this is returned.
    BusTimeout {
        /// Units still outstanding when the budget ran out
        remaining: u32,
    },
    /// Address window with an inverted range
    ///
    /// Rejected before any command reaches the bus.
    InvalidWindow {
        /// Left column
        x1: u16,
        /// Top row
        y1: u16,
        /// Right column
        x2: u16,
        /// Bottom row
        y2: u16,
    },
    /// Pixel format that the requested path cannot encode
    UnsupportedPixelFormat,
    /// Pixel encoding failed
    Encode(EncodeError),
    /// Bulk transfer hardware error
    Transfer(TransferError),
    /// Caller buffer is too small for the request
    BufferTooSmall {
        /// Required buffer size in bytes
        required: usize,
        /// Provided buffer size in bytes
        provided: usize,
    },
}

impl<E, P> From<EncodeError> for Error<E, P> {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::UnsupportedPixelFormat { .. } => Self::UnsupportedPixelFormat,
            other => Self::Encode(other),
        }
    }
}

impl<E, P> From<InvertedWindow> for Error<E, P> {
    fn from(window: InvertedWindow) -> Self {
        let InvertedWindow { x1, y1, x2, y2 } = window;
        Self::InvalidWindow { x1, y1, x2, y2 }
    }
}

impl<E, P> From<TransferError> for Error<E, P> {
    fn from(err: TransferError) -> Self {
        Self::Transfer(err)
    }
}

impl<E: core::fmt::Debug, P: core::fmt::Debug> core::fmt::Display for Error<E, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Engine(e) => write!(f, "Engine error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
            Self::BusTimeout { remaining } => {
                write!(f, "Bus timeout with {remaining} units outstanding")
            }
            Self::InvalidWindow { x1, y1, x2, y2 } => {
                write!(f, "Invalid window: ({x1},{y1})..({x2},{y2})")
            }
            Self::UnsupportedPixelFormat => write!(f, "Unsupported pixel format"),
            Self::Encode(e) => write!(f, "Encode error: {e}"),
            Self::Transfer(e) => write!(f, "Transfer error: {e}"),
            Self::BufferTooSmall { required, provided } => {
                write!(
                    f,
                    "Buffer too small: required {required} bytes, provided {provided}"
                )
            }
        }
    }
}

impl<E: core::fmt::Debug, P: core::fmt::Debug> core::error::Error for Error<E, P> {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the driver is
/// created, so a driver never exists with an invalid configuration.
#[derive(Debug, PartialEq, Eq)]
pub enum BuilderError {
    /// Two bus functions were assigned the same GPIO
    PinConflict {
        /// The GPIO number claimed twice
        pin: u8,
    },
    /// A pin number does not fit in the GPIO numbering
    PinOutOfRange {
        /// The offending GPIO number
        pin: u8,
    },
    /// A control line is not where the side-set programs drive it
    ///
    /// D/C, /WR and /RD must sit at `data_base + 8`, `+ 9` and `+ 10`.
    MisplacedControl {
        /// The GPIO the caller assigned
        pin: u8,
        /// The GPIO the programs drive for that line
        expected: u8,
    },
    /// A clock rate of zero was requested
    InvalidClock,
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PinConflict { pin } => write!(f, "GPIO {pin} is assigned more than once"),
            Self::PinOutOfRange { pin } => write!(f, "GPIO {pin} is out of range"),
            Self::MisplacedControl { pin, expected } => {
                write!(f, "Control line on GPIO {pin} must be on GPIO {expected}")
            }
            Self::InvalidClock => write!(f, "Clock rate must be non-zero"),
        }
    }
}

impl core::error::Error for BuilderError {}
