//! Python pickle codec for string-to-string mappings.
//!
//! The writer reproduces CPython's `pickle.dumps` byte for byte for
//! `dict[str, str]` values under protocols 2 to 5, so generated fixtures
//! can replace ones produced by Python. The reader accepts the same opcode
//! subset and is used to verify fixtures.

pub mod opcodes;
pub mod pickler;
pub mod unpickler;

use std::fmt;
use thiserror::Error;

pub use pickler::{dumps, Pickler};
pub use unpickler::{loads, Unpickler};

/// Error types for pickle encoding and decoding
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PickleError {
    #[error("unsupported pickle protocol {0} (supported: {min}..={max})", min = Protocol::MIN, max = Protocol::MAX)]
    UnsupportedProtocol(u8),

    #[error("string of {0} bytes is too large for protocol {1}")]
    StringTooLarge(usize, u8),

    #[error("pickle data was truncated at offset {0}")]
    UnexpectedEof(usize),

    #[error("unknown or unsupported opcode 0x{opcode:02x} at offset {offset}")]
    UnsupportedOpcode { opcode: u8, offset: usize },

    #[error("stack underflow at offset {0}")]
    StackUnderflow(usize),

    #[error("could not find MARK at offset {0}")]
    MissingMark(usize),

    #[error("invalid UTF-8 in string at offset {0}")]
    InvalidUtf8(usize),

    #[error("memo value not found at index {0}")]
    MissingMemo(u32),

    #[error("mapping entries must be strings (offset {0})")]
    NonStringEntry(usize),

    #[error("pickled object is not a mapping")]
    NotAMapping,

    #[error("pickle data ended without STOP")]
    MissingStop,
}

/// Pickle protocol version accepted by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Protocol(u8);

impl Protocol {
    pub const MIN: u8 = 2;
    pub const MAX: u8 = 5;

    /// Protocol of the checked-in `{"key": "value"}` fixture.
    pub const DEFAULT: Protocol = Protocol(4);

    pub fn new(version: u8) -> Result<Self, PickleError> {
        if (Self::MIN..=Self::MAX).contains(&version) {
            Ok(Self(version))
        } else {
            Err(PickleError::UnsupportedProtocol(version))
        }
    }

    pub fn version(self) -> u8 {
        self.0
    }

    /// Protocol 4 introduced framing, `MEMOIZE` and the short/8-byte string opcodes.
    pub fn is_framed(self) -> bool {
        self.0 >= 4
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Protocol {
    type Error = PickleError;

    fn try_from(version: u8) -> Result<Self, Self::Error> {
        Self::new(version)
    }
}
