// Opcode bytes used by the codec. Names follow CPython's pickle module.

pub const MARK: u8 = b'(';
pub const STOP: u8 = b'.';
pub const DICT: u8 = b'd';
pub const EMPTY_DICT: u8 = b'}';
pub const SETITEM: u8 = b's';
pub const SETITEMS: u8 = b'u';

pub const BINUNICODE: u8 = b'X';
pub const SHORT_BINUNICODE: u8 = 0x8c;
pub const BINUNICODE8: u8 = 0x8d;

pub const BINGET: u8 = b'h';
pub const LONG_BINGET: u8 = b'j';
pub const BINPUT: u8 = b'q';
pub const LONG_BINPUT: u8 = b'r';
pub const MEMOIZE: u8 = 0x94;

pub const PROTO: u8 = 0x80;
pub const FRAME: u8 = 0x95;

/// Frames smaller than this are written without a `FRAME` header.
pub const FRAME_SIZE_MIN: usize = 4;
/// A frame is committed once it reaches this size.
pub const FRAME_SIZE_TARGET: usize = 64 * 1024;

/// Number of dict items grouped under one `MARK ... SETITEMS` run.
pub const BATCH_SIZE: usize = 1000;
