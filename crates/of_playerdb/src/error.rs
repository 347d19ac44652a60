use std::path::PathBuf;
use thiserror::Error;

/// Why a store file could not be opened or created.
#[derive(Error, Debug)]
pub enum InitFailure {
    #[error("file not found")]
    NotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("truncated: {found} bytes, expected at least {expected}")]
    Truncated { found: u64, expected: u64 },

    #[error("bad magic bytes")]
    BadMagic,

    #[error("version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u16, expected: u16 },

    #[error("byte order mark {found:#06x} does not match this host")]
    ByteOrder { found: u16 },

    #[error("record size mismatch: found {found}, expected {expected}")]
    RecordSize { found: u32, expected: u32 },

    #[error("invalid capacity {capacity} (max {max})")]
    Capacity { capacity: u32, max: u32 },

    #[error("length {found} does not match capacity (expected {expected} bytes)")]
    LengthMismatch { found: u64, expected: u64 },

    #[error("slot {slot} holds record id {found}")]
    IdMismatch { slot: u32, found: u32 },

    #[error("starting lineup slot {index} references invalid id {id}")]
    Lineup { index: usize, id: u32 },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to initialize player store {path}: {reason}")]
    Initialization { path: PathBuf, reason: InitFailure },

    #[error("player id {id} out of range (capacity {capacity})")]
    OutOfRange { id: u32, capacity: u32 },

    #[error("lineup slot {index} out of range (squad size {size})")]
    LineupIndex { index: usize, size: usize },

    #[error("player store already closed")]
    Disposed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn init(path: impl Into<PathBuf>, reason: impl Into<InitFailure>) -> Self {
        StoreError::Initialization { path: path.into(), reason: reason.into() }
    }

    /// Errors that only a misbehaving caller can produce.
    pub fn is_caller_bug(&self) -> bool {
        match self {
            StoreError::OutOfRange { .. } => true,
            StoreError::LineupIndex { .. } => true,
            StoreError::Disposed => true,
            StoreError::Initialization { .. } => false,
            StoreError::Io(_) => false,
        }
    }
}

/// Field range violations reported by `PlayerRecord::validate`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("{field} = {value} exceeds {max}")]
    OutOfBounds { field: &'static str, value: u32, max: u32 },

    #[error("unknown preferred foot code {0}")]
    UnknownFoot(u8),

    #[error("unknown position code {0}")]
    UnknownPosition(u8),
}

#[derive(Error, Debug)]
pub enum StringTableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),

    #[error("Decompression error")]
    Decompression,

    #[error("Corrupted data")]
    Corrupted,

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    #[error("Version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("string table full ({capacity} entries)")]
    TableFull { capacity: usize },

    #[error("string of {len} bytes exceeds {max}")]
    StringTooLong { len: usize, max: usize },

    #[error("declared size {size} exceeds {max} bytes")]
    TooLarge { size: usize, max: usize },
}

impl StringTableError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            StringTableError::Io(_) => true,
            StringTableError::VersionMismatch { .. } => true,
            StringTableError::Corrupted => false,
            StringTableError::ChecksumMismatch => false,
            StringTableError::TooLarge { .. } => false,
            _ => false,
        }
    }
}
