//! # File System Module
//!
//! This is a container for file system modules.  At present the only one
//! is DOS 3.3, which interprets the sector data held by the `img` module.
//! Structures on disk are represented by fixed-size types carrying the
//! `DiskStruct` trait, so the byte layout is always explicit.

pub mod dos33;

/// Enumerates the operational errors a caller of the filesystem can
/// receive.  Where DOS had an equivalent message the display string is the
/// DOS message.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("FILE NOT FOUND")]
    NotFound,
    #[error("NOT A DIRECTORY")]
    NotADirectory,
    #[error("OPERATION NOT SUPPORTED")]
    Unsupported,
    #[error("WRITE PROTECTED")]
    ReadOnly,
    #[error("FILE LOCKED")]
    Locked,
    #[error("disk structure is damaged: {0}")]
    CorruptImage(String),
    #[error("I/O ERROR")]
    Io(#[from] std::io::Error)
}

/// Fixed-size structures that mirror bytes on disk.  Every implementor
/// round-trips losslessly between its fields and the flattened form.
pub trait DiskStruct {
    /// Create an empty structure
    fn new() -> Self where Self: Sized;
    /// Create structure using flattened bytes (typically from disk)
    fn from_bytes(bytes: &[u8]) -> Self where Self: Sized;
    /// Return flattened bytes (typically written to disk)
    fn to_bytes(&self) -> Vec<u8>;
    /// Length of the flattened structure
    fn len(&self) -> usize;
}
