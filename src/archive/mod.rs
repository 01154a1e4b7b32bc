//! Stored-only archive container: read-side directory index and write-side packer.
//!
//! Only the subset of the PKWARE layout needed by boot animations is understood: local file
//! headers, central directory entries and the trailing directory-end record. Members are
//! expected to be stored (method 0); nothing is ever inflated.

/// Directory-indexed random-access reader.
pub mod index;
/// Stored-only archive writer.
pub mod writer;

pub(crate) const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
pub(crate) const CDIR_ENTRY_SIG: u32 = 0x0201_4b50;
pub(crate) const CDIR_END_SIG: u32 = 0x0605_4b50;

pub(crate) const LOCAL_HEADER_LEN: usize = 30;
pub(crate) const CDIR_ENTRY_LEN: usize = 46;
pub(crate) const CDIR_END_LEN: usize = 22;
