//! Flat-file person store
//!
//! The backing store is a single text file with one encoded person per
//! line and a trailing newline per line. No header, no versioning, no
//! checksum. The store exposes three primitives:
//!
//! - [`PersonStore::load`] reads the whole file into memory
//! - [`PersonStore::rewrite`] replaces the whole file's contents
//! - [`PersonStore::append`] adds exactly one line
//!
//! Lines that fail to decode are dropped from the loaded set and counted;
//! the count surfaces on [`LoadedRecords`] and as a `RECORD_LINE_DROPPED`
//! warning. The parent directory is created on demand.
//!
//! The store has no locking discipline. Callers are assumed to be
//! single-threaded and sequential; overlapping load-mutate-rewrite cycles
//! lose updates (last writer wins).

pub mod errors;
mod file;

pub use errors::{StoreError, StoreErrorCode, StoreResult};
pub use file::{LoadedRecords, PersonStore, DEFAULT_STORE_PATH};
