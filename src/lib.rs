//! roadregistry - a flat-file person registry with demerit-point tracking
//!
//! Records live in a single line-oriented text file, one person per line.
//! Every workflow call loads the full record set, mutates it in memory and
//! writes it back, so the backing file is the single source of truth
//! between calls. Concurrent callers are not supported: two overlapping
//! load-mutate-rewrite cycles race and the last writer wins.

pub mod cli;
pub mod observability;
pub mod person;
pub mod registry;
pub mod store;
pub mod validate;
