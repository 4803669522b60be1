//! Registry workflows: create, update details, add demerit points
//!
//! Each workflow performs one blocking load-mutate-rewrite cycle against
//! the store. Nothing is written unless every applicable rule passes, so
//! relative to the backing file each call either fully applies or leaves
//! it untouched.

pub mod errors;
mod operations;

pub use errors::{RegistryError, RegistryResult};
pub use operations::Registry;
