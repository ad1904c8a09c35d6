//! Crate error type (spec §7): allocation failure is the only condition this
//! cache ever reports as an error, and only at points where there is no
//! safe fallback (falling back to "run uncached" covers every other case).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("could not allocate cache state")]
    OutOfMemory,
}
