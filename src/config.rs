//! Tunable constants and the single runtime knob this cache exposes.

/// Maximum number of entries retained in one bucket before the oldest is
/// recycled on insert (spec §4.B.3, "why cap bucket length at 5").
pub const MAX_HASH_DEPTH: usize = 5;

/// Soft limit on how many `CacheHead`s may coexist in one directory bucket
/// before `head_create` may prefer reusing/reclaiming an existing one. Not
/// required for correctness (spec §4.E).
pub const HEAD_HASH_REUSE_LIMIT: usize = 5;

/// Number of buckets in the top-level chain-class directory. Fixed
/// regardless of memory profile.
pub const DIRECTORY_SIZE: usize = 256;

/// Maximum number of CLIDs a chain-class key may carry before `head_create`
/// aborts and leaves the chain uncached (spec §4.B.1 step 2).
pub const MAX_CHAIN_CLASS_KEY_LEN: usize = 256;

/// Selects the pair of (per-head bucket count, slab table capacity) the
/// cache operates under. There is no persisted or environment-driven
/// configuration beyond this one flag (spec §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MemoryProfile {
    /// table=8192 bytes, buckets=2048 in the reference implementation.
    #[default]
    Normal,
    /// table=512 bytes, buckets=1201 in the reference implementation.
    LowMemory,
}

impl MemoryProfile {
    /// Number of buckets in a `CacheHead`'s per-input hash table.
    pub const fn hash_size(self) -> usize {
        match self {
            MemoryProfile::Normal => 2048,
            MemoryProfile::LowMemory => 1201,
        }
    }

    /// Number of entry slots carved out of each `DataTable` block. This
    /// crate replaces the reference implementation's raw byte budgets
    /// (512B / 8192B) with an equivalent slot-count budget, since Rust
    /// entries don't have a single fixed byte size across all `Color`
    /// instantiations the way a C struct does.
    pub const fn table_capacity(self) -> usize {
        match self {
            MemoryProfile::Normal => 512,
            MemoryProfile::LowMemory => 32,
        }
    }
}
