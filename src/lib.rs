//! A hierarchical memoisation cache for color-chain invocations in a raster
//! image processor's color-chain engine (spec §1).
//!
//! The cache is organized as a 256-bucket [`state::CacheState`] directory
//! over [`head::CacheHead`]s, one per structural chain class. Each head
//! hashes chain invocations by their input color vector into its own bucket
//! table, backed by a bump-allocated [`table::DataTable`] slab whose entries
//! are never individually freed — only a whole head's storage is ever torn
//! down at once, by [`head::CacheHead::clear`].
//!
//! Two entry styles are supported (spec §3): `DL_COLOR` entries, which hold
//! a reference-counted device-color handle obtained through a
//! [`color::DeviceColorSink`] collaborator, and `FINAL_LINK` entries, which
//! hold a plain output color vector. A head's style is fixed for its entire
//! lifetime.

mod barrier;
pub mod chain;
pub mod clid;
pub mod color;
pub mod config;
pub mod entry;
pub mod error;
pub mod head;
pub mod input;
pub mod state;
pub mod table;

pub use chain::{ChainClassLinks, ChainLink, ChainRequest, RequestPayload};
pub use clid::{Clid, ChainClassKey};
pub use color::{BlackType, DeviceColorSink, Opacity, SpotFlags};
pub use config::MemoryProfile;
pub use entry::{CacheEntry, Style};
pub use error::CacheError;
pub use head::{CacheHead, LookupOutcome};
pub use input::InputKey;
pub use state::{CacheState, HeadId, LowMemoryHandler};
