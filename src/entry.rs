//! `CacheEntry`: one memoised chain invocation (spec §3).

use smallvec::SmallVec;

use crate::{
    color::{BlackType, Opacity, SpotFlags},
    input::InputKey,
};

/// Which of the two entry shapes a `CacheHead` stores. Fixed for a head's
/// entire lifetime at creation time (spec §3, §4.B.1 step 3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Style {
    DlColor,
    FinalLink,
}

/// A handle to one slot within a head's slab list: which `DataTable` in the
/// chain, and which slot within it (Design Notes, "arena + indices" in
/// place of raw pointers).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryRef {
    pub table: u32,
    pub slot: u32,
}

/// One memoised chain invocation, or an empty placeholder slot freshly
/// carved from a `DataTable` and not yet populated.
pub enum CacheEntry<Color> {
    /// A fresh slab slot that has never held a value, or whose value was
    /// cleared without being individually freed (spec §4.A: "entries are
    /// never individually freed").
    Empty,
    DlColor {
        input: InputKey,
        output: Color,
        spot_flags: SpotFlags,
        out_black_type: BlackType,
        in_black_type: BlackType,
        opacity: Opacity,
    },
    FinalLink {
        input: InputKey,
        output: SmallVec<[f32; 8]>,
    },
}

impl<Color> CacheEntry<Color> {
    pub fn input(&self) -> Option<&InputKey> {
        match self {
            CacheEntry::Empty => None,
            CacheEntry::DlColor { input, .. } | CacheEntry::FinalLink { input, .. } => Some(input),
        }
    }

    pub fn style(&self) -> Option<Style> {
        match self {
            CacheEntry::Empty => None,
            CacheEntry::DlColor { .. } => Some(Style::DlColor),
            CacheEntry::FinalLink { .. } => Some(Style::FinalLink),
        }
    }
}
