//! Secondary cache keys and the device-color collaborator interface (spec
//! §3, §4.B.2, §6). These types model the narrow surface the cache consumes
//! from the display-list color context; the context itself is an external
//! collaborator out of scope for this crate.

/// Black-preservation classification carried alongside a `DL_COLOR` entry's
/// input and output sides (spec §3, §4.B.3 step 5).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlackType(pub u8);

impl BlackType {
    /// Packs an input/output black-type pair into the single byte the
    /// reference implementation stores: `inBlackType | (outBlackType << 3)`
    /// (spec §4.B.3 step 5).
    pub fn pack(in_black_type: BlackType, out_black_type: BlackType) -> u8 {
        in_black_type.0 | (out_black_type.0 << 3)
    }
}

/// Opacity scalar, compared bit-exactly as a secondary key for `DL_COLOR`
/// lookups (spec §4.B.2 step 5).
#[derive(Clone, Copy, Debug, PartialEq, Hash)]
pub struct Opacity(u32);

impl Opacity {
    pub fn from_value(value: f32) -> Self {
        Self(value.to_bits())
    }

    pub fn to_bits(self) -> u32 {
        self.0
    }
}

impl Eq for Opacity {}

/// Per-object spot-color flags carried alongside a `DL_COLOR` entry's output
/// side (spec §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct SpotFlags(pub u8);

/// The display-list color context collaborator (spec §6): owns
/// reference-counted device-color handles and exposes the operations the
/// cache needs to move one into/out of an entry without ever interpreting
/// its contents.
///
/// Operations act on the chain's *current* color slot directly (rather than
/// taking it as a `&mut` parameter derived from `self`) so implementations
/// don't need interior mutability just to satisfy the borrow checker.
pub trait DeviceColorSink<Color> {
    /// The chain's current device color handle.
    fn current(&self) -> &Color;

    /// Releases whatever is in the chain's current color slot, decrementing
    /// its reference count (spec invariant 8's release operation, applied
    /// to the chain's own slot rather than a stored entry).
    fn release_current(&mut self);

    /// Overwrites the chain's current color slot with a copy of `src`,
    /// incrementing `src`'s reference count. Returns `false` on allocation
    /// failure (spec §4.B.2 step 6: "If the device-color copy fails,
    /// lookup returns miss even though inputs matched").
    fn copy_into_current(&mut self, src: &Color) -> bool;

    /// Produces a fresh handle referencing the same color as `current`,
    /// incrementing its reference count, to store into a new cache entry at
    /// insert time. `None` on allocation failure (spec §4.B.3 step 5, "If
    /// copy fails, roll back the bump allocation").
    fn try_reserve_copy(&mut self) -> Option<Color>;

    /// Releases one reference to a color previously obtained from this sink
    /// (spec invariant 8: an evicted `DL_COLOR` entry's output is released
    /// through the display-list color context).
    fn release(&mut self, color: &mut Color);

    /// The chain's current spot-flags, stored into a fresh `DL_COLOR` entry
    /// on insert (spec §4.B.3 step 5).
    fn spot_flags(&self) -> SpotFlags;

    /// The chain's current (output-side) black type, packed with the
    /// request's `in_black_type` on insert (spec §4.B.3 step 5). Distinct
    /// from [`ChainRequest::in_black_type`](crate::chain::ChainRequest),
    /// which is the input side.
    fn black_type(&self) -> BlackType;

    /// Writes a hit entry's stored spot-flags back into the chain's
    /// context (spec §4.B.2 step 6).
    fn set_spot_flags(&mut self, flags: SpotFlags);

    /// Writes a hit entry's stored insert-side black type back into the
    /// chain's context (spec §4.B.2 step 6: "assign stored spot-flags and
    /// insert-side black-type to the current context").
    fn set_black_type(&mut self, black_type: BlackType);
}
