//! The chain and chain-class descriptors the cache consumes (spec §6). The
//! color-chain engine, transform links, and display-list allocator that
//! produce these values are out of scope (spec §1) and are modelled only by
//! the interfaces below.

use smallvec::SmallVec;

use crate::{
    clid::Clid,
    color::{BlackType, DeviceColorSink, Opacity},
    input::InputKey,
};

/// One link of a chain class: its link type, and its id list (spec §4.B.1).
pub struct ChainLink {
    pub link_type: Clid,
    pub ids: SmallVec<[Clid; 8]>,
}

/// Iterable view over a chain class's links and terminating colorants,
/// consumed only during `head_create` to build the chain-class key (spec
/// §6, "Chain class descriptor").
pub trait ChainClassLinks {
    fn color_space(&self) -> Clid;
    fn n_in_colorants(&self) -> Clid;
    fn links(&self) -> Vec<ChainLink>;
    fn terminating_colorants(&self) -> SmallVec<[Clid; 8]>;

    /// A link reporting this count signals the chain must never be cached
    /// (spec §4.B.1 step 2, "disable count").
    const DISABLE_COUNT: Clid = Clid::MAX;

    /// True until this chain's first `head_create` call clears it. The first
    /// use of a fresh chain is heuristically deemed single-shot and skips the
    /// cache entirely (spec §2, §4.B.1, P6); only the second and later uses
    /// get a `CacheHead`.
    fn is_first_use(&self) -> bool;

    /// Clears the first-use flag. Called once, the first time `head_create`
    /// sees this chain.
    fn clear_first_use(&mut self);
}

/// The per-invocation collaborator payload, selecting which style of entry
/// this request reads or writes (spec §3, §6).
pub enum RequestPayload<'a, Color> {
    DlColor(&'a mut dyn DeviceColorSink<Color>),
    FinalLink(&'a mut [f32]),
}

/// A single chain invocation's request to the cache (spec §6, "Chain
/// descriptor"): the input color vector, arity, and the two fields that
/// exclude or qualify caching (`overprint_process`, `in_black_type`).
pub struct ChainRequest<'a, Color> {
    pub input: InputKey,
    pub overprint_process: u32,
    pub in_black_type: BlackType,
    /// The chain's current opacity. Used in the per-invocation hash for
    /// both styles (spec §4.B.2 step 2) and as a `DL_COLOR` secondary key
    /// (spec §4.B.2 step 5).
    pub opacity: Opacity,
    pub payload: RequestPayload<'a, Color>,
}

impl<'a, Color> ChainRequest<'a, Color> {
    pub fn new(
        input: InputKey,
        overprint_process: u32,
        in_black_type: BlackType,
        opacity: Opacity,
        payload: RequestPayload<'a, Color>,
    ) -> Self {
        Self { input, overprint_process, in_black_type, opacity, payload }
    }
}
