//! `CacheState`: the top-level cache directory over all chain-class heads
//! (spec §4.A, §4.C).

use slotmap::{new_key_type, SlotMap};
use tracing::{debug, instrument, trace};

use crate::{
    chain::{ChainClassLinks, ChainRequest},
    clid::{build_chain_class_key, hash_chain_class},
    config::{MemoryProfile, DIRECTORY_SIZE},
    entry::Style,
    head::{CacheHead, LookupOutcome},
};

new_key_type! {
    /// A generational handle to one [`CacheHead`], stable across `reset`
    /// and `purge` (spec §3: "generational safety" in place of raw
    /// `CacheHead*` pointers).
    pub struct HeadId;
}

/// The top-level cache (spec §4.A): a 256-bucket directory of chain-class
/// heads, hashed by structural chain-class key (spec §4.E).
///
/// `Lut` is the externally-owned image-LUT back-reference type each head may
/// carry (spec §3); it defaults to `()` for callers with no image-LUT
/// chains to track.
pub struct CacheState<Color, Lut = ()> {
    heads: SlotMap<HeadId, CacheHead<Color, Lut>>,
    directory: [Vec<HeadId>; DIRECTORY_SIZE],
    purged_count: usize,
    next_generation: u64,
    profile: MemoryProfile,
}

impl<Color, Lut> CacheState<Color, Lut> {
    pub fn new(profile: MemoryProfile) -> Self {
        Self {
            heads: SlotMap::with_key(),
            directory: std::array::from_fn(|_| Vec::new()),
            purged_count: 0,
            next_generation: 1,
            profile,
        }
    }

    pub fn profile(&self) -> MemoryProfile {
        self.profile
    }

    pub fn head_count(&self) -> usize {
        self.heads.len()
    }

    pub fn purged_count(&self) -> usize {
        self.purged_count
    }

    pub fn head(&self, id: HeadId) -> Option<&CacheHead<Color, Lut>> {
        self.heads.get(id)
    }

    /// Mutable access to a head, e.g. to attach an image-LUT back-reference
    /// via [`CacheHead::set_image_lut`].
    pub fn head_mut(&mut self, id: HeadId) -> Option<&mut CacheHead<Color, Lut>> {
        self.heads.get_mut(id)
    }

    /// Finds the existing head for this chain class and retains it, or
    /// creates a fresh one (spec §4.B.1). Returns `None` if this is the
    /// chain's first use (a deliberate single-shot heuristic, P6), if the
    /// chain is structurally uncacheable (the disable-count sentinel, or a
    /// key too large to represent), or if allocating a fresh head's storage
    /// fails (spec §4.A, §7: the chain simply runs uncached).
    #[instrument(skip(self, links))]
    pub fn create_head<L: ChainClassLinks>(
        &mut self,
        links: &mut L,
        style: Style,
        n_in_comps: usize,
        n_out_comps: usize,
    ) -> Option<HeadId> {
        if links.is_first_use() {
            links.clear_first_use();
            trace!("declining to cache: first use of chain (single-shot heuristic)");
            return None;
        }

        let link_list = links.links();
        if link_list.iter().any(|link| link.ids.len() as u32 == L::DISABLE_COUNT) {
            trace!("declining to cache: disable-count sentinel");
            return None;
        }

        let key = build_chain_class_key(
            links.color_space(),
            links.n_in_colorants(),
            link_list.into_iter().map(|link| (link.link_type, link.ids)),
            &links.terminating_colorants(),
        );
        let Some(key) = key else {
            trace!("declining to cache: chain-class key too large");
            return None;
        };
        let hash_key = hash_chain_class(&key);

        for &id in &self.directory[hash_key as usize] {
            if let Some(head) = self.heads.get_mut(id) {
                if *head.chain_class_key() == key {
                    head.retain();
                    debug!(bucket = hash_key, ref_count = head.ref_count(), "reusing existing head");
                    return Some(id);
                }
            }
        }

        let hash_size = self.profile.hash_size();
        let table_capacity = self.profile.table_capacity();
        let generation = self.next_generation;
        self.next_generation += 1;

        let head =
            CacheHead::try_new(key, hash_key, generation, style, n_in_comps, n_out_comps, hash_size, table_capacity)?;
        let id = self.heads.insert(head);
        self.directory[hash_key as usize].push(id);
        debug!(bucket = hash_key, generation, style = ?style, n_in_comps, n_out_comps, "created head");
        Some(id)
    }

    /// Drops one reference to `id`'s head, fully freeing it (unlinking it
    /// from the directory and the head arena) once its reference count
    /// reaches zero (spec §3: `ref_cnt == 0` vs. "purged but retained").
    pub fn release_head(&mut self, id: HeadId, release_outputs: bool, release: &mut dyn FnMut(&mut Color)) {
        let Some(head) = self.heads.get_mut(id) else { return };
        if head.release() > 0 {
            return;
        }
        let bucket = head.directory_bucket();
        head.clear(release_outputs, release);
        self.heads.remove(id);
        self.directory[bucket as usize].retain(|&linked| linked != id);
    }

    pub fn lookup(&mut self, id: HeadId, req: &mut ChainRequest<Color>) -> Option<LookupOutcome> {
        self.heads.get_mut(id).map(|head| head.lookup(req))
    }

    pub fn insert(&mut self, id: HeadId, req: &mut ChainRequest<Color>, hash: usize) -> bool {
        match self.heads.get_mut(id) {
            Some(head) => head.insert(req, hash, &mut self.purged_count),
            None => false,
        }
    }

    /// Empties every head's storage without destroying the heads
    /// themselves or their directory linkage (spec §4.C.1), freeing any head
    /// whose reference count has already reached zero. When `release_outputs`
    /// is false (page boundary, not partial paint), also nulls every
    /// surviving head's image-LUT back-reference, since the LUT pool is
    /// about to disappear (spec §3, §4.C.1 step 3).
    #[instrument(skip(self, release))]
    pub fn reset(&mut self, release_outputs: bool, release: &mut dyn FnMut(&mut Color)) {
        let ids: Vec<HeadId> = self.heads.keys().collect();
        let mut cleared = 0usize;
        let mut freed = 0usize;
        for id in ids {
            let Some(head) = self.heads.get_mut(id) else { continue };
            if !head.is_purged() {
                head.clear(release_outputs, release);
                cleared += 1;
            }
            if !release_outputs {
                head.clear_image_lut();
            }
            if head.ref_count() == 0 {
                let bucket = head.directory_bucket();
                self.heads.remove(id);
                self.directory[bucket as usize].retain(|&linked| linked != id);
                freed += 1;
            }
        }
        self.purged_count = self.heads.len();
        debug!(cleared, freed, retained = self.purged_count, "reset complete");
    }

    /// A head is purgeable if it isn't already purged, and either it has
    /// never scored a hit, nothing references it, or its hit density is
    /// low (spec §4.C.2): `chits == 0 || ref_cnt == 0 || chits / population
    /// < 5`. The last clause is plain integer division, deliberately not
    /// refined to a floating-point ratio (see DESIGN.md).
    fn matches_purge_predicate(head: &CacheHead<Color, Lut>) -> bool {
        if head.is_purged() {
            return false;
        }
        let population = head.population();
        head.chits() == 0 || head.ref_count() == 0 || (population > 0 && head.chits() / population as u64 < 5)
    }

    /// Clears every head matching the purge predicate, freeing those whose
    /// reference count is also zero (spec §4.C.2). Always releases
    /// `DL_COLOR` outputs, matching the reference implementation's call
    /// convention (`purge` is only ever invoked with `release_outputs =
    /// true`). Returns whether anything was purged or freed.
    #[instrument(skip(self, release))]
    pub fn purge(&mut self, release: &mut dyn FnMut(&mut Color)) -> bool {
        let ids: Vec<HeadId> = self.heads.keys().collect();
        let mut cleared = 0usize;
        let mut freed = 0usize;
        for id in ids {
            let Some(head) = self.heads.get(id) else { continue };
            if !Self::matches_purge_predicate(head) {
                continue;
            }
            let head = self.heads.get_mut(id).expect("checked above");
            head.clear(true, release);
            cleared += 1;
            if head.ref_count() == 0 {
                let bucket = head.directory_bucket();
                self.heads.remove(id);
                self.directory[bucket as usize].retain(|&linked| linked != id);
                freed += 1;
            }
        }
        self.purged_count = self.heads.values().filter(|head| head.is_purged()).count();
        debug!(cleared, freed, "purge complete");
        cleared > 0
    }
}

/// The directory's two-phase protocol for the host's process-wide memory
/// manager (spec §4.C.3). Between a `solicit` and its matching `release`
/// the cache must not be mutated from another control flow — this crate
/// assumes a single-threaded interpreter, so that constraint holds
/// trivially as long as callers don't re-enter the cache from within
/// `release`'s callback.
pub trait LowMemoryHandler<Color> {
    /// Scans (without mutating) for purgeable heads. Returns an estimated
    /// byte cost if anything is purgeable, `None` if this solicit has
    /// nothing to offer.
    fn solicit(&self) -> Option<usize>;

    /// Performs the actual release. `safe_point` signals a point between
    /// operators where a full `reset` is safe; otherwise only `purge`'s
    /// narrower predicate runs.
    fn release(&mut self, safe_point: bool, release: &mut dyn FnMut(&mut Color)) -> bool;
}

impl<Color, Lut> LowMemoryHandler<Color> for CacheState<Color, Lut> {
    #[instrument(skip(self))]
    fn solicit(&self) -> Option<usize> {
        let purgeable = self.heads.values().filter(|head| Self::matches_purge_predicate(head)).count();
        if purgeable == 0 {
            debug!("nothing purgeable");
            return None;
        }
        let slot_pointer_size = std::mem::size_of::<usize>();
        let estimate = purgeable * self.profile.hash_size() * slot_pointer_size;
        debug!(purgeable, estimate, "solicited");
        Some(estimate)
    }

    #[instrument(skip(self, release))]
    fn release(&mut self, safe_point: bool, release: &mut dyn FnMut(&mut Color)) -> bool {
        let did_something = if safe_point {
            self.reset(true, release);
            true
        } else {
            self.purge(release)
        };
        debug!(did_something, "release complete");
        did_something
    }
}
