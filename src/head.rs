//! `CacheHead`: one cache instance bound to one chain class (spec §4.B).

use smallvec::SmallVec;
use tracing::trace;

use crate::{
    barrier::ProtectedAlloc,
    chain::{ChainRequest, RequestPayload},
    clid::ChainClassKey,
    color::BlackType,
    config::MAX_HASH_DEPTH,
    entry::{CacheEntry, EntryRef, Style},
    input::hash_input_key,
    table::DataTable,
};

/// The mutable bucket/slab state of a head. `None` on the head itself means
/// "purged but retained" (spec §3, invariant 5).
pub(crate) struct HeadStorage<Color> {
    buckets: Vec<Vec<EntryRef>>,
    hash_depth: Vec<usize>,
    max_hash_depth: usize,
    slab: DataTable<Color>,
}

impl<Color> HeadStorage<Color> {
    fn try_new(hash_size: usize, table_capacity: usize) -> Option<Self> {
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(hash_size).ok()?;
        buckets.resize_with(hash_size, Vec::new);

        let mut hash_depth = Vec::new();
        hash_depth.try_reserve_exact(hash_size).ok()?;
        hash_depth.resize(hash_size, 0);

        let slab = DataTable::try_new(table_capacity)?;
        Some(Self { buckets, hash_depth, max_hash_depth: 0, slab })
    }

    #[cfg(test)]
    pub(crate) fn hash_depth_len(&self) -> usize {
        self.hash_depth.len()
    }
}

/// One cache instance bound to one chain class (spec §3).
///
/// `Lut` is the externally-owned image-LUT back-reference (spec §3: "Optional
/// image-LUT back-reference ... cleared on full reset"). The cache never
/// reads or interprets it, only holds and nulls it; callers that don't use
/// image-LUT chains can ignore the parameter entirely since it defaults to
/// `()`.
pub struct CacheHead<Color, Lut = ()> {
    chain_class_key: ChainClassKey,
    hash_key: u8,
    ref_cnt: u32,
    generation: u64,
    style: Style,
    #[allow(dead_code)] // carried for parity with spec §3; not read by any algorithm here
    n_in_comps: usize,
    n_out_comps: usize,
    hash_size: usize,
    table_capacity: usize,
    storage: Option<HeadStorage<Color>>,
    population: usize,
    chits: u64,
    clookups: u64,
    image_lut: Option<Lut>,
}

/// Outcome of [`CacheHead::lookup`]. On a miss, the hash is handed back so
/// the caller can pass it to `insert` without recomputing it (spec §4.B.2).
pub enum LookupOutcome {
    Hit,
    Miss { hash: usize },
}

impl<Color, Lut> CacheHead<Color, Lut> {
    /// Builds a fresh head's storage and fields. Allocation failure here is
    /// safe: the caller (`CacheState::create_head`) simply declines to
    /// create the head and the chain runs uncached (spec §4.A, §7).
    pub(crate) fn try_new(
        chain_class_key: ChainClassKey,
        hash_key: u8,
        generation: u64,
        style: Style,
        n_in_comps: usize,
        n_out_comps: usize,
        hash_size: usize,
        table_capacity: usize,
    ) -> Option<Self> {
        let storage = HeadStorage::try_new(hash_size, table_capacity)?;
        Some(Self {
            chain_class_key,
            hash_key,
            ref_cnt: 1,
            generation,
            style,
            n_in_comps,
            n_out_comps,
            hash_size,
            table_capacity,
            storage: Some(storage),
            population: 0,
            chits: 0,
            clookups: 0,
            image_lut: None,
        })
    }

    pub fn chain_class_key(&self) -> &ChainClassKey {
        &self.chain_class_key
    }

    pub fn directory_bucket(&self) -> u8 {
        self.hash_key
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn n_out_comps(&self) -> usize {
        self.n_out_comps
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn ref_count(&self) -> u32 {
        self.ref_cnt
    }

    pub fn retain(&mut self) {
        self.ref_cnt += 1;
    }

    /// Returns the new reference count.
    pub fn release(&mut self) -> u32 {
        self.ref_cnt = self.ref_cnt.saturating_sub(1);
        self.ref_cnt
    }

    /// `hashtable == NULL` in spec terms: purged but retained (invariant 5).
    pub fn is_purged(&self) -> bool {
        self.storage.is_none()
    }

    pub fn population(&self) -> usize {
        self.population
    }

    pub fn chits(&self) -> u64 {
        self.chits
    }

    pub fn clookups(&self) -> u64 {
        self.clookups
    }

    /// The externally-owned image-LUT back-reference, if one was attached.
    pub fn image_lut(&self) -> Option<&Lut> {
        self.image_lut.as_ref()
    }

    /// Attaches (or replaces) the image-LUT back-reference.
    pub fn set_image_lut(&mut self, lut: Lut) {
        self.image_lut = Some(lut);
    }

    /// Nulls the image-LUT back-reference (spec §3, §4.C.1: done by
    /// `CacheState::reset` when `release_outputs` is false, since the LUT
    /// pool is about to disappear).
    pub fn clear_image_lut(&mut self) {
        self.image_lut = None;
    }

    pub fn max_hash_depth(&self) -> usize {
        self.storage.as_ref().map_or(0, |s| s.max_hash_depth)
    }

    pub fn hash_depth(&self, bucket: usize) -> usize {
        self.storage.as_ref().map_or(0, |s| s.hash_depth[bucket])
    }

    /// Attempts to recreate purged storage in place, e.g. when `insert` is
    /// called on a head a prior `purge` emptied (spec §4.B.3 step 2).
    /// Returns `true` if storage is now present (either already was, or was
    /// just rebuilt).
    pub(crate) fn ensure_storage(&mut self) -> bool {
        if self.storage.is_some() {
            return true;
        }
        match HeadStorage::try_new(self.hash_size, self.table_capacity) {
            Some(storage) => {
                self.storage = Some(storage);
                true
            }
            None => false,
        }
    }

    /// Moves storage out for the duration of a [`ProtectedAlloc`] barrier.
    pub(crate) fn take_storage(&mut self) -> Option<HeadStorage<Color>> {
        self.storage.take()
    }

    /// Restores storage moved out by [`Self::take_storage`].
    pub(crate) fn restore_storage(&mut self, storage: HeadStorage<Color>) {
        debug_assert!(self.storage.is_none(), "restoring storage over a live head");
        self.storage = Some(storage);
    }

    /// Looks up `req` against this head (spec §4.B.2).
    pub fn lookup(&mut self, req: &mut ChainRequest<Color>) -> LookupOutcome {
        if req.overprint_process != 0 {
            return LookupOutcome::Miss { hash: 0 };
        }

        let hash = hash_input_key(&req.input, req.opacity.to_bits(), self.hash_size);

        let storage = match &mut self.storage {
            Some(s) => s,
            None => return LookupOutcome::Miss { hash },
        };

        self.clookups += 1;

        let bucket = &storage.buckets[hash];
        let mut matched_at = None;
        for (pos, entry_ref) in bucket.iter().enumerate() {
            if Self::entry_matches(&storage.slab, *entry_ref, req) {
                matched_at = Some(pos);
                break;
            }
        }

        let Some(pos) = matched_at else {
            return LookupOutcome::Miss { hash };
        };

        let entry_ref = storage.buckets[hash][pos];
        let entry = Self::resolve_mut(&mut storage.slab, entry_ref);
        if !Self::deliver_hit(entry, req) {
            // Device-color copy failed: treat as miss despite the match
            // (spec §4.B.2 step 6 note).
            return LookupOutcome::Miss { hash };
        }

        self.chits += 1;
        // MRU reorder: move the matched entry to the bucket head.
        let bucket = &mut storage.buckets[hash];
        let entry_ref = bucket.remove(pos);
        bucket.insert(0, entry_ref);

        trace!(bucket = hash, "cache hit");
        LookupOutcome::Hit
    }

    /// Inserts `req`'s output under the bucket `hash` (the value a prior
    /// [`Self::lookup`] miss returned) (spec §4.B.3).
    pub fn insert(&mut self, req: &mut ChainRequest<Color>, hash: usize, purged_count: &mut usize) -> bool {
        if req.overprint_process != 0 {
            return false;
        }
        if self.storage.is_none() && !self.ensure_storage() {
            return false;
        }

        let mut guard = ProtectedAlloc::enter(self, purged_count);
        let (storage, head) = guard.storage_and_head();
        Self::insert_into(storage, head, req, hash)
    }

    fn insert_into(
        storage: &mut HeadStorage<Color>,
        head: &mut CacheHead<Color, Lut>,
        req: &mut ChainRequest<Color>,
        hash: usize,
    ) -> bool {
        let entry_ref = if storage.hash_depth[hash] == MAX_HASH_DEPTH {
            // Bucket already at its bounded depth: recycle the tail entry
            // rather than growing it further (spec §4.B.3 step 3).
            let recycled = storage.buckets[hash].pop().expect("hash_depth tracks bucket length");
            storage.hash_depth[hash] -= 1;
            head.population -= 1;
            recycled
        } else {
            match Self::alloc_slot(&mut storage.slab, head.table_capacity) {
                Some(entry_ref) => entry_ref,
                None => return false,
            }
        };

        let slot = Self::resolve_mut(&mut storage.slab, entry_ref);
        let populated = match (&mut req.payload, head.style) {
            (RequestPayload::DlColor(sink), Style::DlColor) => match sink.try_reserve_copy() {
                Some(output) => {
                    *slot = CacheEntry::DlColor {
                        input: req.input.clone(),
                        output,
                        spot_flags: sink.spot_flags(),
                        out_black_type: sink.black_type(),
                        in_black_type: req.in_black_type,
                        opacity: req.opacity,
                    };
                    true
                }
                // Device-color copy failed: roll back (spec §4.B.3 step 5).
                // The chosen slot (bumped or recycled) is simply abandoned;
                // entries are never individually freed (spec §4.A).
                None => false,
            },
            (RequestPayload::FinalLink(values), Style::FinalLink) => {
                *slot = CacheEntry::FinalLink { input: req.input.clone(), output: SmallVec::from_slice(values) };
                true
            }
            _ => false,
        };

        if !populated {
            return false;
        }

        storage.buckets[hash].insert(0, entry_ref);
        storage.hash_depth[hash] += 1;
        head.population += 1;
        storage.max_hash_depth = storage.max_hash_depth.max(storage.hash_depth[hash]);
        trace!(bucket = hash, "cache insert");
        true
    }

    /// Frees this head's storage (spec §4.B.4). If `release_outputs` is
    /// true, every live `DL_COLOR` entry's output is released through
    /// `release` before the slab is dropped.
    pub fn clear(&mut self, release_outputs: bool, release: &mut dyn FnMut(&mut Color)) {
        if let Some(mut storage) = self.storage.take() {
            if release_outputs && self.style == Style::DlColor {
                Self::release_all(&mut storage.slab, release);
            }
        }
        self.population = 0;
        self.chits = 0;
        self.clookups = 0;
    }

    fn release_all(slab: &mut DataTable<Color>, release: &mut dyn FnMut(&mut Color)) {
        for entry in slab.slots_mut() {
            if let CacheEntry::DlColor { output, .. } = entry {
                release(output);
            }
        }
        if let Some(next) = slab.next_mut() {
            Self::release_all(next, release);
        }
    }

    /// Bump-allocates the next free slot anywhere in the slab chain,
    /// growing it with one more block if the tip is full (spec §4.A,
    /// §4.B.3 step 3).
    fn alloc_slot(slab: &mut DataTable<Color>, table_capacity: usize) -> Option<EntryRef> {
        let mut idx = 0u32;
        let mut table = slab;
        loop {
            if !table.is_full() {
                let slot = table.alloc().expect("just checked is_full");
                return Some(EntryRef { table: idx, slot });
            }
            if table.next().is_none() {
                table.set_next(DataTable::try_new(table_capacity)?);
            }
            table = table.next_mut().expect("just linked or already present");
            idx += 1;
        }
    }

    fn entry_matches(slab: &DataTable<Color>, entry_ref: EntryRef, req: &ChainRequest<Color>) -> bool {
        let entry = Self::resolve(slab, entry_ref);
        match entry {
            CacheEntry::DlColor { input, in_black_type, opacity, .. } => {
                *input == req.input && *in_black_type == req.in_black_type && *opacity == req.opacity
            }
            CacheEntry::FinalLink { input, .. } => *input == req.input,
            CacheEntry::Empty => false,
        }
    }

    fn resolve(slab: &DataTable<Color>, entry_ref: EntryRef) -> &CacheEntry<Color> {
        let mut table = slab;
        let mut idx = entry_ref.table;
        while idx > 0 {
            table = table.next().expect("entry_ref points at a chained table");
            idx -= 1;
        }
        table.slot(entry_ref.slot)
    }

    fn resolve_mut(slab: &mut DataTable<Color>, entry_ref: EntryRef) -> &mut CacheEntry<Color> {
        let mut table = slab;
        let mut idx = entry_ref.table;
        while idx > 0 {
            table = table.next_mut().expect("entry_ref points at a chained table");
            idx -= 1;
        }
        table.slot_mut(entry_ref.slot)
    }

    /// Copies a hit entry's output back into the request and writes its
    /// stored spot-flags / insert-side black type back into the chain's
    /// context (spec §4.B.2 step 6). Returns `false` if a `DL_COLOR`
    /// device-color copy failed, in which case the caller must treat the
    /// lookup as a miss.
    fn deliver_hit(entry: &mut CacheEntry<Color>, req: &mut ChainRequest<Color>) -> bool {
        match (entry, &mut req.payload) {
            (
                CacheEntry::DlColor { output, spot_flags, out_black_type, .. },
                RequestPayload::DlColor(sink),
            ) => {
                sink.release_current();
                if !sink.copy_into_current(output) {
                    return false;
                }
                sink.set_spot_flags(*spot_flags);
                sink.set_black_type(*out_black_type);
                true
            }
            (CacheEntry::FinalLink { output, .. }, RequestPayload::FinalLink(slot)) => {
                let n = output.len().min(slot.len());
                slot[..n].copy_from_slice(&output[..n]);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{color::{DeviceColorSink, Opacity, SpotFlags}, input::InputKey};

    #[derive(Clone, Copy, Default, PartialEq, Debug)]
    struct TestColor(u32);

    struct TestSink {
        current: TestColor,
        spot_flags: SpotFlags,
        black_type: BlackType,
        fail_copy: bool,
    }

    impl DeviceColorSink<TestColor> for TestSink {
        fn current(&self) -> &TestColor {
            &self.current
        }
        fn release_current(&mut self) {
            self.current = TestColor::default();
        }
        fn copy_into_current(&mut self, src: &TestColor) -> bool {
            if self.fail_copy {
                return false;
            }
            self.current = *src;
            true
        }
        fn try_reserve_copy(&mut self) -> Option<TestColor> {
            if self.fail_copy {
                None
            } else {
                Some(self.current)
            }
        }
        fn release(&mut self, color: &mut TestColor) {
            *color = TestColor::default();
        }
        fn spot_flags(&self) -> SpotFlags {
            self.spot_flags
        }
        fn black_type(&self) -> BlackType {
            self.black_type
        }
        fn set_spot_flags(&mut self, flags: SpotFlags) {
            self.spot_flags = flags;
        }
        fn set_black_type(&mut self, black_type: BlackType) {
            self.black_type = black_type;
        }
    }

    fn dl_color_head() -> CacheHead<TestColor> {
        CacheHead::try_new(ChainClassKey::new(), 0, 1, Style::DlColor, 4, 1, 32, 8).unwrap()
    }

    fn final_link_head() -> CacheHead<TestColor> {
        CacheHead::try_new(ChainClassKey::new(), 0, 1, Style::FinalLink, 4, 3, 32, 8).unwrap()
    }

    #[test]
    fn miss_then_hit_roundtrip_dl_color() {
        let mut head = dl_color_head();
        let mut purged = 0usize;
        let mut sink = TestSink {
            current: TestColor(7),
            spot_flags: SpotFlags(1),
            black_type: BlackType(2),
            fail_copy: false,
        };

        let input = InputKey::from_values(&[0.1, 0.2, 0.3, 0.4]);
        let opacity = Opacity::from_value(1.0);
        let mut req = ChainRequest::new(
            input.clone(),
            0,
            BlackType(0),
            opacity,
            RequestPayload::DlColor(&mut sink),
        );

        let hash = match head.lookup(&mut req) {
            LookupOutcome::Miss { hash } => hash,
            LookupOutcome::Hit => panic!("must miss on empty head"),
        };
        assert!(head.insert(&mut req, hash, &mut purged));
        assert_eq!(head.population(), 1);

        let mut req2 = ChainRequest::new(input, 0, BlackType(0), opacity, RequestPayload::DlColor(&mut sink));
        assert!(matches!(head.lookup(&mut req2), LookupOutcome::Hit));
        assert_eq!(head.chits(), 1);
    }

    #[test]
    fn miss_then_hit_roundtrip_final_link() {
        let mut head = final_link_head();
        let mut purged = 0usize;
        let input = InputKey::from_values(&[0.5, 0.5, 0.5, 0.5]);
        let mut out = [0.0f32; 3];
        let mut req = ChainRequest::new(input.clone(), 0, BlackType(0), Opacity::from_value(1.0), RequestPayload::FinalLink(&mut out));

        let hash = match head.lookup(&mut req) {
            LookupOutcome::Miss { hash } => hash,
            LookupOutcome::Hit => panic!("must miss on empty head"),
        };
        out[0] = 9.0;
        out[1] = 8.0;
        out[2] = 7.0;
        assert!(head.insert(&mut req, hash, &mut purged));

        let mut out2 = [0.0f32; 3];
        let mut req2 = ChainRequest::new(input, 0, BlackType(0), Opacity::from_value(1.0), RequestPayload::FinalLink(&mut out2));
        assert!(matches!(head.lookup(&mut req2), LookupOutcome::Hit));
        assert_eq!(out2, [9.0, 8.0, 7.0]);
    }

    #[test]
    fn overprint_process_never_caches() {
        let mut head = final_link_head();
        let mut purged = 0usize;
        let input = InputKey::from_values(&[0.5, 0.5, 0.5, 0.5]);
        let mut out = [0.0f32; 3];
        let mut req = ChainRequest::new(input, 7, BlackType(0), Opacity::from_value(1.0), RequestPayload::FinalLink(&mut out));

        assert!(matches!(head.lookup(&mut req), LookupOutcome::Miss { hash: 0 }));
        assert!(!head.insert(&mut req, 0, &mut purged));
        assert_eq!(head.population(), 0);
    }

    #[test]
    fn hit_delivers_insert_side_black_type_not_lookup_key() {
        let mut head = dl_color_head();
        let mut purged = 0usize;
        let mut sink = TestSink {
            current: TestColor(7),
            spot_flags: SpotFlags(0),
            black_type: BlackType(2),
            fail_copy: false,
        };

        let input = InputKey::from_values(&[0.6, 0.6, 0.6, 0.6]);
        let opacity = Opacity::from_value(1.0);
        // in_black_type (the lookup-side secondary key) differs from
        // sink.black_type() (the insert-side value actually packed into the
        // entry as out_black_type).
        let mut req =
            ChainRequest::new(input.clone(), 0, BlackType(1), opacity, RequestPayload::DlColor(&mut sink));
        let hash = match head.lookup(&mut req) {
            LookupOutcome::Miss { hash } => hash,
            LookupOutcome::Hit => panic!("must miss on empty head"),
        };
        assert!(head.insert(&mut req, hash, &mut purged));

        sink.black_type = BlackType(9);
        let mut req2 = ChainRequest::new(input, 0, BlackType(1), opacity, RequestPayload::DlColor(&mut sink));
        assert!(matches!(head.lookup(&mut req2), LookupOutcome::Hit));
        assert_eq!(sink.black_type(), BlackType(2), "hit must deliver the insert-side black type, not the lookup key or stale value");
    }

    #[test]
    fn failed_device_color_copy_reports_miss_on_hit() {
        let mut head = dl_color_head();
        let mut purged = 0usize;
        let mut sink =
            TestSink { current: TestColor(1), spot_flags: SpotFlags(0), black_type: BlackType(0), fail_copy: false };
        let input = InputKey::from_values(&[1.0, 1.0, 1.0, 1.0]);
        let opacity = Opacity::from_value(1.0);
        let mut req =
            ChainRequest::new(input.clone(), 0, BlackType(0), opacity, RequestPayload::DlColor(&mut sink));
        let hash = match head.lookup(&mut req) {
            LookupOutcome::Miss { hash } => hash,
            LookupOutcome::Hit => panic!("must miss on empty head"),
        };
        assert!(head.insert(&mut req, hash, &mut purged));

        sink.fail_copy = true;
        let mut req2 = ChainRequest::new(input, 0, BlackType(0), opacity, RequestPayload::DlColor(&mut sink));
        assert!(matches!(head.lookup(&mut req2), LookupOutcome::Miss { .. }));
    }

    #[test]
    fn clear_resets_population_and_stats() {
        let mut head = final_link_head();
        let mut purged = 0usize;
        let input = InputKey::from_values(&[0.2, 0.2, 0.2, 0.2]);
        let mut out = [1.0f32; 3];
        let mut req = ChainRequest::new(input, 0, BlackType(0), Opacity::from_value(1.0), RequestPayload::FinalLink(&mut out));
        let hash = match head.lookup(&mut req) {
            LookupOutcome::Miss { hash } => hash,
            LookupOutcome::Hit => panic!("must miss on empty head"),
        };
        head.insert(&mut req, hash, &mut purged);
        assert_eq!(head.population(), 1);

        head.clear(false, &mut |_| {});
        assert_eq!(head.population(), 0);
        assert!(head.is_purged());
    }

    /// Spec §8 S3: with a degenerate one-bucket hash table, inserting 6
    /// distinct inputs (all colliding in bucket 0) leaves only the 5 most
    /// recent; the oldest is recycled out and its lookup misses.
    #[test]
    fn bucket_recycle_evicts_oldest_past_max_depth() {
        let mut head: CacheHead<TestColor> =
            CacheHead::try_new(ChainClassKey::new(), 0, 1, Style::FinalLink, 1, 1, 1, 16).unwrap();
        let mut purged = 0usize;
        let mut out = [0.0f32; 1];

        for i in 0..6u32 {
            let input = InputKey::from_values(&[f32::from_bits(i)]);
            let mut req = ChainRequest::new(input, 0, BlackType(0), Opacity::from_value(1.0), RequestPayload::FinalLink(&mut out));
            let hash = match head.lookup(&mut req) {
                LookupOutcome::Miss { hash } => hash,
                LookupOutcome::Hit => panic!("every input here is distinct"),
            };
            assert!(head.insert(&mut req, hash, &mut purged));
        }

        assert_eq!(head.population(), MAX_HASH_DEPTH);
        assert_eq!(head.hash_depth(0), MAX_HASH_DEPTH);

        let first_input = InputKey::from_values(&[f32::from_bits(0)]);
        let mut req = ChainRequest::new(first_input, 0, BlackType(0), Opacity::from_value(1.0), RequestPayload::FinalLink(&mut out));
        assert!(matches!(head.lookup(&mut req), LookupOutcome::Miss { .. }));
    }

    /// Spec §8 S4: a hit on a non-head bucket entry moves it to position 0
    /// without disturbing lookups for the entries still ahead of it.
    #[test]
    fn mru_reorder_moves_hit_entry_to_bucket_front() {
        let mut head: CacheHead<TestColor> =
            CacheHead::try_new(ChainClassKey::new(), 0, 1, Style::FinalLink, 1, 1, 1, 16).unwrap();
        let mut purged = 0usize;
        let mut out = [0.0f32; 1];

        let inputs: Vec<InputKey> =
            (0..3u32).map(|i| InputKey::from_values(&[f32::from_bits(i)])).collect();
        for input in &inputs {
            let mut req =
                ChainRequest::new(input.clone(), 0, BlackType(0), Opacity::from_value(1.0), RequestPayload::FinalLink(&mut out));
            let hash = match head.lookup(&mut req) {
                LookupOutcome::Miss { hash } => hash,
                LookupOutcome::Hit => panic!("every input here is distinct"),
            };
            head.insert(&mut req, hash, &mut purged);
        }
        // Bucket order (front to back) is now C, B, A (most recent first).

        let mut req = ChainRequest::new(
            inputs[0].clone(),
            0,
            BlackType(0),
            Opacity::from_value(1.0),
            RequestPayload::FinalLink(&mut out),
        );
        assert!(matches!(head.lookup(&mut req), LookupOutcome::Hit));

        // A must now be at the bucket front: a second lookup still hits
        // without needing to walk past B or C.
        let mut req2 = ChainRequest::new(inputs[0].clone(), 0, BlackType(0), Opacity::from_value(1.0), RequestPayload::FinalLink(&mut out));
        assert!(matches!(head.lookup(&mut req2), LookupOutcome::Hit));
    }
}
