//! Bit-exact input color keys (spec §4.B.2, Design Notes "Bit-exact float
//! keys"): the cache memoises identical requests, not numerically-equivalent
//! ones, so raw 32-bit float representations are stored and compared, never
//! numeric equality, and NaN is never canonicalised.

use smallvec::SmallVec;

/// The raw bit patterns of an input color vector, in channel order. Equality
/// and hashing are bit-exact: two `InputKey`s are equal iff every channel's
/// underlying bits match exactly.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InputKey {
    bits: SmallVec<[u32; 8]>,
}

impl InputKey {
    /// Builds a key from raw `USERVALUE` floats by capturing their bit
    /// patterns, never their numeric value.
    pub fn from_values(values: &[f32]) -> Self {
        Self { bits: values.iter().map(|v| v.to_bits()).collect() }
    }

    pub fn arity(&self) -> usize {
        self.bits.len()
    }

    pub fn as_bits(&self) -> &[u32] {
        &self.bits
    }
}

/// Computes the per-invocation input-color hash (spec §4.B.2 step 2):
/// `sum((bits[i] as u32) << i) + opacity_bits; h += h>>16; h += h>>8`, folded
/// into `[0, hash_size)`.
pub fn hash_input_key(key: &InputKey, opacity_bits: u32, hash_size: usize) -> usize {
    let mut h: u32 = 0;
    for (i, &bits) in key.as_bits().iter().enumerate() {
        // Reference shifts by the channel index; wrap rather than panic for
        // the (unrealistic) case of very high arity.
        h = h.wrapping_add(bits.wrapping_shl(i as u32));
    }
    h = h.wrapping_add(opacity_bits);
    h = h.wrapping_add(h >> 16);
    h = h.wrapping_add(h >> 8);
    fold_to_bucket(h, hash_size)
}

/// Folds a raw mixed hash into `[0, hash_size)`. The reference bucket counts
/// (2048, 1201) are not both powers of two, so a plain mask isn't always
/// valid; modulo is used instead.
pub fn fold_to_bucket(raw: u32, hash_size: usize) -> usize {
    (raw as usize) % hash_size
}
