//! Chain-class keys: the structural identity of a chain, independent of
//! which concrete chain instance is in use (spec §4.B.1, GLOSSARY).

use smallvec::SmallVec;

use crate::config::MAX_CHAIN_CLASS_KEY_LEN;

/// One element of a chain-class key: a link type, an id count, an id, or a
/// terminating colorant index.
pub type Clid = u32;

/// The flat CLID vector identifying a chain's structural class: `(iColorSpace,
/// n_iColorants, {linkType, idcount, ids...} per link, terminating colorant
/// indices)` (spec §4.B.1 step 1).
pub type ChainClassKey = SmallVec<[Clid; 32]>;

/// Appends one chain link's CLIDs to a key under construction.
pub fn push_link(key: &mut ChainClassKey, link_type: Clid, ids: &[Clid]) {
    key.push(link_type);
    key.push(ids.len() as Clid);
    key.extend_from_slice(ids);
}

/// Builds the chain-class key for a chain, or `None` if it would exceed
/// [`MAX_CHAIN_CLASS_KEY_LEN`] (spec §4.B.1 step 2).
pub fn build_chain_class_key(
    color_space: Clid,
    n_in_colorants: Clid,
    links: impl Iterator<Item = (Clid, SmallVec<[Clid; 8]>)>,
    terminating_colorants: &[Clid],
) -> Option<ChainClassKey> {
    let mut key = ChainClassKey::new();
    key.push(color_space);
    key.push(n_in_colorants);
    for (link_type, ids) in links {
        push_link(&mut key, link_type, &ids);
        if key.len() > MAX_CHAIN_CLASS_KEY_LEN {
            return None;
        }
    }
    key.extend_from_slice(terminating_colorants);
    if key.len() > MAX_CHAIN_CLASS_KEY_LEN {
        return None;
    }
    Some(key)
}

/// Mixes a chain-class key into an 8-bit directory bucket index (spec §4.E):
/// `key = (key << 5) | next; key += key >> 16; key += key >> 8; key &= 0xFF`.
pub fn hash_chain_class(clids: &[Clid]) -> u8 {
    let mut key: u32 = 0;
    for &next in clids {
        key = (key << 5) | next;
    }
    key = key.wrapping_add(key >> 16);
    key = key.wrapping_add(key >> 8);
    (key & 0xFF) as u8
}
