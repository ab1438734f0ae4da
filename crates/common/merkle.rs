//! Bitcoin merkle trees.
//!
//! Internal nodes are `hash256(left || right)`; a level with an odd number
//! of nodes duplicates its last entry. All hashes here are in wire
//! (little-endian) order; callers working with display-order txids reverse
//! on the way in and out, the same boundary rule the codecs follow.

use bitx_crypto::hash::hash256;

/// Hash of two child nodes.
pub fn merkle_parent(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut data = [0u8; 64];
    data[..32].copy_from_slice(left);
    data[32..].copy_from_slice(right);
    hash256(&data)
}

/// Builds the next level up. The last node is paired with itself when the
/// level has an odd count.
pub fn merkle_parent_level(level: &[[u8; 32]]) -> Vec<[u8; 32]> {
    let mut parents = Vec::with_capacity(level.len().div_ceil(2));
    for pair in level.chunks(2) {
        match pair {
            [left, right] => parents.push(merkle_parent(left, right)),
            [single] => parents.push(merkle_parent(single, single)),
            _ => {}
        }
    }
    parents
}

/// Reduces the leaves to the merkle root. A single leaf is its own root.
///
/// An empty slice has no defined root; `None` is returned rather than a
/// sentinel value.
pub fn merkle_root(leaves: &[[u8; 32]]) -> Option<[u8; 32]> {
    match leaves {
        [] => None,
        [single] => Some(*single),
        _ => {
            let mut level = leaves.to_vec();
            while level.len() > 1 {
                level = merkle_parent_level(&level);
            }
            level.first().copied()
        }
    }
}
