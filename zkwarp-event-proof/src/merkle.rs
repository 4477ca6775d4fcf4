// zkwarp/zkwarp-event-proof/src/merkle.rs
//
// Binary keccak256 tree over 32-byte leaves. Interior nodes are tagged
// so a leaf encoding can never be replayed as a node (and vice versa).
// An odd level duplicates its last node.

use serde::{Deserialize, Serialize};
use tiny_keccak::{Hasher, Keccak};

use zkwarp_common::ZkwarpError;

pub type Digest = [u8; 32];

/// Prefix for interior-node hashing.
pub const NODE_TAG: u8 = 0x01;
/// Prefix for leaf hashing (used by event leaf encoding).
pub const LEAF_TAG: u8 = 0x00;

pub fn keccak256(data: &[u8]) -> Digest {
    let mut hasher = Keccak::v256();
    let mut out = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut out);
    out
}

fn combine(left: &Digest, right: &Digest) -> Digest {
    let mut hasher = Keccak::v256();
    let mut out = [0u8; 32];
    hasher.update(&[NODE_TAG]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize(&mut out);
    out
}

/// Sibling path from a leaf to the root. `leaf_index` selects the
/// left/right orientation at each level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMerkleProof {
    pub leaf_index: u32,
    pub siblings: Vec<Digest>,
}

/// Root over the given leaf hashes. A single leaf is its own root.
pub fn merkle_root(leaves: &[Digest]) -> Result<Digest, ZkwarpError> {
    if leaves.is_empty() {
        return Err(ZkwarpError::MalformedInput(
            "cannot build a tree over zero leaves".into(),
        ));
    }
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(*level.last().unwrap());
        }
        level = level
            .chunks_exact(2)
            .map(|pair| combine(&pair[0], &pair[1]))
            .collect();
    }
    Ok(level[0])
}

/// Sibling path for `index`. When the node is the duplicated tail of an
/// odd level its sibling is itself.
pub fn merkle_prove(leaves: &[Digest], index: usize) -> Result<EventMerkleProof, ZkwarpError> {
    if leaves.is_empty() {
        return Err(ZkwarpError::MalformedInput(
            "cannot build a tree over zero leaves".into(),
        ));
    }
    if index >= leaves.len() {
        return Err(ZkwarpError::IndexOutOfRange {
            index,
            len: leaves.len(),
        });
    }

    let mut level = leaves.to_vec();
    let mut pos = index;
    let mut siblings = Vec::new();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(*level.last().unwrap());
        }
        let sibling_pos = pos ^ 1;
        siblings.push(level[sibling_pos]);
        level = level
            .chunks_exact(2)
            .map(|pair| combine(&pair[0], &pair[1]))
            .collect();
        pos /= 2;
    }

    Ok(EventMerkleProof {
        leaf_index: index as u32,
        siblings,
    })
}

/// Recompute the root from `leaf` along the proof and compare.
pub fn merkle_verify(root: &Digest, leaf: &Digest, proof: &EventMerkleProof) -> bool {
    let mut node = *leaf;
    let mut pos = proof.leaf_index as usize;
    for sibling in &proof.siblings {
        node = if pos % 2 == 0 {
            combine(&node, sibling)
        } else {
            combine(sibling, &node)
        };
        pos /= 2;
    }
    node == *root
}
