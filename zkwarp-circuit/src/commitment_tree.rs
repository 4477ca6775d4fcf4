// zkwarp/zkwarp-circuit/src/commitment_tree.rs

use ark_bn254::Fr;
use thiserror::Error;

use crate::poseidon::combine_nodes;
use crate::MERKLE_DEPTH;

/// Maximum number of committed amounts a depth-10 accumulator can hold.
pub const MAX_COMMITMENTS: usize = 1 << MERKLE_DEPTH;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("commitment tree requires at least one leaf")]
    Empty,
    #[error("commitment tree holds at most {max} leaves, got {count}")]
    CapacityExceeded { count: usize, max: usize },
    #[error("leaf index {index} out of range for {len} leaves")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Sibling hashes and direction bits for one leaf, ordered leaf-first.
/// A true index bit means the running node is the right child at that level.
#[derive(Clone, Copy, Debug)]
pub struct MembershipPath {
    pub elements: [Fr; MERKLE_DEPTH],
    pub indices: [bool; MERKLE_DEPTH],
}

/// Fixed-depth Poseidon accumulator over committed amounts.
///
/// Every level pairs nodes left-to-right; an odd trailing node is paired
/// with itself. The same rule runs on build and on verify, so a given leaf
/// sequence always produces the same root.
pub struct CommitmentTree {
    levels: Vec<Vec<Fr>>,
}

impl CommitmentTree {
    pub fn new(leaves: &[Fr]) -> Result<Self, TreeError> {
        if leaves.is_empty() {
            return Err(TreeError::Empty);
        }
        if leaves.len() > MAX_COMMITMENTS {
            return Err(TreeError::CapacityExceeded {
                count: leaves.len(),
                max: MAX_COMMITMENTS,
            });
        }

        let mut levels = Vec::with_capacity(MERKLE_DEPTH + 1);
        let mut current = leaves.to_vec();
        for _ in 0..MERKLE_DEPTH {
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            for pair in current.chunks(2) {
                let left = pair[0];
                let right = if pair.len() == 2 { pair[1] } else { pair[0] };
                next.push(combine_nodes(left, right));
            }
            levels.push(current);
            current = next;
        }
        // current now holds the single root node
        levels.push(current);
        Ok(Self { levels })
    }

    pub fn root(&self) -> Fr {
        self.levels[MERKLE_DEPTH][0]
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    pub fn path(&self, index: usize) -> Result<MembershipPath, TreeError> {
        let len = self.leaf_count();
        if index >= len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }

        let mut elements = [Fr::from(0u64); MERKLE_DEPTH];
        let mut indices = [false; MERKLE_DEPTH];
        let mut pos = index;
        for level in 0..MERKLE_DEPTH {
            let nodes = &self.levels[level];
            let sibling_pos = pos ^ 1;
            // an odd trailing node is its own sibling
            elements[level] = if sibling_pos < nodes.len() {
                nodes[sibling_pos]
            } else {
                nodes[pos]
            };
            indices[level] = pos & 1 == 1;
            pos /= 2;
        }
        Ok(MembershipPath { elements, indices })
    }
}

/// Recompute the root a path claims, starting from `leaf`.
pub fn fold_path(leaf: Fr, path: &MembershipPath) -> Fr {
    let mut node = leaf;
    for (sibling, is_right) in path.elements.iter().zip(path.indices.iter()) {
        node = if *is_right {
            combine_nodes(*sibling, node)
        } else {
            combine_nodes(node, *sibling)
        };
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(values: &[u64]) -> Vec<Fr> {
        values.iter().map(|v| Fr::from(*v)).collect()
    }

    #[test]
    fn path_folds_back_to_root() {
        let tree = CommitmentTree::new(&leaves(&[10, 20, 30, 40, 50])).unwrap();
        for index in 0..5 {
            let path = tree.path(index).unwrap();
            assert_eq!(fold_path(Fr::from((index as u64 + 1) * 10), &path), tree.root());
        }
    }

    #[test]
    fn odd_leaf_count_is_deterministic() {
        let a = CommitmentTree::new(&leaves(&[1, 2, 3])).unwrap();
        let b = CommitmentTree::new(&leaves(&[1, 2, 3])).unwrap();
        assert_eq!(a.root(), b.root());
    }

    #[test]
    fn single_leaf_tree_has_full_depth_path() {
        let tree = CommitmentTree::new(&leaves(&[7])).unwrap();
        let path = tree.path(0).unwrap();
        assert_eq!(fold_path(Fr::from(7u64), &path), tree.root());
    }

    #[test]
    fn rejects_out_of_range_index() {
        let tree = CommitmentTree::new(&leaves(&[1, 2])).unwrap();
        assert!(matches!(
            tree.path(2),
            Err(TreeError::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn rejects_empty_leaf_set() {
        assert!(matches!(CommitmentTree::new(&[]), Err(TreeError::Empty)));
    }

    #[test]
    fn tampered_sibling_changes_folded_root() {
        let tree = CommitmentTree::new(&leaves(&[10, 20, 30, 40])).unwrap();
        let mut path = tree.path(1).unwrap();
        path.elements[0] += Fr::from(1u64);
        assert_ne!(fold_path(Fr::from(20u64), &path), tree.root());
    }
}
