//! Proof trees
//!
//! A proof tree is the binary tree of a value with every subtree that holds no
//! disclosed data replaced by its hash. It hashes to the same root as the
//! value it was built from.

use crate::error::{GtvError, Result};
use crate::merkle::{
    merkle_hash, MerkleHashCalculator, HASH_PREFIX_NODE, HASH_PREFIX_NODE_ARRAY,
    HASH_PREFIX_NODE_DICT,
};
use crate::path::{GtvPath, PathElement};
use crate::value::Gtv;
use gtv_crypto::Hash;

/// One element of a proof tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProofElement {
    /// A pruned subtree, represented by its hash
    HashedLeaf(Hash),
    /// A disclosed value; containers are disclosed whole
    ValueLeaf {
        value: Gtv,
        path_element: Option<PathElement>,
    },
    Node {
        left: Box<ProofElement>,
        right: Box<ProofElement>,
    },
    ArrayHead {
        size: usize,
        path_element: Option<PathElement>,
        left: Box<ProofElement>,
        right: Box<ProofElement>,
    },
    DictHead {
        size: usize,
        path_element: Option<PathElement>,
        left: Box<ProofElement>,
        right: Box<ProofElement>,
    },
}

impl ProofElement {
    pub fn merkle_hash<C: MerkleHashCalculator + ?Sized>(&self, calc: &C) -> Hash {
        match self {
            Self::HashedLeaf(hash) => hash.clone(),
            Self::ValueLeaf { value, .. } => merkle_hash(value, calc),
            Self::Node { left, right } => node_hash(HASH_PREFIX_NODE, left, right, calc),
            Self::ArrayHead { left, right, .. } => {
                node_hash(HASH_PREFIX_NODE_ARRAY, left, right, calc)
            }
            Self::DictHead { left, right, .. } => {
                node_hash(HASH_PREFIX_NODE_DICT, left, right, calc)
            }
        }
    }

    /// The step from the parent container, if this element records one
    pub fn path_element(&self) -> Option<&PathElement> {
        match self {
            Self::ValueLeaf { path_element, .. }
            | Self::ArrayHead { path_element, .. }
            | Self::DictHead { path_element, .. } => path_element.as_ref(),
            Self::HashedLeaf(_) | Self::Node { .. } => None,
        }
    }
}

fn node_hash<C: MerkleHashCalculator + ?Sized>(
    prefix: u8,
    left: &ProofElement,
    right: &ProofElement,
    calc: &C,
) -> Hash {
    calc.calculate_node_hash(prefix, &left.merkle_hash(calc), &right.merkle_hash(calc))
}

/// A selective-disclosure proof
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GtvMerkleProofTree {
    root: ProofElement,
}

impl GtvMerkleProofTree {
    pub fn new(root: ProofElement) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &ProofElement {
        &self.root
    }

    pub fn into_root(self) -> ProofElement {
        self.root
    }

    /// Recompute the root hash the proof commits to
    pub fn merkle_hash<C: MerkleHashCalculator + ?Sized>(&self, calc: &C) -> Hash {
        self.root.merkle_hash(calc)
    }

    /// Every disclosed value with the path it was recorded under
    ///
    /// Paths come from the path elements stored in the proof. They are not
    /// covered by the root hash; see [`Self::check_paths`].
    pub fn disclosed_values(&self) -> Vec<(GtvPath, &Gtv)> {
        let mut out = Vec::new();
        collect_values(&self.root, &mut Vec::new(), &mut out);
        out
    }

    /// Number of pruned subtrees
    pub fn hashed_leaf_count(&self) -> usize {
        fn count(element: &ProofElement) -> usize {
            match element {
                ProofElement::HashedLeaf(_) => 1,
                ProofElement::ValueLeaf { .. } => 0,
                ProofElement::Node { left, right }
                | ProofElement::ArrayHead { left, right, .. }
                | ProofElement::DictHead { left, right, .. } => count(left) + count(right),
            }
        }
        count(&self.root)
    }

    /// Check that every recorded path element matches its position
    ///
    /// An array element's index is fixed by its position under the head and
    /// the head's size. A dictionary value must sit next to the hashed leaf of
    /// the key it claims. Elements inside a container must carry a step and
    /// the root must not.
    pub fn check_paths<C: MerkleHashCalculator + ?Sized>(&self, calc: &C) -> Result<()> {
        if self.root.path_element().is_some() {
            return Err(GtvError::MalformedProof(
                "root element carries a path element".to_string(),
            ));
        }
        if matches!(self.root, ProofElement::Node { .. }) {
            return Err(GtvError::MalformedProof(
                "plain node outside a container".to_string(),
            ));
        }
        check_children(&self.root, calc)
    }
}

fn collect_values<'a>(
    element: &'a ProofElement,
    path: &mut Vec<PathElement>,
    out: &mut Vec<(GtvPath, &'a Gtv)>,
) {
    let pushed = match element.path_element() {
        Some(step) => {
            path.push(step.clone());
            true
        }
        None => false,
    };
    match element {
        ProofElement::HashedLeaf(_) => {}
        ProofElement::ValueLeaf { value, .. } => out.push((GtvPath::new(path.clone()), value)),
        ProofElement::Node { left, right }
        | ProofElement::ArrayHead { left, right, .. }
        | ProofElement::DictHead { left, right, .. } => {
            collect_values(left, path, out);
            collect_values(right, path, out);
        }
    }
    if pushed {
        path.pop();
    }
}

#[derive(Clone, Copy)]
enum HeadKind {
    Array,
    Dict,
}

/// Levels of pairing between a head and its leaf layer
fn levels_for(leaf_count: usize) -> usize {
    if leaf_count <= 2 {
        1
    } else {
        (usize::BITS - (leaf_count - 1).leading_zeros()) as usize
    }
}

fn check_children<C: MerkleHashCalculator + ?Sized>(element: &ProofElement, calc: &C) -> Result<()> {
    let (kind, size, left, right) = match element {
        ProofElement::ArrayHead { size, left, right, .. } => (HeadKind::Array, *size, left, right),
        ProofElement::DictHead { size, left, right, .. } => (HeadKind::Dict, *size, left, right),
        _ => return Ok(()),
    };
    let leaf_count = match kind {
        HeadKind::Array => size,
        HeadKind::Dict => size.saturating_mul(2),
    };
    let head = HeadContext {
        kind,
        size,
        levels: levels_for(leaf_count),
    };
    let mut turns = Vec::new();
    head.check(left, right, &mut turns, calc)
}

struct HeadContext {
    kind: HeadKind,
    size: usize,
    levels: usize,
}

impl HeadContext {
    fn check<C: MerkleHashCalculator + ?Sized>(
        &self,
        left: &ProofElement,
        right: &ProofElement,
        turns: &mut Vec<bool>,
        calc: &C,
    ) -> Result<()> {
        turns.push(false);
        self.check_element(left, None, turns, calc)?;
        turns.pop();
        turns.push(true);
        self.check_element(right, Some(left), turns, calc)?;
        turns.pop();
        Ok(())
    }

    fn check_element<C: MerkleHashCalculator + ?Sized>(
        &self,
        element: &ProofElement,
        left_sibling: Option<&ProofElement>,
        turns: &mut Vec<bool>,
        calc: &C,
    ) -> Result<()> {
        match element {
            ProofElement::HashedLeaf(_) => Ok(()),
            ProofElement::Node { left, right } => {
                if turns.len() >= self.levels {
                    return Err(GtvError::MalformedProof(format!(
                        "node below the leaf layer of a container of size {}",
                        self.size
                    )));
                }
                self.check(left, right, turns, calc)
            }
            _ => {
                let step = element.path_element().ok_or_else(|| {
                    GtvError::MalformedProof("container element without a path element".to_string())
                })?;
                self.check_position(step, left_sibling, turns, calc)?;
                check_children(element, calc)
            }
        }
    }

    fn check_position<C: MerkleHashCalculator + ?Sized>(
        &self,
        step: &PathElement,
        left_sibling: Option<&ProofElement>,
        turns: &[bool],
        calc: &C,
    ) -> Result<()> {
        if turns.len() != self.levels {
            return Err(GtvError::MalformedProof(format!(
                "element {step} is not on the leaf layer"
            )));
        }
        let index = turns.iter().fold(0usize, |acc, &right| (acc << 1) | right as usize);
        match (self.kind, step) {
            (HeadKind::Array, PathElement::ArrayIndex(i)) if *i == index && index < self.size => {
                Ok(())
            }
            (HeadKind::Dict, PathElement::DictKey(key)) if index % 2 == 1 && index / 2 < self.size => {
                let expected = calc.calculate_leaf_hash(&Gtv::String(key.clone()));
                match left_sibling {
                    Some(ProofElement::HashedLeaf(hash)) if *hash == expected => Ok(()),
                    _ => Err(GtvError::MalformedProof(format!(
                        "dictionary value recorded under key {key:?} is not next to that key"
                    ))),
                }
            }
            _ => Err(GtvError::MalformedProof(format!(
                "element {step} does not match its position {index}"
            ))),
        }
    }
}
