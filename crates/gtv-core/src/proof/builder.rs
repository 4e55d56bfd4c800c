//! Building proofs from values

use super::tree::{GtvMerkleProofTree, ProofElement};
use crate::error::Result;
use crate::merkle::{empty_hash, BinaryTree, ContainerHead, MerkleHashCalculator, TreeElement};
use crate::path::GtvPathSet;
use crate::value::Gtv;
use tracing::{debug, instrument};

/// Build a proof disclosing the parts of `value` named by `paths`
///
/// Every path must resolve in `value`; otherwise the result is an invalid-path
/// error and nothing is built. An empty path set yields a single hashed leaf.
#[instrument(skip_all, fields(paths = paths.len()))]
pub fn build_proof<C: MerkleHashCalculator + ?Sized>(
    value: &Gtv,
    paths: &GtvPathSet,
    calc: &C,
) -> Result<GtvMerkleProofTree> {
    let tree = BinaryTree::build_with_paths(value, paths)?;
    let proof = build_proof_from_tree(&tree, calc);
    debug!(
        disclosed = proof.disclosed_values().len(),
        hashed = proof.hashed_leaf_count(),
        "built proof"
    );
    Ok(proof)
}

/// Prune a tree built with paths into a proof
pub fn build_proof_from_tree<C: MerkleHashCalculator + ?Sized>(
    tree: &BinaryTree<'_>,
    calc: &C,
) -> GtvMerkleProofTree {
    GtvMerkleProofTree::new(prove(tree.root(), calc))
}

fn prove<C: MerkleHashCalculator + ?Sized>(element: &TreeElement<'_>, calc: &C) -> ProofElement {
    match element {
        TreeElement::Empty => ProofElement::HashedLeaf(empty_hash()),
        TreeElement::Leaf {
            value,
            marker: Some(marker),
        } => ProofElement::ValueLeaf {
            value: value.clone().into_owned(),
            path_element: marker.element.clone(),
        },
        TreeElement::Node {
            left,
            right,
            on_path: true,
        } => ProofElement::Node {
            left: Box::new(prove(left, calc)),
            right: Box::new(prove(right, calc)),
        },
        TreeElement::ArrayHead(head) => prove_head(element, head, calc, |size, path_element, left, right| {
            ProofElement::ArrayHead {
                size,
                path_element,
                left,
                right,
            }
        }),
        TreeElement::DictHead(head) => prove_head(element, head, calc, |size, path_element, left, right| {
            ProofElement::DictHead {
                size,
                path_element,
                left,
                right,
            }
        }),
        _ => ProofElement::HashedLeaf(element.merkle_hash(calc)),
    }
}

type HeadBuilder = fn(
    usize,
    Option<crate::path::PathElement>,
    Box<ProofElement>,
    Box<ProofElement>,
) -> ProofElement;

fn prove_head<C: MerkleHashCalculator + ?Sized>(
    element: &TreeElement<'_>,
    head: &ContainerHead<'_>,
    calc: &C,
    make: HeadBuilder,
) -> ProofElement {
    match &head.marker {
        None => ProofElement::HashedLeaf(element.merkle_hash(calc)),
        Some(marker) if marker.is_path_leaf => ProofElement::ValueLeaf {
            value: head.content.clone(),
            path_element: marker.element.clone(),
        },
        Some(marker) => make(
            head.size,
            marker.element.clone(),
            Box::new(prove(&head.left, calc)),
            Box::new(prove(&head.right, calc)),
        ),
    }
}

impl Gtv {
    /// Build a proof disclosing the parts of this value named by `paths`
    pub fn generate_proof<C: MerkleHashCalculator + ?Sized>(
        &self,
        paths: &GtvPathSet,
        calc: &C,
    ) -> Result<GtvMerkleProofTree> {
        build_proof(self, paths, calc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::merkle_hash;
    use crate::path::{GtvPath, PathElement};
    use crate::testing::DummyMerkleHashCalculator;

    fn paths(list: &[&str]) -> GtvPathSet {
        list.iter().map(|p| p.parse::<GtvPath>().unwrap()).collect()
    }

    fn hashed(hex: &str) -> Box<ProofElement> {
        Box::new(ProofElement::HashedLeaf(gtv_crypto::Hash::from_hex(hex).unwrap()))
    }

    #[test]
    fn test_empty_path_set_hashes_everything() {
        let value = Gtv::array([1, 2, 3]);
        let calc = DummyMerkleHashCalculator;
        let proof = build_proof(&value, &GtvPathSet::empty(), &calc).unwrap();
        assert_eq!(
            proof.root(),
            &ProofElement::HashedLeaf(merkle_hash(&value, &calc))
        );
        assert!(proof.disclosed_values().is_empty());
    }

    #[test]
    fn test_four_element_array_one_disclosed() {
        let value = Gtv::array([1, 2, 3, 4]);
        let calc = DummyMerkleHashCalculator;
        let proof = build_proof(&value, &paths(&["/0"]), &calc).unwrap();

        let expected = ProofElement::ArrayHead {
            size: 4,
            path_element: None,
            left: Box::new(ProofElement::Node {
                left: Box::new(ProofElement::ValueLeaf {
                    value: Gtv::Integer(1),
                    path_element: Some(PathElement::ArrayIndex(0)),
                }),
                right: hashed("0203"),
            }),
            right: hashed("0103050306"),
        };
        assert_eq!(proof.root(), &expected);
        assert_eq!(proof.merkle_hash(&calc), merkle_hash(&value, &calc));
    }

    #[test]
    fn test_single_entry_dict_key_is_hashed() {
        let value = Gtv::dict([("one", 1)]);
        let calc = DummyMerkleHashCalculator;
        let proof = build_proof(&value, &paths(&["/one"]), &calc).unwrap();

        let expected = ProofElement::DictHead {
            size: 1,
            path_element: None,
            left: hashed("02706f66"),
            right: Box::new(ProofElement::ValueLeaf {
                value: Gtv::Integer(1),
                path_element: Some(PathElement::DictKey("one".into())),
            }),
        };
        assert_eq!(proof.root(), &expected);
        assert_eq!(proof.merkle_hash(&calc).to_hex(), "09037170670303");
    }

    #[test]
    fn test_path_to_container_discloses_it_whole() {
        let inner = Gtv::array([5, 6]);
        let value = Gtv::array([Gtv::Integer(1), inner.clone()]);
        let calc = DummyMerkleHashCalculator;
        let proof = build_proof(&value, &paths(&["/1", "/1/0"]), &calc).unwrap();

        let disclosed = proof.disclosed_values();
        assert_eq!(disclosed, vec![("/1".parse::<GtvPath>().unwrap(), &inner)]);
        assert_eq!(proof.merkle_hash(&calc), merkle_hash(&value, &calc));
    }

    #[test]
    fn test_nested_disclosure_paths() {
        let value = Gtv::dict([
            ("header", Gtv::dict([("height", Gtv::Integer(7)), ("prev", Gtv::bytes(vec![1; 4]))])),
            ("txs", Gtv::array(["a", "b", "c"])),
        ]);
        let calc = DummyMerkleHashCalculator;
        let proof = build_proof(&value, &paths(&["/header/height", "/txs/2"]), &calc).unwrap();

        let disclosed: Vec<String> = proof
            .disclosed_values()
            .into_iter()
            .map(|(path, value)| format!("{path}={value}"))
            .collect();
        assert_eq!(disclosed, vec!["/header/height=7", "/txs/2=\"c\""]);
        assert_eq!(proof.merkle_hash(&calc), merkle_hash(&value, &calc));
        proof.check_paths(&calc).unwrap();
    }

    #[test]
    fn test_invalid_path_builds_nothing() {
        let value = Gtv::array([1]);
        let calc = DummyMerkleHashCalculator;
        let err = build_proof(&value, &paths(&["/0", "/1"]), &calc).unwrap_err();
        assert!(matches!(err, crate::GtvError::InvalidPath { .. }));
    }

    #[test]
    fn test_root_path_discloses_everything() {
        let value = Gtv::dict([("a", Gtv::array([1, 2]))]);
        let calc = DummyMerkleHashCalculator;
        let proof = value.generate_proof(&paths(&["/"]), &calc).unwrap();
        assert_eq!(proof.disclosed_values(), vec![(GtvPath::root(), &value)]);
        assert_eq!(proof.hashed_leaf_count(), 0);
    }
}
