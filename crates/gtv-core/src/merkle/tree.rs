//! Balanced binary trees over values
//!
//! Each container becomes a head node whose two children are the tops of a
//! balanced tree over its leaf layer. An array's leaf layer is its elements;
//! a dictionary's is `key0, value0, key1, value1, ...` in key order. Layers are
//! paired left to right and an odd element is paired with the empty sentinel.
//! Elements that are containers become head nodes themselves.

use super::calculator::MerkleHashCalculator;
use super::{empty_hash, HASH_PREFIX_NODE, HASH_PREFIX_NODE_ARRAY, HASH_PREFIX_NODE_DICT};
use crate::error::Result;
use crate::path::{CurrentElement, GtvPathSet, PathElement};
use crate::value::Gtv;
use gtv_crypto::Hash;
use std::borrow::Cow;
use tracing::trace;

/// How a tree element relates to the requested paths
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathMarker {
    /// The step from the parent container, `None` at the root
    pub element: Option<PathElement>,
    /// Some path ends here, so the whole value is disclosed
    pub is_path_leaf: bool,
}

/// A container's head node
#[derive(Debug)]
pub struct ContainerHead<'a> {
    pub size: usize,
    pub content: &'a Gtv,
    pub left: Box<TreeElement<'a>>,
    pub right: Box<TreeElement<'a>>,
    pub marker: Option<PathMarker>,
}

/// A node in the binary tree
#[derive(Debug)]
pub enum TreeElement<'a> {
    /// Padding; hashes to the empty sentinel
    Empty,
    /// A primitive value or a dictionary key
    Leaf {
        value: Cow<'a, Gtv>,
        marker: Option<PathMarker>,
    },
    /// Plain interior node
    Node {
        left: Box<TreeElement<'a>>,
        right: Box<TreeElement<'a>>,
        on_path: bool,
    },
    ArrayHead(ContainerHead<'a>),
    DictHead(ContainerHead<'a>),
}

impl<'a> TreeElement<'a> {
    fn node(left: TreeElement<'a>, right: TreeElement<'a>) -> Self {
        let on_path = left.is_on_path() || right.is_on_path();
        Self::Node {
            left: Box::new(left),
            right: Box::new(right),
            on_path,
        }
    }

    /// True when this element or a descendant is named by a path
    pub fn is_on_path(&self) -> bool {
        match self {
            Self::Empty => false,
            Self::Leaf { marker, .. } => marker.is_some(),
            Self::Node { on_path, .. } => *on_path,
            Self::ArrayHead(head) | Self::DictHead(head) => head.marker.is_some(),
        }
    }

    pub fn merkle_hash<C: MerkleHashCalculator + ?Sized>(&self, calc: &C) -> Hash {
        match self {
            Self::Empty => empty_hash(),
            Self::Leaf { value, .. } => calc.calculate_leaf_hash(value),
            Self::Node { left, right, .. } => calc.calculate_node_hash(
                HASH_PREFIX_NODE,
                &left.merkle_hash(calc),
                &right.merkle_hash(calc),
            ),
            Self::ArrayHead(head) => head.merkle_hash(HASH_PREFIX_NODE_ARRAY, calc),
            Self::DictHead(head) => head.merkle_hash(HASH_PREFIX_NODE_DICT, calc),
        }
    }

    /// Height of the subtree; leaves count as 1
    pub fn depth(&self) -> usize {
        match self {
            Self::Empty | Self::Leaf { .. } => 1,
            Self::Node { left, right, .. } => 1 + left.depth().max(right.depth()),
            Self::ArrayHead(head) | Self::DictHead(head) => {
                1 + head.left.depth().max(head.right.depth())
            }
        }
    }
}

impl ContainerHead<'_> {
    fn merkle_hash<C: MerkleHashCalculator + ?Sized>(&self, prefix: u8, calc: &C) -> Hash {
        calc.calculate_node_hash(prefix, &self.left.merkle_hash(calc), &self.right.merkle_hash(calc))
    }
}

/// The binary tree of one value
#[derive(Debug)]
pub struct BinaryTree<'a> {
    root: TreeElement<'a>,
}

impl<'a> BinaryTree<'a> {
    /// Build the tree without path information
    pub fn build(value: &'a Gtv) -> Self {
        Self {
            root: build_element(value, &GtvPathSet::empty(), None),
        }
    }

    /// Build the tree, marking the elements named by `paths`
    ///
    /// Fails with an invalid-path error unless every path resolves in `value`.
    pub fn build_with_paths(value: &'a Gtv, paths: &GtvPathSet) -> Result<Self> {
        paths.validate(value)?;
        Ok(Self {
            root: build_element(value, paths, None),
        })
    }

    pub fn root(&self) -> &TreeElement<'a> {
        &self.root
    }

    pub fn root_hash<C: MerkleHashCalculator + ?Sized>(&self, calc: &C) -> Hash {
        self.root.merkle_hash(calc)
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

fn build_element<'a>(
    value: &'a Gtv,
    paths: &GtvPathSet,
    element: Option<PathElement>,
) -> TreeElement<'a> {
    let marker = paths.current_element().map(|current| PathMarker {
        element,
        is_path_leaf: current == CurrentElement::Leaf,
    });

    match value {
        Gtv::Array(items) => {
            let paths = paths.keep_only_array_paths();
            let leaves = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    build_element(item, &paths.tail_for_index(i), Some(PathElement::ArrayIndex(i)))
                })
                .collect();
            trace!(size = items.len(), "array head");
            TreeElement::ArrayHead(head(items.len(), value, leaves, marker))
        }
        Gtv::Dict(entries) => {
            let paths = paths.keep_only_dict_paths();
            let mut leaves = Vec::with_capacity(entries.len() * 2);
            for (key, item) in entries {
                leaves.push(TreeElement::Leaf {
                    value: Cow::Owned(Gtv::String(key.clone())),
                    marker: None,
                });
                let sub = paths.tail_for_key(key);
                leaves.push(build_element(item, &sub, Some(PathElement::DictKey(key.clone()))));
            }
            trace!(size = entries.len(), "dict head");
            TreeElement::DictHead(head(entries.len(), value, leaves, marker))
        }
        _ => TreeElement::Leaf {
            value: Cow::Borrowed(value),
            marker,
        },
    }
}

fn head<'a>(
    size: usize,
    content: &'a Gtv,
    leaves: Vec<TreeElement<'a>>,
    marker: Option<PathMarker>,
) -> ContainerHead<'a> {
    let (left, right) = pair_layers(leaves);
    ContainerHead {
        size,
        content,
        left: Box::new(left),
        right: Box::new(right),
        marker,
    }
}

/// Pair up layers until two elements remain, padding odd layers with `Empty`
fn pair_layers(mut layer: Vec<TreeElement<'_>>) -> (TreeElement<'_>, TreeElement<'_>) {
    while layer.len() > 2 {
        let mut next = Vec::with_capacity(layer.len().div_ceil(2));
        let mut iter = layer.into_iter();
        while let Some(left) = iter.next() {
            let right = iter.next().unwrap_or(TreeElement::Empty);
            next.push(TreeElement::node(left, right));
        }
        layer = next;
    }
    let mut iter = layer.into_iter();
    let left = iter.next().unwrap_or(TreeElement::Empty);
    let right = iter.next().unwrap_or(TreeElement::Empty);
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::GtvPath;
    use crate::testing::DummyMerkleHashCalculator;

    fn ints(n: i64) -> Gtv {
        Gtv::array(1..=n)
    }

    #[test]
    fn test_depth_is_logarithmic() {
        assert_eq!(BinaryTree::build(&Gtv::Integer(1)).depth(), 1);
        assert_eq!(BinaryTree::build(&ints(2)).depth(), 2);
        assert_eq!(BinaryTree::build(&ints(4)).depth(), 3);
        assert_eq!(BinaryTree::build(&ints(7)).depth(), 4);
        assert_eq!(BinaryTree::build(&ints(1024)).depth(), 11);
    }

    #[test]
    fn test_odd_layers_are_padded() {
        let value = ints(3);
        let tree = BinaryTree::build(&value);
        let TreeElement::ArrayHead(head) = tree.root() else {
            panic!("expected array head");
        };
        let TreeElement::Node { right, .. } = head.right.as_ref() else {
            panic!("expected node");
        };
        assert!(matches!(right.as_ref(), TreeElement::Empty));
    }

    #[test]
    fn test_dict_leaf_layer_interleaves_keys() {
        let value = Gtv::dict([("b", 2), ("a", 1)]);
        let tree = BinaryTree::build(&value);
        let TreeElement::DictHead(head) = tree.root() else {
            panic!("expected dict head");
        };
        let TreeElement::Node { left, right, .. } = head.left.as_ref() else {
            panic!("expected node");
        };
        assert!(matches!(left.as_ref(), TreeElement::Leaf { value, .. } if **value == Gtv::from("a")));
        assert!(matches!(right.as_ref(), TreeElement::Leaf { value, .. } if **value == Gtv::Integer(1)));
    }

    #[test]
    fn test_markers_follow_paths() {
        let value = Gtv::array([Gtv::Integer(1), Gtv::array([2, 3])]);
        let paths = GtvPathSet::new(["/1/0".parse::<GtvPath>().unwrap()]);
        let tree = BinaryTree::build_with_paths(&value, &paths).unwrap();

        let TreeElement::ArrayHead(root) = tree.root() else {
            panic!("expected array head");
        };
        assert_eq!(root.marker, Some(PathMarker { element: None, is_path_leaf: false }));
        assert!(!root.left.is_on_path());

        let TreeElement::ArrayHead(inner) = root.right.as_ref() else {
            panic!("expected inner head");
        };
        assert_eq!(inner.marker.as_ref().and_then(|m| m.element.clone()), Some(PathElement::ArrayIndex(1)));
        assert!(inner.left.is_on_path());
        assert!(!inner.right.is_on_path());
    }

    #[test]
    fn test_paths_do_not_change_the_hash() {
        let value = Gtv::dict([("x", ints(5)), ("y", Gtv::from("y"))]);
        let paths = GtvPathSet::new(["/x/3".parse::<GtvPath>().unwrap(), "/y".parse().unwrap()]);
        let calc = DummyMerkleHashCalculator;
        assert_eq!(
            BinaryTree::build_with_paths(&value, &paths).unwrap().root_hash(&calc),
            BinaryTree::build(&value).root_hash(&calc)
        );
    }

    #[test]
    fn test_unresolvable_path_is_rejected() {
        let value = ints(2);
        let paths = GtvPathSet::new(["/5".parse::<GtvPath>().unwrap()]);
        assert!(BinaryTree::build_with_paths(&value, &paths).is_err());
    }
}
