//! Paths into values
//!
//! A [`GtvPath`] is a sequence of array indices and dictionary keys leading
//! from a root value to one of its descendants. A [`GtvPathSet`] names the
//! parts of a value a proof should disclose.
//!
//! Text form: `/` is the root, `/3/name` is key `name` of element 3. Segments
//! made of digits are indices; a double-quoted segment is always a key, so
//! `/"3"` is the key `3`.

use crate::error::{GtvError, Result};
use crate::text::{read_string_literal, write_quoted};
use crate::value::Gtv;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// One step of a path
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathElement {
    ArrayIndex(usize),
    DictKey(String),
}

impl PathElement {
    pub fn is_array_index(&self) -> bool {
        matches!(self, Self::ArrayIndex(_))
    }

    pub fn is_dict_key(&self) -> bool {
        matches!(self, Self::DictKey(_))
    }
}

impl From<usize> for PathElement {
    fn from(index: usize) -> Self {
        Self::ArrayIndex(index)
    }
}

impl From<&str> for PathElement {
    fn from(key: &str) -> Self {
        Self::DictKey(key.to_string())
    }
}

impl From<String> for PathElement {
    fn from(key: String) -> Self {
        Self::DictKey(key)
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArrayIndex(i) => write!(f, "{i}"),
            Self::DictKey(key) if needs_quotes(key) => write_quoted(f, key),
            Self::DictKey(key) => f.write_str(key),
        }
    }
}

fn needs_quotes(key: &str) -> bool {
    key.is_empty()
        || key.bytes().all(|b| b.is_ascii_digit())
        || key.starts_with('"')
        || key.chars().any(|c| c == '/' || c == ',' || c.is_control())
        || key.trim() != key
}

/// A path from a root value to a descendant
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GtvPath {
    elements: Vec<PathElement>,
}

impl GtvPath {
    pub fn new(elements: Vec<PathElement>) -> Self {
        Self { elements }
    }

    /// The empty path, which points at the root value itself
    pub fn root() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_root(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn first(&self) -> Option<&PathElement> {
        self.elements.first()
    }

    /// The path with its first element removed
    pub fn tail(&self) -> GtvPath {
        Self::new(self.elements.iter().skip(1).cloned().collect())
    }

    /// This path extended by one step
    pub fn child(&self, element: impl Into<PathElement>) -> GtvPath {
        let mut elements = self.elements.clone();
        elements.push(element.into());
        Self::new(elements)
    }

    /// Follow the path through `value`
    pub fn resolve<'a>(&self, value: &'a Gtv) -> Result<&'a Gtv> {
        let mut current = value;
        for (depth, element) in self.elements.iter().enumerate() {
            current = match (current, element) {
                (Gtv::Array(items), PathElement::ArrayIndex(i)) => {
                    items.get(*i).ok_or_else(|| {
                        self.invalid(format!(
                            "index {i} out of range for array of {} at step {depth}",
                            items.len()
                        ))
                    })?
                }
                (Gtv::Dict(entries), PathElement::DictKey(key)) => {
                    entries.get(key).ok_or_else(|| {
                        self.invalid(format!("key {key:?} not present at step {depth}"))
                    })?
                }
                (other, element) => {
                    return Err(self.invalid(format!(
                        "cannot apply {element} to {} at step {depth}",
                        other.gtv_type()
                    )));
                }
            };
        }
        Ok(current)
    }

    fn invalid(&self, reason: String) -> GtvError {
        GtvError::InvalidPath {
            path: self.to_string(),
            reason,
        }
    }
}

impl FromIterator<PathElement> for GtvPath {
    fn from_iter<I: IntoIterator<Item = PathElement>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for GtvPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elements.is_empty() {
            return f.write_str("/");
        }
        for element in &self.elements {
            write!(f, "/{element}")?;
        }
        Ok(())
    }
}

impl FromStr for GtvPath {
    type Err = GtvError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| GtvError::InvalidPath {
            path: s.to_string(),
            reason: reason.to_string(),
        };

        let mut rest = s.strip_prefix('/').unwrap_or(s);
        let mut elements = Vec::new();
        while !rest.is_empty() {
            let (element, used) = if rest.starts_with('"') {
                let (key, used) = read_string_literal(rest)?;
                (PathElement::DictKey(key), used)
            } else {
                let end = rest.find('/').unwrap_or(rest.len());
                let segment = &rest[..end];
                if segment.is_empty() {
                    return Err(invalid("empty segment"));
                }
                let element = if segment.bytes().all(|b| b.is_ascii_digit()) {
                    segment
                        .parse()
                        .map(PathElement::ArrayIndex)
                        .map_err(|_| invalid("index out of range"))?
                } else {
                    PathElement::DictKey(segment.to_string())
                };
                (element, end)
            };
            elements.push(element);
            rest = &rest[used..];
            if !rest.is_empty() {
                rest = rest
                    .strip_prefix('/')
                    .ok_or_else(|| invalid("expected '/' after quoted key"))?;
                if rest.is_empty() {
                    return Err(invalid("trailing '/'"));
                }
            }
        }
        Ok(Self::new(elements))
    }
}

/// What a path set asks for at the current level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurrentElement<'a> {
    /// Some path ends here
    Leaf,
    /// Some path continues through this step
    Step(&'a PathElement),
}

/// A set of paths naming the parts of a value to disclose
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GtvPathSet {
    paths: BTreeSet<GtvPath>,
}

impl GtvPathSet {
    pub fn new(paths: impl IntoIterator<Item = GtvPath>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }

    /// The set with no paths; a proof built from it discloses nothing
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GtvPath> {
        self.paths.iter()
    }

    pub fn contains(&self, path: &GtvPath) -> bool {
        self.paths.contains(path)
    }

    pub fn insert(&mut self, path: GtvPath) -> bool {
        self.paths.insert(path)
    }

    /// True when some path ends here, i.e. the current value is disclosed whole
    pub fn has_path_leaf(&self) -> bool {
        self.paths.iter().any(GtvPath::is_root)
    }

    /// The path leaf if there is one, otherwise the first step of some path
    pub fn current_element(&self) -> Option<CurrentElement<'_>> {
        if self.has_path_leaf() {
            return Some(CurrentElement::Leaf);
        }
        self.paths
            .iter()
            .find_map(GtvPath::first)
            .map(CurrentElement::Step)
    }

    /// Tails of the paths that continue into array element `index`
    pub fn tail_for_index(&self, index: usize) -> GtvPathSet {
        self.tails_for(&PathElement::ArrayIndex(index))
    }

    /// Tails of the paths that continue into dictionary entry `key`
    pub fn tail_for_key(&self, key: &str) -> GtvPathSet {
        self.tails_for(&PathElement::DictKey(key.to_string()))
    }

    fn tails_for(&self, element: &PathElement) -> GtvPathSet {
        self.paths
            .iter()
            .filter(|path| path.first() == Some(element))
            .map(GtvPath::tail)
            .collect()
    }

    /// Paths whose first step is an array index
    pub fn keep_only_array_paths(&self) -> GtvPathSet {
        self.keep_first(PathElement::is_array_index)
    }

    /// Paths whose first step is a dictionary key
    pub fn keep_only_dict_paths(&self) -> GtvPathSet {
        self.keep_first(PathElement::is_dict_key)
    }

    fn keep_first(&self, pred: impl Fn(&PathElement) -> bool) -> GtvPathSet {
        self.paths
            .iter()
            .filter(|path| path.first().is_some_and(&pred))
            .cloned()
            .collect()
    }

    /// Check that every path resolves inside `value`
    pub fn validate(&self, value: &Gtv) -> Result<()> {
        for path in &self.paths {
            path.resolve(value)?;
        }
        Ok(())
    }
}

impl FromIterator<GtvPath> for GtvPathSet {
    fn from_iter<I: IntoIterator<Item = GtvPath>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl Extend<GtvPath> for GtvPathSet {
    fn extend<I: IntoIterator<Item = GtvPath>>(&mut self, iter: I) {
        self.paths.extend(iter);
    }
}

impl<'a> IntoIterator for &'a GtvPathSet {
    type Item = &'a GtvPath;
    type IntoIter = std::collections::btree_set::Iter<'a, GtvPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

impl fmt::Display for GtvPathSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, path) in self.paths.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{path}")?;
        }
        f.write_str("}")
    }
}

/// Comma-separated paths, optionally inside braces as printed by `Display`
impl FromStr for GtvPathSet {
    type Err = GtvError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(trimmed);
        split_outside_quotes(inner)
            .into_iter()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse::<GtvPath>)
            .collect()
    }
}

fn split_outside_quotes(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ',' if !quoted => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn path(s: &str) -> GtvPath {
        s.parse().unwrap()
    }

    fn set(paths: &[&str]) -> GtvPathSet {
        paths.iter().map(|p| path(p)).collect()
    }

    #[rstest]
    #[case("/", vec![])]
    #[case("", vec![])]
    #[case("/0", vec![PathElement::ArrayIndex(0)])]
    #[case("/3/name", vec![3usize.into(), "name".into()])]
    #[case("/\"3\"", vec!["3".into()])]
    #[case("/\"a/b\"/1", vec!["a/b".into(), 1usize.into()])]
    fn test_parse_path(#[case] text: &str, #[case] expected: Vec<PathElement>) {
        assert_eq!(path(text), GtvPath::new(expected));
    }

    #[rstest]
    #[case("//")]
    #[case("/1/")]
    #[case("/\"open")]
    #[case("/\"k\"x")]
    fn test_reject_bad_paths(#[case] text: &str) {
        assert!(text.parse::<GtvPath>().is_err());
    }

    #[test]
    fn test_display_round_trips_awkward_keys() {
        for key in ["", "12", "a/b", " padded", "\"quoted", "plain"] {
            let original = GtvPath::root().child(key).child(4usize);
            assert_eq!(path(&original.to_string()), original, "key {key:?}");
        }
        assert_eq!(GtvPath::root().to_string(), "/");
    }

    #[test]
    fn test_resolve() {
        let value = Gtv::array([
            Gtv::Integer(1),
            Gtv::dict([("inner", Gtv::array(["x", "y"]))]),
        ]);
        assert_eq!(path("/1/inner/1").resolve(&value).unwrap(), &Gtv::from("y"));
        assert_eq!(path("/").resolve(&value).unwrap(), &value);

        for bad in ["/2", "/1/missing", "/0/0", "/inner", "/1/inner/0/0"] {
            assert!(
                matches!(path(bad).resolve(&value), Err(GtvError::InvalidPath { .. })),
                "resolved {bad}"
            );
        }
    }

    #[test]
    fn test_tails() {
        let paths = set(&["/0/5", "/0/6", "/1", "/a/b"]);
        assert_eq!(paths.tail_for_index(0), set(&["/5", "/6"]));
        assert!(paths.tail_for_index(1).has_path_leaf());
        assert!(paths.tail_for_index(2).is_empty());
        assert_eq!(paths.tail_for_key("a"), set(&["/b"]));
        assert!(!paths.has_path_leaf());
    }

    #[test]
    fn test_walk_down_three_paths() {
        let paths = set(&["/0/7", "/3/myKey/2", "/3/myKey/2/5"]);
        assert!(paths.current_element().is_some());

        let index0 = paths.tail_for_index(0);
        assert_eq!(index0.len(), 1);
        assert_eq!(
            index0.current_element(),
            Some(CurrentElement::Step(&PathElement::ArrayIndex(7)))
        );

        let index1 = paths.tail_for_index(1);
        assert!(index1.is_empty());
        assert_eq!(index1.current_element(), None);

        let index3 = paths.tail_for_index(3);
        assert_eq!(index3.len(), 2);
        assert_eq!(
            index3.current_element(),
            Some(CurrentElement::Step(&PathElement::DictKey("myKey".into())))
        );

        let my_key = index3.tail_for_key("myKey");
        assert_eq!(my_key.len(), 2);

        // one path ends at element 2 and another continues; the leaf wins
        let element2 = my_key.tail_for_index(2);
        assert_eq!(element2.len(), 2);
        assert_eq!(element2.current_element(), Some(CurrentElement::Leaf));

        let element5 = element2.tail_for_index(5);
        assert_eq!(element5.len(), 1);
        assert_eq!(element5.current_element(), Some(CurrentElement::Leaf));
    }

    #[test]
    fn test_keep_only() {
        let paths = set(&["/0", "/key", "/1/x"]);
        assert_eq!(paths.keep_only_array_paths(), set(&["/0", "/1/x"]));
        assert_eq!(paths.keep_only_dict_paths(), set(&["/key"]));
    }

    #[test]
    fn test_validate() {
        let value = Gtv::dict([("a", Gtv::array([1, 2]))]);
        assert!(set(&["/a/1", "/"]).validate(&value).is_ok());
        assert!(set(&["/a/1", "/b"]).validate(&value).is_err());
    }

    #[test]
    fn test_parse_path_set() {
        let paths: GtvPathSet = "/0, /\"a,b\"/1 ,/key".parse().unwrap();
        assert_eq!(paths.len(), 3);
        assert!(paths.contains(&GtvPath::root().child("a,b").child(1usize)));
        assert_eq!(paths.to_string().parse::<GtvPathSet>().unwrap(), paths);
        assert!("{}".parse::<GtvPathSet>().unwrap().is_empty());
        assert!("/a, //".parse::<GtvPathSet>().is_err());
    }

    fn arb_element() -> impl Strategy<Value = PathElement> {
        prop_oneof![
            (0usize..100_000).prop_map(PathElement::ArrayIndex),
            "[a-z0-9 ,/\"]{0,6}".prop_map(PathElement::DictKey),
        ]
    }

    proptest! {
        #[test]
        fn prop_path_text_round_trip(elements in proptest::collection::vec(arb_element(), 0..5)) {
            let path = GtvPath::new(elements);
            prop_assert_eq!(path.to_string().parse::<GtvPath>().unwrap(), path);
        }
    }
}
