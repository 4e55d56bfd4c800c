//! Layered merging of values
//!
//! [`GtvBuilder`] folds partial documents into one accumulated value, as used
//! for stacking configuration files. Primitives always replace what they
//! land on. Arrays and dictionaries merge with what is already there
//! according to the builder's [`ArrayMerge`] and [`DictMerge`] modes.

use crate::error::{GtvError, Result};
use crate::value::Gtv;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

/// How an incoming array combines with an existing one
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrayMerge {
    Replace,
    #[default]
    Append,
    Prepend,
}

/// How an incoming dictionary combines with an existing one
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DictMerge {
    /// The incoming dictionary replaces the old one whole
    Replace,
    /// On a shared key the old value wins
    KeepOld,
    /// On a shared key the values are merged, the new one winning conflicts
    #[default]
    KeepNew,
    /// A shared key is a conflict
    Strict,
}

impl ArrayMerge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Append => "append",
            Self::Prepend => "prepend",
        }
    }
}

impl DictMerge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::KeepOld => "keep-old",
            Self::KeepNew => "keep-new",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for ArrayMerge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DictMerge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArrayMerge {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "replace" => Ok(Self::Replace),
            "append" => Ok(Self::Append),
            "prepend" => Ok(Self::Prepend),
            other => Err(format!("unknown array merge mode: {other}")),
        }
    }
}

impl FromStr for DictMerge {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "replace" => Ok(Self::Replace),
            "keep-old" => Ok(Self::KeepOld),
            "keep-new" => Ok(Self::KeepNew),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown dict merge mode: {other}")),
        }
    }
}

/// Accumulates values by merging
#[derive(Clone, Debug, PartialEq)]
pub struct GtvBuilder {
    value: Gtv,
    array_merge: ArrayMerge,
    dict_merge: DictMerge,
}

impl Default for GtvBuilder {
    fn default() -> Self {
        Self::new(Gtv::empty_dict())
    }
}

impl GtvBuilder {
    /// Start from `value` with the default merge modes
    pub fn new(value: Gtv) -> Self {
        Self {
            value,
            array_merge: ArrayMerge::default(),
            dict_merge: DictMerge::default(),
        }
    }

    pub fn with_array_merge(mut self, mode: ArrayMerge) -> Self {
        self.array_merge = mode;
        self
    }

    pub fn with_dict_merge(mut self, mode: DictMerge) -> Self {
        self.dict_merge = mode;
        self
    }

    /// Merge `value` in at the root
    pub fn merge(&mut self, value: Gtv) -> Result<()> {
        self.update(value, &[])
    }

    /// Merge `value` in, nested under the dictionary keys in `path`
    ///
    /// The dictionaries along `path` always keep their other keys; the merge
    /// modes only apply where `value` meets what is already there. On error
    /// the accumulated value is left unchanged.
    #[instrument(skip_all, fields(path = %path.join("/")))]
    pub fn update(&mut self, value: Gtv, path: &[&str]) -> Result<()> {
        let mut trail = Vec::new();
        let merged = self.merge_at(value, &self.value, path, &mut trail)?;
        debug!(result_type = %merged.gtv_type(), "merged value");
        self.value = merged;
        Ok(())
    }

    pub fn value(&self) -> &Gtv {
        &self.value
    }

    pub fn build(self) -> Gtv {
        self.value
    }

    fn merge_at(
        &self,
        value: Gtv,
        old: &Gtv,
        path: &[&str],
        trail: &mut Vec<String>,
    ) -> Result<Gtv> {
        let Some((key, rest)) = path.split_first() else {
            return self.merge_value(value, old, trail);
        };
        let Gtv::Dict(old_entries) = old else {
            return Err(conflict(trail, old, "DICT"));
        };
        let mut result = old_entries.clone();
        let merged = match old_entries.get(*key) {
            None => nest(value, rest),
            Some(existing) => {
                trail.push(key.to_string());
                let merged = self.merge_at(value, existing, rest, trail)?;
                trail.pop();
                merged
            }
        };
        result.insert(key.to_string(), merged);
        Ok(Gtv::Dict(result))
    }

    fn merge_value(&self, new: Gtv, old: &Gtv, trail: &mut Vec<String>) -> Result<Gtv> {
        match new {
            Gtv::Array(items) => self.merge_array(items, old, trail),
            Gtv::Dict(entries) => self.merge_dict(entries, old, trail),
            primitive => Ok(primitive),
        }
    }

    fn merge_array(&self, new: Vec<Gtv>, old: &Gtv, trail: &[String]) -> Result<Gtv> {
        let Gtv::Array(old_items) = old else {
            return Err(conflict(trail, old, "ARRAY"));
        };
        if self.array_merge == ArrayMerge::Replace || old_items.is_empty() {
            return Ok(Gtv::Array(new));
        }
        if new.is_empty() {
            return Ok(old.clone());
        }
        Ok(Gtv::Array(match self.array_merge {
            ArrayMerge::Prepend => new.into_iter().chain(old_items.iter().cloned()).collect(),
            _ => old_items.iter().cloned().chain(new).collect(),
        }))
    }

    fn merge_dict(
        &self,
        new: BTreeMap<String, Gtv>,
        old: &Gtv,
        trail: &mut Vec<String>,
    ) -> Result<Gtv> {
        let Gtv::Dict(old_entries) = old else {
            return Err(conflict(trail, old, "DICT"));
        };
        if self.dict_merge == DictMerge::Replace || old_entries.is_empty() {
            return Ok(Gtv::Dict(new));
        }

        let mut result = old_entries.clone();
        for (key, value) in new {
            let merged = match old_entries.get(&key) {
                None => value,
                Some(existing) => match self.dict_merge {
                    DictMerge::KeepOld => existing.clone(),
                    DictMerge::Strict => {
                        return Err(GtvError::MergeConflict {
                            path: trail.join("/"),
                            reason: format!("key conflict: {key:?}"),
                        })
                    }
                    DictMerge::KeepNew | DictMerge::Replace => {
                        trail.push(key.clone());
                        let merged = self.merge_value(value, existing, trail)?;
                        trail.pop();
                        merged
                    }
                },
            };
            result.insert(key, merged);
        }
        Ok(Gtv::Dict(result))
    }
}

fn nest(value: Gtv, path: &[&str]) -> Gtv {
    path.iter()
        .rev()
        .fold(value, |inner, key| Gtv::Dict(BTreeMap::from([(key.to_string(), inner)])))
}

fn conflict(trail: &[String], old: &Gtv, new_type: &str) -> GtvError {
    GtvError::MergeConflict {
        path: trail.join("/"),
        reason: format!("cannot merge {new_type} into {}", old.gtv_type()),
    }
}
