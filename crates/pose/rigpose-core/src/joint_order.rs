//! Frozen joint order of a skeleton template.
//!
//! Index basis for every flat per-frame array. Built once while the rest pose is
//! constructed and shared read-only (behind an `Arc`) with every posed snapshot.

use hashbrown::HashMap;
use serde::Serialize;

use crate::bone::BoneId;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct JointOrder {
    names: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl JointOrder {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            names: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Append a name. Returns `false` (and leaves the order untouched) on duplicates.
    pub(crate) fn push(&mut self, name: &str) -> bool {
        if self.index.contains_key(name) {
            return false;
        }
        self.index.insert(name.to_string(), self.names.len());
        self.names.push(name.to_string());
        true
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[inline]
    pub fn id_of(&self, name: &str) -> Option<BoneId> {
        self.index_of(name).map(|i| BoneId(i as u32))
    }

    #[inline]
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
