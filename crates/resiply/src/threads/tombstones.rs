use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Ids of threads the user deleted locally. A tombstoned id is never
/// re-admitted by a merge, whatever the remote history says.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TombstoneSet(BTreeSet<String>);

impl TombstoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the id was already tombstoned.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.0.insert(id.into())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for TombstoneSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
