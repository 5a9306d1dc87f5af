//! Feature groups and their column layout.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// How the levels of a group map to indicator columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// Mutually exclusive levels; exactly one indicator is set per row.
    OneHot,
    /// Independent indicators; zero or more are set per row.
    MultiHot,
}

/// Declaration of a feature group before levels are known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureGroupSpec {
    /// Semantic name used in importance and effect tables.
    pub name: String,
    /// Column-name prefix; columns are named `{prefix}_{level}`.
    pub prefix: Option<String>,
    pub kind: GroupKind,
}

impl FeatureGroupSpec {
    /// One-hot group.
    pub fn one_hot(name: impl Into<String>, prefix: Option<&str>) -> Self {
        Self { name: name.into(), prefix: prefix.map(String::from), kind: GroupKind::OneHot }
    }

    /// Multi-hot group.
    pub fn multi_hot(name: impl Into<String>, prefix: Option<&str>) -> Self {
        Self { name: name.into(), prefix: prefix.map(String::from), kind: GroupKind::MultiHot }
    }

    /// Column name of a level.
    pub fn column_name(&self, level: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}_{level}"),
            None => level.to_string(),
        }
    }
}

/// A fitted group: its kind and contiguous column range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureGroup {
    pub name: String,
    pub kind: GroupKind,
    pub columns: Range<usize>,
}

impl FeatureGroup {
    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the group has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether `column` belongs to this group.
    pub fn contains(&self, column: usize) -> bool {
        self.columns.contains(&column)
    }
}

/// Ordered feature groups and column names of an encoded matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureLayout {
    groups: Vec<FeatureGroup>,
    column_names: Vec<String>,
}

impl FeatureLayout {
    pub(crate) fn new(groups: Vec<FeatureGroup>, column_names: Vec<String>) -> Self {
        debug_assert_eq!(groups.last().map_or(0, |g| g.columns.end), column_names.len());
        Self { groups, column_names }
    }

    /// Groups in column order.
    pub fn groups(&self) -> &[FeatureGroup] {
        &self.groups
    }

    /// Column names in column order.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Total number of columns.
    pub fn n_features(&self) -> usize {
        self.column_names.len()
    }

    /// Index of the group owning `column`.
    pub fn group_of(&self, column: usize) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(column))
    }

    /// Group by semantic name.
    pub fn group(&self, name: &str) -> Option<&FeatureGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Whether two distinct columns are mutually exclusive levels of one group.
    pub fn are_exclusive(&self, a: usize, b: usize) -> bool {
        a != b
            && self
                .group_of(a)
                .is_some_and(|g| self.groups[g].kind == GroupKind::OneHot && self.groups[g].contains(b))
    }
}
